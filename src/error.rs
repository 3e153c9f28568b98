use thiserror::Error;

use crate::interpret;
use crate::parse::ParseErrors;

/// Failure of one pass through the pipeline, tagged by the stage that failed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Scan(ParseErrors),

    #[error("{0}")]
    Parse(ParseErrors),

    #[error(transparent)]
    Runtime(#[from] interpret::Error),
}
