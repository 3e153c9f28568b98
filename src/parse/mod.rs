mod context;
mod error;
mod lex;
mod parser;

pub use error::{ParseError, ParseErrors, MAX_ARGUMENTS};
pub use lex::lex;
pub use parser::parse;
