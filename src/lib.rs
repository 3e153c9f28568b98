pub mod ast;
pub mod error;
pub mod interpret;
pub mod parse;
pub mod printer;
pub mod token;

use log::{debug, trace};

pub use error::Error;
pub use interpret::{Environment, Interpreter, Value};

use crate::ast::StatementList;

/// Scans and parses `input`. Nothing is parsed when scanning failed.
pub fn parse_source(input: &str) -> Result<StatementList, Error> {
    let tokens = parse::lex(input).map_err(Error::Scan)?;
    for token in &tokens {
        debug!("{}", token);
    }

    let stmts = parse::parse(&tokens).map_err(Error::Parse)?;
    for stmt in &stmts {
        trace!("{}", printer::print_statement(stmt));
    }

    Ok(stmts)
}

/// Runs `input` against `environment`. Bindings made before a runtime error
/// stay in the environment, which is back at its root scope either way.
pub fn run(input: &str, environment: &mut Environment) -> Result<Value, Error> {
    let stmts = parse_source(input)?;
    let value = Interpreter::new(environment).interpret(&stmts)?;
    Ok(value)
}
