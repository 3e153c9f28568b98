mod environment;
mod error;
mod interpreter;
mod value;

pub use environment::Environment;
pub use error::Error;
pub use interpreter::Interpreter;
pub use value::Value;
