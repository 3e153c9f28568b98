use super::value::Value;
use thiserror::Error;

use crate::token::Token;

#[derive(Debug, Error)]
pub enum Error {
    #[error("[line {line}] Undefined variable `{name}`")]
    UndefinedVariable { name: String, line: usize },

    #[error("[line {}] Operand of `{}` must be a number, got {}", .operator.line, .operator.lexeme, .operand.type_name())]
    NumberOperand { operator: Token, operand: Value },

    #[error("[line {}] Operands of `{}` must be numbers, got {} and {}", .operator.line, .operator.lexeme, .lhs.type_name(), .rhs.type_name())]
    NumberOperands {
        operator: Token,
        lhs: Value,
        rhs: Value,
    },

    #[error("[line {}] Operands of `{}` must be two numbers or two strings, got {} and {}", .operator.line, .operator.lexeme, .lhs.type_name(), .rhs.type_name())]
    AddOperands {
        operator: Token,
        lhs: Value,
        rhs: Value,
    },

    #[error("[line {line}] Unsupported construct: {construct}")]
    Unsupported { construct: &'static str, line: usize },

    #[error("[line {}] Unknown operator `{}`", .0.line, .0.lexeme)]
    UnknownOperation(Token),

    #[error("Write value `{0}` failed with error: {1}")]
    WriteFailed(Value, std::io::Error),
}

impl Error {
    /// Operand errors, the runtime's type errors.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Error::NumberOperand { .. } | Error::NumberOperands { .. } | Error::AddOperands { .. }
        )
    }

    pub fn line(&self) -> Option<usize> {
        use Error::*;
        match self {
            UndefinedVariable { line, .. } | Unsupported { line, .. } => Some(*line),
            NumberOperand { operator, .. }
            | NumberOperands { operator, .. }
            | AddOperands { operator, .. } => Some(operator.line),
            UnknownOperation(t) => Some(t.line),
            WriteFailed(..) => None,
        }
    }
}
