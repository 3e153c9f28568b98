use std::io::Write;

use log::trace;

use super::environment::Environment;
use super::error::Error;
use super::value::Value;
use crate::ast::*;
use crate::printer::print_statement;
use crate::token::{Token, TokenKind};

/// Walks statements against an environment owned by the caller, so the
/// bindings outlive one `interpret` call when the caller wants them to.
pub struct Interpreter<'env> {
    environment: &'env mut Environment,
}

impl<'env> Interpreter<'env> {
    pub fn new(environment: &'env mut Environment) -> Self {
        Self { environment }
    }

    /// Runs `stmts` in order, stopping at the first runtime error. Yields the
    /// value of the last statement when it is an expression statement.
    pub fn interpret(&mut self, stmts: &[Statement]) -> Result<Value, Error> {
        let mut last = Value::Nil;
        for stmt in stmts {
            last = match stmt {
                Statement::Expr(expr) => self.interpret_expr(expr)?,
                _ => {
                    self.interpret_stmt(stmt)?;
                    Value::Nil
                }
            };
        }
        Ok(last)
    }

    fn interpret_stmt(&mut self, stmt: &Statement) -> Result<(), Error> {
        trace!("exec {}", print_statement(stmt));
        match stmt {
            Statement::Expr(expr) => self.interpret_expr(expr).map(|_| ()),
            Statement::Print(expr) => self.interpret_print_stmt(expr),
            Statement::Var { name, initializer } => {
                self.interpret_declare_stmt(name, initializer.as_ref())
            }
            Statement::Block(stmts) => self.interpret_block(stmts),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.interpret_if_stmt(condition, then_branch, else_branch.as_deref()),
            Statement::While { condition, body } => self.interpret_while_stmt(condition, body),
            Statement::Function(node) => Err(unsupported("function declaration", &node.name)),
            Statement::Return { keyword, .. } => Err(unsupported("return statement", keyword)),
            Statement::Class { name, .. } => Err(unsupported("class declaration", name)),
        }
    }

    fn interpret_stmt_list(&mut self, stmts: &[Statement]) -> Result<(), Error> {
        for stmt in stmts {
            self.interpret_stmt(stmt)?;
        }
        Ok(())
    }

    fn interpret_block(&mut self, stmts: &[Statement]) -> Result<(), Error> {
        let previous = self.environment.push_scope();
        let result = self.interpret_stmt_list(stmts);
        // restore before looking at the result, errors included
        self.environment.restore_scope(previous);
        result
    }

    fn interpret_print_stmt(&mut self, expr: &Expression) -> Result<(), Error> {
        let value = self.interpret_expr(expr)?;
        let mut out = self.environment.get_print_writer();
        writeln!(out, "{}", value).map_err(|err| Error::WriteFailed(value, err))
    }

    fn interpret_declare_stmt(
        &mut self,
        name: &Token,
        initializer: Option<&Expression>,
    ) -> Result<(), Error> {
        let value = match initializer {
            Some(expr) => self.interpret_expr(expr)?,
            None => Value::Nil,
        };
        self.environment.define(&name.lexeme, value);
        Ok(())
    }

    fn interpret_if_stmt(
        &mut self,
        condition: &Expression,
        then_branch: &Statement,
        else_branch: Option<&Statement>,
    ) -> Result<(), Error> {
        if self.is_truthy(condition)? {
            return self.interpret_stmt(then_branch);
        }
        match else_branch {
            Some(stmt) => self.interpret_stmt(stmt),
            None => Ok(()),
        }
    }

    fn interpret_while_stmt(
        &mut self,
        condition: &Expression,
        body: &Statement,
    ) -> Result<(), Error> {
        while self.is_truthy(condition)? {
            self.interpret_stmt(body)?;
        }
        Ok(())
    }

    fn interpret_expr(&mut self, expr: &Expression) -> Result<Value, Error> {
        match expr {
            Expression::Literal(literal) => Ok(Value::from(literal)),
            Expression::Grouping(inner) => self.interpret_expr(inner),
            Expression::Unary { operator, operand } => self.interpret_unary_op(operator, operand),
            Expression::Binary {
                left,
                operator,
                right,
            } => self.interpret_binary_op(left, operator, right),
            Expression::Logical {
                left,
                operator,
                right,
            } => self.interpret_logical_op(left, operator, right),
            Expression::Variable(name) => self.environment.get(name),
            Expression::Assignment { name, value } => {
                let value = self.interpret_expr(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Call { paren, .. } => Err(unsupported("call", paren)),
            Expression::Get { name, .. } => Err(unsupported("property access", name)),
            Expression::Set { name, .. } => Err(unsupported("property assignment", name)),
            Expression::This(keyword) => Err(unsupported("this", keyword)),
            Expression::Super { keyword, .. } => Err(unsupported("super", keyword)),
        }
    }

    fn interpret_unary_op(&mut self, op: &Token, operand: &Expression) -> Result<Value, Error> {
        let res = self.interpret_expr(operand)?;
        match op.kind {
            TokenKind::Bang => Ok(Value::Bool(!res.is_truthy())),
            TokenKind::Minus => match res {
                Value::Number(v) => Ok(Value::Number(-v)),
                _ => Err(Error::NumberOperand {
                    operator: op.clone(),
                    operand: res,
                }),
            },
            _ => Err(Error::UnknownOperation(op.clone())),
        }
    }

    fn interpret_binary_op(
        &mut self,
        lhs: &Expression,
        op: &Token,
        rhs: &Expression,
    ) -> Result<Value, Error> {
        let lhs = self.interpret_expr(lhs)?;
        let rhs = self.interpret_expr(rhs)?;

        match op.kind {
            TokenKind::Plus => add(lhs, op, rhs),
            TokenKind::Minus | TokenKind::Star | TokenKind::Slash => arithmetic(lhs, op, rhs),
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => compare(lhs, op, rhs),
            TokenKind::EqualEqual => Ok(Value::Bool(lhs == rhs)),
            TokenKind::BangEqual => Ok(Value::Bool(lhs != rhs)),
            _ => Err(Error::UnknownOperation(op.clone())),
        }
    }

    // The left operand is evaluated once and, when it decides the result,
    // returned as is.
    fn interpret_logical_op(
        &mut self,
        lhs: &Expression,
        op: &Token,
        rhs: &Expression,
    ) -> Result<Value, Error> {
        let lhs = self.interpret_expr(lhs)?;
        match op.kind {
            TokenKind::Or if lhs.is_truthy() => Ok(lhs),
            TokenKind::And if !lhs.is_truthy() => Ok(lhs),
            TokenKind::Or | TokenKind::And => self.interpret_expr(rhs),
            _ => Err(Error::UnknownOperation(op.clone())),
        }
    }

    fn is_truthy(&mut self, expr: &Expression) -> Result<bool, Error> {
        self.interpret_expr(expr).map(|v| v.is_truthy())
    }
} // Interpreter

fn unsupported(construct: &'static str, token: &Token) -> Error {
    Error::Unsupported {
        construct,
        line: token.line,
    }
}

fn add(lhs: Value, op: &Token, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
        (lhs, rhs) => Err(Error::AddOperands {
            operator: op.clone(),
            lhs,
            rhs,
        }),
    }
}

fn arithmetic(lhs: Value, op: &Token, rhs: Value) -> Result<Value, Error> {
    let (l, r) = extract_numbers(lhs, op, rhs)?;
    let v = match op.kind {
        TokenKind::Minus => l - r,
        TokenKind::Star => l * r,
        // IEEE semantics, dividing by zero is not an error
        TokenKind::Slash => l / r,
        _ => return Err(Error::UnknownOperation(op.clone())),
    };
    Ok(Value::Number(v))
}

fn compare(lhs: Value, op: &Token, rhs: Value) -> Result<Value, Error> {
    let (l, r) = extract_numbers(lhs, op, rhs)?;
    let v = match op.kind {
        TokenKind::Greater => l > r,
        TokenKind::GreaterEqual => l >= r,
        TokenKind::Less => l < r,
        TokenKind::LessEqual => l <= r,
        _ => return Err(Error::UnknownOperation(op.clone())),
    };
    Ok(Value::Bool(v))
}

fn extract_numbers(lhs: Value, op: &Token, rhs: Value) -> Result<(f64, f64), Error> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        (lhs, rhs) => Err(Error::NumberOperands {
            operator: op.clone(),
            lhs,
            rhs,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::parse::{lex, parse};
    use crate::token::Literal;

    struct Run {
        result: Result<Value, Error>,
        output: String,
        environment: Environment,
    }

    fn run(input: &str) -> Run {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let mut environment = Environment::new(buffer.clone());
        let stmts = parse(&lex(input).unwrap()).unwrap();
        let result = Interpreter::new(&mut environment).interpret(&stmts);
        let output = String::from_utf8(buffer.borrow().clone()).unwrap();
        Run {
            result,
            output,
            environment,
        }
    }

    fn eval(input: &str) -> Value {
        run(&format!("{};", input)).result.unwrap()
    }

    fn token(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, None, 4)
    }

    #[test]
    fn arithmetic_follows_precedence() {
        assert_eq!(eval("1 + 2 * 3"), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3"), Value::Number(9.0));
        assert_eq!(eval("10 - 4 - 3"), Value::Number(3.0));
        assert_eq!(eval("-2 * -3"), Value::Number(6.0));
        assert_eq!(eval("7 / 2"), Value::Number(3.5));
    }

    #[test]
    fn division_by_zero_is_infinite() {
        assert_eq!(eval("1 / 0"), Value::Number(f64::INFINITY));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("\"foo\" + \"bar\""), Value::Str("foobar".to_string()));
    }

    #[test]
    fn comparison_and_equality() {
        assert_eq!(eval("1 < 2"), Value::Bool(true));
        assert_eq!(eval("2 <= 2"), Value::Bool(true));
        assert_eq!(eval("1 > 2"), Value::Bool(false));
        assert_eq!(eval("nil == nil"), Value::Bool(true));
        assert_eq!(eval("nil == false"), Value::Bool(false));
        assert_eq!(eval("\"a\" == 1"), Value::Bool(false));
        assert_eq!(eval("\"a\" != \"a\""), Value::Bool(false));
    }

    #[test]
    fn bang_uses_truthiness() {
        assert_eq!(eval("!nil"), Value::Bool(true));
        assert_eq!(eval("!0"), Value::Bool(false));
        assert_eq!(eval("!\"\""), Value::Bool(false));
    }

    #[test]
    fn type_errors_name_the_operator() {
        let err = run("-\"x\";").result.unwrap_err();
        assert!(matches!(err, Error::NumberOperand { ref operator, .. } if operator.lexeme == "-"));

        let err = run("1 + \"x\";").result.unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("`+`"));

        let err = run("\"a\" < \"b\";").result.unwrap_err();
        assert!(matches!(err, Error::NumberOperands { ref operator, .. } if operator.lexeme == "<"));

        let err = run("true * 2;").result.unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn logical_operators_return_original_operands() {
        assert_eq!(eval("nil or \"x\""), Value::Str("x".to_string()));
        assert_eq!(eval("1 or undefined"), Value::Number(1.0));
        assert_eq!(eval("nil and undefined"), Value::Nil);
        assert_eq!(eval("1 and 2"), Value::Number(2.0));
        assert_eq!(eval("false or nil"), Value::Nil);
    }

    #[test]
    fn assignment_yields_value_and_chains() {
        let run = run("var a; var b; a = b = 3; print a; print b;");
        run.result.unwrap();
        assert_eq!(run.output, "3\n3\n");
    }

    #[test]
    fn block_scope_is_restored_after_runtime_error() {
        let run = run("var a = 1; { var a = 2; { print undefined; } }");
        assert!(matches!(
            run.result,
            Err(Error::UndefinedVariable { ref name, line: 1 }) if name == "undefined"
        ));
        assert_eq!(run.environment.depth(), 1);
        let name = token(TokenKind::Identifier, "a");
        assert_eq!(run.environment.get(&name).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn while_and_if() {
        let run = run(
            "var i = 0; var evens = 0;
             while (i < 5) {
               if (i == 0 or i == 2 or i == 4) evens = evens + 1; else print i;
               i = i + 1;
             }
             print evens;",
        );
        run.result.unwrap();
        assert_eq!(run.output, "1\n3\n3\n");
    }

    #[test]
    fn last_expression_statement_is_the_result() {
        assert_eq!(run("var a = 2; a * 4;").result.unwrap(), Value::Number(8.0));
        assert_eq!(run("1; print 2;").result.unwrap(), Value::Nil);
    }

    #[test]
    fn reserved_statements_are_unsupported() {
        let err = run("fun f() {}").result.unwrap_err();
        assert!(matches!(err, Error::Unsupported { construct: "function declaration", .. }));
        let err = run("class A {}").result.unwrap_err();
        assert!(matches!(err, Error::Unsupported { construct: "class declaration", .. }));
        let err = run("return;").result.unwrap_err();
        assert!(matches!(err, Error::Unsupported { construct: "return statement", .. }));
    }

    #[test]
    fn reserved_expressions_are_unsupported() {
        let mut environment = Environment::new(Rc::new(RefCell::new(Vec::<u8>::new())));
        let mut itp = Interpreter::new(&mut environment);
        let callee = Expression::Variable(token(TokenKind::Identifier, "f"));
        let cases = vec![
            (
                Expression::Call {
                    callee: Box::new(callee.clone()),
                    paren: token(TokenKind::RightParen, ")"),
                    arguments: vec![],
                },
                "call",
            ),
            (
                Expression::Get {
                    object: Box::new(callee.clone()),
                    name: token(TokenKind::Identifier, "x"),
                },
                "property access",
            ),
            (
                Expression::Set {
                    object: Box::new(callee),
                    name: token(TokenKind::Identifier, "x"),
                    value: Box::new(Expression::Literal(Literal::Nil)),
                },
                "property assignment",
            ),
            (Expression::This(token(TokenKind::This, "this")), "this"),
            (
                Expression::Super {
                    keyword: token(TokenKind::Super, "super"),
                    method: token(TokenKind::Identifier, "m"),
                },
                "super",
            ),
        ];

        for (expr, expected) in cases {
            let err = itp.interpret(&[Statement::Expr(expr)]).unwrap_err();
            assert!(
                matches!(err, Error::Unsupported { construct, line: 4 } if construct == expected),
                "unexpected error {:?}",
                err
            );
        }
    }
}
