//! Parenthesized, Lisp-style rendering of the AST, used for debug dumps.

use crate::ast::{Expression, FunctionNode, Statement};
use crate::token::Token;

pub fn print_expression(expr: &Expression) -> String {
    match expr {
        Expression::Literal(literal) => literal.to_string(),
        Expression::Grouping(inner) => parenthesize("group", &[inner.as_ref()]),
        Expression::Unary { operator, operand } => {
            parenthesize(&operator.lexeme, &[operand.as_ref()])
        }
        Expression::Binary {
            left,
            operator,
            right,
        }
        | Expression::Logical {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[left.as_ref(), right.as_ref()]),
        Expression::Variable(name) => name.lexeme.clone(),
        Expression::Assignment { name, value } => {
            format!("(= {} {})", name.lexeme, print_expression(value))
        }
        Expression::Call {
            callee, arguments, ..
        } => {
            let mut parts = vec![print_expression(callee)];
            parts.extend(arguments.iter().map(print_expression));
            format!("(call {})", parts.join(" "))
        }
        Expression::Get { object, name } => {
            format!("(. {} {})", print_expression(object), name.lexeme)
        }
        Expression::Set {
            object,
            name,
            value,
        } => format!(
            "(.= {} {} {})",
            print_expression(object),
            name.lexeme,
            print_expression(value)
        ),
        Expression::This(_) => "this".to_string(),
        Expression::Super { method, .. } => format!("(super {})", method.lexeme),
    }
}

pub fn print_statement(stmt: &Statement) -> String {
    match stmt {
        Statement::Expr(expr) => format!("(; {})", print_expression(expr)),
        Statement::Print(expr) => format!("(print {})", print_expression(expr)),
        Statement::Var { name, initializer } => match initializer {
            Some(expr) => format!("(var {} {})", name.lexeme, print_expression(expr)),
            None => format!("(var {})", name.lexeme),
        },
        Statement::Block(stmts) => with_children("(block", stmts.iter().map(print_statement)),
        Statement::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut parts = vec![print_expression(condition), print_statement(then_branch)];
            if let Some(stmt) = else_branch {
                parts.push(print_statement(stmt));
            }
            format!("(if {})", parts.join(" "))
        }
        Statement::While { condition, body } => format!(
            "(while {} {})",
            print_expression(condition),
            print_statement(body)
        ),
        Statement::Function(node) => print_function("fun", node),
        Statement::Return { value, .. } => match value {
            Some(expr) => format!("(return {})", print_expression(expr)),
            None => "(return)".to_string(),
        },
        Statement::Class {
            name,
            superclass,
            methods,
        } => {
            let head = match superclass {
                Some(superclass) => format!("(class {} < {}", name.lexeme, superclass.lexeme),
                None => format!("(class {}", name.lexeme),
            };
            with_children(&head, methods.iter().map(|m| print_function("method", m)))
        }
    }
}

fn print_function(kind: &str, node: &FunctionNode) -> String {
    let head = format!("({} {} ({})", kind, node.name.lexeme, join_names(&node.params));
    with_children(&head, node.body.iter().map(print_statement))
}

fn join_names(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parenthesize(name: &str, exprs: &[&Expression]) -> String {
    let mut formatted = format!("({}", name);
    for expr in exprs {
        formatted.push(' ');
        formatted.push_str(&print_expression(expr));
    }
    formatted.push(')');
    formatted
}

fn with_children(head: &str, children: impl Iterator<Item = String>) -> String {
    let mut formatted = head.to_string();
    for child in children {
        formatted.push(' ');
        formatted.push_str(&child);
    }
    formatted.push(')');
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{lex, parse};

    fn print_source(input: &str) -> Vec<String> {
        let stmts = parse(&lex(input).unwrap()).unwrap();
        stmts.iter().map(print_statement).collect()
    }

    #[test]
    fn expressions() {
        assert_eq!(
            print_source("(1 + 2) * -3; a = b or !c; \"s\" == nil;"),
            vec![
                "(; (* (group (+ 1 2)) (- 3)))",
                "(; (= a (or b (! c))))",
                "(; (== s nil))",
            ]
        );
    }

    #[test]
    fn statements() {
        assert_eq!(
            print_source("var x; var y = 1.5; { print y; } if (x) print 1; else print 2;"),
            vec![
                "(var x)",
                "(var y 1.5)",
                "(block (print y))",
                "(if x (print 1) (print 2))",
            ]
        );
    }

    #[test]
    fn desugared_for() {
        assert_eq!(
            print_source("for (var i = 0; i < 2; i = i + 1) print i;"),
            vec!["(block (var i 0) (while (< i 2) (block (print i) (; (= i (+ i 1))))))"]
        );
    }

    #[test]
    fn reserved_forms() {
        assert_eq!(
            print_source("fun f(a, b) { return a; } class C < B { m() { this.x = super.y(1); } }"),
            vec![
                "(fun f (a b) (return a))",
                "(class C < B (method m () (; (.= this x (call (super y) 1)))))",
            ]
        );
    }
}
