use log::trace;

use crate::ast::*;
use crate::token::{Literal, Token, TokenKind};

use super::context::Context;
use super::error::{ParseError, ParseErrors, MAX_ARGUMENTS};

/// Parses a whole token stream. A failed declaration is reported, the
/// parser resynchronizes at the next statement boundary and carries on, so
/// every independent error in the input comes back in one `ParseErrors`.
pub fn parse(items: &[Token]) -> Result<StatementList, ParseErrors> {
    let mut state = Context::new(items);
    let mut stmts = vec![];

    while !state.is_at_end() {
        if let Some(stmt) = parse_declaration(&mut state) {
            stmts.push(stmt);
        }
    }

    let errors = state.into_errors();
    if errors.is_empty() {
        Ok(stmts)
    } else {
        Err(ParseErrors(errors))
    }
}

fn parse_declaration(state: &mut Context) -> Option<Statement> {
    let result = match state.get_curr().kind {
        TokenKind::Class => parse_class(state),
        TokenKind::Fun => {
            state.advance();
            parse_function(state).map(Statement::Function)
        }
        TokenKind::Var => parse_var_declaration(state),
        _ => parse_stmt(state),
    };

    match result {
        Ok(stmt) => Some(stmt),
        Err(err) => {
            trace!("recovering from {:?}", err);
            state.report(err);
            state.synchronize();
            None
        }
    }
}

fn parse_class(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::Class)?;
    let name = state.consume_token(TokenKind::Identifier)?;

    let superclass = match state.match_token(&[TokenKind::Less]) {
        Some(_) => Some(state.consume_token(TokenKind::Identifier)?),
        None => None,
    };

    state.consume_token(TokenKind::LeftBrace)?;
    let mut methods = vec![];
    while !state.peek(&[TokenKind::RightBrace]) && !state.is_at_end() {
        methods.push(parse_function(state)?);
    }
    state.consume_token(TokenKind::RightBrace)?;

    Ok(Statement::Class {
        name,
        superclass,
        methods,
    })
}

fn parse_function(state: &mut Context) -> Result<FunctionNode, ParseError> {
    let name = state.consume_token(TokenKind::Identifier)?;
    state.consume_token(TokenKind::LeftParen)?;
    let (params, _) = parse_comma_list(state, TokenKind::RightParen, |s| {
        s.consume_token(TokenKind::Identifier)
    })?;
    let body = parse_block_statement_list(state)?;
    Ok(FunctionNode { name, params, body })
}

fn parse_var_declaration(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::Var)?;
    let name = state.consume_token(TokenKind::Identifier)?;

    let initializer = match state.match_token(&[TokenKind::Equal]) {
        Some(_) => Some(parse_expr(state)?),
        None => None,
    };

    state.consume_token(TokenKind::Semicolon)?;
    Ok(Statement::Var { name, initializer })
}

fn parse_stmt(state: &mut Context) -> Result<Statement, ParseError> {
    match state.get_curr().kind {
        TokenKind::Print => parse_print(state),
        TokenKind::LeftBrace => parse_block_statement_list(state).map(Statement::Block),
        TokenKind::If => parse_if(state),
        TokenKind::While => parse_while(state),
        TokenKind::For => parse_for(state),
        TokenKind::Return => parse_return(state),
        _ => parse_expr_stmt(state),
    }
}

fn parse_print(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::Print)?;
    let expr = parse_expr(state)?;
    state.consume_token(TokenKind::Semicolon)?;
    Ok(Statement::Print(expr))
}

fn parse_return(state: &mut Context) -> Result<Statement, ParseError> {
    let keyword = state.consume_token(TokenKind::Return)?;
    let value = if !state.peek(&[TokenKind::Semicolon]) {
        Some(parse_expr(state)?)
    } else {
        None
    };
    state.consume_token(TokenKind::Semicolon)?;
    Ok(Statement::Return { keyword, value })
}

fn parse_block_statement_list(state: &mut Context) -> Result<StatementList, ParseError> {
    state.consume_token(TokenKind::LeftBrace)?;

    let mut stmts = vec![];
    while !state.peek(&[TokenKind::RightBrace]) && !state.is_at_end() {
        if let Some(stmt) = parse_declaration(state) {
            stmts.push(stmt);
        }
    }

    state.consume_token(TokenKind::RightBrace)?;
    Ok(stmts)
}

fn parse_if(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::If)?;
    state.consume_token(TokenKind::LeftParen)?;
    let condition = parse_expr(state)?;
    state.consume_token(TokenKind::RightParen)?;

    let then_branch = Box::new(parse_stmt(state)?);
    let else_branch = match state.match_token(&[TokenKind::Else]) {
        Some(_) => Some(Box::new(parse_stmt(state)?)),
        None => None,
    };

    Ok(Statement::If {
        condition,
        then_branch,
        else_branch,
    })
}

fn parse_while(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::While)?;
    state.consume_token(TokenKind::LeftParen)?;
    let condition = parse_expr(state)?;
    state.consume_token(TokenKind::RightParen)?;
    let body = Box::new(parse_stmt(state)?);
    Ok(Statement::While { condition, body })
}

// `for` has no node of its own: it becomes
// { initializer; while (condition) { body; increment; } }
fn parse_for(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::For)?;
    state.consume_token(TokenKind::LeftParen)?;

    let initializer = if state.match_token(&[TokenKind::Semicolon]).is_some() {
        None
    } else if state.peek(&[TokenKind::Var]) {
        Some(parse_var_declaration(state)?)
    } else {
        Some(parse_expr_stmt(state)?)
    };

    let condition = if !state.peek(&[TokenKind::Semicolon]) {
        Some(parse_expr(state)?)
    } else {
        None
    };
    state.consume_token(TokenKind::Semicolon)?;

    let increment = if !state.peek(&[TokenKind::RightParen]) {
        Some(parse_expr(state)?)
    } else {
        None
    };
    state.consume_token(TokenKind::RightParen)?;

    let mut body = parse_stmt(state)?;

    if let Some(increment) = increment {
        body = Statement::Block(vec![body, Statement::Expr(increment)]);
    }

    body = Statement::While {
        condition: condition.unwrap_or(Expression::Literal(Literal::Bool(true))),
        body: Box::new(body),
    };

    if let Some(initializer) = initializer {
        body = Statement::Block(vec![initializer, body]);
    }

    Ok(body)
}

fn parse_expr_stmt(state: &mut Context) -> Result<Statement, ParseError> {
    let expr = parse_expr(state)?;
    state.consume_token(TokenKind::Semicolon)?;
    Ok(Statement::Expr(expr))
}

fn parse_expr(state: &mut Context) -> Result<Expression, ParseError> {
    parse_assignment(state)
}

fn parse_assignment(state: &mut Context) -> Result<Expression, ParseError> {
    let expr = parse_logic_or(state)?;

    let Some(equals) = state.match_token(&[TokenKind::Equal]) else {
        return Ok(expr);
    };
    let value = Box::new(parse_assignment(state)?);

    match expr {
        Expression::Variable(name) => Ok(Expression::Assignment { name, value }),
        Expression::Get { object, name } => Ok(Expression::Set {
            object,
            name,
            value,
        }),
        other => {
            // keep going with the left side as a plain expression
            state.report(ParseError::InvalidAssignmentTarget(equals));
            Ok(other)
        }
    }
}

fn parse_logic_or(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(state, &[TokenKind::Or], parse_logic_and, logical_node)
}

fn parse_logic_and(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(state, &[TokenKind::And], parse_equality, logical_node)
}

fn parse_equality(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[TokenKind::BangEqual, TokenKind::EqualEqual],
        parse_comparison,
        binary_node,
    )
}

fn parse_comparison(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ],
        parse_term,
        binary_node,
    )
}

fn parse_term(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[TokenKind::Minus, TokenKind::Plus],
        parse_factor,
        binary_node,
    )
}

fn parse_factor(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[TokenKind::Slash, TokenKind::Star],
        parse_unary,
        binary_node,
    )
}

fn binary_node(left: Expression, operator: Token, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

fn logical_node(left: Expression, operator: Token, right: Expression) -> Expression {
    Expression::Logical {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

fn parse_recursive_binary<F>(
    state: &mut Context,
    match_tokens: &'static [TokenKind],
    lower_fn: F,
    make_node: fn(Expression, Token, Expression) -> Expression,
) -> Result<Expression, ParseError>
where
    F: Fn(&mut Context) -> Result<Expression, ParseError>,
{
    let mut lhs = lower_fn(state)?;

    while let Some(op) = state.match_token(match_tokens) {
        let rhs = lower_fn(state)?;
        lhs = make_node(lhs, op, rhs);
    }

    Ok(lhs)
}

fn parse_unary(state: &mut Context) -> Result<Expression, ParseError> {
    match state.match_token(&[TokenKind::Bang, TokenKind::Minus]) {
        Some(operator) => Ok(Expression::Unary {
            operator,
            operand: Box::new(parse_unary(state)?),
        }),
        None => parse_call(state),
    }
}

fn parse_call(state: &mut Context) -> Result<Expression, ParseError> {
    let mut expr = parse_primary(state)?;

    loop {
        if state.match_token(&[TokenKind::LeftParen]).is_some() {
            let (arguments, paren) = parse_comma_list(state, TokenKind::RightParen, parse_expr)?;
            expr = Expression::Call {
                callee: Box::new(expr),
                paren,
                arguments,
            };
        } else if state.match_token(&[TokenKind::Dot]).is_some() {
            let name = state.consume_token(TokenKind::Identifier)?;
            expr = Expression::Get {
                object: Box::new(expr),
                name,
            };
        } else {
            break;
        }
    }

    Ok(expr)
}

fn parse_primary(state: &mut Context) -> Result<Expression, ParseError> {
    let li = state.get_curr().clone();

    let expr = match li.kind {
        TokenKind::False => Expression::Literal(Literal::Bool(false)),
        TokenKind::True => Expression::Literal(Literal::Bool(true)),
        TokenKind::Nil => Expression::Literal(Literal::Nil),
        TokenKind::Number | TokenKind::String => match li.literal.clone() {
            Some(literal) => Expression::Literal(literal),
            None => return Err(ParseError::ExpectExpression(li)),
        },
        TokenKind::Identifier => Expression::Variable(li),
        TokenKind::This => Expression::This(li),
        TokenKind::Super => return parse_super(state),
        TokenKind::LeftParen => return parse_group(state),
        _ => return Err(ParseError::ExpectExpression(li)),
    };

    state.advance();
    Ok(expr)
}

fn parse_super(state: &mut Context) -> Result<Expression, ParseError> {
    let keyword = state.consume_token(TokenKind::Super)?;
    state.consume_token(TokenKind::Dot)?;
    let method = state.consume_token(TokenKind::Identifier)?;
    Ok(Expression::Super { keyword, method })
}

fn parse_group(state: &mut Context) -> Result<Expression, ParseError> {
    state.consume_token(TokenKind::LeftParen)?;
    let expr = parse_expr(state)?;
    state.consume_token(TokenKind::RightParen)?;
    Ok(Expression::Grouping(Box::new(expr)))
}

/// Parses `item ("," item)*` up to and including `right_paren`, whose token
/// is returned alongside the items. The opening paren is already consumed.
fn parse_comma_list<F, T>(
    state: &mut Context,
    right_paren: TokenKind,
    lower_fn: F,
) -> Result<(Vec<T>, Token), ParseError>
where
    F: Fn(&mut Context) -> Result<T, ParseError>,
{
    let mut result = Vec::new();

    if !state.peek(&[right_paren]) {
        loop {
            if result.len() == MAX_ARGUMENTS {
                state.report(ParseError::TooManyArguments(state.get_curr().clone()));
            }
            result.push(lower_fn(state)?);
            if state.match_token(&[TokenKind::Comma]).is_none() {
                break;
            }
        }
    }

    let closing = state.consume_token(right_paren)?;
    Ok((result, closing))
}
