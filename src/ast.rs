use crate::token::{Literal, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Grouping(Box<Expression>),
    Unary {
        operator: Token,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: Token,
        right: Box<Expression>,
    },
    Logical {
        left: Box<Expression>,
        operator: Token,
        right: Box<Expression>,
    },
    Variable(Token),
    Assignment {
        name: Token,
        value: Box<Expression>,
    },

    // Reserved for functions and classes: parsed, never evaluated.
    Call {
        callee: Box<Expression>,
        paren: Token,
        arguments: ExpressionList,
    },
    Get {
        object: Box<Expression>,
        name: Token,
    },
    Set {
        object: Box<Expression>,
        name: Token,
        value: Box<Expression>,
    },
    This(Token),
    Super {
        keyword: Token,
        method: Token,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expression),
    Print(Expression),
    Var {
        name: Token,
        initializer: Option<Expression>,
    },
    Block(StatementList),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },

    // Reserved, see `Expression::Call`.
    Function(FunctionNode),
    Return {
        keyword: Token,
        value: Option<Expression>,
    },
    Class {
        name: Token,
        superclass: Option<Token>,
        methods: Vec<FunctionNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: StatementList,
}

pub type ExpressionList = Vec<Expression>;

pub type StatementList = Vec<Statement>;
