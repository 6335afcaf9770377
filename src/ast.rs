use crate::tokens::Token;

#[derive(Debug)]
pub enum Stmt<'source> {
  Alias {
    name: Token<'source>,
    value: Expr<'source>,
  },
  Attempt {
    attempt: Vec<Stmt<'source>>,
    error: Token<'source>,
    fail: Vec<Stmt<'source>>,
  },
  Block {
    statements: Vec<Stmt<'source>>,
  },
  Class {
    name: Token<'source>,
  },
  Each {
    identifier: Token<'source>,
    collection: Expr<'source>,
    body: Box<Stmt<'source>>,
  },
  Expression {
    expression: Expr<'source>,
  },
  For {
    keyword: Token<'source>,
    init: Option<Box<Stmt<'source>>>,
    condition: Option<Expr<'source>>,
    increment: Option<Expr<'source>>,
    body: Box<Stmt<'source>>,
  },
  Function {
    name: Token<'source>,
    parameters: Vec<Token<'source>>,
    body: Vec<Stmt<'source>>,
  },
  If {
    condition: Expr<'source>,
    then: Box<Stmt<'source>>,
    otherwise: Option<Box<Stmt<'source>>>,
  },
  Import {
    module: Expr<'source>,
  },
  Namespace {
    name: Token<'source>,
    body: Vec<Stmt<'source>>,
  },
  Panic {
    keyword: Token<'source>,
    message: Option<Expr<'source>>,
  },
  Return {
    keyword: Token<'source>,
    value: Option<Expr<'source>>,
  },
  Skip {
    keyword: Token<'source>,
  },
  Stop {
    keyword: Token<'source>,
  },
  Var {
    name: Token<'source>,
    initializer: Option<Expr<'source>>,
  },
  While {
    keyword: Token<'source>,
    condition: Expr<'source>,
    body: Box<Stmt<'source>>,
  },
}

#[derive(Debug)]
pub enum Expr<'source> {
  Assign {
    name: Token<'source>,
    value: Box<Expr<'source>>,
  },
  Binary {
    operator: Token<'source>,
    left: Box<Expr<'source>>,
    right: Box<Expr<'source>>,
  },
  Bitwise {
    operator: Token<'source>,
    left: Box<Expr<'source>>,
    right: Box<Expr<'source>>,
  },
  Call {
    paren: Token<'source>,
    callee: Box<Expr<'source>>,
    arguments: Vec<Expr<'source>>,
  },
  Get {
    name: Token<'source>,
    object: Box<Expr<'source>>,
  },
  Group {
    expression: Box<Expr<'source>>,
  },
  Index {
    bracket: Token<'source>,
    object: Box<Expr<'source>>,
    index: Box<Expr<'source>>,
  },
  IndexSet {
    bracket: Token<'source>,
    object: Box<Expr<'source>>,
    index: Box<Expr<'source>>,
    value: Box<Expr<'source>>,
  },
  List {
    bracket: Token<'source>,
    elements: Vec<Expr<'source>>,
  },
  Literal {
    token: Token<'source>,
  },
  Logical {
    operator: Token<'source>,
    left: Box<Expr<'source>>,
    right: Box<Expr<'source>>,
  },
  Map {
    brace: Token<'source>,
    entries: Vec<(Expr<'source>, Expr<'source>)>,
  },
  Postfix {
    operator: Token<'source>,
    left: Box<Expr<'source>>,
  },
  Prefix {
    operator: Token<'source>,
    right: Box<Expr<'source>>,
  },
  Range {
    operator: Token<'source>,
    start: Box<Expr<'source>>,
    end: Box<Expr<'source>>,
  },
  Set {
    name: Token<'source>,
    object: Box<Expr<'source>>,
    value: Box<Expr<'source>>,
  },
  Shift {
    operator: Token<'source>,
    left: Box<Expr<'source>>,
    right: Box<Expr<'source>>,
  },
  This {
    keyword: Token<'source>,
  },
  Variable {
    name: Token<'source>,
  },
}
