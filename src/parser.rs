use crate::{
  ast::{Expr, Stmt},
  diagnostic::Diagnostic,
  tokens::{Token, TokenType},
};

#[derive(Clone, Copy, Debug, PartialOrd, PartialEq)]
enum Precedence {
  None = 1,
  Assignment, // =
  Or,         // or
  And,        // and
  BitwiseOr,  // |
  BitwiseXor, // ^
  BitwiseAnd, // &
  Equality,   // == !=
  Comparison, // < > <= >=
  Shift,      // << >>
  Range,      // ..
  Term,       // + -
  Factor,     // * / %
  Unary,      // ! -
  Call,       // . () [] ++ --
  Primary,
}

impl Precedence {
  fn next(self) -> Self {
    match self {
      Self::None => Self::Assignment,
      Self::Assignment => Self::Or,
      Self::Or => Self::And,
      Self::And => Self::BitwiseOr,
      Self::BitwiseOr => Self::BitwiseXor,
      Self::BitwiseXor => Self::BitwiseAnd,
      Self::BitwiseAnd => Self::Equality,
      Self::Equality => Self::Comparison,
      Self::Comparison => Self::Shift,
      Self::Shift => Self::Range,
      Self::Range => Self::Term,
      Self::Term => Self::Factor,
      Self::Factor => Self::Unary,
      Self::Unary => Self::Call,
      Self::Call | Self::Primary => Self::Primary,
    }
  }

  fn from(token_type: TokenType) -> Self {
    match token_type {
      TokenType::Or => Self::Or,
      TokenType::And => Self::And,
      TokenType::Pipe => Self::BitwiseOr,
      TokenType::Caret => Self::BitwiseXor,
      TokenType::Ampersand => Self::BitwiseAnd,
      TokenType::BangEqual | TokenType::EqualEqual => Self::Equality,
      TokenType::Greater | TokenType::GreaterEqual | TokenType::Less | TokenType::LessEqual => {
        Self::Comparison
      }
      TokenType::LessLess | TokenType::GreaterGreater => Self::Shift,
      TokenType::DotDot => Self::Range,
      TokenType::Plus | TokenType::Minus => Self::Term,
      TokenType::Star | TokenType::Slash | TokenType::Percent => Self::Factor,
      TokenType::LeftParen
      | TokenType::LeftBracket
      | TokenType::Dot
      | TokenType::PlusPlus
      | TokenType::MinusMinus => Self::Call,
      _ => Self::None,
    }
  }
}

enum Error {
  ExpectedExpression,
  ExpectedIdentifier,
  ExpectedSemicolon,
  ExpectedOpeningBracket,
  ExpectedClosingBracket,
  ExpectedOpeningBrace,
  ExpectedClosingBrace,
  ExpectedClosingSquareBracket,
  ExpectedColon,
  ExpectedIn,
  ExpectedFail,
  UnexpectedCharacter,
  UnterminatedString,
}

impl Error {
  fn get_title(&self) -> &'static str {
    match self {
      Self::ExpectedExpression => "Expected Expression",
      Self::ExpectedIdentifier => "Expected Identifier",
      Self::ExpectedSemicolon => "Expected ';'",
      Self::ExpectedOpeningBracket => "Expected '('",
      Self::ExpectedClosingBracket => "Expected ')'",
      Self::ExpectedOpeningBrace => "Expected '{'",
      Self::ExpectedClosingBrace => "Expected '}'",
      Self::ExpectedClosingSquareBracket => "Expected ']'",
      Self::ExpectedColon => "Expected ':'",
      Self::ExpectedIn => "Expected 'in'",
      Self::ExpectedFail => "Expected 'fail' Block",
      Self::UnexpectedCharacter => "Unexpected Character",
      Self::UnterminatedString => "Unterminated String",
    }
  }

  fn get_message(&self, token: &Token) -> String {
    match self {
      Self::UnexpectedCharacter => format!("Unknown character '{}'", token.lexeme),
      Self::UnterminatedString => format!("Missing closing quote {}", &token.lexeme[0..1]),
      Self::ExpectedFail => "An attempt block must be followed by fail (error) { ... }".to_string(),
      _ => format!("but received '{}'", token.lexeme),
    }
  }

  fn get_diagnostic(&self, token: &Token) -> Diagnostic {
    Diagnostic {
      title: self.get_title().to_string(),
      message: self.get_message(token),
      line: token.line,
      column: token.column,
    }
  }
}

type ExpressionResult<'source> = Result<Expr<'source>, (Error, Token<'source>)>;
type StatementResult<'source> = Result<Stmt<'source>, (Error, Token<'source>)>;

struct Parser<'source> {
  tokens: Vec<Token<'source>>,
  position: usize,
}

impl<'source> Parser<'source> {
  fn new(tokens: &[Token<'source>]) -> Self {
    Self {
      tokens: tokens
        .iter()
        .filter(|token| !token.is_trivia())
        .copied()
        .collect(),
      position: 0,
    }
  }

  fn at_end(&self) -> bool {
    self.position >= self.tokens.len()
  }

  fn current(&self) -> Token<'source> {
    self.get(self.position)
  }

  fn get(&self, position: usize) -> Token<'source> {
    match self.tokens.get(position) {
      Some(token) => *token,
      None => Token {
        ttype: TokenType::EndOfFile,
        lexeme: "",
        line: self.tokens.last().map_or(0, |token| token.line),
        column: 0,
      },
    }
  }

  fn advance(&mut self) -> Token<'source> {
    let token = self.current();
    self.position += 1;
    token
  }

  fn check(&self, token_type: TokenType) -> bool {
    self.current().ttype == token_type
  }

  fn matches(&mut self, token_type: TokenType) -> bool {
    if self.check(token_type) {
      self.position += 1;
      true
    } else {
      false
    }
  }

  fn consume(&mut self, token_type: TokenType, error: Error) -> Result<Token<'source>, (Error, Token<'source>)> {
    if self.check(token_type) {
      Ok(self.advance())
    } else {
      Err((error, self.current()))
    }
  }
}

// Expressions
impl<'source> Parser<'source> {
  fn expression(&mut self) -> ExpressionResult<'source> {
    self.parse_precedence(Precedence::Assignment)
  }

  fn parse_precedence(&mut self, precedence: Precedence) -> ExpressionResult<'source> {
    let token = self.advance();
    let can_assign = precedence <= Precedence::Assignment;
    let mut expression = self.prefix_rule(token, can_assign)?;

    while precedence <= Precedence::from(self.current().ttype) {
      let token = self.advance();
      expression = self.infix_rule(token, expression, can_assign)?;
    }

    Ok(expression)
  }

  fn prefix_rule(&mut self, token: Token<'source>, can_assign: bool) -> ExpressionResult<'source> {
    match token.ttype {
      TokenType::Number | TokenType::True | TokenType::False | TokenType::Nil => {
        Ok(Expr::Literal { token })
      }
      TokenType::String => self.string(token),
      TokenType::Identifier => self.variable(token, can_assign),
      TokenType::This => Ok(Expr::This { keyword: token }),
      TokenType::LeftParen => self.grouping(),
      TokenType::Minus | TokenType::Bang => self.unary(token),
      TokenType::LeftBracket => self.list(token),
      TokenType::LeftBrace => self.map(token),
      TokenType::Unknown => Err((Error::UnexpectedCharacter, token)),
      _ => Err((Error::ExpectedExpression, token)),
    }
  }

  fn infix_rule(
    &mut self,
    token: Token<'source>,
    left: Expr<'source>,
    can_assign: bool,
  ) -> ExpressionResult<'source> {
    match token.ttype {
      TokenType::Plus
      | TokenType::Minus
      | TokenType::Star
      | TokenType::Slash
      | TokenType::Percent
      | TokenType::BangEqual
      | TokenType::EqualEqual
      | TokenType::Greater
      | TokenType::GreaterEqual
      | TokenType::Less
      | TokenType::LessEqual => self.binary(token, left),
      TokenType::And | TokenType::Or => self.logical(token, left),
      TokenType::Ampersand | TokenType::Pipe | TokenType::Caret => self.bitwise(token, left),
      TokenType::LessLess | TokenType::GreaterGreater => self.shift(token, left),
      TokenType::DotDot => self.range(token, left),
      TokenType::LeftParen => self.call(token, left),
      TokenType::LeftBracket => self.index(token, left, can_assign),
      TokenType::Dot => self.property(left, can_assign),
      TokenType::PlusPlus | TokenType::MinusMinus => Ok(Expr::Postfix {
        operator: token,
        left: Box::new(left),
      }),
      _ => Err((Error::ExpectedExpression, token)),
    }
  }

  fn string(&mut self, token: Token<'source>) -> ExpressionResult<'source> {
    let quote = &token.lexeme[0..1];
    if token.lexeme.len() < 2 || !token.lexeme.ends_with(quote) {
      Err((Error::UnterminatedString, token))
    } else {
      Ok(Expr::Literal { token })
    }
  }

  fn variable(&mut self, name: Token<'source>, can_assign: bool) -> ExpressionResult<'source> {
    if can_assign && self.matches(TokenType::Equal) {
      Ok(Expr::Assign {
        name,
        value: Box::new(self.expression()?),
      })
    } else {
      Ok(Expr::Variable { name })
    }
  }

  fn grouping(&mut self) -> ExpressionResult<'source> {
    let expression = self.expression()?;
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;

    Ok(Expr::Group {
      expression: Box::new(expression),
    })
  }

  fn unary(&mut self, operator: Token<'source>) -> ExpressionResult<'source> {
    let right = self.parse_precedence(Precedence::Unary)?;

    Ok(Expr::Prefix {
      operator,
      right: Box::new(right),
    })
  }

  fn binary(&mut self, operator: Token<'source>, left: Expr<'source>) -> ExpressionResult<'source> {
    let right = self.parse_precedence(Precedence::from(operator.ttype).next())?;

    Ok(Expr::Binary {
      operator,
      left: Box::new(left),
      right: Box::new(right),
    })
  }

  fn logical(&mut self, operator: Token<'source>, left: Expr<'source>) -> ExpressionResult<'source> {
    let right = self.parse_precedence(Precedence::from(operator.ttype).next())?;

    Ok(Expr::Logical {
      operator,
      left: Box::new(left),
      right: Box::new(right),
    })
  }

  fn bitwise(&mut self, operator: Token<'source>, left: Expr<'source>) -> ExpressionResult<'source> {
    let right = self.parse_precedence(Precedence::from(operator.ttype).next())?;

    Ok(Expr::Bitwise {
      operator,
      left: Box::new(left),
      right: Box::new(right),
    })
  }

  fn shift(&mut self, operator: Token<'source>, left: Expr<'source>) -> ExpressionResult<'source> {
    let right = self.parse_precedence(Precedence::from(operator.ttype).next())?;

    Ok(Expr::Shift {
      operator,
      left: Box::new(left),
      right: Box::new(right),
    })
  }

  fn range(&mut self, operator: Token<'source>, start: Expr<'source>) -> ExpressionResult<'source> {
    let end = self.parse_precedence(Precedence::Range.next())?;

    Ok(Expr::Range {
      operator,
      start: Box::new(start),
      end: Box::new(end),
    })
  }

  fn call(&mut self, paren: Token<'source>, callee: Expr<'source>) -> ExpressionResult<'source> {
    let mut arguments = Vec::new();

    if !self.check(TokenType::RightParen) {
      loop {
        arguments.push(self.expression()?);
        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;

    Ok(Expr::Call {
      paren,
      callee: Box::new(callee),
      arguments,
    })
  }

  fn index(
    &mut self,
    bracket: Token<'source>,
    object: Expr<'source>,
    can_assign: bool,
  ) -> ExpressionResult<'source> {
    let index = self.expression()?;
    self.consume(TokenType::RightBracket, Error::ExpectedClosingSquareBracket)?;

    if can_assign && self.matches(TokenType::Equal) {
      Ok(Expr::IndexSet {
        bracket,
        object: Box::new(object),
        index: Box::new(index),
        value: Box::new(self.expression()?),
      })
    } else {
      Ok(Expr::Index {
        bracket,
        object: Box::new(object),
        index: Box::new(index),
      })
    }
  }

  fn property(&mut self, object: Expr<'source>, can_assign: bool) -> ExpressionResult<'source> {
    let name = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;

    if can_assign && self.matches(TokenType::Equal) {
      Ok(Expr::Set {
        name,
        object: Box::new(object),
        value: Box::new(self.expression()?),
      })
    } else {
      Ok(Expr::Get {
        name,
        object: Box::new(object),
      })
    }
  }

  fn list(&mut self, bracket: Token<'source>) -> ExpressionResult<'source> {
    let mut elements = Vec::new();

    if !self.check(TokenType::RightBracket) {
      loop {
        elements.push(self.expression()?);
        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }
    self.consume(TokenType::RightBracket, Error::ExpectedClosingSquareBracket)?;

    Ok(Expr::List { bracket, elements })
  }

  fn map(&mut self, brace: Token<'source>) -> ExpressionResult<'source> {
    let mut entries = Vec::new();

    if !self.check(TokenType::RightBrace) {
      loop {
        let key = self.expression()?;
        self.consume(TokenType::Colon, Error::ExpectedColon)?;
        let value = self.expression()?;
        entries.push((key, value));

        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }
    self.consume(TokenType::RightBrace, Error::ExpectedClosingBrace)?;

    Ok(Expr::Map { brace, entries })
  }
}

// Statements
impl<'source> Parser<'source> {
  fn statement(&mut self) -> StatementResult<'source> {
    match self.current().ttype {
      TokenType::Alias => self.alias_statement(),
      TokenType::Attempt => self.attempt_statement(),
      TokenType::Class => self.class_statement(),
      TokenType::Each => self.each_statement(),
      TokenType::Fn => self.function_statement(),
      TokenType::For => self.for_statement(),
      TokenType::If => self.if_statement(),
      TokenType::Import => self.import_statement(),
      TokenType::LeftBrace => self.block_statement(),
      TokenType::Namespace => self.namespace_statement(),
      TokenType::Panic => self.panic_statement(),
      TokenType::Return => self.return_statement(),
      TokenType::Skip => self.skip_statement(),
      TokenType::Stop => self.stop_statement(),
      TokenType::Var => self.var_statement(),
      TokenType::While => self.while_statement(),
      _ => self.expression_statement(),
    }
  }

  fn block(&mut self) -> Result<Vec<Stmt<'source>>, (Error, Token<'source>)> {
    self.consume(TokenType::LeftBrace, Error::ExpectedOpeningBrace)?;

    let mut statements = Vec::new();
    while !self.check(TokenType::RightBrace) && !self.at_end() {
      statements.push(self.statement()?);
    }
    self.consume(TokenType::RightBrace, Error::ExpectedClosingBrace)?;

    Ok(statements)
  }

  fn alias_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let name = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;
    self.consume(TokenType::Equal, Error::ExpectedExpression)?;
    let value = self.expression()?;
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Alias { name, value })
  }

  fn attempt_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let attempt = self.block()?;

    self.consume(TokenType::Fail, Error::ExpectedFail)?;
    self.consume(TokenType::LeftParen, Error::ExpectedOpeningBracket)?;
    let error = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;
    let fail = self.block()?;

    Ok(Stmt::Attempt {
      attempt,
      error,
      fail,
    })
  }

  fn block_statement(&mut self) -> StatementResult<'source> {
    Ok(Stmt::Block {
      statements: self.block()?,
    })
  }

  fn class_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let name = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;
    self.consume(TokenType::LeftBrace, Error::ExpectedOpeningBrace)?;
    self.consume(TokenType::RightBrace, Error::ExpectedClosingBrace)?;

    Ok(Stmt::Class { name })
  }

  fn each_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let identifier = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;
    self.consume(TokenType::In, Error::ExpectedIn)?;
    let collection = self.expression()?;
    let body = self.statement()?;

    Ok(Stmt::Each {
      identifier,
      collection,
      body: Box::new(body),
    })
  }

  fn function_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let name = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;

    self.consume(TokenType::LeftParen, Error::ExpectedOpeningBracket)?;
    let mut parameters = Vec::new();
    if !self.check(TokenType::RightParen) {
      loop {
        parameters.push(self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?);
        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;

    let body = self.block()?;

    Ok(Stmt::Function {
      name,
      parameters,
      body,
    })
  }

  fn for_statement(&mut self) -> StatementResult<'source> {
    let keyword = self.advance();
    self.consume(TokenType::LeftParen, Error::ExpectedOpeningBracket)?;

    let init = if self.matches(TokenType::Semicolon) {
      None
    } else if self.check(TokenType::Var) {
      Some(Box::new(self.var_statement()?))
    } else {
      Some(Box::new(self.expression_statement()?))
    };

    let condition = if self.check(TokenType::Semicolon) {
      None
    } else {
      Some(self.expression()?)
    };
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    let increment = if self.check(TokenType::RightParen) {
      None
    } else {
      Some(self.expression()?)
    };
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;

    let body = self.statement()?;

    Ok(Stmt::For {
      keyword,
      init,
      condition,
      increment,
      body: Box::new(body),
    })
  }

  fn if_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    self.consume(TokenType::LeftParen, Error::ExpectedOpeningBracket)?;
    let condition = self.expression()?;
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;

    let then = self.statement()?;
    let otherwise = if self.matches(TokenType::Else) {
      Some(Box::new(self.statement()?))
    } else {
      None
    };

    Ok(Stmt::If {
      condition,
      then: Box::new(then),
      otherwise,
    })
  }

  fn import_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let module = self.expression()?;
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Import { module })
  }

  fn namespace_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let name = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;
    let body = self.block()?;

    Ok(Stmt::Namespace { name, body })
  }

  fn panic_statement(&mut self) -> StatementResult<'source> {
    let keyword = self.advance();
    let message = if self.check(TokenType::Semicolon) {
      None
    } else {
      Some(self.expression()?)
    };
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Panic { keyword, message })
  }

  fn return_statement(&mut self) -> StatementResult<'source> {
    let keyword = self.advance();
    let value = if self.check(TokenType::Semicolon) {
      None
    } else {
      Some(self.expression()?)
    };
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Return { keyword, value })
  }

  fn skip_statement(&mut self) -> StatementResult<'source> {
    let keyword = self.advance();
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Skip { keyword })
  }

  fn stop_statement(&mut self) -> StatementResult<'source> {
    let keyword = self.advance();
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Stop { keyword })
  }

  fn var_statement(&mut self) -> StatementResult<'source> {
    self.advance();
    let name = self.consume(TokenType::Identifier, Error::ExpectedIdentifier)?;
    let initializer = if self.matches(TokenType::Equal) {
      Some(self.expression()?)
    } else {
      None
    };
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Var { name, initializer })
  }

  fn while_statement(&mut self) -> StatementResult<'source> {
    let keyword = self.advance();
    self.consume(TokenType::LeftParen, Error::ExpectedOpeningBracket)?;
    let condition = self.expression()?;
    self.consume(TokenType::RightParen, Error::ExpectedClosingBracket)?;
    let body = self.statement()?;

    Ok(Stmt::While {
      keyword,
      condition,
      body: Box::new(body),
    })
  }

  fn expression_statement(&mut self) -> StatementResult<'source> {
    let expression = self.expression()?;
    self.consume(TokenType::Semicolon, Error::ExpectedSemicolon)?;

    Ok(Stmt::Expression { expression })
  }
}

pub fn parse<'source>(tokens: &[Token<'source>]) -> Result<Vec<Stmt<'source>>, Diagnostic> {
  let mut parser = Parser::new(tokens);
  let mut statements = Vec::new();

  while !parser.at_end() {
    match parser.statement() {
      Ok(statement) => statements.push(statement),
      Err((error, token)) => return Err(error.get_diagnostic(&token)),
    }
  }

  Ok(statements)
}

pub fn parse_number(lexeme: &str) -> f64 {
  lexeme.replace('_', "").parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokens::tokenize;

  fn parse_source(source: &str) -> Result<Vec<Stmt>, Diagnostic> {
    let tokens = tokenize(source);
    parse(&tokens)
  }

  #[test]
  fn should_parse_declarations_and_expressions() {
    let ast = parse_source("var x = 1 + 2 * 3;").unwrap();
    assert_eq!(ast.len(), 1);
    assert!(matches!(&ast[0], Stmt::Var { .. }));

    let ast = parse_source("x[0] = {'a': 1};").unwrap();
    match &ast[0] {
      Stmt::Expression { expression } => assert!(matches!(expression, Expr::IndexSet { .. })),
      _ => panic!("expected expression statement"),
    }
  }

  #[test]
  fn should_report_missing_semicolon() {
    let error = parse_source("var x = 1").unwrap_err();
    assert_eq!(error.title, "Expected ';'");
  }

  #[test]
  fn should_report_unterminated_string() {
    let error = parse_source("var x = 'abc;").unwrap_err();
    assert_eq!(error.title, "Unterminated String");
  }

  #[test]
  fn should_parse_attempt_fail() {
    let ast = parse_source("attempt { panic 'm'; } fail (e) { print(e); }").unwrap();
    assert!(matches!(&ast[0], Stmt::Attempt { .. }));
  }
}
