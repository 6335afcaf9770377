use smallvec::SmallVec;
use std::rc::Rc;

use crate::{
  ast::{Expr, Stmt},
  builtins,
  chunk::{Chunk, OpCode},
  diagnostic::Diagnostic,
  parser::parse_number,
  tokens::{ColumnNumber, LineNumber, Token, TokenType},
  value::{Function, Value},
};

enum Error {
  TooManyConstants,
  TooBigJump,
  TooManyLocals,
  TooManyArguments,
  TooManyParameters,
  TooLongList,
  StopOutsideLoop,
  SkipOutsideLoop,
}

impl Error {
  fn get_title(&self) -> &'static str {
    match self {
      Self::TooManyConstants => "Too Many Constants",
      Self::TooBigJump => "Too Big Jump",
      Self::TooManyLocals => "Too Many Local Variables",
      Self::TooManyArguments => "Too Many Arguments",
      Self::TooManyParameters => "Too Many Parameters",
      Self::TooLongList => "Too Long List",
      Self::StopOutsideLoop => "Stop Outside Loop",
      Self::SkipOutsideLoop => "Skip Outside Loop",
    }
  }

  fn get_message(&self) -> String {
    match self {
      Self::TooManyConstants | Self::TooBigJump => {
        "This is likely an error with the language".to_string()
      }
      Self::TooManyLocals => "There is a limit of 256 local variables at once".to_string(),
      Self::TooManyArguments => {
        "There is a limit of 255 arguments to be passed to a function".to_string()
      }
      Self::TooManyParameters => "There is a limit of 255 parameters for a function".to_string(),
      Self::TooLongList => "There is a limit of 255 items in a literal".to_string(),
      Self::StopOutsideLoop => "Cannot use 'stop' outside of a loop".to_string(),
      Self::SkipOutsideLoop => "Cannot use 'skip' outside of a loop".to_string(),
    }
  }

  fn into_diagnostic(self, line: LineNumber, column: ColumnNumber) -> Diagnostic {
    Diagnostic {
      title: self.get_title().to_string(),
      message: self.get_message(),
      line,
      column,
    }
  }
}

struct Local<'s> {
  name: &'s str,
  depth: u8,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoopKind {
  While,
  For,
  Each,
}

struct LoopContext {
  start_ip: usize,
  scope_depth: u8,
  kind: LoopKind,
  break_jumps: Vec<usize>,
}

struct Compiler<'s> {
  chunk: Chunk,

  locals: Vec<Local<'s>>,
  scope_depth: u8,
  namespace: String,
  loop_stack: SmallVec<[LoopContext; 4]>,

  line: LineNumber,
  column: ColumnNumber,
  errors: Vec<Diagnostic>,
}

// Emit Bytecode
impl<'s> Compiler<'s> {
  fn track(&mut self, token: Token) {
    self.line = token.line;
    self.column = token.column;
  }

  fn emit_opcode(&mut self, code: OpCode) {
    self.chunk.write_opcode(code, self.line, self.column);
  }

  fn emit_value(&mut self, value: u8) {
    self.chunk.write(value, self.line, self.column);
  }

  fn emit_long_value(&mut self, value: u16) {
    self.chunk.write_long_value(value, self.line, self.column);
  }

  fn make_constant(&mut self, value: Value) -> u8 {
    let position = self.chunk.add_constant(value);

    match u8::try_from(position) {
      Ok(position) => position,
      Err(_) => {
        self.error(Error::TooManyConstants);
        0
      }
    }
  }

  fn emit_constant(&mut self, value: Value) {
    let position = self.make_constant(value);
    self.emit_opcode(OpCode::Constant);
    self.emit_value(position);
  }

  fn emit_jump(&mut self, instruction: OpCode) -> usize {
    self.emit_opcode(instruction);
    self.emit_long_value(u16::MAX);
    self.chunk.len() - 2
  }

  fn patch_jump(&mut self, offset: usize) {
    // -2 to adjust for the jump operand itself
    let jump = self.chunk.len() - offset - 2;

    match u16::try_from(jump) {
      Ok(jump) => self.chunk.set_long_value(offset, jump),
      Err(_) => self.error(Error::TooBigJump),
    }
  }

  fn emit_loop(&mut self, loop_start: usize) {
    self.emit_opcode(OpCode::Loop);

    let offset = self.chunk.len() - loop_start + 2;
    match u16::try_from(offset) {
      Ok(offset) => self.emit_long_value(offset),
      Err(_) => {
        self.error(Error::TooBigJump);
        self.emit_long_value(0);
      }
    }
  }

  fn error(&mut self, error: Error) {
    self.errors.push(error.into_diagnostic(self.line, self.column));
  }
}

// Scopes and name resolution
impl<'s> Compiler<'s> {
  fn new() -> Self {
    Self {
      chunk: Chunk::new(),
      locals: Vec::new(),
      scope_depth: 0,
      namespace: String::new(),
      loop_stack: SmallVec::new(),
      line: 0,
      column: 0,
      errors: Vec::new(),
    }
  }

  fn begin_scope(&mut self) {
    self.scope_depth += 1;
  }

  fn end_scope(&mut self) {
    self.scope_depth -= 1;

    while self
      .locals
      .last()
      .map_or(false, |local| local.depth > self.scope_depth)
    {
      self.emit_opcode(OpCode::Pop);
      self.locals.pop();
    }
  }

  fn add_local(&mut self, name: &'s str) {
    if self.locals.len() > u8::MAX as usize {
      self.error(Error::TooManyLocals);
      return;
    }

    self.locals.push(Local {
      name,
      depth: self.scope_depth,
    });
  }

  fn resolve_local(&self, name: &str) -> Option<u8> {
    self
      .locals
      .iter()
      .rposition(|local| local.name == name)
      .map(|position| position as u8)
  }

  // Bare names inside a namespace become fully qualified globals, except
  // registered natives and names already carrying a qualifier
  fn qualified_name(&self, name: &str) -> String {
    if name.contains("::")
      || builtins::is_native(name)
      || name.starts_with("native")
      || self.namespace.is_empty()
    {
      name.to_string()
    } else {
      format!("{}::{}", self.namespace, name)
    }
  }

  fn emit_get_variable(&mut self, name: Token<'s>) {
    self.track(name);

    match self.resolve_local(name.lexeme) {
      Some(slot) => {
        self.emit_opcode(OpCode::GetLocal);
        self.emit_value(slot);
      }
      None => {
        let global = self.qualified_name(name.lexeme);
        let position = self.make_constant(Value::from(global));
        self.emit_opcode(OpCode::GetGlobal);
        self.emit_value(position);
      }
    }
  }

  fn emit_set_variable(&mut self, name: Token<'s>) {
    self.track(name);

    match self.resolve_local(name.lexeme) {
      Some(slot) => {
        self.emit_opcode(OpCode::SetLocal);
        self.emit_value(slot);
      }
      None => {
        let global = self.qualified_name(name.lexeme);
        let position = self.make_constant(Value::from(global));
        self.emit_opcode(OpCode::SetGlobal);
        self.emit_value(position);
      }
    }
  }

  fn emit_define_global(&mut self, name: &str) {
    let global = self.qualified_name(name);
    let position = self.make_constant(Value::from(global));
    self.emit_opcode(OpCode::DefineGlobal);
    self.emit_value(position);
  }

  // The locals of a `var M::x = ...;` declaration drop the qualifier
  fn local_name(lexeme: &str) -> &str {
    match lexeme.rfind(':') {
      Some(position) => &lexeme[position + 1..],
      None => lexeme,
    }
  }

  // An assignment pops its own value, so its statement emits no Pop.
  // Postfix on anything but a variable compiles to nothing at all.
  fn expression_pops(expression: &Expr) -> bool {
    match expression {
      Expr::Assign { .. } | Expr::IndexSet { .. } => false,
      Expr::Postfix { left, .. } => matches!(left.as_ref(), Expr::Variable { .. }),
      _ => true,
    }
  }
}

// Statements
impl<'s> Compiler<'s> {
  fn compile_statement(&mut self, statement: &Stmt<'s>) {
    match statement {
      Stmt::Expression { expression } => {
        self.compile_expression(expression);
        if Self::expression_pops(expression) {
          self.emit_opcode(OpCode::Pop);
        }
      }
      Stmt::Block { statements } => {
        self.begin_scope();
        for statement in statements {
          self.compile_statement(statement);
        }
        self.end_scope();
      }
      Stmt::If {
        condition,
        then,
        otherwise,
      } => {
        self.compile_expression(condition);
        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_opcode(OpCode::Pop);

        self.compile_statement(then);

        let else_jump = self.emit_jump(OpCode::Jump);
        self.patch_jump(then_jump);
        self.emit_opcode(OpCode::Pop);

        if let Some(otherwise) = otherwise {
          self.compile_statement(otherwise);
        }
        self.patch_jump(else_jump);
      }
      Stmt::While {
        keyword,
        condition,
        body,
      } => {
        self.track(*keyword);
        let loop_start = self.chunk.len();
        self.loop_stack.push(LoopContext {
          start_ip: loop_start,
          scope_depth: self.scope_depth,
          kind: LoopKind::While,
          break_jumps: Vec::new(),
        });

        self.compile_expression(condition);
        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_opcode(OpCode::Pop);

        self.compile_statement(body);
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_opcode(OpCode::Pop);

        let context = self.loop_stack.pop().unwrap();
        for jump in context.break_jumps {
          self.patch_jump(jump);
        }
      }
      Stmt::For {
        keyword,
        init,
        condition,
        increment,
        body,
      } => {
        self.track(*keyword);
        self.begin_scope();
        if let Some(init) = init {
          self.compile_statement(init);
        }

        let loop_start = self.chunk.len();
        self.loop_stack.push(LoopContext {
          start_ip: loop_start,
          scope_depth: self.scope_depth,
          kind: LoopKind::For,
          break_jumps: Vec::new(),
        });

        let exit_jump = condition.as_ref().map(|condition| {
          self.compile_expression(condition);
          let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
          self.emit_opcode(OpCode::Pop);
          exit_jump
        });

        self.compile_statement(body);

        if let Some(increment) = increment {
          self.compile_expression(increment);
          if Self::expression_pops(increment) {
            self.emit_opcode(OpCode::Pop);
          }
        }
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
          self.patch_jump(exit_jump);
          self.emit_opcode(OpCode::Pop);
        }

        let context = self.loop_stack.pop().unwrap();
        for jump in context.break_jumps {
          self.patch_jump(jump);
        }
        self.end_scope();
      }
      Stmt::Each {
        identifier,
        collection,
        body,
      } => {
        self.track(*identifier);
        self.compile_expression(collection);
        self.emit_constant(Value::from(0.0));

        self.begin_scope();
        self.add_local(""); // collection slot
        self.add_local(""); // index slot

        let loop_start = self.chunk.len();
        self.loop_stack.push(LoopContext {
          start_ip: loop_start,
          scope_depth: self.scope_depth,
          kind: LoopKind::Each,
          break_jumps: Vec::new(),
        });

        let exit_jump = self.emit_jump(OpCode::ForEachNext);

        self.begin_scope();
        self.add_local(identifier.lexeme);
        self.compile_statement(body);
        self.end_scope(); // pops the loop variable

        self.emit_loop(loop_start);
        self.patch_jump(exit_jump);

        self.end_scope(); // pops the collection and index

        let context = self.loop_stack.pop().unwrap();
        for jump in context.break_jumps {
          self.patch_jump(jump);
        }
      }
      Stmt::Var { name, initializer } => {
        self.track(*name);
        match initializer {
          Some(initializer) => self.compile_expression(initializer),
          None => self.emit_opcode(OpCode::Null),
        }

        if self.scope_depth > 0 {
          self.add_local(Self::local_name(name.lexeme));
        } else {
          self.emit_define_global(name.lexeme);
        }
      }
      Stmt::Function {
        name,
        parameters,
        body,
      } => {
        self.track(*name);

        let saved_locals = std::mem::take(&mut self.locals);
        let saved_scope_depth = std::mem::replace(&mut self.scope_depth, 0);
        let saved_loop_stack = std::mem::take(&mut self.loop_stack);
        let enclosing = std::mem::take(&mut self.chunk);

        self.begin_scope();
        self.add_local(""); // slot 0 holds the callee
        for parameter in parameters {
          self.add_local(parameter.lexeme);
        }

        for statement in body {
          self.compile_statement(statement);
        }
        self.emit_opcode(OpCode::Null);
        self.emit_opcode(OpCode::Return);

        let chunk = std::mem::replace(&mut self.chunk, enclosing);
        self.locals = saved_locals;
        self.scope_depth = saved_scope_depth;
        self.loop_stack = saved_loop_stack;

        let arity = u8::try_from(parameters.len()).unwrap_or_else(|_| {
          self.error(Error::TooManyParameters);
          255
        });

        self.emit_constant(Value::from(Function {
          name: Rc::from(Self::local_name(name.lexeme)),
          arity,
          chunk,
        }));
        self.emit_define_global(name.lexeme);
      }
      Stmt::Return { keyword, value } => {
        self.track(*keyword);
        match value {
          Some(value) => self.compile_expression(value),
          None => self.emit_opcode(OpCode::Null),
        }
        self.emit_opcode(OpCode::Return);
      }
      Stmt::Panic { keyword, message } => {
        self.track(*keyword);
        match message {
          Some(message) => self.compile_expression(message),
          None => self.emit_opcode(OpCode::Null),
        }
        self.emit_opcode(OpCode::Panic);
      }
      Stmt::Class { name } => {
        self.track(*name);
        let position = self.make_constant(Value::from(Self::local_name(name.lexeme)));
        self.emit_opcode(OpCode::Class);
        self.emit_value(position);
        self.emit_define_global(name.lexeme);
      }
      Stmt::Import { module } => {
        self.compile_expression(module);
        self.emit_opcode(OpCode::Import);
      }
      Stmt::Alias { name, value } => {
        self.track(*name);
        self.compile_expression(value);
        self.emit_define_global(name.lexeme);
      }
      Stmt::Namespace { name, body } => {
        self.track(*name);
        let enclosing = std::mem::replace(&mut self.namespace, name.lexeme.to_string());
        for statement in body {
          self.compile_statement(statement);
        }
        self.namespace = enclosing;
      }
      Stmt::Stop { keyword } => {
        self.track(*keyword);
        if self.loop_stack.is_empty() {
          self.error(Error::StopOutsideLoop);
          return;
        }

        let context = self.loop_stack.last().unwrap();
        let kind = context.kind;
        let count = self.locals_deeper_than(context.scope_depth);

        for _ in 0..count {
          self.emit_opcode(OpCode::Pop);
        }
        if kind == LoopKind::Each {
          // also discard the hidden collection and index slots
          self.emit_opcode(OpCode::Pop);
          self.emit_opcode(OpCode::Pop);
        }

        let jump = self.emit_jump(OpCode::Jump);
        self.loop_stack.last_mut().unwrap().break_jumps.push(jump);
      }
      Stmt::Skip { keyword } => {
        self.track(*keyword);
        if self.loop_stack.is_empty() {
          self.error(Error::SkipOutsideLoop);
          return;
        }

        let context = self.loop_stack.last().unwrap();
        let start_ip = context.start_ip;
        let count = self.locals_deeper_than(context.scope_depth);

        for _ in 0..count {
          self.emit_opcode(OpCode::Pop);
        }
        self.emit_loop(start_ip);
      }
      Stmt::Attempt {
        attempt,
        error,
        fail,
      } => {
        self.track(*error);
        let attempt_jump = self.emit_jump(OpCode::Attempt);

        for statement in attempt {
          self.compile_statement(statement);
        }
        self.emit_opcode(OpCode::EndAttempt);
        let end_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(attempt_jump);

        // The VM pushes the panic message into the error variable's slot
        self.begin_scope();
        self.add_local(error.lexeme);
        for statement in fail {
          self.compile_statement(statement);
        }
        self.end_scope();

        self.patch_jump(end_jump);
      }
    }
  }

  fn locals_deeper_than(&self, scope_depth: u8) -> usize {
    self
      .locals
      .iter()
      .rev()
      .take_while(|local| local.depth > scope_depth)
      .count()
  }
}

// Expressions
impl<'s> Compiler<'s> {
  fn compile_expression(&mut self, expression: &Expr<'s>) {
    match expression {
      Expr::Literal { token } => {
        self.track(*token);
        match token.ttype {
          TokenType::True => self.emit_opcode(OpCode::True),
          TokenType::False => self.emit_opcode(OpCode::False),
          TokenType::Nil => self.emit_opcode(OpCode::Null),
          TokenType::Number => self.emit_constant(Value::from(parse_number(token.lexeme))),
          TokenType::String => {
            let value = &token.lexeme[1..token.lexeme.len() - 1];
            self.emit_constant(Value::from(value));
          }
          _ => {}
        }
      }
      Expr::Group { expression } => self.compile_expression(expression),
      Expr::Variable { name } => self.emit_get_variable(*name),
      Expr::Assign { name, value } => {
        self.track(*name);
        self.compile_expression(value);
        self.emit_set_variable(*name);
      }
      Expr::Binary {
        operator,
        left,
        right,
      } => {
        self.track(*operator);
        self.compile_expression(left);
        self.compile_expression(right);

        match operator.ttype {
          TokenType::Plus => self.emit_opcode(OpCode::Add),
          TokenType::Minus => self.emit_opcode(OpCode::Subtract),
          TokenType::Star => self.emit_opcode(OpCode::Multiply),
          TokenType::Slash => self.emit_opcode(OpCode::Divide),
          TokenType::Percent => self.emit_opcode(OpCode::Modulo),
          TokenType::EqualEqual => self.emit_opcode(OpCode::Equal),
          TokenType::BangEqual => {
            self.emit_opcode(OpCode::Equal);
            self.emit_opcode(OpCode::Not);
          }
          TokenType::Greater => self.emit_opcode(OpCode::Greater),
          TokenType::GreaterEqual => {
            self.emit_opcode(OpCode::Less);
            self.emit_opcode(OpCode::Not);
          }
          TokenType::Less => self.emit_opcode(OpCode::Less),
          TokenType::LessEqual => {
            self.emit_opcode(OpCode::Greater);
            self.emit_opcode(OpCode::Not);
          }
          _ => {}
        }
      }
      Expr::Logical {
        operator,
        left,
        right,
      } => {
        self.track(*operator);
        self.compile_expression(left);

        if operator.ttype == TokenType::And {
          let end_jump = self.emit_jump(OpCode::JumpIfFalse);
          self.emit_opcode(OpCode::Pop);
          self.compile_expression(right);
          self.patch_jump(end_jump);
        } else {
          let else_jump = self.emit_jump(OpCode::JumpIfFalse);
          let end_jump = self.emit_jump(OpCode::Jump);
          self.patch_jump(else_jump);
          self.emit_opcode(OpCode::Pop);
          self.compile_expression(right);
          self.patch_jump(end_jump);
        }
      }
      Expr::Bitwise {
        operator,
        left,
        right,
      } => {
        self.track(*operator);
        self.compile_expression(left);
        self.compile_expression(right);

        match operator.ttype {
          TokenType::Ampersand => self.emit_opcode(OpCode::BitwiseAnd),
          TokenType::Pipe => self.emit_opcode(OpCode::BitwiseOr),
          TokenType::Caret => self.emit_opcode(OpCode::BitwiseXor),
          _ => {}
        }
      }
      Expr::Shift {
        operator,
        left,
        right,
      } => {
        self.track(*operator);
        self.compile_expression(left);
        self.compile_expression(right);

        if operator.ttype == TokenType::LessLess {
          self.emit_opcode(OpCode::LeftShift);
        } else {
          self.emit_opcode(OpCode::RightShift);
        }
      }
      Expr::Range {
        operator,
        start,
        end,
      } => {
        self.track(*operator);
        self.compile_expression(start);
        self.compile_expression(end);
        self.emit_opcode(OpCode::BuildRangeList);
      }
      Expr::List { bracket, elements } => {
        self.track(*bracket);
        for element in elements {
          self.compile_expression(element);
        }

        match u8::try_from(elements.len()) {
          Ok(length) => {
            self.emit_opcode(OpCode::BuildList);
            self.emit_value(length);
          }
          Err(_) => self.error(Error::TooLongList),
        }
      }
      Expr::Map { brace, entries } => {
        self.track(*brace);
        for (key, value) in entries {
          self.compile_expression(key);
          self.compile_expression(value);
        }

        match u8::try_from(entries.len()) {
          Ok(length) => {
            self.emit_opcode(OpCode::BuildMap);
            self.emit_value(length);
          }
          Err(_) => self.error(Error::TooLongList),
        }
      }
      Expr::Call {
        paren,
        callee,
        arguments,
      } => {
        self.track(*paren);
        self.compile_expression(callee);

        let count = u8::try_from(arguments.len()).unwrap_or_else(|_| {
          self.error(Error::TooManyArguments);
          255
        });
        for argument in arguments {
          self.compile_expression(argument);
        }

        self.emit_opcode(OpCode::Call);
        self.emit_value(count);
      }
      Expr::Get { name, object } => {
        self.track(*name);
        self.compile_expression(object);
        let position = self.make_constant(Value::from(name.lexeme));
        self.emit_opcode(OpCode::GetProperty);
        self.emit_value(position);
      }
      Expr::Set {
        name,
        object,
        value,
      } => {
        self.track(*name);
        self.compile_expression(object);
        self.compile_expression(value);
        let position = self.make_constant(Value::from(name.lexeme));
        self.emit_opcode(OpCode::SetProperty);
        self.emit_value(position);
      }
      Expr::Index {
        bracket,
        object,
        index,
      } => {
        self.track(*bracket);
        self.compile_expression(object);
        self.compile_expression(index);
        self.emit_opcode(OpCode::GetIndex);
      }
      Expr::IndexSet {
        bracket,
        object,
        index,
        value,
      } => {
        self.track(*bracket);
        self.compile_expression(object);
        self.compile_expression(index);
        self.compile_expression(value);
        self.emit_opcode(OpCode::SetIndex);
      }
      Expr::Prefix { operator, right } => {
        self.track(*operator);
        self.compile_expression(right);

        if operator.ttype == TokenType::Minus {
          self.emit_opcode(OpCode::Negate);
        } else {
          self.emit_opcode(OpCode::Not);
        }
      }
      Expr::Postfix { operator, left } => {
        self.track(*operator);

        // Postfix on anything but a variable silently compiles to nothing
        if let Expr::Variable { name } = left.as_ref() {
          self.emit_get_variable(*name);
          self.emit_opcode(OpCode::Copy);
          self.emit_constant(Value::from(1.0));

          if operator.ttype == TokenType::PlusPlus {
            self.emit_opcode(OpCode::Add);
          } else {
            self.emit_opcode(OpCode::Subtract);
          }

          self.emit_set_variable(*name);
        }
      }
      Expr::This { keyword } => {
        self.track(*keyword);
        self.emit_opcode(OpCode::GetLocal);
        self.emit_value(0);
      }
    }
  }
}

pub fn compile(ast: &[Stmt]) -> Result<Chunk, Vec<Diagnostic>> {
  let mut compiler = Compiler::new();
  compiler.locals.push(Local {
    name: "(script)",
    depth: 0,
  });

  for statement in ast {
    compiler.compile_statement(statement);
  }
  compiler.emit_opcode(OpCode::Return);

  if compiler.errors.is_empty() {
    Ok(compiler.chunk)
  } else {
    Err(compiler.errors)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{parser, tokens};

  fn compile_source(source: &str) -> Result<Chunk, Vec<Diagnostic>> {
    let tokens = tokens::tokenize(source);
    let ast = parser::parse(&tokens).unwrap();
    compile(&ast)
  }

  fn instruction_size(chunk: &Chunk, position: usize) -> usize {
    match chunk.get(position).unwrap() {
      OpCode::Constant
      | OpCode::DefineGlobal
      | OpCode::GetGlobal
      | OpCode::SetGlobal
      | OpCode::GetLocal
      | OpCode::SetLocal
      | OpCode::Call
      | OpCode::BuildList
      | OpCode::BuildMap
      | OpCode::GetProperty
      | OpCode::SetProperty
      | OpCode::Class => 2,
      OpCode::Jump
      | OpCode::JumpIfFalse
      | OpCode::Loop
      | OpCode::Attempt
      | OpCode::ForEachNext => 3,
      _ => 1,
    }
  }

  // Walk the bytecode and check every jump lands on an opcode boundary
  fn assert_jumps_in_bounds(chunk: &Chunk) {
    let mut boundaries = std::collections::HashSet::new();
    let mut position = 0;
    while position < chunk.len() {
      boundaries.insert(position);
      position += instruction_size(chunk, position);
    }
    boundaries.insert(chunk.len());

    let mut position = 0;
    while position < chunk.len() {
      let target = match chunk.get(position).unwrap() {
        OpCode::Jump | OpCode::JumpIfFalse | OpCode::Attempt | OpCode::ForEachNext => {
          Some(position + 3 + chunk.get_long_value(position + 1) as usize)
        }
        OpCode::Loop => Some(position + 3 - chunk.get_long_value(position + 1) as usize),
        _ => None,
      };

      if let Some(target) = target {
        assert!(boundaries.contains(&target), "bad jump target {}", target);
      }
      position += instruction_size(chunk, position);
    }
  }

  #[test]
  fn empty_program_is_a_single_return() {
    let chunk = compile_source("").unwrap();
    assert_eq!(chunk.code, vec![OpCode::Return as u8]);
  }

  #[test]
  fn global_declaration_emits_define_global() {
    let chunk = compile_source("var x = 1;").unwrap();

    assert_eq!(
      chunk.code,
      vec![
        OpCode::Constant as u8,
        0,
        OpCode::DefineGlobal as u8,
        1,
        OpCode::Return as u8,
      ]
    );
    assert_eq!(chunk.constants[0], Value::from(1.0));
    assert_eq!(chunk.constants[1], Value::from("x"));
  }

  #[test]
  fn jumps_land_on_opcode_boundaries() {
    let chunk = compile_source(
      "var i = 0;
       while (i < 10) {
         if (i == 3) { stop; }
         if (i == 1) { skip; }
         i = i + 1;
       }
       each n in 1..4 { if (n and true or false) { stop; } }",
    )
    .unwrap();

    assert_jumps_in_bounds(&chunk);
  }

  #[test]
  fn stop_outside_loop_is_an_error() {
    let errors = compile_source("stop;").unwrap_err();
    assert_eq!(errors[0].title, "Stop Outside Loop");

    let errors = compile_source("skip;").unwrap_err();
    assert_eq!(errors[0].title, "Skip Outside Loop");
  }

  #[test]
  fn stop_pops_locals_deeper_than_the_loop() {
    let chunk = compile_source("while (true) { var a = 1; var b = 2; stop; }").unwrap();

    // find the Jump emitted by stop, and count the Pops directly before it
    let mut position = 0;
    let mut previous = Vec::new();
    while position < chunk.len() {
      if chunk.get(position) == Some(OpCode::Jump) {
        break;
      }
      previous.push(chunk.get(position).unwrap());
      position += instruction_size(&chunk, position);
    }

    let pops = previous
      .iter()
      .rev()
      .take_while(|code| **code == OpCode::Pop)
      .count();
    assert_eq!(pops, 2);
  }

  #[test]
  fn namespace_qualifies_declarations_and_references() {
    let chunk = compile_source("namespace M { var x = 5; } var y = M::x;").unwrap();

    assert!(chunk.constants.contains(&Value::from("M::x")));
    assert!(!chunk.constants.contains(&Value::from("x")));
  }

  #[test]
  fn function_declarations_store_their_own_chunk() {
    let chunk = compile_source("fn add(a, b) { return a + b; }").unwrap();

    let function = chunk
      .constants
      .iter()
      .find_map(|constant| match constant {
        Value::Function(function) => Some(function),
        _ => None,
      })
      .unwrap();

    assert_eq!(function.arity, 2);
    assert_eq!(&*function.name, "add");
    assert_jumps_in_bounds(&function.chunk);
    assert_eq!(
      function.chunk.get(function.chunk.len() - 1),
      Some(OpCode::Return)
    );
  }
}
