use crate::chunk::{Chunk, OpCode};
use crate::tokens::Token;
use crate::value::Value;

pub fn tokens(tokens: &[Token]) {
  let mut line = 0;

  println!("     ╭─[Tokens]");
  for token in tokens {
    if token.is_trivia() {
      continue;
    }

    if token.line == line {
      print!("     │ ");
    } else {
      print!("{:>4} │ ", token.line);
      line = token.line;
    }
    println!("{:?} ({})", token.ttype, token.lexeme);
  }
  println!("─────╯");
}

pub fn chunk(chunk: &Chunk, name: &str) {
  println!("          ╭─[{}]", name);

  let mut position = 0;
  let mut last_line = 0;
  while position < chunk.len() {
    let line = chunk.get_line(position);
    if line == last_line {
      print!("     {:0>4} │ ", position);
    } else {
      print!("{:<4} {:0>4} │ ", line, position);
      last_line = line;
    }

    position = disassemble_instruction(chunk, position);
  }
  println!("──────────╯");

  // nested functions carry their own chunks
  for constant in &chunk.constants {
    if let Value::Function(function) = constant {
      self::chunk(&function.chunk, &function.name);
    }
  }
}

fn disassemble_instruction(chunk: &Chunk, position: usize) -> usize {
  match chunk.get(position) {
    Some(OpCode::Constant) => constant_instruction("Constant", chunk, position),
    Some(OpCode::Null) => simple_instruction("Null", position),
    Some(OpCode::True) => simple_instruction("True", position),
    Some(OpCode::False) => simple_instruction("False", position),
    Some(OpCode::Pop) => simple_instruction("Pop", position),
    Some(OpCode::Copy) => simple_instruction("Copy", position),
    Some(OpCode::Add) => simple_instruction("Add", position),
    Some(OpCode::Subtract) => simple_instruction("Subtract", position),
    Some(OpCode::Multiply) => simple_instruction("Multiply", position),
    Some(OpCode::Divide) => simple_instruction("Divide", position),
    Some(OpCode::Modulo) => simple_instruction("Modulo", position),
    Some(OpCode::Negate) => simple_instruction("Negate", position),
    Some(OpCode::Not) => simple_instruction("Not", position),
    Some(OpCode::Equal) => simple_instruction("Equal", position),
    Some(OpCode::Greater) => simple_instruction("Greater", position),
    Some(OpCode::Less) => simple_instruction("Less", position),
    Some(OpCode::BitwiseAnd) => simple_instruction("Bitwise And", position),
    Some(OpCode::BitwiseOr) => simple_instruction("Bitwise Or", position),
    Some(OpCode::BitwiseXor) => simple_instruction("Bitwise Xor", position),
    Some(OpCode::LeftShift) => simple_instruction("Left Shift", position),
    Some(OpCode::RightShift) => simple_instruction("Right Shift", position),
    Some(OpCode::DefineGlobal) => constant_instruction("Define Global", chunk, position),
    Some(OpCode::GetGlobal) => constant_instruction("Get Global", chunk, position),
    Some(OpCode::SetGlobal) => constant_instruction("Set Global", chunk, position),
    Some(OpCode::GetLocal) => byte_instruction("Get Local", chunk, position),
    Some(OpCode::SetLocal) => byte_instruction("Set Local", chunk, position),
    Some(OpCode::Jump) => jump_instruction("Jump", 1, chunk, position),
    Some(OpCode::JumpIfFalse) => jump_instruction("Jump If False", 1, chunk, position),
    Some(OpCode::Loop) => jump_instruction("Loop", -1, chunk, position),
    Some(OpCode::Call) => byte_instruction("Call", chunk, position),
    Some(OpCode::Return) => simple_instruction("Return", position),
    Some(OpCode::BuildList) => byte_instruction("Build List", chunk, position),
    Some(OpCode::BuildMap) => byte_instruction("Build Map", chunk, position),
    Some(OpCode::BuildRangeList) => simple_instruction("Build Range List", position),
    Some(OpCode::GetIndex) => simple_instruction("Get Index", position),
    Some(OpCode::SetIndex) => simple_instruction("Set Index", position),
    Some(OpCode::GetProperty) => constant_instruction("Get Property", chunk, position),
    Some(OpCode::SetProperty) => constant_instruction("Set Property", chunk, position),
    Some(OpCode::Class) => constant_instruction("Class", chunk, position),
    Some(OpCode::Import) => simple_instruction("Import", position),
    Some(OpCode::Attempt) => jump_instruction("Attempt", 1, chunk, position),
    Some(OpCode::EndAttempt) => simple_instruction("End Attempt", position),
    Some(OpCode::ForEachNext) => jump_instruction("For Each Next", 1, chunk, position),
    Some(OpCode::Panic) => simple_instruction("Panic", position),
    None => simple_instruction("Unknown OpCode", position),
  }
}

fn simple_instruction(name: &str, position: usize) -> usize {
  println!("{}", name);
  position + 1
}

fn constant_instruction(name: &str, chunk: &Chunk, position: usize) -> usize {
  let location = chunk.get_value(position + 1);
  let constant = chunk.get_constant(location as usize);
  println!("{} '{}' ({})", name, constant, location);

  position + 2
}

fn byte_instruction(name: &str, chunk: &Chunk, position: usize) -> usize {
  println!("{} {}", name, chunk.get_value(position + 1));

  position + 2
}

fn jump_instruction(name: &str, direction: i8, chunk: &Chunk, position: usize) -> usize {
  let jump = chunk.get_long_value(position + 1);
  println!("{} {}", name, i32::from(jump) * i32::from(direction));

  position + 3
}
