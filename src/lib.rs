pub mod ast;
mod builtins;
mod chunk;
mod compiler;
mod diagnostic;
mod modules;
mod parser;
pub mod print;
mod tokens;
mod value;
mod vm;

// Errors and warnings from the language
pub use diagnostic::{Diagnostic, RuntimeError};

// Scan a string of source code into tokens
pub use tokens::{tokenize, ColumnNumber, LineNumber, Token, TokenType};

// Parse a slice of tokens into an AST
pub use parser::{parse, parse_number};

// Compile an AST into a chunk of bytecode
pub use chunk::{Chunk, OpCode};
pub use compiler::compile;

// Run a chunk of bytecode
pub use modules::{
  DynamicLoader, ModuleFunction, ModuleLoader, RegisterFn, RegistrationTarget, StdModules,
};
pub use vm::{run, VM};

// A value from the virtual machine
pub use value::{Function, NativeFn, NativeFunction, Range, Value, VMGlobals};

#[derive(Debug)]
pub enum InterpretError {
  Parse(Diagnostic),
  Compile(Vec<Diagnostic>),
  Runtime(RuntimeError),
}

// Interpret a string of code, returning the script's value and its globals
pub fn interpret(source: &str) -> Result<(Value, VMGlobals), InterpretError> {
  let tokens = tokenize(source);
  let ast = parse(&tokens).map_err(InterpretError::Parse)?;
  let chunk = compile(&ast).map_err(InterpretError::Compile)?;

  run(chunk).map_err(InterpretError::Runtime)
}
