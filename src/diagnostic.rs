use std::fmt;

use crate::tokens::{ColumnNumber, LineNumber};

// An error from the parser or the compiler
#[derive(Debug, PartialEq, Eq)]
pub struct Diagnostic {
  pub title: String,
  pub message: String,
  pub line: LineNumber,
  pub column: ColumnNumber,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "Error at line {}, column {}: {}",
      self.line, self.column, self.title
    )
  }
}

// An uncaught panic from the virtual machine, with one entry per call frame
#[derive(Debug, PartialEq, Eq)]
pub struct RuntimeError {
  pub message: String,
  pub line: LineNumber,
  pub column: ColumnNumber,
  pub traceback: Vec<(String, LineNumber)>,
}

impl fmt::Display for RuntimeError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.traceback.first() {
      Some((function, line)) => write!(
        f,
        "Runtime panic: {} [at {}:{}]",
        self.message, function, line
      ),
      None => write!(f, "Runtime panic: {}", self.message),
    }
  }
}
