use ahash::AHashMap;
use smallvec::SmallVec;
use std::rc::Rc;

use crate::{
  builtins,
  chunk::{Chunk, OpCode},
  diagnostic::RuntimeError,
  modules::{ModuleLoader, StdModules},
  value::{Function, Instance, NativeFunction, Value, VMGlobals},
};

// Raises a panic at the current instruction: either transfers control to the
// innermost attempt handler, or breaks out of the run loop with the error
macro_rules! runtime_panic {
  (($vm:expr, $function:expr, $ip:expr, $offset:expr), $($message:tt)+) => {{
    let message = format!($($message)+);
    match $vm.unwind(&mut $function, &mut $ip, &mut $offset, message) {
      Some(error) => break Err(error),
      None => continue,
    }
  }};
}

macro_rules! integer_expression {
  ($vm:expr, $token:tt) => {
    let (right, left) = ($vm.pop(), $vm.pop());

    match (left, right) {
      (Value::Number(left), Value::Number(right)) => {
        $vm.push(Value::Number(((left as i64) $token (right as i64)) as f64));
      }
      _ => $vm.push(Value::Nil),
    }
  };
}

struct CallFrame {
  function: Rc<Function>,
  ip: usize,
  offset: usize,
}

struct AttemptHandler {
  ip: usize,
  frame_count: usize,
  stack_len: usize,
}

pub struct VM<'m> {
  stack: Vec<Value>,
  frames: Vec<CallFrame>,
  globals: VMGlobals,
  handlers: SmallVec<[AttemptHandler; 4]>,
  loader: &'m dyn ModuleLoader,
}

impl<'m> VM<'m> {
  pub fn new(loader: &'m dyn ModuleLoader) -> Self {
    let mut vm = Self {
      stack: Vec::with_capacity(64),
      frames: Vec::with_capacity(16),
      globals: VMGlobals::default(),
      handlers: SmallVec::new(),
      loader,
    };

    builtins::define_globals(&mut vm);

    vm
  }

  pub fn define_global(&mut self, name: &str, value: Value) {
    self.globals.insert(Rc::from(name), value);
  }

  #[inline]
  fn peek(&self) -> &Value {
    self.stack.last().unwrap()
  }

  #[inline]
  fn pop(&mut self) -> Value {
    self.stack.pop().unwrap_or(Value::Nil)
  }

  #[inline]
  fn push(&mut self, value: Value) {
    self.stack.push(value);
  }

  fn unwind(
    &mut self,
    function: &mut Rc<Function>,
    ip: &mut usize,
    offset: &mut usize,
    message: String,
  ) -> Option<RuntimeError> {
    match self.handlers.pop() {
      Some(handler) => {
        if self.frames.len() > handler.frame_count {
          self.frames.truncate(handler.frame_count + 1);
          let frame = self.frames.pop().unwrap();
          *function = frame.function;
          *offset = frame.offset;
        }
        *ip = handler.ip;

        self.stack.truncate(handler.stack_len);
        self.stack.push(Value::from(message));

        None
      }
      None => {
        let line = function.chunk.get_line(*ip);
        let column = function.chunk.get_column(*ip);

        let mut traceback = vec![(function.name.to_string(), line)];
        for frame in self.frames.iter().rev() {
          traceback.push((
            frame.function.name.to_string(),
            frame.function.chunk.get_line(frame.ip),
          ));
        }

        self.stack.clear();
        self.frames.clear();
        self.handlers.clear();

        Some(RuntimeError {
          message,
          line,
          column,
          traceback,
        })
      }
    }
  }

  pub fn run(&mut self, chunk: Chunk) -> Result<Value, RuntimeError> {
    let script = Rc::new(Function {
      name: Rc::from("(script)"),
      arity: 0,
      chunk,
    });

    self.stack.clear();
    self.frames.clear();
    self.handlers.clear();
    self.push(Value::Function(script.clone()));
    let mut function = script;
    let mut ip: usize = 0;
    let mut offset: usize = 0;

    loop {
      let instruction = match function.chunk.get(ip) {
        Some(instruction) => instruction,
        None => runtime_panic!((self, function, ip, offset), "Unknown opcode."),
      };

      match instruction {
        OpCode::Constant => {
          let constant_location = function.chunk.get_value(ip + 1);
          let constant = function.chunk.get_constant(constant_location as usize);
          self.push(constant);
          ip += 2;
        }
        OpCode::Null => {
          self.push(Value::Nil);
          ip += 1;
        }
        OpCode::True => {
          self.push(Value::Boolean(true));
          ip += 1;
        }
        OpCode::False => {
          self.push(Value::Boolean(false));
          ip += 1;
        }
        OpCode::Pop => {
          self.stack.pop();
          ip += 1;
        }
        OpCode::Copy => {
          let value = self.peek().clone();
          self.push(value);
          ip += 1;
        }

        OpCode::Add => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.add(&right));
          ip += 1;
        }
        OpCode::Subtract => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.subtract(&right));
          ip += 1;
        }
        OpCode::Multiply => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.multiply(&right));
          ip += 1;
        }
        OpCode::Divide => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.divide(&right));
          ip += 1;
        }
        OpCode::Modulo => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.modulo(&right));
          ip += 1;
        }
        OpCode::Negate => {
          let value = self.pop();
          match value {
            Value::Number(number) => self.push(Value::Number(-number)),
            value => runtime_panic!(
              (self, function, ip, offset),
              "Operand must be a number but received {}.",
              value.get_type()
            ),
          }
          ip += 1;
        }
        OpCode::Not => {
          let value = self.pop();
          self.push(Value::Boolean(value.is_falsy()));
          ip += 1;
        }

        OpCode::Equal => {
          let (right, left) = (self.pop(), self.pop());
          self.push(Value::Boolean(left == right));
          ip += 1;
        }
        OpCode::Greater => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.greater(&right));
          ip += 1;
        }
        OpCode::Less => {
          let (right, left) = (self.pop(), self.pop());
          self.push(left.less(&right));
          ip += 1;
        }

        OpCode::BitwiseAnd => {
          integer_expression!(self, &);
          ip += 1;
        }
        OpCode::BitwiseOr => {
          integer_expression!(self, |);
          ip += 1;
        }
        OpCode::BitwiseXor => {
          integer_expression!(self, ^);
          ip += 1;
        }
        OpCode::LeftShift => {
          let (right, left) = (self.pop(), self.pop());
          match (left, right) {
            (Value::Number(left), Value::Number(right)) => {
              self.push(Value::Number(((left as i64).wrapping_shl(right as u32)) as f64));
            }
            _ => self.push(Value::Nil),
          }
          ip += 1;
        }
        OpCode::RightShift => {
          let (right, left) = (self.pop(), self.pop());
          match (left, right) {
            (Value::Number(left), Value::Number(right)) => {
              self.push(Value::Number(((left as i64).wrapping_shr(right as u32)) as f64));
            }
            _ => self.push(Value::Nil),
          }
          ip += 1;
        }

        OpCode::DefineGlobal => {
          let name_location = function.chunk.get_value(ip + 1);
          let name = function.chunk.get_constant(name_location as usize);

          let value = self.pop();
          self.globals.insert(name.as_str(), value);

          ip += 2;
        }
        OpCode::GetGlobal => {
          let name_location = function.chunk.get_value(ip + 1);
          let name = function.chunk.get_constant(name_location as usize);

          match self.globals.get(&name.as_str()).cloned() {
            Some(value) => self.push(value),
            None => runtime_panic!(
              (self, function, ip, offset),
              "Undefined variable '{}'.",
              name.as_str()
            ),
          }

          ip += 2;
        }
        OpCode::SetGlobal => {
          let name_location = function.chunk.get_value(ip + 1);
          let name = function.chunk.get_constant(name_location as usize).as_str();
          let value = self.pop();

          if self.globals.contains_key(&name) {
            self.globals.insert(name, value);
          } else {
            runtime_panic!((self, function, ip, offset), "Undefined variable '{}'.", name);
          }

          ip += 2;
        }
        OpCode::GetLocal => {
          let slot = function.chunk.get_value(ip + 1);
          self.push(self.stack[offset + slot as usize].clone());
          ip += 2;
        }
        OpCode::SetLocal => {
          let slot = function.chunk.get_value(ip + 1);
          let value = self.pop();
          self.stack[offset + slot as usize] = value;
          ip += 2;
        }

        OpCode::Jump => {
          let jump = function.chunk.get_long_value(ip + 1);
          ip += jump as usize + 3;
        }
        OpCode::JumpIfFalse => {
          let jump = function.chunk.get_long_value(ip + 1);
          if self.peek().is_falsy() {
            ip += jump as usize + 3;
          } else {
            ip += 3;
          }
        }
        OpCode::Loop => {
          let jump = function.chunk.get_long_value(ip + 1);
          ip = ip + 3 - jump as usize;
        }

        OpCode::Call => {
          let arg_count = function.chunk.get_value(ip + 1) as usize;
          let position = self.stack.len() - arg_count - 1;
          let callee = self.stack[position].clone();

          match callee {
            Value::Function(func) => {
              if func.arity as usize != arg_count {
                runtime_panic!(
                  (self, function, ip, offset),
                  "Expected {} arguments but got {}.",
                  func.arity,
                  arg_count
                );
              }

              let enclosing = std::mem::replace(&mut function, func);
              self.frames.push(CallFrame {
                function: enclosing,
                ip: ip + 2,
                offset,
              });
              offset = position;
              ip = 0;
            }
            Value::NativeFunction(native) => {
              if native.arity as usize != arg_count {
                runtime_panic!(
                  (self, function, ip, offset),
                  "Expected {} arguments but got {}.",
                  native.arity,
                  arg_count
                );
              }

              let start_of_args = self.stack.len() - arg_count;
              let result = (native.func)(&self.stack[start_of_args..], &mut self.globals);
              self.stack.truncate(position);
              self.push(result);

              ip += 2;
            }
            _ => runtime_panic!((self, function, ip, offset), "Can only call functions."),
          }
        }
        OpCode::Return => {
          let result = self.stack.pop();

          if self.frames.is_empty() {
            break Ok(match result {
              Some(value) if !self.stack.is_empty() => value,
              _ => Value::Nil,
            });
          }

          self.stack.truncate(offset);
          self.push(result.unwrap_or(Value::Nil));

          // handlers opened by the returning frame are no longer reachable
          while self
            .handlers
            .last()
            .map_or(false, |handler| handler.frame_count >= self.frames.len())
          {
            self.handlers.pop();
          }

          let frame = self.frames.pop().unwrap();
          function = frame.function;
          ip = frame.ip;
          offset = frame.offset;
        }

        OpCode::BuildList => {
          let length = function.chunk.get_value(ip + 1);
          let start_of_items = self.stack.len() - length as usize;

          let items = self.stack.drain(start_of_items..).collect::<Vec<_>>();
          self.push(Value::from(items));

          ip += 2;
        }
        OpCode::BuildMap => {
          let length = function.chunk.get_value(ip + 1);
          let start_of_items = self.stack.len() - length as usize * 2;

          let items = self.stack.drain(start_of_items..).collect::<Vec<_>>();
          let mut entries = AHashMap::with_capacity(length as usize);
          for pair in items.chunks_exact(2) {
            entries.insert(pair[0].clone(), pair[1].clone());
          }
          self.push(Value::from(entries));

          ip += 2;
        }
        OpCode::BuildRangeList => {
          let (end, start) = (self.pop(), self.pop());

          match (start, end) {
            (Value::Number(start), Value::Number(end)) => {
              let mut items = Vec::new();
              let mut value = start;
              while value < end {
                items.push(Value::Number(value));
                value += 1.0;
              }
              self.push(Value::from(items));
            }
            _ => runtime_panic!((self, function, ip, offset), "Range bounds must be numbers."),
          }

          ip += 1;
        }

        OpCode::GetIndex => {
          let index = self.pop();
          let item = self.pop();

          match (&item, &index) {
            (Value::List(list), Value::Number(number)) => {
              let list = list.borrow();
              let position = *number as usize;
              if *number < 0.0 || position >= list.len() {
                runtime_panic!((self, function, ip, offset), "Index {} out of range.", number);
              }
              let value = list[position].clone();
              self.push(value);
            }
            (Value::String(string), Value::Number(number)) => {
              let position = *number as usize;
              match string.chars().nth(position).filter(|_| *number >= 0.0) {
                Some(character) => self.push(Value::from(character.to_string())),
                None => runtime_panic!(
                  (self, function, ip, offset),
                  "Index {} out of range.",
                  number
                ),
              }
            }
            (Value::Map(map), key) => {
              let value = map.borrow().get(key).cloned().unwrap_or(Value::Nil);
              self.push(value);
            }
            _ => runtime_panic!(
              (self, function, ip, offset),
              "Can't index {} with {}.",
              item.get_type(),
              index.get_type()
            ),
          }

          ip += 1;
        }
        OpCode::SetIndex => {
          let value = self.pop();
          let index = self.pop();
          let item = self.pop();

          match (&item, &index) {
            (Value::List(list), Value::Number(number)) => {
              let mut list = list.borrow_mut();
              let position = *number as usize;
              if *number < 0.0 || position >= list.len() {
                runtime_panic!((self, function, ip, offset), "Index {} out of range.", number);
              }
              list[position] = value;
            }
            (Value::Map(map), key) => {
              map.borrow_mut().insert((*key).clone(), value);
            }
            _ => runtime_panic!(
              (self, function, ip, offset),
              "Can't assign to index of type {}.",
              item.get_type()
            ),
          }

          ip += 1;
        }

        OpCode::GetProperty => {
          let name_location = function.chunk.get_value(ip + 1);
          let name = function.chunk.get_constant(name_location as usize);
          let object = self.pop();

          match &object {
            Value::Instance(instance) => {
              let value = instance
                .fields
                .borrow()
                .get(&name.as_str())
                .cloned()
                .unwrap_or(Value::Nil);
              self.push(value);
            }
            _ => runtime_panic!(
              (self, function, ip, offset),
              "Only instances have properties, received {}.",
              object.get_type()
            ),
          }

          ip += 2;
        }
        OpCode::SetProperty => {
          let name_location = function.chunk.get_value(ip + 1);
          let name = function.chunk.get_constant(name_location as usize);
          let value = self.pop();
          let object = self.pop();

          match &object {
            Value::Instance(instance) => {
              instance.fields.borrow_mut().insert(name.as_str(), value.clone());
              self.push(value);
            }
            _ => runtime_panic!(
              (self, function, ip, offset),
              "Only instances have properties, received {}.",
              object.get_type()
            ),
          }

          ip += 2;
        }
        OpCode::Class => {
          let name_location = function.chunk.get_value(ip + 1);
          let name = function.chunk.get_constant(name_location as usize);
          self.push(Value::from(Instance::new(name.as_str())));
          ip += 2;
        }

        OpCode::Import => {
          let module = self.pop();
          let name = match &module {
            Value::String(name) => name.clone(),
            _ => runtime_panic!((self, function, ip, offset), "Module name must be a string."),
          };

          match self.loader.load(&name) {
            Some(functions) => {
              for entry in functions {
                let native = NativeFunction::create(&entry.name, entry.arity, entry.func);
                self
                  .globals
                  .insert(Rc::from(format!("{}::{}", name, entry.name)), native);
              }
            }
            None => runtime_panic!(
              (self, function, ip, offset),
              "Could not load module '{}'.",
              name
            ),
          }

          ip += 1;
        }

        OpCode::Attempt => {
          let jump = function.chunk.get_long_value(ip + 1);
          self.handlers.push(AttemptHandler {
            ip: ip + jump as usize + 3,
            frame_count: self.frames.len(),
            stack_len: self.stack.len(),
          });
          ip += 3;
        }
        OpCode::EndAttempt => {
          self.handlers.pop();
          ip += 1;
        }

        OpCode::ForEachNext => {
          let length = self.stack.len();
          let collection = self.stack[length - 2].clone();
          let index = match self.stack[length - 1].clone() {
            Value::Number(number) => number as usize,
            _ => runtime_panic!((self, function, ip, offset), "Loop index must be a number."),
          };

          let element = match &collection {
            Value::List(list) => list.borrow().get(index).cloned(),
            Value::String(string) => string
              .chars()
              .nth(index)
              .map(|character| Value::from(character.to_string())),
            Value::Range(range) => {
              let value = range.start + index as f64;
              if value < range.end {
                Some(Value::Number(value))
              } else {
                None
              }
            }
            _ => runtime_panic!(
              (self, function, ip, offset),
              "Can't iterate over {}.",
              collection.get_type()
            ),
          };

          match element {
            Some(element) => {
              self.stack[length - 1] = Value::from(index + 1);
              self.push(element);
              ip += 3;
            }
            None => {
              let jump = function.chunk.get_long_value(ip + 1);
              ip += jump as usize + 3;
            }
          }
        }

        OpCode::Panic => {
          let message = self.pop();
          runtime_panic!((self, function, ip, offset), "{}", message);
        }
      }
    }
  }
}

pub fn run(chunk: Chunk) -> Result<(Value, VMGlobals), RuntimeError> {
  let modules = StdModules::new();
  let mut vm = VM::new(&modules);

  let value = vm.run(chunk)?;

  Ok((value, vm.globals))
}
