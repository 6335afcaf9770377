use ahash::AHashMap;
use std::{
  cell::RefCell,
  fmt::Display,
  hash::{Hash, Hasher},
  rc::Rc,
};

use crate::chunk::Chunk;

pub type VMGlobals = AHashMap<Rc<str>, Value>;
pub type NativeFn = fn(args: &[Value], globals: &mut VMGlobals) -> Value;

#[derive(Debug)]
pub struct Function {
  pub name: Rc<str>,
  pub arity: u8,
  pub chunk: Chunk,
}

#[derive(Debug)]
pub struct NativeFunction {
  pub name: Rc<str>,
  pub arity: u8,
  pub func: NativeFn,
}
impl NativeFunction {
  pub fn create(name: &str, arity: u8, func: NativeFn) -> Value {
    Value::from(Self {
      name: Rc::from(name),
      arity,
      func,
    })
  }
}

// A class is represented by a single instance value carrying its fields
#[derive(Debug)]
pub struct Instance {
  pub name: Rc<str>,
  pub fields: RefCell<AHashMap<Rc<str>, Value>>,
}
impl Instance {
  pub fn new(name: Rc<str>) -> Self {
    Self {
      name,
      fields: RefCell::new(AHashMap::new()),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Range {
  pub start: f64,
  pub end: f64,
}

#[derive(Clone)]
pub enum Value {
  Nil,
  Boolean(bool),
  Number(f64),
  String(Rc<str>),
  List(Rc<RefCell<Vec<Value>>>),
  Map(Rc<RefCell<AHashMap<Value, Value>>>),
  Range(Range),
  Function(Rc<Function>),
  Instance(Rc<Instance>),
  NativeFunction(Rc<NativeFunction>),
}

impl Value {
  pub fn as_str(&self) -> Rc<str> {
    match self {
      Self::String(string) => string.clone(),
      _ => Rc::from(""),
    }
  }

  pub fn is_falsy(&self) -> bool {
    matches!(self, Self::Nil | Self::Boolean(false))
  }

  pub fn get_type(&self) -> &'static str {
    match self {
      Self::Nil => "nil",
      Self::Boolean(_) => "boolean",
      Self::Number(_) => "number",
      Self::String(_) => "string",
      Self::List(_) => "list",
      Self::Map(_) => "map",
      Self::Range(_) => "range",
      Self::Function(_) | Self::NativeFunction(_) => "function",
      Self::Instance(_) => "class",
    }
  }

  pub fn add(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Number(left + right),
      _ => Self::from(format!("{}{}", self, other)),
    }
  }

  // Non-numeric operands still concatenate, matching `+`
  pub fn subtract(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Number(left - right),
      _ => Self::from(format!("{}{}", self, other)),
    }
  }

  pub fn multiply(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Number(left * right),
      _ => Self::from(format!("{}{}", self, other)),
    }
  }

  pub fn divide(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Number(left / right),
      _ => Self::Nil,
    }
  }

  pub fn modulo(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Number(left % right),
      _ => Self::Nil,
    }
  }

  pub fn greater(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Boolean(left > right),
      _ => Self::Nil,
    }
  }

  pub fn less(&self, other: &Self) -> Self {
    match (self, other) {
      (Self::Number(left), Self::Number(right)) => Self::Boolean(left < right),
      _ => Self::Nil,
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Nil, Self::Nil) => true,
      (Self::Boolean(value), Self::Boolean(other)) => value == other,
      (Self::Number(value), Self::Number(other)) => value == other,
      (Self::String(value), Self::String(other)) => value == other,
      (Self::Range(value), Self::Range(other)) => value == other,
      (Self::List(value), Self::List(other)) => Rc::ptr_eq(value, other),
      (Self::Map(value), Self::Map(other)) => Rc::ptr_eq(value, other),
      (Self::Function(value), Self::Function(other)) => Rc::ptr_eq(value, other),
      (Self::Instance(value), Self::Instance(other)) => Rc::ptr_eq(value, other),
      (Self::NativeFunction(value), Self::NativeFunction(other)) => Rc::ptr_eq(value, other),
      _ => false,
    }
  }
}
impl Eq for Value {}

impl Hash for Value {
  fn hash<H: Hasher>(&self, state: &mut H) {
    std::mem::discriminant(self).hash(state);
    match self {
      Self::Nil => {}
      Self::Boolean(value) => value.hash(state),
      Self::Number(value) => value.to_bits().hash(state),
      Self::String(value) => value.hash(state),
      Self::Range(value) => {
        value.start.to_bits().hash(state);
        value.end.to_bits().hash(state);
      }
      Self::List(value) => Rc::as_ptr(value).hash(state),
      Self::Map(value) => Rc::as_ptr(value).hash(state),
      // Functions and instances are not meaningful keys
      Self::Function(_) | Self::Instance(_) | Self::NativeFunction(_) => {}
    }
  }
}

impl std::fmt::Debug for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{}", self)
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Self::Nil => write!(f, "nil"),
      Self::Boolean(value) => write!(f, "{}", value),
      Self::Number(value) => write!(f, "{}", value),
      Self::String(value) => write!(f, "{}", value),
      Self::Range(value) => write!(f, "{}..{}", value.start as i64, value.end as i64),
      Self::List(value) => write!(
        f,
        "[{}]",
        value
          .borrow()
          .iter()
          .map(std::string::ToString::to_string)
          .collect::<Vec<String>>()
          .join(", ")
      ),
      Self::Map(value) => write!(
        f,
        "{{{}}}",
        value
          .borrow()
          .iter()
          .map(|(key, value)| format!("{}: {}", key, value))
          .collect::<Vec<String>>()
          .join(", ")
      ),
      Self::Function(value) => write!(f, "<fn {}>", value.name),
      Self::NativeFunction(value) => write!(f, "<native fn {}>", value.name),
      Self::Instance(value) => write!(f, "<class {}>", value.name),
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Boolean(value)
  }
}
impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}
impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Self::Number(f64::from(value))
  }
}
impl From<usize> for Value {
  #[allow(clippy::cast_precision_loss)]
  fn from(value: usize) -> Self {
    Self::Number(value as f64)
  }
}
impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::String(Rc::from(value))
  }
}
impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::String(Rc::from(value))
  }
}
impl From<Range> for Value {
  fn from(value: Range) -> Self {
    Self::Range(value)
  }
}
impl From<Function> for Value {
  fn from(value: Function) -> Self {
    Self::Function(Rc::from(value))
  }
}
impl From<NativeFunction> for Value {
  fn from(value: NativeFunction) -> Self {
    Self::NativeFunction(Rc::from(value))
  }
}
impl From<Instance> for Value {
  fn from(value: Instance) -> Self {
    Self::Instance(Rc::from(value))
  }
}
impl From<Vec<Self>> for Value {
  fn from(value: Vec<Self>) -> Self {
    Self::List(Rc::from(RefCell::new(value)))
  }
}
impl From<AHashMap<Self, Self>> for Value {
  fn from(value: AHashMap<Self, Self>) -> Self {
    Self::Map(Rc::from(RefCell::new(value)))
  }
}
impl From<()> for Value {
  fn from(_value: ()) -> Self {
    Self::Nil
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_display_without_trailing_zeros() {
    assert_eq!(Value::from(7.0).to_string(), "7");
    assert_eq!(Value::from(2.5).to_string(), "2.5");
    assert_eq!(Value::from(-0.5).to_string(), "-0.5");
    assert_eq!(Value::from(100.0).to_string(), "100");
  }

  #[test]
  fn ranges_display_with_integer_endpoints() {
    let range = Value::from(Range {
      start: 1.0,
      end: 4.0,
    });
    assert_eq!(range.to_string(), "1..4");
  }

  #[test]
  fn lists_and_maps_display_their_items() {
    let list = Value::from(vec![Value::from(1.0), Value::from("a")]);
    assert_eq!(list.to_string(), "[1, a]");

    let mut entries = AHashMap::new();
    entries.insert(Value::from("key"), Value::from(2.0));
    assert_eq!(Value::from(entries).to_string(), "{key: 2}");
  }

  #[test]
  fn primitive_equality_is_structural() {
    assert_eq!(Value::from(1.5), Value::from(1.5));
    assert_eq!(Value::from("a"), Value::from("a"));
    assert_eq!(Value::Nil, Value::Nil);
    assert_ne!(Value::from(1.0), Value::from("1"));
  }

  #[test]
  fn container_equality_is_by_identity() {
    let list = Value::from(vec![Value::from(1.0)]);
    let same = list.clone();
    let other = Value::from(vec![Value::from(1.0)]);

    assert_eq!(list, same);
    assert_ne!(list, other);
  }

  #[test]
  fn mixed_arithmetic_concatenates() {
    assert_eq!(Value::from(1.0).add(&Value::from("a")), Value::from("1a"));
    assert_eq!(
      Value::from("a").subtract(&Value::from(1.0)),
      Value::from("a1")
    );
    assert_eq!(
      Value::from(true).multiply(&Value::from("x")),
      Value::from("truex")
    );
  }

  #[test]
  fn division_by_zero_does_not_trap() {
    assert_eq!(
      Value::from(1.0).divide(&Value::from(0.0)),
      Value::from(f64::INFINITY)
    );
  }

  #[test]
  fn comparisons_on_non_numbers_yield_nil() {
    assert_eq!(Value::from("a").greater(&Value::from(1.0)), Value::Nil);
    assert_eq!(Value::from(2.0).greater(&Value::from(1.0)), Value::from(true));
    assert_eq!(Value::from(2.0).less(&Value::from(1.0)), Value::from(false));
  }

  #[test]
  fn values_work_as_map_keys() {
    let mut map: AHashMap<Value, Value> = AHashMap::new();
    map.insert(Value::from("name"), Value::from("ry"));
    map.insert(Value::from(1.0), Value::from(true));

    assert_eq!(map.get(&Value::from("name")), Some(&Value::from("ry")));
    assert_eq!(map.get(&Value::from(1.0)), Some(&Value::from(true)));
    assert_eq!(map.get(&Value::from(2.0)), None);
  }

  #[test]
  fn truthiness_covers_zero_and_empty_string() {
    assert!(Value::Nil.is_falsy());
    assert!(Value::from(false).is_falsy());
    assert!(!Value::from(0.0).is_falsy());
    assert!(!Value::from("").is_falsy());
  }
}
