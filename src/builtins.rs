use std::time::{SystemTime, UNIX_EPOCH};

use crate::value::{NativeFunction, Value};
use crate::vm::VM;

// Names the compiler must leave unqualified inside namespaces
pub const NATIVE_NAMES: [&str; 5] = ["print", "type", "clock", "exit", "clear"];

pub fn is_native(name: &str) -> bool {
  NATIVE_NAMES.contains(&name)
}

pub fn define_globals(vm: &mut VM) {
  let print = NativeFunction::create("print", 1, |args, _globals| {
    println!("{}", args[0]);
    args[0].clone()
  });

  let type_ = NativeFunction::create("type", 1, |args, _globals| Value::from(args[0].get_type()));

  let clock = NativeFunction::create("clock", 0, |_args, _globals| {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
      Ok(duration) => Value::from(duration.as_secs_f64()),
      Err(_) => Value::Nil,
    }
  });

  let exit = NativeFunction::create("exit", 1, |args, _globals| {
    let code = match args[0] {
      Value::Number(code) => code as i32,
      _ => 0,
    };
    std::process::exit(code)
  });

  let clear = NativeFunction::create("clear", 0, |_args, _globals| {
    print!("\x1B[2J\x1B[1;1H");
    Value::Nil
  });

  vm.define_global("print", print);
  vm.define_global("type", type_);
  vm.define_global("clock", clock);
  vm.define_global("exit", exit);
  vm.define_global("clear", clear);
}
