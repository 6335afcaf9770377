use std::{
  cell::RefCell,
  ffi::CStr,
  os::raw::c_char,
  path::PathBuf,
};

use libloading::Library;

use crate::value::{NativeFn, Value, VMGlobals};

pub struct ModuleFunction {
  pub name: String,
  pub arity: u8,
  pub func: NativeFn,
}

// Resolves an imported name to the native functions it provides.
// `None` becomes a runtime panic at the import site.
pub trait ModuleLoader {
  fn load(&self, name: &str) -> Option<Vec<ModuleFunction>>;
}

pub struct RegistrationTarget {
  functions: Vec<ModuleFunction>,
}

pub type RegisterFn = extern "C" fn(*const c_char, NativeFn, u8, *mut RegistrationTarget);
type InitModuleFn = unsafe extern "C" fn(RegisterFn, *mut RegistrationTarget);

#[allow(improper_ctypes_definitions)]
extern "C" fn register_function(
  name: *const c_char,
  func: NativeFn,
  arity: u8,
  target: *mut RegistrationTarget,
) {
  let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
  let target = unsafe { &mut *target };

  target.functions.push(ModuleFunction { name, arity, func });
}

// Loads `<directory>/<platform library name>` and calls its `init_ry_module`
// entry point. Loaded libraries stay alive as long as the loader, as the VM
// holds registered function pointers into them.
pub struct DynamicLoader {
  directory: PathBuf,
  libraries: RefCell<Vec<Library>>,
}

impl DynamicLoader {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      libraries: RefCell::new(Vec::new()),
    }
  }
}

impl ModuleLoader for DynamicLoader {
  fn load(&self, name: &str) -> Option<Vec<ModuleFunction>> {
    let filename = format!(
      "{}{}{}",
      std::env::consts::DLL_PREFIX,
      name,
      std::env::consts::DLL_SUFFIX
    );
    let path = self.directory.join(filename);
    if !path.exists() {
      return None;
    }

    let library = unsafe { Library::new(&path) }.ok()?;
    let mut target = RegistrationTarget {
      functions: Vec::new(),
    };

    unsafe {
      let init: libloading::Symbol<InitModuleFn> = library.get(b"init_ry_module").ok()?;
      init(register_function, &mut target);
    }

    self.libraries.borrow_mut().push(library);
    Some(target.functions)
  }
}

// The default loader: built-in modules first, then dynamic libraries from
// the conventional `modules/` directory
pub struct StdModules {
  dynamic: DynamicLoader,
}

impl StdModules {
  pub fn new() -> Self {
    Self {
      dynamic: DynamicLoader::new("modules"),
    }
  }
}

impl Default for StdModules {
  fn default() -> Self {
    Self::new()
  }
}

impl ModuleLoader for StdModules {
  fn load(&self, name: &str) -> Option<Vec<ModuleFunction>> {
    builtin_module(name).or_else(|| self.dynamic.load(name))
  }
}

fn builtin_module(name: &str) -> Option<Vec<ModuleFunction>> {
  match name {
    "file" => Some(vec![
      ModuleFunction {
        name: "read".to_string(),
        arity: 1,
        func: file_read,
      },
      ModuleFunction {
        name: "write".to_string(),
        arity: 2,
        func: file_write,
      },
    ]),
    "string" => Some(vec![
      ModuleFunction {
        name: "upper".to_string(),
        arity: 1,
        func: string_upper,
      },
      ModuleFunction {
        name: "lower".to_string(),
        arity: 1,
        func: string_lower,
      },
      ModuleFunction {
        name: "substr".to_string(),
        arity: 3,
        func: string_substr,
      },
    ]),
    _ => None,
  }
}

fn file_read(args: &[Value], _globals: &mut VMGlobals) -> Value {
  match &args[0] {
    Value::String(path) => match std::fs::read_to_string(&**path) {
      Ok(content) => Value::from(content),
      Err(_) => Value::Nil,
    },
    _ => Value::Nil,
  }
}

fn file_write(args: &[Value], _globals: &mut VMGlobals) -> Value {
  match (&args[0], &args[1]) {
    (Value::String(path), Value::String(content)) => {
      Value::from(std::fs::write(&**path, &**content).is_ok())
    }
    _ => Value::from(false),
  }
}

fn string_upper(args: &[Value], _globals: &mut VMGlobals) -> Value {
  match &args[0] {
    Value::String(string) => Value::from(string.to_uppercase()),
    _ => Value::Nil,
  }
}

fn string_lower(args: &[Value], _globals: &mut VMGlobals) -> Value {
  match &args[0] {
    Value::String(string) => Value::from(string.to_lowercase()),
    _ => Value::Nil,
  }
}

// Returns an empty string rather than nil when out of bounds
fn string_substr(args: &[Value], _globals: &mut VMGlobals) -> Value {
  match (&args[0], &args[1], &args[2]) {
    (Value::String(string), Value::Number(start), Value::Number(length)) => {
      let start = start.max(0.0) as usize;
      let length = length.max(0.0) as usize;

      let substring: String = string.chars().skip(start).take(length).collect();
      Value::from(substring)
    }
    _ => Value::from(""),
  }
}
