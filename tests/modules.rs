use ry_test::*;

use ry::{compile, parse, tokenize, ModuleFunction, ModuleLoader, VMGlobals, Value, VM};

ry_test!(string_module_upper
"import 'string';
 return string::upper('ry');"
  returns "RY"
);

ry_test!(string_module_lower
"import 'string';
 return string::lower('LOUD');"
  returns "loud"
);

ry_test!(string_module_substr
"import 'string';
 return string::substr('language', 4, 3);"
  returns "uag"
);

ry_test!(substr_clamps_out_of_bounds
"import 'string';
 return string::substr('ry', 10, 2);"
  returns ""
);

ry_test!(missing_module_panics
"import 'no_such_module';"
  RuntimeError
);

ry_test!(import_of_non_string_panics
"import 5;"
  RuntimeError
);

ry_test!(failed_import_can_be_caught
"attempt { import 'no_such_module'; } fail (e) { return 'caught'; }"
  returns "caught"
);

#[test]
fn file_module_round_trips_through_disk() {
  let path = std::env::temp_dir().join("ry_module_test.txt");
  let path = path.to_string_lossy().replace('\\', "/");

  let source = format!(
    "import 'file';
     file::write('{path}', 'stored by ry');
     return file::read('{path}');"
  );

  let (result, value, _globals) = run(&source);
  assert_eq!(result, RunResult::Success);
  assert!(value == Value::from("stored by ry"));

  std::fs::remove_file(std::env::temp_dir().join("ry_module_test.txt")).ok();
}

// The loader is a seam: tests can substitute an in-memory registry
struct TestModules;

fn double(args: &[Value], _globals: &mut VMGlobals) -> Value {
  match args[0] {
    Value::Number(number) => Value::from(number * 2.0),
    _ => Value::Nil,
  }
}

impl ModuleLoader for TestModules {
  fn load(&self, name: &str) -> Option<Vec<ModuleFunction>> {
    if name == "test" {
      Some(vec![ModuleFunction {
        name: "double".to_string(),
        arity: 1,
        func: double,
      }])
    } else {
      None
    }
  }
}

#[test]
fn a_custom_loader_registers_namespaced_natives() {
  let source = "import 'test'; return test::double(21);";
  let tokens = tokenize(source);
  let ast = parse(&tokens).unwrap();
  let chunk = compile(&ast).unwrap();

  let loader = TestModules;
  let mut vm = VM::new(&loader);
  let value = vm.run(chunk).unwrap();

  assert!(value == Value::from(42.0));
}

#[test]
fn a_custom_loader_still_reports_unknown_modules() {
  let source = "import 'other';";
  let tokens = tokenize(source);
  let ast = parse(&tokens).unwrap();
  let chunk = compile(&ast).unwrap();

  let loader = TestModules;
  let mut vm = VM::new(&loader);
  let error = vm.run(chunk).unwrap_err();

  assert!(error.message.contains("other"));
}
