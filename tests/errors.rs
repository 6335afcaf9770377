use ry::{compile, parse, tokenize, InterpretError};

fn runtime_error(source: &str) -> ry::RuntimeError {
  match ry::interpret(source) {
    Err(InterpretError::Runtime(error)) => error,
    other => panic!("expected a runtime error, got {:?}", other.map(|_| ())),
  }
}

#[test]
fn panics_carry_their_message_and_position() {
  let error = runtime_error("var x = 1;\npanic 'broken';");

  assert_eq!(error.message, "broken");
  assert_eq!(error.line, 2);
  assert_eq!(error.column, 7);
}

#[test]
fn runtime_errors_format_with_function_and_line() {
  let error = runtime_error("panic 'm';");

  assert_eq!(error.to_string(), "Runtime panic: m [at (script):1]");
}

#[test]
fn traceback_lists_frames_innermost_first() {
  let error = runtime_error(
    "fn inner() { panic 'x'; }
     fn outer() { inner(); }
     outer();",
  );

  let functions: Vec<&str> = error
    .traceback
    .iter()
    .map(|(function, _)| function.as_str())
    .collect();
  assert_eq!(functions, vec!["inner", "outer", "(script)"]);
}

#[test]
fn compile_errors_carry_coordinates() {
  let tokens = tokenize("var x = 1;\n  stop;");
  let ast = parse(&tokens).unwrap();
  let errors = compile(&ast).unwrap_err();

  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].line, 2);
  assert_eq!(errors[0].column, 3);
  assert_eq!(
    errors[0].to_string(),
    "Error at line 2, column 3: Stop Outside Loop"
  );
}

#[test]
fn compilation_continues_after_an_error() {
  let tokens = tokenize("stop;\nskip;");
  let ast = parse(&tokens).unwrap();
  let errors = compile(&ast).unwrap_err();

  assert_eq!(errors.len(), 2);
}

#[test]
fn parse_errors_carry_coordinates() {
  let tokens = tokenize("var = 1;");
  let error = parse(&tokens).unwrap_err();

  assert_eq!(error.line, 1);
  assert_eq!(error.column, 5);
}

#[test]
fn undefined_variable_message_names_the_variable() {
  let error = runtime_error("return missing_thing;");

  assert!(error.message.contains("missing_thing"));
}

#[test]
fn arity_errors_name_both_counts() {
  let error = runtime_error("fn two(a, b) { } two(1);");

  assert_eq!(error.message, "Expected 2 arguments but got 1.");
}
