use ry_test::*;

ry_test!(function_call
"fn add(a, b) { return a + b; }
 return add(1, 2);"
  returns 3.0
);

ry_test!(function_without_return_gives_nil
"fn noop() { }
 return noop() == nil;"
  returns true
);

ry_test!(function_locals_are_independent
"fn double(x) { var result = x * 2; return result; }
 var a = double(3);
 var b = double(5);"
  "a" == 6.0
  "b" == 10.0
);

ry_test!(recursion
"fn fib(n) {
   if (n < 2) { return n; }
   return fib(n - 1) + fib(n - 2);
 }
 return fib(10);"
  returns 55.0
);

ry_test!(functions_can_call_functions
"fn inner(x) { return x + 1; }
 fn outer(x) { return inner(x) * 2; }
 return outer(4);"
  returns 10.0
);

ry_test!(arity_mismatch_panics
"fn add(a, b) { return a + b; }
 return add(1);"
  RuntimeError
);

ry_test!(too_many_arguments_panics
"fn one(a) { return a; }
 return one(1, 2);"
  RuntimeError
);

ry_test!(calling_a_number_panics
"var x = 5; x();"
  RuntimeError
);

ry_test!(calling_nil_panics
"var x; x();"
  RuntimeError
);

ry_test!(undefined_global_panics
"return missing;"
  RuntimeError
);

ry_test!(assigning_undefined_global_panics
"missing = 1;"
  RuntimeError
);

ry_test!(native_type_of_values
"var a = type(1);
 var b = type('x');
 var c = type([1]);
 var d = type(nil);"
  "a" == "number"
  "b" == "string"
  "c" == "list"
  "d" == "nil"
);

ry_test!(native_print_returns_its_argument
"return print('hello');"
  returns "hello"
);

ry_test!(native_arity_is_checked
"return type(1, 2);"
  RuntimeError
);

ry_test!(functions_display_with_their_name
"fn greet() { }
 return greet + '';"
  returns "<fn greet>"
);

ry_test!(alias_binds_a_new_name
"fn add(a, b) { return a + b; }
 alias plus = add;
 return plus(2, 3);"
  returns 5.0
);

ry_test!(parameters_shadow_globals
"var x = 1;
 fn shadow(x) { return x * 10; }
 var y = shadow(5);"
  "x" == 1.0
  "y" == 50.0
);
