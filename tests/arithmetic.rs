use ry_test::*;

ry_test!(precedence
"var x = 1 + 2 * 3; return x;"
  returns 7.0
);

ry_test!(grouping
"return (1 + 2) * 3;"
  returns 9.0
);

ry_test!(modulo_uses_fmod
"return 7.5 % 2;"
  returns 1.5
);

ry_test!(division_by_zero_is_infinity
"var x = 1 / 0; return x;"
  returns f64::INFINITY
);

ry_test!(negation
"return -(2 + 3);"
  returns -5.0
);

ry_test!(negating_a_string_panics
"return -'a';"
  RuntimeError
);

ry_test!(mixed_add_concatenates
"return 1 + 'a';"
  returns "1a"
);

ry_test!(mixed_subtract_concatenates
"return 'a' - 1;"
  returns "a1"
);

ry_test!(mixed_multiply_concatenates
"return 2 * 'x';"
  returns "2x"
);

ry_test!(string_concatenation
"return 'foo' + 'bar';"
  returns "foobar"
);

ry_test!(number_display_strips_trailing_zeros
"return 7.0 + '';"
  returns "7"
);

ry_test!(mixed_divide_is_nil
"var x = 'a' / 2; return x == nil;"
  returns true
);

ry_test!(comparisons
"var a = 1 < 2; var b = 1 > 2; var c = 2 <= 2; var d = 3 >= 4;"
  "a" == true
  "b" == false
  "c" == true
  "d" == false
);

ry_test!(comparing_non_numbers_is_nil
"return ('a' < 1) == nil;"
  returns true
);

ry_test!(equality
"var a = 1 == 1; var b = 'x' == 'x'; var c = 1 == '1'; var d = nil == nil;"
  "a" == true
  "b" == true
  "c" == false
  "d" == true
);

ry_test!(not_equal
"return 1 != 2;"
  returns true
);

ry_test!(bitwise_operators
"var a = 6 & 3; var b = 6 | 3; var c = 6 ^ 3;"
  "a" == 2.0
  "b" == 7.0
  "c" == 5.0
);

ry_test!(shift_operators
"var a = 1 << 4; var b = 32 >> 2;"
  "a" == 16.0
  "b" == 8.0
);

ry_test!(bitwise_on_strings_is_nil
"return ('a' & 1) == nil;"
  returns true
);

ry_test!(bitwise_truncates_to_integers
"return 6.9 & 3.2;"
  returns 2.0
);

ry_test!(not_operator
"var a = !true; var b = !nil; var c = !0;"
  "a" == false
  "b" == true
  "c" == false
);

ry_test!(numbers_with_underscores
"return 1_000 + 2;"
  returns 1002.0
);
