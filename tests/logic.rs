use ry_test::*;

ry_test!(if_else
"var x;
 if (1 < 2) { x = 'then'; } else { x = 'else'; }
 return x;"
  returns "then"
);

ry_test!(if_without_else
"var x = 'unchanged';
 if (false) { x = 'changed'; }
 return x;"
  returns "unchanged"
);

ry_test!(zero_is_truthy
"var x = 'no';
 if (0) { x = 'yes'; }
 return x;"
  returns "yes"
);

ry_test!(empty_string_is_truthy
"var x = 'no';
 if ('') { x = 'yes'; }
 return x;"
  returns "yes"
);

ry_test!(nil_is_falsy
"var x = 'no';
 if (nil) { x = 'yes'; }
 return x;"
  returns "no"
);

ry_test!(and_short_circuits
"var called = false;
 fn flag() { called = true; return true; }
 var result = false and flag();"
  "called" == false
  "result" == false
);

ry_test!(or_short_circuits
"var called = false;
 fn flag() { called = true; return true; }
 var result = true or flag();"
  "called" == false
  "result" == true
);

ry_test!(and_yields_right_operand
"return true and 'right';"
  returns "right"
);

ry_test!(or_yields_first_truthy
"return false or 'fallback';"
  returns "fallback"
);

ry_test!(logic_combines_with_comparisons
"var x = 5;
 return x > 1 and x < 10;"
  returns true
);
