use ry_test::*;

ry_test!(while_loop
"var i = 0; while (i < 10) { i = i + 1; }"
  "i" == 10.0
);

ry_test!(while_false_never_runs
"var i = 0; while (false) { i = i + 1; }"
  "i" == 0.0
);

ry_test!(while_with_stop
"var i = 0; while (i < 10) { if (i == 3) { stop; } i = i + 1; } return i;"
  returns 3.0
);

ry_test!(while_with_skip
"var i = 0; var s = 0;
 while (i < 5) {
   i = i + 1;
   if (i == 2) { skip; }
   s = s + i;
 }
 return s;"
  returns 13.0
);

ry_test!(stop_discards_block_locals
"var i = 0;
 while (true) {
   var a = i * 2;
   if (a > 4) { stop; }
   i = i + 1;
 }
 return i;"
  returns 3.0
);

ry_test!(for_loop
"var s = 0; for (var i = 0; i < 3; i++) { s = s + i; } return s;"
  returns 3.0
);

ry_test!(for_loop_with_assignment_increment
"var s = 0; for (var i = 0; i < 4; i = i + 1) { s = s + 1; } return s;"
  returns 4.0
);

ry_test!(for_loop_with_stop
"var n = 0; for (var i = 0; i < 100; i++) { if (i == 7) { stop; } n = n + 1; } return n;"
  returns 7.0
);

ry_test!(nested_while_loops
"var total = 0;
 var i = 0;
 while (i < 3) {
   var j = 0;
   while (j < 3) {
     if (j == i) { stop; }
     total = total + 1;
     j = j + 1;
   }
   i = i + 1;
 }
 return total;"
  returns 3.0
);

ry_test!(each_over_range
"var s = 0; each n in 1..4 { s = s + n; } return s;"
  returns 6.0
);

ry_test!(each_over_list
"var s = 0; each n in [5, 6, 7] { s = s + n; } return s;"
  returns 18.0
);

ry_test!(each_over_string
"var s = ''; each c in 'abc' { s = c + s; } return s;"
  returns "cba"
);

ry_test!(each_with_stop
"var s = 0; each n in [5, 6, 7] { if (n == 6) { stop; } s = s + n; } return s;"
  returns 5.0
);

ry_test!(each_with_skip
"var s = 0; each n in 1..6 { if (n % 2 == 0) { skip; } s = s + n; } return s;"
  returns 9.0
);

ry_test!(each_loop_variable_is_local
"var s = 0; each n in 1..4 { s = s + n; } return n;"
  RuntimeError
);

ry_test!(empty_range_never_runs
"var s = 1; each n in 4..1 { s = s + n; } return s;"
  returns 1.0
);

ry_test!(each_over_number_panics
"each n in 5 { }"
  RuntimeError
);

ry_test!(stop_outside_loop
"stop;"
  CompileError
);

ry_test!(skip_outside_loop
"skip;"
  CompileError
);
