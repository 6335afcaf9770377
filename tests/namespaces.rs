use ry_test::*;

ry_test!(namespace_qualifies_globals
"namespace M { var x = 5; }
 return M::x;"
  returns 5.0
);

ry_test!(namespace_members_are_stored_qualified
"namespace M { var x = 5; }"
  "M::x" == 5.0
);

ry_test!(references_inside_namespace_are_qualified
"namespace M {
   var x = 2;
   var y = x * 10;
 }
 return M::y;"
  returns 20.0
);

ry_test!(namespaced_functions
"namespace maths {
   fn square(n) { return n * n; }
 }
 return maths::square(6);"
  returns 36.0
);

ry_test!(functions_see_their_own_namespace
"namespace counter {
   var count = 0;
   fn bump() { count = count + 1; return count; }
 }
 counter::bump();
 return counter::bump();"
  returns 2.0
);

ry_test!(namespaces_do_not_nest_their_prefixes
"namespace outer {
   namespace inner { var x = 1; }
   var y = 2;
 }
 return inner::x + outer::y;"
  returns 3.0
);

ry_test!(natives_stay_unqualified_inside_namespaces
"namespace M {
   var t = type(1);
 }
 return M::t;"
  returns "number"
);

ry_test!(qualified_reference_is_left_alone
"namespace a { var x = 1; }
 namespace b { var y = a::x + 1; }
 return b::y;"
  returns 2.0
);

ry_test!(unqualified_access_from_outside_fails
"namespace M { var x = 5; }
 return x;"
  RuntimeError
);

ry_test!(locals_are_never_qualified
"namespace M {
   fn pick(a) {
     var b = a + 1;
     return b;
   }
 }
 return M::pick(1);"
  returns 2.0
);

ry_test!(alias_inside_namespace_is_qualified
"namespace M {
   fn add(a, b) { return a + b; }
   alias plus = add;
 }
 return M::plus(1, 2);"
  returns 3.0
);

ry_test!(postfix_qualifies_inside_namespace
"namespace M {
   var n = 7;
   fn bump() { n++; return n; }
 }
 return M::bump();"
  returns 8.0
);

ry_test!(classes_inside_namespaces
"namespace app {
   class Config {}
 }
 app::Config.debug = true;
 return app::Config.debug;"
  returns true
);
