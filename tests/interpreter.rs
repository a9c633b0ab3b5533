mod common;

use pretty_assertions::assert_eq;

use rlox::interpreter::MAX_CALL_DEPTH;
use rlox::lox::RunOutcome;
use rlox::value::Value;

use common::{messages, output_of, run, session};

/// Run a program that must fail at runtime; returns its output and the
/// rendered error.
fn runtime_failure(source: &str) -> (String, String) {
    let (output, outcome) = run(source);

    assert!(outcome.had_runtime_error(), "expected a runtime error: {:?}", outcome);

    let mut errors = messages(&outcome);
    assert_eq!(errors.len(), 1);

    (output, errors.remove(0))
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(output_of("print 2 + 3 * 4;"), "14\n");
    assert_eq!(output_of("print (2 + 3) * 4;"), "20\n");
    assert_eq!(output_of("print 10 / 4;"), "2.5\n");
    assert_eq!(output_of("print -(1 - 3);"), "2\n");
}

#[test]
fn division_by_zero_is_infinity() {
    assert_eq!(output_of("print 1 / 0;"), "Infinity\n");
    assert_eq!(output_of("print -1 / 0;"), "-Infinity\n");
}

#[test]
fn large_numbers_use_exponent_form() {
    assert_eq!(output_of("print 1000000000 * 1000000000000;"), "1e+21\n");
}

#[test]
fn strings_concatenate() {
    assert_eq!(output_of("print \"foo\" + \"bar\";"), "foobar\n");
}

#[test]
fn mixed_addition_is_a_runtime_error() {
    let (output, error) = runtime_failure("print \"a\" + 1;");

    assert_eq!(output, "");
    assert_eq!(error, "Operands must be two numbers or two strings.\n[line 1]");
}

#[test]
fn comparison_and_negation_require_numbers() {
    assert_eq!(
        runtime_failure("print 1 < \"2\";").1,
        "Operands must be numbers.\n[line 1]"
    );
    assert_eq!(
        runtime_failure("\n\nprint -\"x\";").1,
        "Operand must be a number.\n[line 3]"
    );
}

#[test]
fn logical_operators_short_circuit_and_yield_operands() {
    assert_eq!(output_of("print true or undefined;"), "true\n");
    assert_eq!(output_of("print false and undefined;"), "false\n");
    assert_eq!(output_of("print nil or \"x\";"), "x\n");
    assert_eq!(output_of("print 1 and 2;"), "2\n");
}

#[test]
fn only_nil_and_false_are_falsey() {
    assert_eq!(
        output_of("print !nil; print !false; print !0; print !\"\";"),
        "true\ntrue\nfalse\nfalse\n"
    );
    assert_eq!(output_of("if (0) print \"yes\"; else print \"no\";"), "yes\n");
}

#[test]
fn equality_is_strict() {
    let program = r#"
print 1 == 1;
print "a" == "a";
print nil == nil;
print nil == false;
print 0 == false;
print "1" == 1;
print 1 != 2;
"#;

    assert_eq!(
        output_of(program),
        "true\ntrue\ntrue\nfalse\nfalse\nfalse\ntrue\n"
    );
}

#[test]
fn reference_values_compare_by_identity() {
    let program = r#"
class A {}
var a = A();
var b = a;
print a == b;
print A() == A();
fun f() {}
print f == f;
"#;

    assert_eq!(output_of(program), "true\nfalse\ntrue\n");
}

#[test]
fn values_print_in_lox_form() {
    let program = r#"
fun f() {}
class K {}
print clock;
print f;
print K;
print K();
print nil;
print 1.5;
print 3;
print true;
"#;

    assert_eq!(
        output_of(program),
        "<native fn>\n<fn f>\nK\nK instance\nnil\n1.5\n3\ntrue\n"
    );
}

#[test]
fn blocks_shadow_and_restore() {
    let program = r#"
var a = "outer";
{
  var a = "inner";
  print a;
}
print a;
"#;

    assert_eq!(output_of(program), "inner\nouter\n");
}

#[test]
fn assignment_reaches_enclosing_scope() {
    assert_eq!(output_of("var a = 1; { a = 2; } print a;"), "2\n");
    assert_eq!(output_of("var a; print a = 3;"), "3\n");
}

#[test]
fn undefined_variables_are_runtime_errors() {
    assert_eq!(
        runtime_failure("print nope;").1,
        "Undefined variable 'nope'.\n[line 1]"
    );
    assert_eq!(
        runtime_failure("nope = 1;").1,
        "Undefined variable 'nope'.\n[line 1]"
    );
}

#[test]
fn while_and_for_loops() {
    assert_eq!(
        output_of("var i = 0; while (i < 3) { print i; i = i + 1; }"),
        "0\n1\n2\n"
    );
    assert_eq!(
        output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn recursion_computes_fibonacci() {
    let program = r#"
fun fib(n) {
  if (n < 2) return n;
  return fib(n - 1) + fib(n - 2);
}
print fib(10);
"#;

    assert_eq!(output_of(program), "55\n");
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(output_of("fun f() {} print f();"), "nil\n");
    assert_eq!(output_of("fun f() { return; } print f();"), "nil\n");
}

#[test]
fn return_unwinds_out_of_loops() {
    let program = r#"
fun first() {
  for (var i = 0; i < 10; i = i + 1) {
    if (i == 2) return i;
  }
}
print first();
"#;

    assert_eq!(output_of(program), "2\n");
}

#[test]
fn closures_keep_their_counter() {
    let program = r#"
fun makeCounter() {
  var i = 0;
  fun count() {
    i = i + 1;
    print i;
  }
  return count;
}
var counter = makeCounter();
counter();
counter();
"#;

    assert_eq!(output_of(program), "1\n2\n");
}

#[test]
fn closures_share_captured_variables() {
    let program = r#"
var get;
var set;
{
  var x = "before";
  fun g() { print x; }
  fun s() { x = "after"; }
  get = g;
  set = s;
}
get();
set();
get();
"#;

    assert_eq!(output_of(program), "before\nafter\n");
}

#[test]
fn arity_is_checked() {
    assert_eq!(
        runtime_failure("fun f(a) {} f();").1,
        "Expected 1 arguments but got 0.\n[line 1]"
    );
    assert_eq!(
        runtime_failure("class C { init(x) {} } C(1, 2);").1,
        "Expected 1 arguments but got 2.\n[line 1]"
    );
}

#[test]
fn only_callables_can_be_called() {
    assert_eq!(
        runtime_failure("\"str\"();").1,
        "Can only call functions and classes.\n[line 1]"
    );
}

#[test]
fn initializer_sets_fields() {
    assert_eq!(
        output_of("class C { init(x) { this.x = x; } } print C(5).x;"),
        "5\n"
    );
}

#[test]
fn init_with_bare_return_still_yields_the_instance() {
    let program = r#"
class C {
  init() {
    this.ready = true;
    return;
  }
}
var c = C();
print c.ready;
print c.init();
"#;

    assert_eq!(output_of(program), "true\nC instance\n");
}

#[test]
fn fields_are_set_and_shadow_methods() {
    let program = r#"
class P {
  name() { return "method"; }
}
var p = P();
p.extra = 1;
print p.extra;
print p.name();
p.name = "field";
print p.name;
"#;

    assert_eq!(output_of(program), "1\nmethod\nfield\n");
}

#[test]
fn extracted_methods_stay_bound() {
    let program = r#"
class Person {
  init(name) { this.name = name; }
  greet() { print "hi " + this.name; }
}
var greet = Person("ann").greet;
greet();
"#;

    assert_eq!(output_of(program), "hi ann\n");
}

#[test]
fn property_errors() {
    assert_eq!(
        runtime_failure("class A {} print A().missing;").1,
        "Undefined property 'missing'.\n[line 1]"
    );
    assert_eq!(
        runtime_failure("var x = 1; print x.y;").1,
        "Only instances have properties.\n[line 1]"
    );
    assert_eq!(
        runtime_failure("var x = 1; x.y = 2;").1,
        "Only instances have fields.\n[line 1]"
    );
}

#[test]
fn subclasses_inherit_init_and_methods() {
    let program = r#"
class A {
  init(v) { this.v = v; }
  show() { print this.v; }
}
class B < A {}
B(7).show();
"#;

    assert_eq!(output_of(program), "7\n");
}

#[test]
fn super_calls_walk_the_chain() {
    let program = r#"
class A {
  method() { print "A method"; }
}
class B < A {
  method() { print "B method"; }
  test() { super.method(); }
}
class C < B {}
C().test();
"#;

    assert_eq!(output_of(program), "A method\n");
}

#[test]
fn super_binds_this_to_the_receiver() {
    let program = r#"
class A {
  name() { return "A:" + this.tag; }
}
class B < A {
  init() { this.tag = "b"; }
  name() { return "B>" + super.name(); }
}
print B().name();
"#;

    assert_eq!(output_of(program), "B>A:b\n");
}

#[test]
fn superclass_must_be_a_class() {
    assert_eq!(
        runtime_failure("var NotClass = 1;\nclass B < NotClass {}").1,
        "Superclass must be a class.\n[line 2]"
    );
}

#[test]
fn output_before_a_runtime_error_is_kept() {
    let (output, error) = runtime_failure("print 1;\nprint 2;\nprint nope;\nprint 4;");

    assert_eq!(output, "1\n2\n");
    assert_eq!(error, "Undefined variable 'nope'.\n[line 3]");
}

#[test]
fn session_keeps_globals_between_runs() {
    let (mut lox, out) = session();

    assert!(matches!(lox.run("var a = 1;"), RunOutcome::Success));
    assert!(matches!(lox.run("fun inc() { a = a + 1; }"), RunOutcome::Success));
    assert!(matches!(lox.run("inc(); print a;"), RunOutcome::Success));

    assert_eq!(out.contents(), "2\n");
}

#[test]
fn closures_from_earlier_runs_resolve_correctly() {
    let (mut lox, out) = session();

    lox.run("fun make() { var n = 10; fun get() { return n; } return get; }");
    lox.run("var g = make();");
    lox.run("{ var shadow = 1; print g(); }");

    assert_eq!(out.contents(), "10\n");
}

#[test]
fn runtime_error_inside_block_restores_global_scope() {
    let (mut lox, out) = session();

    let outcome = lox.run("var a = \"global\"; { var a = \"local\"; print nope; }");
    assert!(outcome.had_runtime_error());

    assert!(matches!(lox.run("print a;"), RunOutcome::Success));
    assert_eq!(out.contents(), "global\n");
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    let (mut lox, out) = session();

    let outcome = lox.run("fun f(n) { return f(n + 1); }\nf(0);");
    assert!(outcome.had_runtime_error());
    assert_eq!(messages(&outcome), vec!["Stack overflow.\n[line 1]"]);

    assert!(matches!(lox.run("print \"still here\";"), RunOutcome::Success));
    assert_eq!(out.contents(), "still here\n");
}

#[test]
fn recursion_below_the_depth_limit_succeeds() {
    let program = format!(
        "fun down(n) {{ if (n == 0) return 0; return down(n - 1); }} print down({});",
        MAX_CALL_DEPTH - 1
    );

    assert_eq!(output_of(&program), "0\n");
}

#[test]
fn depth_is_released_after_a_failed_run() {
    let (mut lox, out) = session();

    lox.run("fun f() { f(); } f();");
    lox.run("fun down(n) { if (n > 0) down(n - 1); } down(60); print \"ok\";");

    assert_eq!(out.contents(), "ok\n");
}

#[test]
fn clock_returns_seconds() {
    assert_eq!(output_of("print clock() > 0;"), "true\n");
}

fn double(args: &[Value]) -> Result<Value, String> {
    match args {
        [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
        _ => Err("double expects a number.".to_string()),
    }
}

#[test]
fn host_can_register_natives() {
    let (mut lox, out) = session();
    lox.interpreter_mut().define_native("double", 1, double);

    assert!(matches!(lox.run("print double(21);"), RunOutcome::Success));
    assert_eq!(out.contents(), "42\n");

    let outcome = lox.run("double(\"x\");");
    assert_eq!(messages(&outcome), vec!["double expects a number.\n[line 1]"]);
}

#[test]
fn scan_and_parse_errors_are_reported_together() {
    let (output, outcome) = run("print @;");

    assert!(outcome.had_compile_error());
    assert_eq!(output, "");
    assert_eq!(
        messages(&outcome),
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
        ]
    );
}
