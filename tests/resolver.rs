mod common;

use pretty_assertions::assert_eq;

use rlox::error::LoxError;
use rlox::lox::RunOutcome;
use rlox::parser::Parser;
use rlox::resolver::{Locals, Resolver};
use rlox::scanner::scan;

use common::{messages, output_of, run};

fn resolve(source: &str) -> Result<Locals, Vec<LoxError>> {
    let (tokens, _) = scan(source);
    let (statements, errors) = Parser::new(&tokens).parse();
    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);

    Resolver::new().resolve(&statements)
}

fn static_errors(source: &str) -> Vec<String> {
    let (output, outcome) = run(source);

    assert!(outcome.had_compile_error(), "expected a static error");
    assert_eq!(output, "", "nothing may run after a static error");

    messages(&outcome)
}

#[test]
fn local_reference_records_hop_distance() {
    // The only variable expression is the `a` in `print a` (id 0).
    let locals = resolve("{ var a = 1; { print a; } }").unwrap();

    assert_eq!(locals.get(&0), Some(&1));
}

#[test]
fn globals_are_left_unresolved() {
    let locals = resolve("var g = 1; print g; { print g; }").unwrap();

    assert!(locals.is_empty());
}

#[test]
fn function_parameters_live_one_scope_in() {
    // ids: `a` in `print a` → 0, `b` → 1
    let locals = resolve("fun f(a) { var b; print a; print b; }").unwrap();

    assert_eq!(locals.get(&0), Some(&0));
    assert_eq!(locals.get(&1), Some(&0));
}

#[test]
fn return_at_top_level_is_rejected() {
    assert_eq!(
        static_errors("print 1;\nreturn 1;"),
        vec!["[line 2] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn this_outside_class_is_rejected() {
    assert_eq!(
        static_errors("print this.x;"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
    assert_eq!(
        static_errors("fun f() { return this; }"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
}

#[test]
fn redeclaring_a_local_is_rejected() {
    assert_eq!(
        static_errors("{ var a = 1; var a = 2; }"),
        vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn redeclaring_a_global_is_allowed() {
    assert_eq!(output_of("var a = 1; var a = 2; print a;"), "2\n");
}

#[test]
fn reading_a_local_in_its_own_initializer_is_rejected() {
    assert_eq!(
        static_errors("var a = 1; { var a = a; }"),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn returning_a_value_from_init_is_rejected() {
    assert_eq!(
        static_errors("class C { init() { return 1; } }"),
        vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
    );
}

#[test]
fn bare_return_in_init_is_allowed() {
    assert!(resolve("class C { init() { return; } }").is_ok());
}

#[test]
fn super_requires_a_subclass() {
    assert_eq!(
        static_errors("class A { f() { super.f(); } }"),
        vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
    );
    assert_eq!(
        static_errors("super.f();"),
        vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
    );
}

#[test]
fn class_cannot_inherit_from_itself() {
    assert_eq!(
        static_errors("class A < A {}"),
        vec!["[line 1] Error at 'A': A class can't inherit from itself."]
    );
}

#[test]
fn every_static_error_is_reported() {
    assert_eq!(
        static_errors("return 1;\n{ var a; var a; }\nprint this;"),
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'a': Already a variable with this name in this scope.",
            "[line 3] Error at 'this': Can't use 'this' outside of a class.",
        ]
    );
}

#[test]
fn static_error_prevents_earlier_statements_from_running() {
    let (output, outcome) = run("print \"before\";\nreturn;");

    assert_eq!(output, "");
    assert!(matches!(outcome, RunOutcome::CompileError(ref errors) if errors.len() == 1));
}

#[test]
fn closure_binds_to_declaration_visible_at_definition() {
    let program = r#"
var a = "global";
{
  fun showA() {
    print a;
  }

  showA();
  var a = "block";
  showA();
  print a;
}
"#;

    assert_eq!(output_of(program), "global\nglobal\nblock\n");
}
