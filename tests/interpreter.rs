mod common;

#[cfg(test)]
mod interpreter_tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use treelox as lox;

    use lox::interpreter::Interpreter;
    use lox::pipeline::run_source;

    use super::common::{messages, run, run_with_input, SharedBuf};

    /// Run a program that must succeed and return its output.
    fn output_of(source: &str) -> String {
        let (output, result) = run(source);
        assert_eq!(messages(&result), Vec::<String>::new());
        output
    }

    /// Run a program that must fail at run time; returns (output, message).
    fn runtime_failure(source: &str) -> (String, String) {
        let (output, result) = run(source);

        let code = result.as_ref().err().map(|e| e.exit_code());
        assert_eq!(code, Some(70), "expected a runtime error");

        let mut diagnostics = messages(&result);
        assert_eq!(diagnostics.len(), 1);
        (output, diagnostics.remove(0))
    }

    // ───────────────────────────── values ─────────────────────────────

    #[test]
    fn test_interpreter_01_arithmetic_and_formatting() {
        assert_eq!(
            output_of("print 6 / 2; print 7 / 2; print 1 + 2 * 3; print -(4 - 6); print \"a\" + \"b\";"),
            "3\n3.5\n7\n2\nab\n"
        );
    }

    #[test]
    fn test_interpreter_02_truthiness_and_equality() {
        assert_eq!(
            output_of(
                "print nil == false; print 0 == false; print \"1\" == 1;\n\
                 print nil == nil; print \"a\" == \"a\";\n\
                 print !nil; print !0; print !\"\";"
            ),
            "false\nfalse\nfalse\ntrue\ntrue\ntrue\nfalse\nfalse\n"
        );
    }

    #[test]
    fn test_interpreter_03_logical_operators_return_operands() {
        assert_eq!(
            output_of("print nil or \"x\"; print 1 and 2; print false and undefined; print 1 or undefined;"),
            "x\n2\nfalse\n1\n"
        );
    }

    #[test]
    fn test_interpreter_04_callable_formatting() {
        assert_eq!(
            output_of("fun f() {} class Foo {} print f; print clock; print Foo; print Foo();"),
            "<fn f>\n<native fn>\nFoo\nFoo instance\n"
        );
    }

    // ─────────────────────────── control flow ─────────────────────────

    #[test]
    fn test_interpreter_05_for_loop_break() {
        assert_eq!(
            output_of("for (var i = 0; i < 10; i = i + 1) { if (i == 2) break; print i; }"),
            "0\n1\n"
        );
    }

    #[test]
    fn test_interpreter_06_break_only_leaves_inner_loop() {
        assert_eq!(
            output_of(
                "var i = 0;\n\
                 while (i < 2) {\n\
                   while (true) break;\n\
                   print i;\n\
                   i = i + 1;\n\
                 }"
            ),
            "0\n1\n"
        );
    }

    #[test]
    fn test_interpreter_07_return_inside_loop() {
        assert_eq!(
            output_of("fun f() { while (true) { return 5; } } print f();"),
            "5\n"
        );
    }

    #[test]
    fn test_interpreter_08_block_scoping() {
        assert_eq!(
            output_of("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
    }

    // ─────────────────────────── functions ────────────────────────────

    #[test]
    fn test_interpreter_09_closure_counter() {
        assert_eq!(
            output_of(
                "fun makeCounter() {\n\
                   var i = 0;\n\
                   fun count() { i = i + 1; print i; }\n\
                   return count;\n\
                 }\n\
                 var c = makeCounter();\n\
                 c();\n\
                 c();"
            ),
            "1\n2\n"
        );
    }

    #[test]
    fn test_interpreter_10_recursion() {
        assert_eq!(
            output_of(
                "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\n\
                 print fib(15);"
            ),
            "610\n"
        );
    }

    #[test]
    fn test_interpreter_11_function_without_return_yields_nil() {
        assert_eq!(output_of("fun f() {} print f();"), "nil\n");
    }

    #[test]
    fn test_interpreter_25_closures_share_captured_variable() {
        assert_eq!(
            output_of(
                "fun mk() {\n\
                   var i = 0;\n\
                   fun a() { i = i + 1; }\n\
                   fun b() { return i; }\n\
                   a();\n\
                   a();\n\
                   return b;\n\
                 }\n\
                 print mk()();"
            ),
            "2\n"
        );
    }

    // ──────────────────────────── classes ─────────────────────────────

    #[test]
    fn test_interpreter_12_fields_and_methods() {
        assert_eq!(
            output_of(
                "class Point {\n\
                   init(x, y) { this.x = x; this.y = y; }\n\
                   sum() { return this.x + this.y; }\n\
                 }\n\
                 var p = Point(1, 2);\n\
                 print p.sum();\n\
                 var m = p.sum;\n\
                 p.x = 10;\n\
                 print m();"
            ),
            "3\n12\n"
        );
    }

    #[test]
    fn test_interpreter_13_inheritance_and_super() {
        assert_eq!(
            output_of(
                "class A { method() { print \"A method\"; } }\n\
                 class B < A {\n\
                   method() { print \"B method\"; }\n\
                   test() { super.method(); }\n\
                 }\n\
                 class C < B {}\n\
                 C().test();\n\
                 C().method();"
            ),
            "A method\nB method\n"
        );
    }

    #[test]
    fn test_interpreter_14_initializer_returns_this() {
        assert_eq!(
            output_of(
                "class Foo {\n\
                   init() { this.x = 1; return; }\n\
                 }\n\
                 var f = Foo();\n\
                 f.x = 2;\n\
                 print f.init().x;\n\
                 print f.init() == f;"
            ),
            "1\ntrue\n"
        );
    }

    #[test]
    fn test_interpreter_15_inherited_initializer() {
        assert_eq!(
            output_of(
                "class A { init(n) { this.n = n; } }\n\
                 class B < A {}\n\
                 print B(7).n;"
            ),
            "7\n"
        );
    }

    // ───────────────────────── runtime errors ─────────────────────────

    #[test]
    fn test_interpreter_16_runtime_error_keeps_prior_output() {
        let (output, message) = runtime_failure("print 1;\nprint -\"x\";\nprint 2;");

        assert_eq!(output, "1\n");
        assert_eq!(message, "Operand must be a number. [line 2]");
    }

    #[test]
    fn test_interpreter_17_runtime_error_messages() {
        let cases = [
            ("print \"a\" + 1;", "Operands must be two numbers or two strings. [line 1]"),
            ("print 1 < \"b\";", "Operands must be numbers. [line 1]"),
            ("print x;", "Undefined variable 'x'. [line 1]"),
            ("x = 1;", "Undefined variable 'x'. [line 1]"),
            ("\"abc\"();", "Can only call functions and classes. [line 1]"),
            ("fun f(a) {} f();", "Expected 1 arguments but got 0. [line 1]"),
            ("print 1.x;", "Only instances have properties. [line 1]"),
            ("var s = \"s\"; s.x = 1;", "Only instances have fields. [line 1]"),
            ("class A {} print A().nope;", "Undefined property 'nope'. [line 1]"),
            ("var N = 1; class B < N {}", "Superclass must be a class. [line 1]"),
        ];

        for (source, expected) in cases {
            let (_, message) = runtime_failure(source);
            assert_eq!(message, expected, "for source {:?}", source);
        }
    }

    #[test]
    fn test_interpreter_18_callee_checked_before_arguments() {
        let (output, message) = runtime_failure("fun side() { print \"evaluated\"; } nil(side());");

        assert_eq!(output, "");
        assert_eq!(message, "Can only call functions and classes. [line 1]");
    }

    // ──────────────────────────── natives ─────────────────────────────

    #[test]
    fn test_interpreter_19_list_operations() {
        assert_eq!(
            output_of(
                "var l = List(2);\n\
                 l.set(0, \"a\");\n\
                 l.append(3);\n\
                 print l.length;\n\
                 print l.get(0);\n\
                 print l.get(1);\n\
                 print l.pop(2);\n\
                 print l.remove(\"a\");\n\
                 print l.remove(\"zzz\");\n\
                 print l.length;"
            ),
            "3\na\nnil\n3\ntrue\nfalse\n1\n"
        );
    }

    #[test]
    fn test_interpreter_20_list_index_errors() {
        let (_, message) = runtime_failure("var l = List(1);\nl.get(5);");
        assert_eq!(message, "Index out of range. [line 2]");

        let (_, message) = runtime_failure("var l = List(1); l.get(0.5);");
        assert_eq!(message, "Index must be a non-negative integer. [line 1]");
    }

    #[test]
    fn test_interpreter_26_list_size_too_large() {
        let (output, message) = runtime_failure(
            "print \"before\"; var l = List(100000000000000000000); print l.length;",
        );
        assert_eq!(output, "before\n");
        assert_eq!(message, "List size too large. [line 1]");

        let (_, message) = runtime_failure("List(100000000);");
        assert_eq!(message, "List size too large. [line 1]");
    }

    #[test]
    fn test_interpreter_21_input_reads_injected_lines() {
        let (output, result) = run_with_input(
            "print input.read(); print input.readNum() + 1; print input.read();",
            "hello\n41\n",
        );

        assert!(result.is_ok());
        assert_eq!(output, "hello\n42\nnil\n");
    }

    #[test]
    fn test_interpreter_22_read_num_rejects_text() {
        let (output, result) = run_with_input("print input.readNum();", "abc\n");

        assert_eq!(output, "");
        assert_eq!(
            messages(&result),
            vec!["Can't convert string to number. [line 1]"]
        );
    }

    #[test]
    fn test_interpreter_23_clock_is_a_number() {
        assert_eq!(output_of("print clock() > 0;"), "true\n");
    }

    // ───────────────────────────── session ────────────────────────────

    #[test]
    fn test_interpreter_24_globals_persist_across_runs() {
        let out = SharedBuf::default();
        let mut interpreter =
            Interpreter::with_io(Box::new(out.clone()), Box::new(Cursor::new(Vec::new())));

        assert!(run_source(&mut interpreter, "var a = 1; fun inc() { a = a + 1; }").is_ok());
        assert!(run_source(&mut interpreter, "print oops").is_err());
        assert!(run_source(&mut interpreter, "inc(); print a;").is_ok());

        assert_eq!(out.contents(), "2\n");
    }

    #[test]
    fn test_interpreter_27_scope_restored_after_runtime_error_in_block() {
        let out = SharedBuf::default();
        let mut interpreter =
            Interpreter::with_io(Box::new(out.clone()), Box::new(Cursor::new(Vec::new())));

        let failed = run_source(&mut interpreter, "{ var x = 1; nil(); }");
        assert_eq!(failed.map_err(|e| e.exit_code()), Err(70));

        assert!(run_source(&mut interpreter, "var y = 2; print y;").is_ok());
        assert!(run_source(&mut interpreter, "fun g() { return y; } print g();").is_ok());

        assert_eq!(out.contents(), "2\n2\n");
    }
}
