#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;
    use treelox as lox;

    use lox::ast::{Expr, Stmt};
    use lox::ast_printer::AstPrinter;
    use lox::parser::Parser;
    use lox::pipeline::compile;
    use lox::scanner::scan_tokens;

    fn print_program(source: &str) -> Vec<String> {
        let statements: Vec<Stmt> = compile(source).unwrap_or_else(|errors| {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            panic!("Unexpected parse errors: {:?}", rendered)
        });

        statements.iter().map(AstPrinter::print_stmt).collect()
    }

    fn compile_errors(source: &str) -> Vec<String> {
        match compile(source) {
            Ok(_) => panic!("Expected parse errors for {:?}", source),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_parser_01_precedence() {
        let (tokens, _) = scan_tokens("1 + 2 * -3 == !(4 >= 5)");
        let expr: Expr = Parser::new(&tokens)
            .parse_expression()
            .expect("valid expression");

        assert_eq!(
            AstPrinter::print_expr(&expr),
            "(== (+ 1.0 (* 2.0 (- 3.0))) (! (group (>= 4.0 5.0))))"
        );
    }

    #[test]
    fn test_parser_02_logical_and_assignment() {
        assert_eq!(
            print_program("a = b or c and d;"),
            vec!["(; (= a (or b (and c d))))"]
        );
    }

    #[test]
    fn test_parser_03_for_desugars_to_while() {
        assert_eq!(
            print_program("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["(block (var i = 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
        );
    }

    #[test]
    fn test_parser_04_empty_for_clauses() {
        assert_eq!(
            print_program("for (;;) break;"),
            vec!["(while true (break))"]
        );
    }

    #[test]
    fn test_parser_05_declarations() {
        assert_eq!(
            print_program(
                "fun add(a, b) { return a + b; }\n\
                 class B < A { init(x) { this.x = x; } get() { return super.get(); } }\n\
                 var v;\n\
                 if (v) print \"yes\"; else print add(1, 2);"
            ),
            vec![
                "(fun add(a b) (return (+ a b)))",
                "(class B < A (fun init(x) (; (.= this x x))) (fun get() (return (call (super get)))))",
                "(var v)",
                "(if v (print yes) (print (call add 1.0 2.0)))",
            ]
        );
    }

    #[test]
    fn test_parser_06_synchronizes_after_errors() {
        let errors = compile_errors("var = 1;\nprint 2;\nvar x = ;\n");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 3] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_parser_07_error_at_end() {
        let errors = compile_errors("print 1");

        assert_eq!(errors, vec!["[line 1] Error at end: Expect ';' after value."]);
    }

    #[test]
    fn test_parser_08_break_outside_loop() {
        let errors = compile_errors("break;");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'break': Must be inside a loop to use 'break'."]
        );

        // A function body does not inherit the enclosing loop.
        let errors = compile_errors("while (true) { fun f() { break; } }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'break': Must be inside a loop to use 'break'."]
        );

        assert_eq!(
            print_program("while (true) { if (true) break; }"),
            vec!["(while true (block (if true (break))))"]
        );
    }

    #[test]
    fn test_parser_09_invalid_assignment_target() {
        let errors = compile_errors("1 + 2 = 3;");

        assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);
    }

    #[test]
    fn test_parser_10_lex_and_parse_errors_together() {
        let errors = compile_errors("var a = @;\n");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: @",
                "[line 1] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_parser_11_too_many_arguments() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let errors = compile_errors(&source);

        assert_eq!(
            errors,
            vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
        );
    }
}
