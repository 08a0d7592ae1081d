mod common;

#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use super::common::{messages, run};

    fn static_errors(source: &str) -> Vec<String> {
        let (output, result) = run(source);

        assert_eq!(output, "", "nothing may run when resolution fails");
        assert_eq!(result.as_ref().map_err(|e| e.exit_code()), Err(65));

        messages(&result)
    }

    #[test]
    fn test_resolver_01_redeclared_local() {
        assert_eq!(
            static_errors("{ var a = 1; var a = 2; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_resolver_02_globals_may_be_redeclared() {
        let (output, result) = run("var a = 1; var a = 2; print a;");

        assert!(result.is_ok());
        assert_eq!(output, "2\n");
    }

    #[test]
    fn test_resolver_03_own_initializer() {
        assert_eq!(
            static_errors("var a = 1; { var a = a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_resolver_04_return_rules() {
        assert_eq!(
            static_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );

        assert_eq!(
            static_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn test_resolver_05_this_and_super_rules() {
        assert_eq!(
            static_errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );

        assert_eq!(
            static_errors("fun f() { super.g(); }"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );

        assert_eq!(
            static_errors("class A { f() { super.f(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn test_resolver_06_self_inheritance() {
        assert_eq!(
            static_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_resolver_07_reports_every_error() {
        let errors = static_errors("return;\nprint this;\n");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at 'return': Can't return from top-level code.",
                "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            ]
        );
    }

    #[test]
    fn test_resolver_08_closure_binds_lexically() {
        let (output, result) = run(
            "var a = \"global\";\n\
             {\n\
               fun show() { print a; }\n\
               show();\n\
               var a = \"block\";\n\
               show();\n\
             }",
        );

        assert!(result.is_ok());
        assert_eq!(output, "global\nglobal\n");
    }
}
