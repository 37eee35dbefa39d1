use ionc::Error;

fn collect(code: &str) -> (bool, Vec<Error>) {
    let (program, errors) = ionc::parse("test.ion", code);
    println!(" {code}");
    for error in &errors {
        println!("  {}", error);
    }
    (program.is_some(), errors)
}

/// Recoverable: the program is still produced and the error is collected
macro_rules! recover {
    ($name:ident, $code:expr, $pat:pat $(if $guard:expr)?) => {
        #[test]
        fn $name() {
            let (parsed, errors) = collect($code);
            assert!(parsed, "parsing stopped");
            assert!(
                errors.iter().any(|e| matches!(e, $pat $(if $guard)?)),
                "Expected {} in {:?}",
                stringify!($pat),
                errors
            );
            assert!(errors.iter().all(|e| !e.is_fatal()));
        }
    };
}

/// Fatal: parsing stops, the last error is the fatal one
macro_rules! fatal {
    ($name:ident, $code:expr, $pat:pat) => {
        #[test]
        fn $name() {
            let (parsed, errors) = collect($code);
            assert!(!parsed, "parsing did not stop");
            let last = errors.last().expect("no errors");
            assert!(
                matches!(last, $pat),
                "Expected {} but got {:?}",
                stringify!($pat),
                last
            );
            assert!(last.is_fatal());
        }
    };
}

// Lexer
recover!(unexpected_character, "void main() { @ }", Error::UnexpectedCharacter('@', _));
recover!(multiple_dots, "void main() { 1.2.3; }", Error::MultipleDotsInNumber(_));

// Symbols
recover!(unknown_variable, "void main() { x = 1; }", Error::UnknownVariable(name, _) if name == "x");
recover!(unknown_variable_access, "void main() { putc(x); }", Error::UnknownVariable(..));
recover!(unknown_variable_increment, "void main() { ++x; }", Error::UnknownVariable(..));
recover!(unknown_function, "void main() { f(); }", Error::UnknownFunction(name, _) if name == "f");
recover!(variable_redeclaration, "uint64 a; uint64 a;", Error::VariableRedeclaration(..));
recover!(local_redeclaration, "uint64 a; void main() { uint64 a = 1; }", Error::VariableRedeclaration(..));
recover!(function_redeclaration, "void f() {} void f() {}", Error::FunctionRedeclaration(..));
recover!(variable_named_like_function, "void f() {} uint64 f;", Error::VariableRedeclaration(..));
recover!(function_named_like_variable, "uint64 f; void f() {}", Error::FunctionRedeclaration(..));
recover!(variable_as_function, "uint64 f; void main() { f(); }", Error::UnknownFunction(..));
recover!(function_as_variable, "void f() {} void main() { f = 1; }", Error::UnknownVariable(..));
recover!(duplicate_field, "struct S { uint64 a; uint64 a; }", Error::VariableRedeclaration(..));

// Types
recover!(unknown_type, "foo x;", Error::UnknownDataType(name, _) if name == "foo");
recover!(void_variable, "void x;", Error::DataTypeNotValidInContext(..));
recover!(void_local, "void main() { void x = 1; }", Error::DataTypeNotValidInContext(..));
recover!(type_as_value, "void main() { putc(uint64); }", Error::DataTypeNotValidInContext(..));
recover!(type_as_name, "uint64 bool;", Error::DataTypeNotValidInContext(..));

// Punctuation
recover!(missing_semicolon, "void main() { putc(1) }", Error::ExpectedDifferentToken(..));
recover!(missing_paren, "void main() { putc(1; }", Error::ExpectedDifferentToken(..));
recover!(missing_curly, "void main() { putc(65);", Error::MissingCharacter('}', _));
recover!(missing_while, "uint64 a; void main() { do { a++; } until (a); }", Error::ExpectedDifferentValue(..));
recover!(case_after_default, "void main() { switch (1) { default: case 1: } }", Error::ExpectedDifferentValue(..));
recover!(stray_in_switch, "void main() { switch (1) { 5 } }", Error::ExpectedDifferentValue(..));

// Fatal
fatal!(division, "void main() { putc(4 / 2); }", Error::NotImplemented(..));
fatal!(division_assign, "uint64 a; void main() { a /= 2; }", Error::NotImplemented(..));
fatal!(global_initializer, "uint64 x = 1;", Error::UnexpectedToken(..));
fatal!(top_level_expression, "42;", Error::UnexpectedToken(..));
fatal!(missing_expression, "void main() { putc(); }", Error::UnexpectedToken(..));
fatal!(missing_type, "struct S { 1; }", Error::UnexpectedToken(..));

#[test]
fn errors_are_collected() {
    let (parsed, errors) = collect("void main() { x = 1; y = 2; z(); }");
    assert!(parsed);
    assert_eq!(errors.len(), 3);
    assert!(matches!(
        errors.as_slice(),
        [
            Error::UnknownVariable(x, _),
            Error::UnknownVariable(y, _),
            Error::UnknownFunction(z, _),
        ] if x == "x" && y == "y" && z == "z"
    ));
}

#[test]
fn errors_before_fatal_are_kept() {
    let (parsed, errors) = collect("void main() { x = 1; putc(1 / 2); }");
    assert!(!parsed);
    assert!(matches!(
        errors.as_slice(),
        [Error::UnknownVariable(..), Error::NotImplemented(..)]
    ));
}

#[test]
fn error_position() {
    let (_, errors) = collect("void main() {\n    x = 1;\n}");
    let pos = errors[0].position().expect("no position");
    assert_eq!((pos.file.as_str(), pos.line, pos.col), ("test.ion", 2, 5));
}

fn compile_errors(code: &str) -> Vec<Error> {
    match ionc::compile("test.ion", code) {
        Ok(code) => panic!("compiled:\n{}", code),
        Err(errors) => errors,
    }
}

#[test]
fn missing_entry_point() {
    let errors = compile_errors("void f() {}");
    assert!(matches!(errors.as_slice(), [Error::MissingEntryPoint]));
}

#[test]
fn float_unsupported() {
    let errors = compile_errors("void main() { putc(1.5); }");
    assert!(matches!(errors.as_slice(), [Error::Unsupported(_)]));
}

#[test]
fn compile_reports_parse_errors() {
    let errors = compile_errors("void main() { x = 1; }");
    assert!(matches!(errors.as_slice(), [Error::UnknownVariable(..)]));
}
