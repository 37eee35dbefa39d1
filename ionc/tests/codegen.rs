use arch::asm::Code;
use ionc::SymbolMap;

fn assert(code: &str) -> Code {
    match ionc::compile("test.ion", code) {
        Ok(asm) => {
            println!("{}", asm);
            asm
        }
        Err(errors) => panic!("Errors found: {:?}", errors),
    }
}

/// The generated text contains `$lines` as one contiguous block
macro_rules! case {
    ($name:ident, $code:expr, $lines:expr) => {
        #[test]
        fn $name() {
            let text = assert($code).to_string();
            assert!(text.contains($lines), "missing:\n{}", $lines);
        }
    };
}

#[test]
fn minimal_program() {
    assert_eq!(
        assert("void main() {}").to_string(),
        "BITS 64
segment .bss
    cbuf: resb 1
segment .text
function_0: ;; main
    ret
global _start
_start:
    call function_0
exit:
    mov rax, 60
    mov rdi, 0
    syscall
"
    );
}

case!(
    globals_in_order,
    "uint64 a; bool b; uint64* c; void main() {}",
    "    cbuf: resb 1
    var_0: resq 1
    var_1: resq 1
    var_2: resq 1
segment .text
"
);

case!(
    entry_after_helpers,
    "void helper() {} void main() { helper(); }",
    "function_0: ;; helper
    ret
function_1: ;; main
    call function_0
    ret
global _start
_start:
    call function_1
"
);

case!(
    putc,
    "void main() { putc(65); }",
    "    mov rax, 65
    mov [cbuf], al
    mov rax, 1
    mov rdi, 1
    mov rsi, cbuf
    mov rdx, 1
    syscall
"
);

case!(
    assign,
    "uint64 a; void main() { a = 7; }",
    "    mov rax, 7
    mov [var_0], rax
"
);

case!(
    assign_add,
    "uint64 a; void main() { a += 7; }",
    "    mov rax, 7
    add [var_0], rax
    mov rax, [var_0]
"
);

case!(
    assign_mul,
    "uint64 a; void main() { a *= 3; }",
    "    mov rax, 3
    imul rax, [var_0]
    mov [var_0], rax
"
);

case!(
    post_increment,
    "uint64 a; void main() { a++; }",
    "    mov rax, [var_0]
    inc qword [var_0]
"
);

case!(
    pre_increment,
    "uint64 a; void main() { ++a; }",
    "    inc qword [var_0]
    mov rax, [var_0]
"
);

case!(
    pre_decrement,
    "uint64 a; void main() { --a; }",
    "    dec qword [var_0]
    mov rax, [var_0]
"
);

case!(
    binary_sub,
    "uint64 a; void main() { a - 2; }",
    "    mov rax, [var_0]
    push rax
    mov rax, 2
    mov rbx, rax
    pop rax
    sub rax, rbx
"
);

case!(
    negate_and_not,
    "uint64 a; void main() { -a; !a; }",
    "    mov rax, [var_0]
    neg rax
    mov rax, [var_0]
    cmp rax, 0
    sete al
    movzx rax, al
"
);

case!(
    if_without_else,
    "uint64 a; void main() { if (a) putc(65); }",
    "    mov rax, [var_0]
    cmp rax, 0
    je if_3_else
    mov rax, 65
    mov [cbuf], al
    mov rax, 1
    mov rdi, 1
    mov rsi, cbuf
    mov rdx, 1
    syscall
    jmp if_3_end
if_3_else:
if_3_end:
"
);

case!(
    while_loop,
    "uint64 i; void main() { while (i < 3) i++; }",
    "while_4_condition:
    mov rax, [var_0]
    push rax
    mov rax, 3
    mov rbx, rax
    pop rax
    cmp rax, rbx
    setb al
    movzx rax, al
    cmp rax, 0
    je while_4_end
    mov rax, [var_0]
    inc qword [var_0]
    jmp while_4_condition
while_4_end:
"
);

case!(
    do_while,
    "uint64 i; void main() { do i++; while (i); }",
    "dowhile_2_start:
    mov rax, [var_0]
    inc qword [var_0]
dowhile_2_condition:
    mov rax, [var_0]
    cmp rax, 0
    jne dowhile_2_start
dowhile_2_end:
"
);

#[test]
fn comparisons() {
    for (op, set) in [
        ("==", "sete"),
        ("!=", "setne"),
        ("<", "setb"),
        (">", "seta"),
        ("<=", "setbe"),
        (">=", "setae"),
    ] {
        let text = assert(&format!("uint64 a; void main() {{ a {} 1; }}", op)).to_string();
        assert!(
            text.contains(&format!("    cmp rax, rbx\n    {} al\n    movzx rax, al\n", set)),
            "{} should use {}",
            op,
            set
        );
    }
}

#[test]
fn switch_layout() {
    let code = assert(
        "uint64 x;
        void main() {
            switch (x) {
                case 1: putc(65);
                case 2: putc(66);
                default: putc(67);
            }
        }",
    );
    let labels: Vec<_> = code
        .labels()
        .filter(|label| label.starts_with("switch_"))
        .collect();
    assert_eq!(
        labels,
        vec![
            "switch_12_case_0",
            "switch_12_case_0_code",
            "switch_12_case_1",
            "switch_12_case_1_code",
            "switch_12_default",
            "switch_12_end",
        ]
    );

    let text = code.to_string();
    let first_case = "switch_12_case_0:
    mov rax, 1
    push rax
    mov rax, [var_0]
    pop rbx
    cmp rax, rbx
    jne switch_12_case_1
switch_12_case_0_code:
";
    assert!(text.contains(first_case));
    // A matched body falls through into the next body
    assert!(text.contains("    jmp switch_12_case_1_code\nswitch_12_case_1:\n"));
    assert!(text.contains("    jne switch_12_default\nswitch_12_case_1_code:\n"));
    assert!(text.contains("    jmp switch_12_default\nswitch_12_default:\n"));
}

#[test]
fn labels_unique() {
    let code = assert(
        "uint64 a;
        void f() { if (a) { if (a) putc(1); else putc(2); } while (a) a--; }
        void main() {
            while (a < 10) { if (a == 1) putc(2); a++; }
            do { switch (a) { case 1: case 2: putc(3); } } while (a);
            f();
        }",
    );
    let mut labels: Vec<_> = code.labels().collect();
    let count = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), count);
}

#[test]
fn deterministic() {
    let source = "uint64 a; uint64 b;
        void f() { a = a + 1; }
        void main() { while (a < 5) { f(); if (a == 3) putc(51); } }";
    let first = assert(source).to_string();
    let second = assert(source).to_string();
    assert_eq!(first, second);
}

#[test]
fn symbol_map() {
    let (program, errors) = ionc::parse(
        "test.ion",
        "uint64 a; bool* b; void helper() {} void main() {}",
    );
    assert!(errors.is_empty());
    let map = SymbolMap::generate(&program.unwrap());

    let functions: Vec<_> = map
        .functions
        .iter()
        .map(|(name, entry)| (name.as_str(), entry.label.as_str()))
        .collect();
    assert_eq!(functions, vec![("helper", "function_0"), ("main", "function_1")]);

    let variables: Vec<_> = map
        .variables
        .iter()
        .map(|(name, entry)| (name.as_str(), entry.label.as_str(), entry.ty.as_str()))
        .collect();
    assert_eq!(variables, vec![("a", "var_0", "uint64"), ("b", "var_1", "bool*")]);

    let yaml = map.to_yaml().unwrap();
    let back: SymbolMap = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, map);
}

#[test]
fn one_label_per_function_and_cell_per_variable() {
    use arch::asm::Line;

    let code = assert(
        "uint64 a; bool b;
        void f() { uint64 c = 1; }
        void g() { f(); }
        void main() { g(); uint64* d; }",
    );
    let functions: Vec<_> = code
        .labels()
        .filter(|label| label.starts_with("function_"))
        .collect();
    assert_eq!(functions, vec!["function_0", "function_1", "function_2"]);

    let cells: Vec<_> = code
        .lines()
        .iter()
        .filter_map(|line| match line {
            Line::Reserve(name, _, _) if name.starts_with("var_") => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(cells, vec!["var_0", "var_1", "var_2", "var_3"]);
}
