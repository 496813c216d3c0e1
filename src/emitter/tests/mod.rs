//! emitter module tests

use super::*;
use crate::diagnostics::Diagnostics;

fn translate_mode(source: &str, mode: CompileMode) -> Result<CompileOutput, Diagnostics> {
    let mut codegen = Codegen::new(mode);
    for (i, line) in source.lines().enumerate() {
        codegen.consume_line(i + 1, line);
    }
    codegen.finish()
}

fn translate(source: &str) -> CompileOutput {
    translate_mode(source, CompileMode::Optimized).expect("translation failed")
}

fn translate_err(source: &str, mode: CompileMode) -> Diagnostics {
    match translate_mode(source, mode) {
        Ok(_) => panic!("expected translation to fail"),
        Err(diags) => diags,
    }
}

/// Net `{`/`}` depth of the code, ignoring braces inside string literals.
fn brace_balance(code: &str) -> i64 {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut escaped = false;
    for c in code.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

// --- declarations ---

#[test]
fn test_var_decl_with_init() {
    let out = translate("int x = 3");
    assert!(out.code.contains("    int x = 3;\n"));
}

#[test]
fn test_var_decl_defaults() {
    let out = translate("int n\nstring s\nlist xs\ndict d\ntuple t\nbool b\nfloat f");
    assert!(out.code.contains("    int n = 0;\n"));
    assert!(out.code.contains("    char* s = NULL;\n"));
    assert!(out.code.contains("    List xs = new_list();\n"));
    assert!(out.code.contains("    Dict d = new_dict();\n"));
    assert!(out.code.contains("    Tuple t = new_tuple();\n"));
    // bool and float stay uninitialized
    assert!(out.code.contains("    bool b;\n"));
    assert!(out.code.contains("    float f;\n"));
}

#[test]
fn test_const_decl() {
    let out = translate("const float pi = 3.14");
    assert!(out.code.contains("    const float pi = 3.14;\n"));
}

#[test]
fn test_const_reinit_is_an_error() {
    let diags = translate_err("const int k = 1\nint k = 2", CompileMode::Optimized);
    assert!(diags.to_text().contains("cannot reinitialize constant 'k'"));
}

#[test]
fn test_unknown_type_in_const_decl() {
    let diags = translate_err("const word w = 1", CompileMode::Optimized);
    assert!(diags.to_text().contains("unknown type in declaration"));
}

// --- print ---

#[test]
fn test_print_string_literal() {
    let out = translate("print(\"yes\")");
    assert!(out.code.contains("    printf(\"%s\\n\", \"yes\");\n"));
}

#[test]
fn test_print_string_variable() {
    let out = translate("string s = \"hi\"\nprint(s)");
    assert!(out.code.contains("    printf(\"%s\\n\", s);\n"));
}

#[test]
fn test_print_bool_uses_ternary() {
    let out = translate("bool flag = true\nprint(flag)");
    assert!(out
        .code
        .contains("    printf(\"%s\\n\", (flag) ? \"true\" : \"false\");\n"));
}

#[test]
fn test_print_float() {
    let out = translate("float r = 1.5\nprint(r)");
    assert!(out.code.contains("    printf(\"%f\\n\", r);\n"));
}

#[test]
fn test_print_defaults_to_int_cast() {
    let out = translate("int x = 3\nint y = 4\nprint(x + y)");
    assert!(out.code.contains("    printf(\"%d\\n\", (int)(x + y));\n"));
}

#[test]
fn test_print_list_and_tuple_helpers() {
    let out = translate("list xs\nprint(xs)\ntuple t\nprint(t)");
    assert!(out.code.contains("    print_list(&xs);\n"));
    assert!(out.code.contains("    print_tuple(&t);\n"));
}

#[test]
fn test_print_list_index_is_rewritten() {
    let out = translate("list xs\nappend(xs, 10)\nappend(xs, 20)\nprint(xs[1])");
    assert!(out.code.contains("    list_append(&xs, 10);\n"));
    assert!(out.code.contains("    printf(\"%d\\n\", (int)(xs.data[1]));\n"));
}

// --- blocks ---

#[test]
fn test_if_else_chain() {
    let out = translate("int x = 1\nif x > 0:\n    print(\"yes\")\nelse:\n    print(\"no\")\nprint(\"done\")");
    assert!(out.code.contains("    if (x > 0) {\n"));
    assert!(out.code.contains("    } else {\n"));
    // `done` lands after the chain is closed.
    let closed = out.code.find("    }\n").expect("chain closed");
    let done = out.code.find("\"done\"").expect("done printed");
    assert!(closed < done);
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_elif_chain() {
    let out = translate("int x = 1\nif x > 1:\n    print(1)\nelif x > 0:\n    print(2)\nelse:\n    print(3)");
    assert!(out.code.contains("    } else if (x > 0) {\n"));
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_elif_without_if_is_an_error() {
    let diags = translate_err("elif x > 0:\n    print(1)", CompileMode::Optimized);
    assert!(diags.to_text().contains("'elif' without a matching 'if'"));
}

#[test]
fn test_else_without_if_is_an_error() {
    let diags = translate_err("else:\n    print(1)", CompileMode::Optimized);
    assert!(diags.to_text().contains("'else' without a matching 'if'"));
}

#[test]
fn test_if_empty_condition_substitutes_true() {
    let diags = translate_err("if:\n    print(1)", CompileMode::Optimized);
    assert!(diags.to_text().contains("'if' with no condition"));
}

#[test]
fn test_while_block() {
    let out = translate("int n = 0\nwhile n < 3:\n    n = n + 1");
    assert!(out.code.contains("    while (n < 3) {\n"));
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_for_to() {
    let out = translate("for i = 0 to 10:\n    print(i)");
    assert!(out
        .code
        .contains("    for (int i = 0; i <= 10; i++) {\n"));
}

#[test]
fn test_for_to_with_step() {
    let out = translate("for i = 0 to(2) 10:\n    print(i)");
    assert!(out
        .code
        .contains("    for (int i = 0; i <= 10; i += 2) {\n"));
}

#[test]
fn test_for_to_missing_bound_is_recovered() {
    let diags = translate_err("for i = 0:\n    print(i)", CompileMode::Optimized);
    assert!(diags.to_text().contains("for loop missing 'to' bound"));
}

#[test]
fn test_for_in_list_closes_with_one_brace() {
    let out = translate("list xs\nfor v in xs:\n    print(v)\nprint(0)");
    assert!(out.code.contains(
        "    for (int v_idx = 0; v_idx < xs.size; v_idx++) { int v = xs.data[v_idx];\n"
    ));
    // One closing brace before the trailing print, not two.
    assert!(out.code.contains("(int)(v));\n    }\n"));
    assert!(!out.code.contains("(int)(v));\n    }\n    }\n"));
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_for_in_string_closes_with_two_braces() {
    let out = translate("string s = \"abc\"\nfor c in s:\n    print(c)\nprint(0)");
    assert!(out.code.contains(
        "    { char* c_it = s; for (int c_idx = 0; c_it[c_idx]; c_idx++) { char c = c_it[c_idx];\n"
    ));
    assert!(out.code.contains("(int)(c));\n    }\n    }\n"));
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_for_in_dict_iterates_keys() {
    let out = translate("dict d\nfor k in d:\n    print(k)");
    assert!(out.code.contains(
        "    for (int k_idx = 0; k_idx < d.size; k_idx++) { char* k = d.keys[k_idx];\n"
    ));
    // Induction variable is a string, so print selects %s.
    assert!(out.code.contains("    printf(\"%s\\n\", k);\n"));
}

#[test]
fn test_for_in_unknown_gets_null_guard() {
    let out = translate("for c in mystery:\n    print(c)");
    assert!(out
        .code
        .contains("for (int c_idx = 0; c_it && c_it[c_idx]; c_idx++)"));
    assert_eq!(brace_balance(&out.code), 0);
}

// --- functions ---

#[test]
fn test_function_prototype_body_and_call() {
    let out = translate("func greet:\n    print(\"hi\")\ngreet()");
    assert!(out.code.contains("void greet(void);\n"));
    assert!(out.code.contains("void greet(void) {\n    printf(\"%s\\n\", \"hi\");\n}\n"));
    assert!(out.code.contains("int main(void) {\n    greet();\n"));
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_func_main_is_skipped_with_warning() {
    let out = translate("func main:\nint x = 1");
    assert_eq!(out.diagnostics.warning_count(), 1);
    assert!(out
        .diagnostics
        .to_text()
        .contains("'func main' ignored"));
    // The declaration still lands in the synthesized main.
    assert!(out.code.contains("int main(void) {\n    int x = 1;\n"));
}

#[test]
fn test_duplicate_function_is_an_error() {
    let diags = translate_err(
        "func f:\n    print(1)\nfunc f:\n    print(2)",
        CompileMode::Optimized,
    );
    assert!(diags.to_text().contains("duplicate function 'f'"));
}

#[test]
fn test_nested_function_is_an_error() {
    let diags = translate_err(
        "func outer:\n    func inner:\n        print(1)",
        CompileMode::Raw,
    );
    assert!(diags
        .to_text()
        .contains("nested function definitions are not supported"));
}

// --- runtime calls ---

#[test]
fn test_append_on_non_list_is_an_error() {
    let diags = translate_err("int n = 0\nappend(n, 1)", CompileMode::Optimized);
    assert!(diags.to_text().contains("'append' target 'n' is int, not list"));
}

#[test]
fn test_dset_and_dget_take_address_of_target() {
    let out = translate("dict d\ndset(d, \"k\", 1)\ndget(d, \"k\")");
    assert!(out.code.contains("    dset(&d, \"k\", 1);\n"));
    assert!(out.code.contains("    dget(&d, \"k\");\n"));
}

#[test]
fn test_append_too_few_args() {
    let diags = translate_err("list xs\nappend(xs)", CompileMode::Optimized);
    assert!(diags.to_text().contains("'append' expects at least 2 argument(s)"));
}

// --- raw statements ---

#[test]
fn test_raw_gets_single_semicolon() {
    let out = translate("int x = 0\nx += 1\nx -= 1;");
    assert!(out.code.contains("    x += 1;\n"));
    assert!(out.code.contains("    x -= 1;\n"));
    assert!(!out.code.contains(";;"));
}

#[test]
fn test_raw_list_index_rewrite() {
    let out = translate("list xs\nint x = 0\nx = xs[0] + xs[1]");
    assert!(out.code.contains("    x = xs.data[0] + xs.data[1];\n"));
}

#[test]
fn test_time_builtins_are_substituted() {
    let out = translate("int t = time.now()\nfloat e = clock.now()");
    assert!(out.code.contains("    int t = (int)time(NULL);\n"));
    assert!(out
        .code
        .contains("    float e = ((double)clock() / CLOCKS_PER_SEC);\n"));
}

// --- closing disciplines ---

#[test]
fn test_brace_block_closed_by_brace() {
    let out = translate("int n = 0\nwhile n < 3 {\n    n = n + 1\n}");
    assert!(out.code.contains("    while (n < 3) {\n"));
    assert_eq!(out.diagnostics.warning_count(), 0);
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_end_closing_brace_block_warns() {
    let out = translate("int n = 0\nif n > 0 {\n    print(1)\nend");
    assert_eq!(out.diagnostics.warning_count(), 1);
    assert!(out
        .diagnostics
        .to_text()
        .contains("'end' closes a block opened with '{' (line 2)"));
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_brace_closing_indent_block_warns() {
    let out = translate("int n = 0\nif n > 0:\n    print(1)\n}");
    assert_eq!(out.diagnostics.warning_count(), 1);
    assert!(out
        .diagnostics
        .to_text()
        .contains("'}' closes a block not opened with '{' (line 2)"));
}

#[test]
fn test_stray_close_brace_is_an_error() {
    let diags = translate_err("int n = 0\n}", CompileMode::Optimized);
    assert!(diags.to_text().contains("stray '}' with no open block"));
}

#[test]
fn test_end_without_block_is_an_error() {
    let diags = translate_err("end", CompileMode::Optimized);
    assert!(diags.to_text().contains("'end' with no open block"));
}

#[test]
fn test_end_is_honored_in_optimized_mode() {
    let out = translate("if 1:\n    print(1)\nend\nprint(2)");
    assert_eq!(out.diagnostics.warning_count(), 0);
    assert_eq!(brace_balance(&out.code), 0);
}

// --- raw mode ---

#[test]
fn test_raw_mode_requires_end() {
    let diags = translate_err("if x > 0:\n    print(\"hi\")", CompileMode::Raw);
    let text = diags.to_text();
    assert!(text.contains("line 1: unclosed 'if' block ('end' expected)"));
}

#[test]
fn test_raw_mode_with_end_succeeds() {
    let out = translate_mode("int x = 1\nif x > 0:\n    print(\"hi\")\nend", CompileMode::Raw)
        .expect("end closes the block");
    assert_eq!(brace_balance(&out.code), 0);
}

#[test]
fn test_unclosed_brace_block_fails_even_with_auto_close() {
    let diags = translate_err("int n = 0\nwhile n < 3 {\n    n = n + 1", CompileMode::Optimized);
    assert!(diags.to_text().contains("line 2: unclosed 'while' block ('}' expected)"));
}

// --- assembly ---

#[test]
fn test_assembly_order() {
    let out = translate("func greet:\n    print(\"hi\")\ngreet()");
    let runtime = out.code.find("List new_list(void)").expect("runtime first");
    let proto = out.code.find("void greet(void);").expect("prototype");
    let body = out.code.find("void greet(void) {").expect("body");
    let main = out.code.find("int main(void) {").expect("main last");
    assert!(runtime < proto && proto < body && body < main);
    assert!(out.code.ends_with("    return 0;\n}\n"));
}

#[test]
fn test_runtime_blob_is_balanced() {
    assert_eq!(brace_balance(RUNTIME), 0);
}

#[test]
fn test_empty_input_still_assembles() {
    let out = translate("");
    assert!(out.code.contains("int main(void) {\n    return 0;\n}\n"));
}
