use ruscript::{natives, Interpreter};

fn run(code: &str) -> Interpreter {
    let mut js = Interpreter::new();
    natives::register_functions(&mut js).expect("natives should register");
    js.execute(code).expect("script should execute");
    js
}

fn result_of(code: &str) -> String {
    run(code).get_variable("result").expect("result should be set")
}

#[test]
fn string_substring() {
    assert_eq!(result_of("var s = \"hello world\"; result = s.substring(0, 5);"), "hello");
    assert_eq!(result_of("var s = \"hi\"; result = s.substring(0, 10);"), "");
}

#[test]
fn string_index_of() {
    assert_eq!(result_of("var s = \"hello\"; result = s.indexOf(\"ll\");"), "2");
    assert_eq!(result_of("var s = \"hello\"; result = s.indexOf(\"xyz\");"), "-1");
}

#[test]
fn string_char_functions() {
    assert_eq!(result_of("var s = \"hello\"; result = s.charAt(1);"), "e");
    assert_eq!(result_of("var s = \"hello\"; result = s.charCodeAt(0);"), "104");
    assert_eq!(result_of("result = String.fromCharCode(65);"), "A");
    assert_eq!(result_of("result = charToInt(\"A\");"), "65");
}

#[test]
fn string_split() {
    assert_eq!(
        result_of(
            "var s = \"a,b,c\";\n\
             var parts = s.split(\",\");\n\
             result = parts.length == 3 && parts[0] == \"a\" && parts[2] == \"c\";"
        ),
        "1"
    );
}

#[test]
fn integer_functions() {
    assert_eq!(result_of("result = Integer.parseInt(\"0x2A\");"), "42");
    assert_eq!(result_of("result = Integer.valueOf(\"A\");"), "65");
}

#[test]
fn math_rand_stays_in_range() {
    assert_eq!(result_of("var r = Math.rand(); result = r >= 0 && r < 1;"), "1");
    assert_eq!(
        result_of("var r = Math.randInt(1, 6); result = r >= 1 && r <= 6;"),
        "1"
    );
}

#[test]
fn array_contains() {
    assert_eq!(result_of("var a = [1, 2, 3]; result = a.contains(2);"), "1");
    assert_eq!(result_of("var a = [1, 2, 3]; result = a.contains(9);"), "0");
}

#[test]
fn array_remove_renumbers() {
    assert_eq!(
        result_of(
            "var a = [1, 2, 3];\n\
             a.remove(2);\n\
             result = a.length == 2 && a[0] == 1 && a[1] == 3;"
        ),
        "1"
    );
}

#[test]
fn array_join() {
    assert_eq!(result_of("var a = [1, 2, 3]; result = a.join(\"-\");"), "1-2-3");
}

#[test]
fn json_stringify() {
    assert_eq!(
        result_of("var obj = { a: 1 }; result = JSON.stringify(obj);"),
        "{ \n  \"a\" : 1\n}"
    );
    assert_eq!(
        result_of("var arr = [1, 2]; result = JSON.stringify(arr);"),
        "[\n1,\n2\n]"
    );
}

#[test]
fn eval_reenters_the_interpreter() {
    assert_eq!(result_of("result = eval(\"2 + 3\");"), "5");
}

#[test]
fn exec_runs_in_the_root_scope() {
    assert_eq!(result_of("exec(\"x = 10;\"); result = x;"), "10");
}

#[test]
fn object_clone_is_a_copy() {
    assert_eq!(
        result_of(
            "var a = { v: 1 };\n\
             var b = a.clone();\n\
             b.v = 2;\n\
             result = a.v == 1 && b.v == 2;"
        ),
        "1"
    );
}
