use ruscript::Interpreter;

fn result_of(code: &str) -> String {
    let mut js = Interpreter::new();
    js.execute(code).expect("script should execute");
    js.get_variable("result").expect("result should be set")
}

#[test]
fn for_loop_accumulates() {
    assert_eq!(
        result_of("var a = 0; for (var i = 1; i < 10; i++) a = a + i; result = a == 45;"),
        "1"
    );
}

#[test]
fn function_calls() {
    assert_eq!(
        result_of("function add(x, y) { return x + y; } result = add(3, 6) == 9;"),
        "1"
    );
}

#[test]
fn method_calls() {
    assert_eq!(
        result_of(
            "var bob = { add: function(x, y) { return x + y; } };\n\
             result = bob.add(3, 6) == 9;"
        ),
        "1"
    );
}

#[test]
fn number_literal_forms() {
    assert_eq!(
        result_of(
            "a = 345;\n\
             b = 34.5;\n\
             c = 3.45e2;\n\
             d = 0377;\n\
             e = 0xFF;\n\
             result = a == 345 && b * 10 == 345 && c == 345 && d == 255 && e == 255;"
        ),
        "1"
    );
}

#[test]
fn arrays_alias_by_reference() {
    assert_eq!(
        result_of(
            "var a;\n\
             a[0] = 10;\n\
             a[1] = 22;\n\
             b = a;\n\
             b[0] = 5;\n\
             result = a[0] == 5 && a[1] == 22 && b[1] == 22;"
        ),
        "1"
    );
}

#[test]
fn call_convention_by_value_and_by_reference() {
    assert_eq!(
        result_of(
            "var a = 42;\n\
             var b;\n\
             b[0] = 43;\n\
             function foo(m) { m[0]++; }\n\
             function bar(v) { v++; }\n\
             foo(b);\n\
             bar(a);\n\
             result = a == 42 && b[0] == 44;"
        ),
        "1"
    );
}

#[test]
fn recursion() {
    assert_eq!(
        result_of(
            "function fib(n) {\n\
                 if (n < 2) return n;\n\
                 return fib(n - 1) + fib(n - 2);\n\
             }\n\
             result = fib(10);"
        ),
        "55"
    );
}

#[test]
fn string_building() {
    assert_eq!(
        result_of("var out = \"\"; for (var i = 0; i < 3; i++) out += i; result = out;"),
        "012"
    );
}

#[test]
fn objects_chain_through_references() {
    assert_eq!(
        result_of(
            "var list = {};\n\
             var node = list;\n\
             for (var i = 0; i < 3; i++) {\n\
                 node.next = { v: i };\n\
                 node = node.next;\n\
             }\n\
             result = list.next.v + list.next.next.v + list.next.next.next.v;"
        ),
        "3"
    );
}
