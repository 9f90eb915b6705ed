use std::rc::Rc;

use ruscript::interpreter::{
    deep_copy, equals, find_child_or_create_by_path, get_js_string, maths_op,
    parse_double_literal, parse_int_literal, Function, FunctionKind, Variable,
};
use ruscript::lexer::TokenKind;
use ruscript::ErrorKind;

#[test]
fn payload_setters_are_exclusive() {
    let v = Variable::int(5);
    assert!(v.borrow().is_int());
    v.borrow_mut().set_string("hello");
    assert!(v.borrow().is_string());
    assert!(!v.borrow().is_int());
    assert!(!v.borrow().is_numeric());
    v.borrow_mut().set_double(1.5);
    assert!(v.borrow().is_double());
    assert!(!v.borrow().is_string());
}

#[test]
fn integer_coercions() {
    assert_eq!(Variable::int(42).borrow().get_string(), "42");
    assert_eq!(Variable::string("0x10").borrow().get_int(), 16);
    assert_eq!(Variable::string("0377").borrow().get_int(), 255);
    assert_eq!(Variable::string("12abc").borrow().get_int(), 12);
    assert_eq!(Variable::double(2.9).borrow().get_int(), 2);
    assert_eq!(Variable::null().borrow().get_int(), 0);
    assert_eq!(Variable::undefined().borrow().get_int(), 0);
}

#[test]
fn string_coercions() {
    assert_eq!(Variable::null().borrow().get_string(), "null");
    assert_eq!(Variable::undefined().borrow().get_string(), "undefined");
    assert_eq!(Variable::double(2.5).borrow().get_string(), "2.500000");
    assert_eq!(Variable::string("3.45e2").borrow().get_double(), 345.0);
}

#[test]
fn literal_parsing() {
    assert_eq!(parse_int_literal("0xFF"), 255);
    assert_eq!(parse_int_literal("0377"), 255);
    assert_eq!(parse_int_literal("-12"), -12);
    assert_eq!(parse_int_literal("9zz"), 9);
    assert_eq!(parse_int_literal("zz"), 0);
    assert_eq!(parse_double_literal("3.45e2"), 345.0);
    assert_eq!(parse_double_literal("2.5"), 2.5);
    assert_eq!(parse_double_literal("junk"), 0.0);
}

#[test]
fn integer_arithmetic() {
    let five = Variable::int(5);
    let three = Variable::int(3);
    let sum = maths_op(&five, &three, TokenKind::Char(b'+')).unwrap();
    assert_eq!(sum.borrow().get_int(), 8);
    let rem = maths_op(&five, &three, TokenKind::Char(b'%')).unwrap();
    assert_eq!(rem.borrow().get_int(), 2);
}

#[test]
fn division_by_zero_is_a_type_error() {
    let err = maths_op(&Variable::int(1), &Variable::int(0), TokenKind::Char(b'/')).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn double_promotion() {
    let result = maths_op(
        &Variable::int(1),
        &Variable::double(2.5),
        TokenKind::Char(b'+'),
    )
    .unwrap();
    assert!(result.borrow().is_double());
    assert_eq!(result.borrow().get_double(), 3.5);
}

#[test]
fn string_concatenation() {
    let result = maths_op(
        &Variable::string("a"),
        &Variable::int(1),
        TokenKind::Char(b'+'),
    )
    .unwrap();
    assert!(result.borrow().is_string());
    assert_eq!(result.borrow().get_string(), "a1");
}

#[test]
fn loose_equality_coerces_strict_does_not() {
    let one_str = Variable::string("1");
    let one = Variable::int(1);
    assert!(equals(&one_str, &one).unwrap());
    let strict = maths_op(&one_str, &one, TokenKind::TypeEqual).unwrap();
    assert!(!strict.borrow().get_bool());
}

#[test]
fn undefined_comparisons() {
    let a = Variable::undefined();
    let b = Variable::undefined();
    assert!(equals(&a, &b).unwrap());
    let sum = maths_op(&a, &b, TokenKind::Char(b'+')).unwrap();
    assert!(sum.borrow().is_undefined());
}

#[test]
fn composite_equality_is_identity() {
    let a = Variable::array();
    let alias = Rc::clone(&a);
    let other = Variable::array();
    assert!(equals(&a, &alias).unwrap());
    assert!(!equals(&a, &other).unwrap());
    let err = maths_op(&a, &other, TokenKind::Char(b'+')).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn array_indexing_and_length() {
    let a = Variable::array();
    a.borrow_mut().set_array_index(0, Variable::int(10));
    a.borrow_mut().set_array_index(5, Variable::int(20));
    assert_eq!(a.borrow().get_array_length(), 6);
    assert_eq!(a.borrow().get_array_index(5).borrow().get_int(), 20);
    // a missing index reads as null, not undefined
    assert!(a.borrow().get_array_index(3).borrow().is_null());
    // storing undefined removes the slot
    a.borrow_mut().set_array_index(5, Variable::undefined());
    assert_eq!(a.borrow().get_array_length(), 1);
}

#[test]
fn adding_a_child_promotes_undefined_to_object() {
    let v = Variable::undefined();
    v.borrow_mut().add_child("x", Variable::int(1));
    assert!(v.borrow().is_object());
}

#[test]
fn add_child_no_dup_replaces() {
    let v = Variable::object();
    v.borrow_mut().add_child_no_dup("k", Variable::int(1));
    v.borrow_mut().add_child_no_dup("k", Variable::int(2));
    assert_eq!(v.borrow().get_children(), 1);
    assert_eq!(v.borrow().find_child_var("k").unwrap().borrow().get_int(), 2);
}

#[test]
fn deep_copy_clones_children_but_shares_prototype() {
    let proto = Variable::object();
    let obj = Variable::object();
    obj.borrow_mut().add_child("prototype", Rc::clone(&proto));
    obj.borrow_mut().add_child("x", Variable::int(1));
    let copy = deep_copy(&obj);
    let copy_proto = copy.borrow().find_child_var("prototype").unwrap();
    assert!(Rc::ptr_eq(&copy_proto, &proto));
    let copy_x = copy.borrow().find_child_var("x").unwrap();
    let orig_x = obj.borrow().find_child_var("x").unwrap();
    assert!(!Rc::ptr_eq(&copy_x, &orig_x));
    assert_eq!(copy_x.borrow().get_int(), 1);
}

#[test]
fn dotted_path_creates_intermediate_objects() {
    let root = Variable::object();
    let leaf = find_child_or_create_by_path(&root, "a.b.c");
    leaf.borrow_mut().set_int(7);
    let a = root.borrow().find_child_var("a").unwrap();
    assert!(a.borrow().is_object());
    let b = a.borrow().find_child_var("b").unwrap();
    assert_eq!(b.borrow().find_child_var("c").unwrap().borrow().get_int(), 7);
}

#[test]
fn js_string_escaping() {
    assert_eq!(get_js_string("a\"b\n"), "\"a\\\"b\\n\"");
    assert_eq!(get_js_string("tab\there"), "\"tab\\x09here\"");
}

#[test]
fn json_object_output() {
    let obj = Variable::object();
    obj.borrow_mut().add_child("a", Variable::int(1));
    let mut out = String::new();
    obj.borrow().get_json(&mut out, "");
    assert_eq!(out, "{ \n  \"a\" : 1\n}");
}

#[test]
fn json_array_output() {
    let arr = Variable::array();
    arr.borrow_mut().set_array_index(0, Variable::int(1));
    arr.borrow_mut().set_array_index(1, Variable::int(2));
    let mut out = String::new();
    arr.borrow().get_json(&mut out, "");
    assert_eq!(out, "[\n1,\n2\n]");
}

#[test]
fn functions_render_as_parsable_source() {
    let f = Variable::function(Function {
        params: vec!["a".to_string(), "b".to_string()],
        body: "{ return 1; }".to_string(),
        kind: FunctionKind::Script,
    });
    assert_eq!(f.borrow().get_parsable_string(), "function (a,b) { return 1; }");
}
