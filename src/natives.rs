//! The standard library of host-implemented functions.
//!
//! None of these are required by the core engine; embedders pick them up
//! with [`register_functions`] or register their own callbacks directly
//! through [`Interpreter::add_native`].

use rand::Rng;

use crate::error::ScriptResult;
use crate::interpreter::{self, Interpreter, VarRef, Variable};

/// Register the standard native functions on an interpreter.
pub fn register_functions(js: &mut Interpreter) -> ScriptResult<()> {
    js.add_native("function exec(jsCode)", native_exec)?;
    js.add_native("function eval(jsCode)", native_eval)?;
    js.add_native("function trace()", |js, _frame| {
        js.trace();
        Ok(())
    })?;
    js.add_native("function Object.dump()", native_object_dump)?;
    js.add_native("function Object.clone()", native_object_clone)?;
    js.add_native("function Math.rand()", native_math_rand)?;
    js.add_native("function Math.randInt(min, max)", native_math_rand_int)?;
    js.add_native("function charToInt(ch)", native_char_to_int)?;
    js.add_native("function String.indexOf(search)", native_string_index_of)?;
    js.add_native("function String.substring(lo, hi)", native_string_substring)?;
    js.add_native("function String.charAt(pos)", native_string_char_at)?;
    js.add_native("function String.charCodeAt(pos)", native_string_char_code_at)?;
    js.add_native("function String.fromCharCode(char)", native_string_from_char_code)?;
    js.add_native("function String.split(separator)", native_string_split)?;
    js.add_native("function Integer.parseInt(str)", native_integer_parse_int)?;
    js.add_native("function Integer.valueOf(str)", native_integer_value_of)?;
    js.add_native("function JSON.stringify(obj, replacer)", native_json_stringify)?;
    js.add_native("function Array.contains(obj)", native_array_contains)?;
    js.add_native("function Array.remove(obj)", native_array_remove)?;
    js.add_native("function Array.join(separator)", native_array_join)?;
    Ok(())
}

fn native_exec(js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let code = frame.borrow_mut().get_parameter("jsCode").borrow().get_string();
    js.execute(&code)
}

fn native_eval(js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let code = frame.borrow_mut().get_parameter("jsCode").borrow().get_string();
    let result = js.evaluate_complex(&code)?;
    frame.borrow_mut().set_return_var(result.var);
    Ok(())
}

fn native_object_dump(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let this = frame.borrow_mut().get_parameter("this");
    interpreter::trace(&this, "> ", "");
    Ok(())
}

fn native_object_clone(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let this = frame.borrow_mut().get_parameter("this");
    let result = frame.borrow_mut().get_return_var();
    interpreter::copy_value(&result, &this);
    Ok(())
}

fn native_math_rand(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    frame
        .borrow_mut()
        .get_return_var()
        .borrow_mut()
        .set_double(rand::thread_rng().gen::<f64>());
    Ok(())
}

fn native_math_rand_int(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let min = frame.borrow_mut().get_parameter("min").borrow().get_int();
    let max = frame.borrow_mut().get_parameter("max").borrow().get_int();
    let value = if max >= min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    frame.borrow_mut().get_return_var().borrow_mut().set_int(value);
    Ok(())
}

fn native_char_to_int(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("ch").borrow().get_string();
    let value = text.as_bytes().first().copied().unwrap_or(0) as i64;
    frame.borrow_mut().get_return_var().borrow_mut().set_int(value);
    Ok(())
}

fn native_string_index_of(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("this").borrow().get_string();
    let search = frame.borrow_mut().get_parameter("search").borrow().get_string();
    let value = match text.find(&search) {
        Some(pos) => pos as i64,
        None => -1,
    };
    frame.borrow_mut().get_return_var().borrow_mut().set_int(value);
    Ok(())
}

fn native_string_substring(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("this").borrow().get_string();
    let lo = frame.borrow_mut().get_parameter("lo").borrow().get_int();
    let hi = frame.borrow_mut().get_parameter("hi").borrow().get_int();
    let len = hi - lo;
    let result = if len > 0 && lo >= 0 && (lo + len) as usize <= text.len() {
        let bytes = &text.as_bytes()[lo as usize..(lo + len) as usize];
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        String::new()
    };
    frame.borrow_mut().get_return_var().borrow_mut().set_string(result);
    Ok(())
}

fn native_string_char_at(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("this").borrow().get_string();
    let pos = frame.borrow_mut().get_parameter("pos").borrow().get_int();
    let result = if pos >= 0 && (pos as usize) < text.len() {
        String::from_utf8_lossy(&text.as_bytes()[pos as usize..pos as usize + 1]).into_owned()
    } else {
        String::new()
    };
    frame.borrow_mut().get_return_var().borrow_mut().set_string(result);
    Ok(())
}

fn native_string_char_code_at(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("this").borrow().get_string();
    let pos = frame.borrow_mut().get_parameter("pos").borrow().get_int();
    let value = if pos >= 0 && (pos as usize) < text.len() {
        text.as_bytes()[pos as usize] as i64
    } else {
        0
    };
    frame.borrow_mut().get_return_var().borrow_mut().set_int(value);
    Ok(())
}

fn native_string_from_char_code(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let code = frame.borrow_mut().get_parameter("char").borrow().get_int();
    let result = String::from_utf8_lossy(&[code as u8]).into_owned();
    frame.borrow_mut().get_return_var().borrow_mut().set_string(result);
    Ok(())
}

fn native_string_split(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let mut text = frame.borrow_mut().get_parameter("this").borrow().get_string();
    let separator = frame.borrow_mut().get_parameter("separator").borrow().get_string();
    let result = frame.borrow_mut().get_return_var();
    result.borrow_mut().set_array();
    let mut length = 0;
    if !separator.is_empty() {
        while let Some(pos) = text.find(&separator) {
            result
                .borrow_mut()
                .set_array_index(length, Variable::string(&text[..pos]));
            text = text[pos + separator.len()..].to_string();
            length += 1;
        }
    }
    if !text.is_empty() {
        result.borrow_mut().set_array_index(length, Variable::string(text));
    }
    Ok(())
}

fn native_integer_parse_int(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("str").borrow().get_string();
    let value = interpreter::parse_int_literal(&text);
    frame.borrow_mut().get_return_var().borrow_mut().set_int(value);
    Ok(())
}

fn native_integer_value_of(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let text = frame.borrow_mut().get_parameter("str").borrow().get_string();
    let value = if text.len() == 1 {
        text.as_bytes()[0] as i64
    } else {
        0
    };
    frame.borrow_mut().get_return_var().borrow_mut().set_int(value);
    Ok(())
}

fn native_json_stringify(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let obj = frame.borrow_mut().get_parameter("obj");
    let mut result = String::new();
    obj.borrow().get_json(&mut result, "");
    frame.borrow_mut().get_return_var().borrow_mut().set_string(result);
    Ok(())
}

fn native_array_contains(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let obj = frame.borrow_mut().get_parameter("obj");
    let this = frame.borrow_mut().get_parameter("this");
    let mut contains = false;
    let links: Vec<VarRef> = this
        .borrow()
        .children()
        .iter()
        .map(|link| link.var.clone())
        .collect();
    for var in links {
        if interpreter::equals(&var, &obj)? {
            contains = true;
            break;
        }
    }
    frame.borrow_mut().get_return_var().borrow_mut().set_int(contains as i64);
    Ok(())
}

fn native_array_remove(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let obj = frame.borrow_mut().get_parameter("obj");
    let this = frame.borrow_mut().get_parameter("this");
    // find the indices to drop
    let mut removed: Vec<i64> = Vec::new();
    let links: Vec<(i64, VarRef)> = this
        .borrow()
        .children()
        .iter()
        .map(|link| (link.int_name(), link.var.clone()))
        .collect();
    for (idx, var) in &links {
        if interpreter::equals(var, &obj)? {
            removed.push(*idx);
        }
    }
    // drop them and renumber everything above
    let mut this_mut = this.borrow_mut();
    let children = this_mut.children_mut();
    children.retain(|link| !removed.contains(&link.int_name()));
    for link in children.iter_mut() {
        let n = interpreter::parse_int_literal(&link.name);
        let shift = removed.iter().filter(|r| **r < n).count() as i64;
        if shift > 0 {
            link.name = (n - shift).to_string();
        }
    }
    Ok(())
}

fn native_array_join(_js: &mut Interpreter, frame: &VarRef) -> ScriptResult<()> {
    let separator = frame.borrow_mut().get_parameter("separator").borrow().get_string();
    let this = frame.borrow_mut().get_parameter("this");
    let mut out = String::new();
    let len = this.borrow().get_array_length();
    for i in 0..len {
        if i > 0 {
            out.push_str(&separator);
        }
        out.push_str(&this.borrow().get_array_index(i).borrow().get_string());
    }
    frame.borrow_mut().get_return_var().borrow_mut().set_string(out);
    Ok(())
}
