//! JSON-style serialization of value graphs.

use super::value::{Data, Variable};

/// Maximum number of array entries serialized before truncating.
const MAX_JSON_ARRAY_ENTRIES: i64 = 10000;

/// Convert a string into a quoted literal suitable for scripts. Bytes
/// outside the printable ASCII range are emitted as `\xHH` escapes.
pub fn get_js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for &byte in text.as_bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x07 => out.push_str("\\a"),
            b'"' => out.push_str("\\\""),
            _ => {
                if byte < 32 || byte > 127 {
                    out.push_str(&format!("\\x{:02X}", byte));
                } else {
                    out.push(byte as char);
                }
            }
        }
    }
    out.push('"');
    out
}

impl Variable {
    /// Render this value as a parsable script fragment: numbers verbatim,
    /// strings quoted, functions with their parameter list and body.
    pub fn get_parsable_string(&self) -> String {
        if self.is_numeric() && !self.is_null() {
            return self.get_string();
        }
        if let Data::Function(func) = &self.data {
            return format!("function ({}) {}", func.params.join(","), func.body);
        }
        if self.is_string() {
            return get_js_string(&self.get_string());
        }
        if self.is_null() {
            return "null".to_string();
        }
        "undefined".to_string()
    }

    /// Append the JSON rendering of this value to `destination`,
    /// indenting nested levels by two spaces per `line_prefix`.
    pub fn get_json(&self, destination: &mut String, line_prefix: &str) {
        if self.is_object() {
            let indented = format!("{}  ", line_prefix);
            destination.push_str("{ \n");
            let children = self.children();
            for (i, link) in children.iter().enumerate() {
                destination.push_str(&indented);
                destination.push_str(&get_js_string(&link.name));
                destination.push_str(" : ");
                link.var.borrow().get_json(destination, &indented);
                if i + 1 < children.len() {
                    destination.push_str(",\n");
                }
            }
            destination.push('\n');
            destination.push_str(line_prefix);
            destination.push('}');
        } else if self.is_array() {
            let indented = format!("{}  ", line_prefix);
            destination.push_str("[\n");
            let len = self.get_array_length().min(MAX_JSON_ARRAY_ENTRIES);
            for i in 0..len {
                self.get_array_index(i).borrow().get_json(destination, &indented);
                if i < len - 1 {
                    destination.push_str(",\n");
                }
            }
            destination.push('\n');
            destination.push_str(line_prefix);
            destination.push(']');
        } else {
            // no children or a function: just write the value directly
            destination.push_str(&self.get_parsable_string());
        }
    }
}
