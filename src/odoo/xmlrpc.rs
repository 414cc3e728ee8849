//! XML-RPC codec
//!
//! Odoo's external API speaks XML-RPC. Values travel through the rest of the
//! crate as `serde_json::Value`, so this module only translates between the
//! two representations:
//!
//! | XML-RPC                          | JSON                    |
//! |----------------------------------|-------------------------|
//! | `nil`                            | `null`                  |
//! | `boolean`                        | bool                    |
//! | `int`, `i4`, `i8`                | integer                 |
//! | `double`                         | float                   |
//! | `string`, untyped `<value>`      | string                  |
//! | `dateTime.iso8601`, `base64`     | string (raw text)       |
//! | `array`                          | array                   |
//! | `struct`                         | object                  |

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

use super::error::OdooError;

// ============================================================================
// Encoding
// ============================================================================

/// Encode a `<methodCall>` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName>");
    write_params(&mut out, params);
    out.push_str("</methodCall>");
    out
}

/// Encode a successful `<methodResponse>` carrying a single value.
pub fn encode_response(value: &Value) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodResponse>");
    write_params(&mut out, std::slice::from_ref(value));
    out.push_str("</methodResponse>");
    out
}

/// Encode a `<fault>` response.
pub fn encode_fault(code: i64, message: &str) -> String {
    let mut fault = Map::new();
    fault.insert("faultCode".to_string(), Value::from(code));
    fault.insert("faultString".to_string(), Value::from(message));

    let mut out = String::from("<?xml version=\"1.0\"?><methodResponse><fault>");
    write_value(&mut out, &Value::Object(fault));
    out.push_str("</fault></methodResponse>");
    out
}

fn write_params(out: &mut String, params: &[Value]) {
    out.push_str("<params>");
    for param in params {
        out.push_str("<param>");
        write_value(out, param);
        out.push_str("</param>");
    }
    out.push_str("</params>");
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            });
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => out.push_str(&format!("<int>{}</int>", i)),
            Some(i) => out.push_str(&format!("<i8>{}</i8>", i)),
            None => {
                let f = n.as_f64().unwrap_or_default();
                out.push_str(&format!("<double>{:?}</double>", f));
            }
        },
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Object(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a `<methodResponse>`. Faults are returned as [`OdooError::Fault`].
pub fn decode_response(xml: &str) -> Result<Value, OdooError> {
    let root = parse_document(xml)?;
    if root.name != "methodResponse" {
        return Err(invalid(format!("unexpected root element <{}>", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| invalid("fault without value"))
            .and_then(decode_value)?;
        let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(OdooError::Fault { code, message });
    }

    let mut params = decode_params(&root)?;
    if params.is_empty() {
        return Err(invalid("response without params"));
    }
    Ok(params.swap_remove(0))
}

/// Decode a `<methodCall>` into its method name and positional params.
pub fn decode_call(xml: &str) -> Result<(String, Vec<Value>), OdooError> {
    let root = parse_document(xml)?;
    if root.name != "methodCall" {
        return Err(invalid(format!("unexpected root element <{}>", root.name)));
    }
    let method = root
        .child("methodName")
        .map(|n| n.text.trim().to_string())
        .ok_or_else(|| invalid("call without methodName"))?;
    Ok((method, decode_params(&root)?))
}

fn decode_params(root: &Node) -> Result<Vec<Value>, OdooError> {
    let Some(params) = root.child("params") else {
        return Ok(Vec::new());
    };
    params
        .children_named("param")
        .map(|param| {
            param
                .child("value")
                .ok_or_else(|| invalid("param without value"))
                .and_then(decode_value)
        })
        .collect()
}

fn decode_value(node: &Node) -> Result<Value, OdooError> {
    let Some(typed) = node.children.first() else {
        return Ok(Value::String(node.text.clone()));
    };

    match typed.name.as_str() {
        "int" | "i4" | "i8" => typed
            .text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(format!("bad integer '{}'", typed.text))),
        "boolean" => match typed.text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(invalid(format!("bad boolean '{}'", other))),
        },
        "double" => typed
            .text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid(format!("bad double '{}'", typed.text))),
        "string" => Ok(Value::String(typed.text.clone())),
        "nil" => Ok(Value::Null),
        "dateTime.iso8601" | "base64" => Ok(Value::String(typed.text.trim().to_string())),
        "array" => {
            let Some(data) = typed.child("data") else {
                return Ok(Value::Array(Vec::new()));
            };
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = Map::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .map(|n| n.text.clone())
                    .ok_or_else(|| invalid("struct member without name"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| invalid("struct member without value"))
                    .and_then(decode_value)?;
                members.insert(name, value);
            }
            Ok(Value::Object(members))
        }
        other => Err(invalid(format!("unsupported value type <{}>", other))),
    }
}

fn invalid(msg: impl Into<String>) -> OdooError {
    OdooError::InvalidResponse(msg.into())
}

// ============================================================================
// Minimal element tree
// ============================================================================

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_document(xml: &str) -> Result<Node, OdooError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = vec![Node::default()];

    loop {
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("malformed XML: {}", e)))?;
        match event {
            Event::Start(e) => stack.push(Node::named(e.name().as_ref())),
            Event::Empty(e) => {
                let node = Node::named(e.name().as_ref());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| invalid(format!("malformed XML text: {}", e)))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(invalid("unbalanced closing tag"));
                }
                let node = stack.pop().unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(invalid("unexpected end of document"));
    }
    stack
        .pop()
        .and_then(|mut root| root.children.pop())
        .ok_or_else(|| invalid("empty document"))
}
