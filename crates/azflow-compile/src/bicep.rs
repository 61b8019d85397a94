//! Bicep rendering.

use crate::resource::{parameters, Resource, Value};

const INDENT: &str = "  ";

pub fn render(resources: &[Resource]) -> String {
    let mut out = String::from("// Bicep template for Azure infrastructure\n");
    for name in parameters(resources) {
        out.push_str(&format!("\n@secure()\nparam {name} string\n"));
    }
    for r in resources {
        out.push('\n');
        write_resource(&mut out, r);
    }
    out
}

fn write_resource(out: &mut String, r: &Resource) {
    if let Some(note) = &r.note {
        out.push_str(&format!("// {note}\n"));
    }
    out.push_str(&format!(
        "resource {} '{}@{}' = {{\n",
        r.ident, r.shape.arm_type, r.shape.api_version
    ));
    if let Some(parent) = &r.parent {
        out.push_str(&format!("{INDENT}parent: {}\n", parent.ident));
    }
    out.push_str(&format!("{INDENT}name: {}\n", string(&r.ident)));
    if let Some(location) = &r.location {
        out.push_str(&format!("{INDENT}location: {}\n", string(location)));
    }
    if let Some(kind) = r.kind {
        out.push_str(&format!("{INDENT}kind: {}\n", string(kind)));
    }
    if !r.sku.is_empty() {
        out.push_str(&format!("{INDENT}sku: {}\n", object(&r.sku, 1)));
    }
    out.push_str(&format!("{INDENT}properties: {}\n", object(&r.properties, 1)));
    out.push_str("}\n");
}

fn object<K: AsRef<str>>(entries: &[(K, Value)], depth: usize) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let pad = INDENT.repeat(depth + 1);
    let mut s = String::from("{\n");
    for (k, v) in entries {
        s.push_str(&format!("{pad}{}: {}\n", key(k.as_ref()), expr(v, depth + 1)));
    }
    s.push_str(&INDENT.repeat(depth));
    s.push('}');
    s
}

fn expr(value: &Value, depth: usize) -> String {
    match value {
        Value::Str(s) => string(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(entries) => object(entries, depth),
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let pad = INDENT.repeat(depth + 1);
            let mut s = String::from("[\n");
            for item in items {
                s.push_str(&format!("{pad}{}\n", expr(item, depth + 1)));
            }
            s.push_str(&INDENT.repeat(depth));
            s.push(']');
            s
        }
        Value::Parameter(name) => name.to_string(),
        Value::Reference(target) => format!("{}.id", target.ident),
        Value::Document(serde_json::Value::Null) => "null".to_string(),
        Value::Document(doc) => expr(&from_json(doc), depth),
    }
}

/// Literal form of an embedded JSON document.
fn from_json(doc: &serde_json::Value) -> Value {
    match doc {
        serde_json::Value::Null => Value::Document(serde_json::Value::Null),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

fn key(k: &str) -> String {
    let mut chars = k.chars();
    let bare = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        k.to_string()
    } else {
        string(k)
    }
}

fn string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '$' if chars.peek() == Some(&'{') => quoted.push_str("\\$"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
