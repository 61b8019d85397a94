//! Terraform (HCL) rendering for the azurerm provider.

use azflow_core::Settings;

use crate::resource::{parameters, Field, Hcl, Resource, Value};

const INDENT: &str = "  ";

enum Entry {
    /// `key = expr`. The expression is already rendered.
    Attr(String, String),
    Block(String, Vec<Entry>),
}

pub fn render(resources: &[Resource], settings: &Settings) -> String {
    let mut out = String::from("# Terraform configuration for Azure infrastructure\n");
    out.push_str("provider \"azurerm\" {\n  features {}\n}\n\n");
    write_block(
        &mut out,
        "resource \"azurerm_resource_group\" \"rg\"",
        &[
            Entry::Attr("name".into(), string(&settings.resource_group)),
            Entry::Attr("location".into(), string(&settings.location)),
        ],
    );

    for name in parameters(resources) {
        out.push('\n');
        write_block(
            &mut out,
            &format!("variable \"{}\"", snake_case(name)),
            &[
                Entry::Attr("type".into(), "string".into()),
                Entry::Attr("sensitive".into(), "true".into()),
            ],
        );
    }

    for r in resources {
        out.push('\n');
        if let Some(note) = &r.note {
            out.push_str(&format!("# {note}\n"));
        }
        write_block(
            &mut out,
            &format!("resource \"{}\" \"{}\"", r.shape.terraform_type, r.ident),
            &resource_entries(r),
        );
    }
    out
}

fn resource_entries(r: &Resource) -> Vec<Entry> {
    let shape = r.shape;
    let mut entries = vec![Entry::Attr("name".into(), string(&r.ident))];
    if let Some(location) = &r.location {
        entries.push(Entry::Attr("location".into(), string(location)));
    }
    if shape.resource_group_scoped {
        entries.push(Entry::Attr(
            "resource_group_name".into(),
            "azurerm_resource_group.rg.name".into(),
        ));
    }
    if let (Some((attr, field)), Some(parent)) = (shape.terraform_parent_attr, &r.parent) {
        entries.push(Entry::Attr(
            attr.to_string(),
            format!("{}.{}.{field}", parent.shape.terraform_type, parent.ident),
        ));
    }
    if let Some(kind) = r.kind {
        let kind = Value::str(kind);
        match shape.terraform_rule(Field::Kind) {
            Some(rule) => entries.extend(apply(rule, &kind)),
            None => entries.push(entry("kind", &kind)),
        }
    }

    let mut sku = Vec::new();
    for (k, v) in &r.sku {
        match shape.terraform_rule(Field::Sku(*k)) {
            Some(Hcl::SkuAttr(name)) => sku.push(entry(name, v)),
            Some(rule) => entries.extend(apply(rule, v)),
            None => sku.push(entry(k, v)),
        }
    }
    if !sku.is_empty() {
        entries.push(Entry::Block("sku".into(), sku));
    }

    for (k, v) in &r.properties {
        match shape.terraform_rule(Field::Property(*k)) {
            Some(rule) => entries.extend(apply(rule, v)),
            None => entries.push(entry(k, v)),
        }
    }
    entries
}

fn apply(rule: Hcl, value: &Value) -> Vec<Entry> {
    match (rule, value) {
        (Hcl::Attr(name) | Hcl::SkuAttr(name), v) => vec![entry(name, v)],
        (Hcl::Split(first, second), Value::Str(s)) => {
            let (head, tail) = s.split_once('_').unwrap_or(("Standard", s.as_str()));
            vec![
                Entry::Attr(first.to_string(), string(head)),
                Entry::Attr(second.to_string(), string(tail)),
            ]
        }
        (Hcl::Split(first, _), v) => vec![entry(first, v)],
        (Hcl::Omit, _) => Vec::new(),
    }
}

fn entry(key: &str, value: &Value) -> Entry {
    let key = snake_case(key);
    match value {
        Value::Object(fields) => {
            Entry::Block(key, fields.iter().map(|(k, v)| entry(k, v)).collect())
        }
        other => Entry::Attr(key, expr(other)),
    }
}

fn expr(value: &Value) -> String {
    match value {
        Value::Str(s) => string(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(expr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{} = {}", snake_case(k), expr(v)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
        Value::Parameter(name) => format!("var.{}", snake_case(name)),
        Value::Reference(target) => format!("{}.{}.id", target.shape.terraform_type, target.ident),
        Value::Document(doc) => format!("<<TEMPLATE\n{doc:#}\nTEMPLATE"),
    }
}

/// Attributes first, `=` aligned, then nested blocks.
fn write_block(out: &mut String, header: &str, entries: &[Entry]) {
    out.push_str(header);
    out.push_str(" {\n");
    write_entries(out, entries, 1);
    out.push_str("}\n");
}

fn write_entries(out: &mut String, entries: &[Entry], depth: usize) {
    let pad = INDENT.repeat(depth);
    let width = entries
        .iter()
        .filter_map(|e| match e {
            Entry::Attr(k, _) => Some(k.len()),
            Entry::Block(..) => None,
        })
        .max()
        .unwrap_or(0);
    for e in entries {
        if let Entry::Attr(k, v) = e {
            out.push_str(&format!("{pad}{k:<width$} = {v}\n"));
        }
    }
    for e in entries {
        if let Entry::Block(k, inner) = e {
            if inner.is_empty() {
                out.push_str(&format!("{pad}{k} {{}}\n"));
            } else {
                out.push_str(&format!("{pad}{k} {{\n"));
                write_entries(out, inner, depth + 1);
                out.push_str(&format!("{pad}}}\n"));
            }
        }
    }
}

fn string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                quoted.push(c);
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

pub(crate) fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_keys() {
        assert_eq!(snake_case("accessTier"), "access_tier");
        assert_eq!(snake_case("administratorLoginPassword"), "administrator_login_password");
        assert_eq!(snake_case("name"), "name");
    }

    #[test]
    fn strings_escape_interpolation() {
        assert_eq!(string(r#"a "b" ${c}"#), r#""a \"b\" $${c}""#);
        assert_eq!(string("100%{x}"), "\"100%%{x}\"");
    }

    #[test]
    fn skeleton_names_resource_group_from_settings() {
        let out = render(&[], &Settings::default());
        assert!(out.starts_with("# Terraform configuration"));
        assert!(out.contains("provider \"azurerm\" {\n  features {}\n}"));
        assert!(out.contains(
            "resource \"azurerm_resource_group\" \"rg\" {\n  name     = \"example-resources\"\n  location = \"East US\"\n}"
        ));
    }

    #[test]
    fn storage_sku_splits_into_tier_and_replication() {
        let entries = apply(
            Hcl::Split("account_tier", "account_replication_type"),
            &Value::str("Premium_ZRS"),
        );
        let mut out = String::new();
        write_entries(&mut out, &entries, 0);
        assert_eq!(
            out,
            "account_tier             = \"Premium\"\naccount_replication_type = \"ZRS\"\n"
        );

        let entries = apply(Hcl::Split("a", "b"), &Value::str("GRS"));
        let mut out = String::new();
        write_entries(&mut out, &entries, 0);
        assert_eq!(out, "a = \"Standard\"\nb = \"GRS\"\n");
    }

    #[test]
    fn omitted_fields_render_nothing() {
        assert!(apply(Hcl::Omit, &Value::Bool(true)).is_empty());
    }

    #[test]
    fn attributes_align_before_blocks() {
        let mut out = String::new();
        write_block(
            &mut out,
            "x",
            &[
                Entry::Block("sku".into(), vec![Entry::Attr("name".into(), "\"S1\"".into())]),
                Entry::Attr("a".into(), "1".into()),
                Entry::Attr("long_key".into(), "2".into()),
            ],
        );
        assert_eq!(
            out,
            "x {\n  a        = 1\n  long_key = 2\n  sku {\n    name = \"S1\"\n  }\n}\n"
        );
    }
}
