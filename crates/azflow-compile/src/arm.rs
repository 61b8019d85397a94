//! Azure Resource Manager JSON rendering.

use serde_json::{json, Map, Value as Json};

use crate::dispatch::NESTED_TEMPLATE_SCHEMA;
use crate::resource::{parameters, Resource, ResourceRef, Value};

pub fn render(resources: &[Resource]) -> String {
    let mut params = Map::new();
    for name in parameters(resources) {
        params.insert(name.to_string(), json!({ "type": "securestring" }));
    }
    let doc = json!({
        "$schema": NESTED_TEMPLATE_SCHEMA,
        "contentVersion": "1.0.0.0",
        "parameters": Json::Object(params),
        "variables": {},
        "resources": Json::Array(resources.iter().map(resource_json).collect()),
        "outputs": {}
    });
    format!("{doc:#}\n")
}

fn resource_json(r: &Resource) -> Json {
    let mut m = Map::new();
    m.insert("type".into(), Json::from(r.shape.arm_type));
    m.insert("apiVersion".into(), Json::from(r.shape.api_version));
    let name = match &r.parent {
        Some(parent) => format!("{}/{}", parent.ident, r.ident),
        None => r.ident.clone(),
    };
    m.insert("name".into(), Json::from(name));
    if let Some(location) = &r.location {
        m.insert("location".into(), Json::from(location.as_str()));
    }
    if let Some(kind) = r.kind {
        m.insert("kind".into(), Json::from(kind));
    }
    if !r.sku.is_empty() {
        m.insert("sku".into(), entries_json(&r.sku));
    }
    let depends: Vec<Json> = r
        .references()
        .into_iter()
        .map(|target| Json::from(resource_id(target)))
        .collect();
    if !depends.is_empty() {
        m.insert("dependsOn".into(), Json::Array(depends));
    }
    m.insert("properties".into(), entries_json(&r.properties));
    Json::Object(m)
}

fn resource_id(target: &ResourceRef) -> String {
    format!(
        "[resourceId('{}', '{}')]",
        target.shape.arm_type, target.ident
    )
}

fn entries_json(entries: &[(&'static str, Value)]) -> Json {
    Json::Object(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), value_json(v)))
            .collect(),
    )
}

fn value_json(v: &Value) -> Json {
    match v {
        Value::Str(s) => Json::from(s.as_str()),
        Value::Number(n) => Json::Number(n.clone()),
        Value::Bool(b) => Json::Bool(*b),
        Value::Object(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), value_json(v)))
                .collect(),
        ),
        Value::Array(items) => Json::Array(items.iter().map(value_json).collect()),
        Value::Parameter(name) => Json::from(format!("[parameters('{name}')]")),
        Value::Reference(target) => Json::from(resource_id(target)),
        Value::Document(doc) => doc.clone(),
    }
}
