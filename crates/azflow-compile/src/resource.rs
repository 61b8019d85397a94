//! Dialect-neutral resource blocks. Builders produce these once per
//! snapshot and every renderer walks the same list.

/// A part of a resource block that a Terraform rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Kind,
    Sku(&'static str),
    Property(&'static str),
}

/// How a field is spelled in azurerm HCL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hcl {
    /// Top-level attribute.
    Attr(&'static str),
    /// Attribute inside the `sku` block.
    SkuAttr(&'static str),
    /// `Standard_LRS` split at the first `_` into two attributes. A value
    /// without `_` is the second half and the first becomes `Standard`.
    Split(&'static str, &'static str),
    Omit,
}

/// Static type information for one kind of cloud resource.
#[derive(Debug, PartialEq, Eq)]
pub struct Shape {
    pub arm_type: &'static str,
    pub api_version: &'static str,
    pub terraform_type: &'static str,
    /// Terraform attribute linking a child to its parent, and the parent
    /// attribute it reads: `("server_name", "name")`.
    pub terraform_parent_attr: Option<(&'static str, &'static str)>,
    /// Whether Terraform needs `resource_group_name` on this resource.
    pub resource_group_scoped: bool,
    /// azurerm spellings. Fields without a rule keep their snake_case key,
    /// and sku entries land in a `sku` block.
    pub terraform_attrs: &'static [(Field, Hcl)],
}

impl Shape {
    pub fn terraform_rule(&self, field: Field) -> Option<Hcl> {
        self.terraform_attrs
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, hcl)| *hcl)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(serde_json::Number),
    Bool(bool),
    Object(Vec<(String, Value)>),
    Array(Vec<Value>),
    /// Reference to a secure deployment parameter, by its camelCase name.
    Parameter(&'static str),
    /// The id of another resource in the same document.
    Reference(ResourceRef),
    /// An embedded JSON document, such as a nested template.
    Document(serde_json::Value),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn object<const N: usize>(entries: [(&str, Value); N]) -> Self {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn collect_parameters(&self, out: &mut Vec<&'static str>) {
        match self {
            Value::Parameter(name) => {
                if !out.contains(name) {
                    out.push(*name);
                }
            }
            Value::Object(entries) => entries.iter().for_each(|(_, v)| v.collect_parameters(out)),
            Value::Array(items) => items.iter().for_each(|v| v.collect_parameters(out)),
            Value::Str(_)
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Reference(_)
            | Value::Document(_) => {}
        }
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a ResourceRef>) {
        match self {
            Value::Reference(target) => {
                if !out.contains(&target) {
                    out.push(target);
                }
            }
            Value::Object(entries) => entries.iter().for_each(|(_, v)| v.collect_references(out)),
            Value::Array(items) => items.iter().for_each(|v| v.collect_references(out)),
            Value::Str(_)
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Parameter(_)
            | Value::Document(_) => {}
        }
    }

    fn retarget(&mut self, from: &ResourceRef, to: &str) {
        match self {
            Value::Reference(target) => target.retarget(from, to),
            Value::Object(entries) => entries.iter_mut().for_each(|(_, v)| v.retarget(from, to)),
            Value::Array(items) => items.iter_mut().for_each(|v| v.retarget(from, to)),
            Value::Str(_)
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Parameter(_)
            | Value::Document(_) => {}
        }
    }
}

/// Points at another resource block by identifier and type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRef {
    pub ident: String,
    pub shape: &'static Shape,
}

impl ResourceRef {
    fn retarget(&mut self, from: &ResourceRef, to: &str) {
        if self == from {
            self.ident = to.to_string();
        }
    }
}

/// One resource block.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Symbolic name and deployed name, identical in every dialect.
    pub ident: String,
    pub shape: &'static Shape,
    /// Id of the diagram node this block was derived from.
    pub node_id: String,
    pub location: Option<String>,
    pub kind: Option<&'static str>,
    pub sku: Vec<(&'static str, Value)>,
    pub properties: Vec<(&'static str, Value)>,
    pub parent: Option<ResourceRef>,
    /// Single-line comment emitted above the block in text dialects.
    pub note: Option<String>,
}

impl Resource {
    pub fn new(ident: impl Into<String>, shape: &'static Shape, node_id: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            shape,
            node_id: node_id.into(),
            location: None,
            kind: None,
            sku: Vec::new(),
            properties: Vec::new(),
            parent: None,
            note: None,
        }
    }

    pub fn located(mut self, region: impl Into<String>) -> Self {
        self.location = Some(region.into());
        self
    }

    pub fn kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn sku(mut self, key: &'static str, value: Value) -> Self {
        self.sku.push((key, value));
        self
    }

    pub fn property(mut self, key: &'static str, value: Value) -> Self {
        self.properties.push((key, value));
        self
    }

    pub fn child_of(mut self, parent: &Resource) -> Self {
        self.parent = Some(parent.reference());
        self
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef {
            ident: self.ident.clone(),
            shape: self.shape,
        }
    }

    /// Parent first, then resources named in sku or property values.
    pub fn references(&self) -> Vec<&ResourceRef> {
        let mut out: Vec<&ResourceRef> = self.parent.iter().collect();
        for (_, v) in self.sku.iter().chain(self.properties.iter()) {
            v.collect_references(&mut out);
        }
        out
    }

    /// Point every reference to `from` at `to` instead.
    pub fn retarget(&mut self, from: &ResourceRef, to: &str) {
        if let Some(parent) = &mut self.parent {
            parent.retarget(from, to);
        }
        for (_, v) in self.sku.iter_mut().chain(self.properties.iter_mut()) {
            v.retarget(from, to);
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        let note: String = note.into();
        self.note = Some(note.replace(['\r', '\n'], " "));
        self
    }

    /// Value of a sku entry, if present.
    pub fn sku_value(&self, key: &str) -> Option<&Value> {
        self.sku.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Secure parameters referenced anywhere in `resources`, in order of first use.
pub fn parameters(resources: &[Resource]) -> Vec<&'static str> {
    let mut out = Vec::new();
    for r in resources {
        for (_, v) in r.sku.iter().chain(r.properties.iter()) {
            v.collect_parameters(&mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    static SHAPE: Shape = Shape {
        arm_type: "Test/things",
        api_version: "2020-01-01",
        terraform_type: "test_thing",
        terraform_parent_attr: None,
        resource_group_scoped: true,
        terraform_attrs: &[(Field::Sku("name"), Hcl::Attr("sku_name"))],
    };

    #[test]
    fn parameters_are_deduplicated_in_order() {
        let a = Resource::new("A1", &SHAPE, "n1")
            .property("secret", Value::Parameter("second"))
            .property(
                "nested",
                Value::object([("inner", Value::Parameter("first"))]),
            );
        let b = Resource::new("B2", &SHAPE, "n2").sku("name", Value::Parameter("second"));
        assert_eq!(parameters(&[a, b]), ["second", "first"]);
    }

    #[test]
    fn references_list_parent_then_properties() {
        let plan = Resource::new("Plan1", &SHAPE, "n1");
        let site = Resource::new("Site1", &SHAPE, "n1")
            .child_of(&plan)
            .property("farm", Value::Reference(plan.reference()))
            .property(
                "extra",
                Value::Array(vec![Value::Reference(ResourceRef {
                    ident: "Other2".into(),
                    shape: &SHAPE,
                })]),
            );
        let idents: Vec<&str> = site.references().iter().map(|r| r.ident.as_str()).collect();
        assert_eq!(idents, ["Plan1", "Other2"]);
    }

    #[test]
    fn retarget_rewrites_matching_references_only() {
        let plan = Resource::new("Plan1", &SHAPE, "n1");
        let mut site = Resource::new("Site1", &SHAPE, "n1")
            .property("farm", Value::Reference(plan.reference()))
            .property(
                "nested",
                Value::object([("also", Value::Reference(plan.reference()))]),
            )
            .property(
                "unrelated",
                Value::Reference(ResourceRef {
                    ident: "Plan2".into(),
                    shape: &SHAPE,
                }),
            );
        site.retarget(&plan.reference(), "Plan1_2");
        let idents: Vec<&str> = site.references().iter().map(|r| r.ident.as_str()).collect();
        assert_eq!(idents, ["Plan1_2", "Plan2"]);
    }

    #[test]
    fn terraform_rules_are_looked_up_by_field() {
        assert_eq!(SHAPE.terraform_rule(Field::Sku("name")), Some(Hcl::Attr("sku_name")));
        assert_eq!(SHAPE.terraform_rule(Field::Sku("tier")), None);
        assert_eq!(SHAPE.terraform_rule(Field::Kind), None);
    }

    #[test]
    fn notes_stay_on_one_line() {
        let r = Resource::new("A1", &SHAPE, "n1").note("line one\nline two");
        assert_eq!(r.note.as_deref(), Some("line one line two"));
    }
}
