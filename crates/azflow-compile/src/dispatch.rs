//! Category dispatch: which resource blocks each service node turns into.

use azflow_core::{Category, GraphSnapshot, Node, Settings};
use serde_json::json;

use crate::naming::{base_ident, id_suffix, Namer};
use crate::resource::{Field, Hcl, Resource, Shape, Value};

/// Everything a builder may read about the node it is expanding.
pub struct NodeContext<'a> {
    pub node: &'a Node,
    pub ident: &'a str,
    pub settings: &'a Settings,
}

impl NodeContext<'_> {
    /// Property as text, or `default` when missing or blank.
    pub fn text(&self, key: &str, default: &str) -> String {
        self.node
            .prop_str(key)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Property as a JSON number, accepting numeric strings.
    pub fn number(&self, key: &str, default: u64) -> Value {
        let parsed = match self.node.properties.get(key) {
            Some(serde_json::Value::Number(n)) => Some(n.clone()),
            Some(serde_json::Value::String(s)) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .map(serde_json::Number::from)
                    .or_else(|| s.parse::<f64>().ok().and_then(serde_json::Number::from_f64))
            }
            _ => None,
        };
        Value::Number(parsed.unwrap_or_else(|| serde_json::Number::from(default)))
    }

    pub fn region(&self) -> String {
        self.text("region", &self.settings.location)
    }

    fn resource(&self, shape: &'static Shape) -> Resource {
        Resource::new(self.ident, shape, self.node.id.as_str())
    }
}

pub type Builder = fn(&NodeContext<'_>) -> Vec<Resource>;

pub static WEB_SITE: Shape = Shape {
    arm_type: "Microsoft.Web/sites",
    api_version: "2021-02-01",
    terraform_type: "azurerm_app_service",
    terraform_parent_attr: None,
    resource_group_scoped: true,
    terraform_attrs: &[
        (Field::Property("serverFarmId"), Hcl::Attr("app_service_plan_id")),
        (Field::Property("siteConfig"), Hcl::Omit),
    ],
};

pub static SERVER_FARM: Shape = Shape {
    arm_type: "Microsoft.Web/serverfarms",
    api_version: "2021-02-01",
    terraform_type: "azurerm_app_service_plan",
    terraform_parent_attr: None,
    resource_group_scoped: true,
    terraform_attrs: &[(Field::Sku("name"), Hcl::SkuAttr("size"))],
};

pub static SQL_SERVER: Shape = Shape {
    arm_type: "Microsoft.Sql/servers",
    api_version: "2021-02-01-preview",
    terraform_type: "azurerm_mssql_server",
    terraform_parent_attr: None,
    resource_group_scoped: true,
    terraform_attrs: &[],
};

pub static SQL_DATABASE: Shape = Shape {
    arm_type: "Microsoft.Sql/servers/databases",
    api_version: "2021-02-01-preview",
    terraform_type: "azurerm_sql_database",
    terraform_parent_attr: Some(("server_name", "name")),
    resource_group_scoped: true,
    terraform_attrs: &[
        (Field::Sku("name"), Hcl::Attr("requested_service_objective_name")),
        (Field::Sku("tier"), Hcl::Attr("edition")),
    ],
};

pub static STORAGE_ACCOUNT: Shape = Shape {
    arm_type: "Microsoft.Storage/storageAccounts",
    api_version: "2021-04-01",
    terraform_type: "azurerm_storage_account",
    terraform_parent_attr: None,
    resource_group_scoped: true,
    terraform_attrs: &[
        (Field::Kind, Hcl::Attr("account_kind")),
        (
            Field::Sku("name"),
            Hcl::Split("account_tier", "account_replication_type"),
        ),
        (
            Field::Property("supportsHttpsTrafficOnly"),
            Hcl::Attr("https_traffic_only_enabled"),
        ),
    ],
};

pub static COGNITIVE_ACCOUNT: Shape = Shape {
    arm_type: "Microsoft.CognitiveServices/accounts",
    api_version: "2023-05-01",
    terraform_type: "azurerm_cognitive_account",
    terraform_parent_attr: None,
    resource_group_scoped: true,
    terraform_attrs: &[
        (Field::Sku("name"), Hcl::Attr("sku_name")),
        (
            Field::Property("customSubDomainName"),
            Hcl::Attr("custom_subdomain_name"),
        ),
    ],
};

pub static MODEL_DEPLOYMENT: Shape = Shape {
    arm_type: "Microsoft.CognitiveServices/accounts/deployments",
    api_version: "2023-05-01",
    terraform_type: "azurerm_cognitive_deployment",
    terraform_parent_attr: Some(("cognitive_account_id", "id")),
    resource_group_scoped: false,
    terraform_attrs: &[],
};

pub static TEMPLATE_DEPLOYMENT: Shape = Shape {
    arm_type: "Microsoft.Resources/deployments",
    api_version: "2021-04-01",
    terraform_type: "azurerm_resource_group_template_deployment",
    terraform_parent_attr: None,
    resource_group_scoped: true,
    terraform_attrs: &[
        (Field::Property("mode"), Hcl::Attr("deployment_mode")),
        (Field::Property("template"), Hcl::Attr("template_content")),
    ],
};

pub const NESTED_TEMPLATE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";

/// Builders keyed by category slug.
pub const DISPATCH: &[(&str, Builder)] = &[
    ("compute", web_host),
    ("database", sql_server),
    ("storage", storage_account),
    ("ai", cognitive_account),
];

/// Builders keyed by (category slug, exact label). Consulted before [`DISPATCH`].
pub const LABEL_OVERRIDES: &[(&str, &str, Builder)] = &[("ai", "Azure OpenAI", openai)];

/// The builder for a service node's category and label.
pub fn builder_for(category: &Category, label: &str) -> Builder {
    let slug = category.as_str();
    LABEL_OVERRIDES
        .iter()
        .find(|(c, l, _)| *c == slug && *l == label)
        .map(|(_, _, b)| *b)
        .or_else(|| DISPATCH.iter().find(|(c, _)| *c == slug).map(|(_, b)| *b))
        .unwrap_or(placeholder)
}

/// Expand every service node into resource blocks, in snapshot order. A
/// node's own block comes first and its supporting blocks follow.
pub fn plan(snapshot: &GraphSnapshot, settings: &Settings) -> Vec<Resource> {
    let mut namer = Namer::new();
    let mut out = Vec::new();
    for node in &snapshot.nodes {
        let Some(category) = node.category() else {
            continue;
        };
        let ident = namer.claim(&base_ident(&node.label, &node.id));
        let ctx = NodeContext {
            node,
            ident: &ident,
            settings,
        };
        let mut resources = builder_for(category, &node.label)(&ctx);
        for i in 1..resources.len() {
            let wanted = resources[i].reference();
            let claimed = namer.claim(&wanted.ident);
            if claimed != wanted.ident {
                resources.iter_mut().for_each(|r| r.retarget(&wanted, &claimed));
                resources[i].ident = claimed;
            }
        }
        tracing::trace!(node = %node.id, %ident, count = resources.len(), "planned");
        out.extend(resources);
    }
    out
}

// --- Builders ---

fn web_host(ctx: &NodeContext<'_>) -> Vec<Resource> {
    let plan = Resource::new(
        format!("appServicePlan{}", id_suffix(&ctx.node.id)),
        &SERVER_FARM,
        ctx.node.id.as_str(),
    )
    .located(ctx.region())
    .sku("name", Value::str(ctx.text("size", "S1")))
    .sku("tier", Value::str(ctx.text("tier", "Standard")));
    let site = ctx
        .resource(&WEB_SITE)
        .located(ctx.region())
        .property("serverFarmId", Value::Reference(plan.reference()))
        .property(
            "siteConfig",
            Value::object([("appSettings", Value::Array(Vec::new()))]),
        )
        .property("httpsOnly", Value::Bool(true));
    vec![site, plan]
}

fn sql_server(ctx: &NodeContext<'_>) -> Vec<Resource> {
    let server = ctx
        .resource(&SQL_SERVER)
        .located(ctx.region())
        .property(
            "administratorLogin",
            Value::str(ctx.text("adminLogin", "adminuser")),
        )
        .property(
            "administratorLoginPassword",
            Value::Parameter("administratorLoginPassword"),
        )
        .property("version", Value::str("12.0"));
    let database = Resource::new(
        format!("{}Database", ctx.ident),
        &SQL_DATABASE,
        ctx.node.id.as_str(),
    )
    .child_of(&server)
    .located(ctx.region())
    .sku("name", Value::str(ctx.text("size", "S0")))
    .sku("tier", Value::str(ctx.text("tier", "Standard")));
    vec![server, database]
}

fn storage_account(ctx: &NodeContext<'_>) -> Vec<Resource> {
    vec![ctx
        .resource(&STORAGE_ACCOUNT)
        .located(ctx.region())
        .kind("StorageV2")
        .sku("name", Value::str(ctx.text("type", "Standard_LRS")))
        .property("accessTier", Value::str(ctx.text("accessTier", "Hot")))
        .property("supportsHttpsTrafficOnly", Value::Bool(true))]
}

fn openai(ctx: &NodeContext<'_>) -> Vec<Resource> {
    let account = ctx
        .resource(&COGNITIVE_ACCOUNT)
        .located(ctx.region())
        .kind("OpenAI")
        .sku("name", Value::str("S0"))
        .property(
            "customSubDomainName",
            Value::str(ctx.ident.to_ascii_lowercase()),
        )
        .property(
            "networkAcls",
            Value::object([("defaultAction", Value::str("Allow"))]),
        );
    let deployment = Resource::new(
        format!("{}Deployment", ctx.ident),
        &MODEL_DEPLOYMENT,
        ctx.node.id.as_str(),
    )
    .child_of(&account)
    .sku("name", Value::str("Standard"))
    .sku("capacity", ctx.number("capacity", 1))
    .property(
        "model",
        Value::object([
            ("format", Value::str("OpenAI")),
            ("name", Value::str(ctx.text("model", "gpt-4"))),
            ("version", Value::str(ctx.text("modelVersion", "1"))),
        ]),
    );
    vec![account, deployment]
}

fn cognitive_account(ctx: &NodeContext<'_>) -> Vec<Resource> {
    vec![ctx
        .resource(&COGNITIVE_ACCOUNT)
        .located(ctx.region())
        .kind("CognitiveServices")
        .sku("name", Value::str("S0"))]
}

fn placeholder(ctx: &NodeContext<'_>) -> Vec<Resource> {
    vec![ctx
        .resource(&TEMPLATE_DEPLOYMENT)
        .note(format!(
            "Placeholder deployment for {} ({})",
            ctx.node.label, ctx.node.id
        ))
        .property("mode", Value::str("Incremental"))
        .property(
            "template",
            Value::Document(json!({
                "$schema": NESTED_TEMPLATE_SCHEMA,
                "contentVersion": "1.0.0.0",
                "resources": []
            })),
        )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use azflow_core::{NodeKind, Position, Properties};

    fn service(id: &str, category: &str, label: &str, properties: serde_json::Value) -> Node {
        Node {
            id: id.into(),
            kind: NodeKind::Service {
                category: Category::from(category),
                resource_type: None,
            },
            label: label.into(),
            properties: match properties {
                serde_json::Value::Object(map) => map,
                _ => Properties::new(),
            },
            position: Position::default(),
            size: None,
            parent_id: None,
        }
    }

    fn plan_one(node: Node) -> Vec<Resource> {
        let snapshot = GraphSnapshot {
            nodes: vec![node],
            edges: Vec::new(),
        };
        plan(&snapshot, &Settings::default())
    }

    #[test]
    fn label_override_wins_over_category() {
        let openai = plan_one(service("node_1", "ai", "Azure OpenAI", json!({})));
        assert_eq!(openai.len(), 2);
        assert_eq!(openai[0].kind, Some("OpenAI"));
        assert_eq!(openai[1].ident, "AzureOpenAI1Deployment");
        assert_eq!(openai[1].parent.as_ref().map(|p| p.ident.as_str()), Some("AzureOpenAI1"));

        let vision = plan_one(service("node_2", "ai", "Computer Vision", json!({})));
        assert_eq!(vision.len(), 1);
        assert_eq!(vision[0].kind, Some("CognitiveServices"));
    }

    #[test]
    fn unknown_categories_fall_back_to_placeholder() {
        let r = plan_one(service("node_3", "unknown-category", "Mystery", json!({})));
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].shape, &TEMPLATE_DEPLOYMENT);
        assert_eq!(r[0].location, None);
        assert_eq!(
            r[0].note.as_deref(),
            Some("Placeholder deployment for Mystery (node_3)")
        );
    }

    #[test]
    fn blank_properties_use_defaults() {
        let r = plan_one(service("n2", "database", "DB", json!({ "tier": " " })));
        assert_eq!(r[1].ident, "DB2Database");
        assert_eq!(r[1].sku_value("tier"), Some(&Value::str("Standard")));
        assert_eq!(r[1].sku_value("name"), Some(&Value::str("S0")));
        assert_eq!(r[0].location.as_deref(), Some("East US"));
        assert_eq!(r[1].location.as_deref(), Some("East US"));
    }

    #[test]
    fn web_host_references_its_plan() {
        let r = plan_one(service("node_3", "compute", "Front", json!({ "size": "P1v2" })));
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].ident, "Front3");
        assert_eq!(r[1].ident, "appServicePlan3");
        assert_eq!(r[1].shape, &SERVER_FARM);
        assert_eq!(r[1].sku_value("name"), Some(&Value::str("P1v2")));
        assert_eq!(
            r[0].references().iter().map(|t| t.ident.as_str()).collect::<Vec<_>>(),
            ["appServicePlan3"]
        );
    }

    #[test]
    fn renamed_supporting_blocks_keep_references_intact() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                service("a_1", "compute", "Web", json!({})),
                service("b_1", "compute", "Api", json!({})),
            ],
            edges: Vec::new(),
        };
        let r = plan(&snapshot, &Settings::default());
        let idents: Vec<&str> = r.iter().map(|r| r.ident.as_str()).collect();
        assert_eq!(idents, ["Web1", "appServicePlan1", "Api1", "appServicePlan1_2"]);
        assert_eq!(r[2].references()[0].ident, "appServicePlan1_2");
        assert_eq!(r[0].references()[0].ident, "appServicePlan1");
    }

    #[test]
    fn numeric_strings_become_numbers() {
        let r = plan_one(service(
            "node_5",
            "ai",
            "Azure OpenAI",
            json!({ "capacity": "10" }),
        ));
        assert_eq!(r[1].sku_value("capacity"), Some(&Value::Number(serde_json::Number::from(10u64))));
    }

    #[test]
    fn groups_produce_nothing() {
        let mut group = service("g", "compute", "Group", json!({}));
        group.kind = NodeKind::Group {
            group_type: azflow_core::GroupType::ResourceGroup,
        };
        assert!(plan_one(group).is_empty());
    }
}
