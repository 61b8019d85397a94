//! Palette catalog: the services a user can drag onto the canvas, with the
//! label and property bag each one starts with.

use crate::{Category, GroupType, Properties};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteItem {
    pub category: &'static str,
    pub label: &'static str,
    pub properties: &'static [(&'static str, &'static str)],
}

impl PaletteItem {
    pub fn category(&self) -> Category {
        Category::from(self.category)
    }

    pub fn properties(&self) -> Properties {
        to_properties(self.properties)
    }
}

const fn item(
    category: &'static str,
    label: &'static str,
    properties: &'static [(&'static str, &'static str)],
) -> PaletteItem {
    PaletteItem {
        category,
        label,
        properties,
    }
}

pub const PALETTE: &[PaletteItem] = &[
    item("compute", "App Service", &[("tier", "Standard"), ("size", "S1"), ("region", "East US")]),
    item("compute", "Virtual Machine", &[("size", "Standard_D2s_v3"), ("os", "Windows Server 2022"), ("region", "East US")]),
    item("compute", "AKS Cluster", &[("nodeSize", "Standard_D2s_v3"), ("nodeCount", "3"), ("region", "East US")]),
    item("compute", "Container Apps", &[("environment", "Production"), ("minReplicas", "1"), ("maxReplicas", "10"), ("region", "East US")]),
    item("compute", "Azure Functions", &[("plan", "Consumption"), ("region", "East US")]),
    item("database", "Azure SQL", &[("tier", "Standard"), ("size", "S0"), ("region", "East US")]),
    item("database", "Cosmos DB", &[("consistency", "Session"), ("region", "East US")]),
    item("database", "PostgreSQL", &[("tier", "GeneralPurpose"), ("region", "East US")]),
    item("database", "MySQL", &[("tier", "GeneralPurpose"), ("region", "East US")]),
    item("storage", "Storage Account", &[("type", "Standard_LRS"), ("accessTier", "Hot"), ("region", "East US")]),
    item("storage", "Blob Storage", &[("type", "Standard_LRS"), ("accessTier", "Hot"), ("region", "East US")]),
    item("storage", "Data Lake Storage", &[("type", "Standard_LRS"), ("accessTier", "Hot"), ("region", "East US")]),
    item("networking", "Virtual Network", &[("addressSpace", "10.0.0.0/16"), ("region", "East US")]),
    item("networking", "Load Balancer", &[("sku", "Standard"), ("region", "East US")]),
    item("networking", "Application Gateway", &[("tier", "Standard_v2"), ("region", "East US")]),
    item("networking", "Front Door", &[("tier", "Standard"), ("region", "Global")]),
    item("security", "Key Vault", &[("sku", "standard"), ("region", "East US")]),
    item("security", "Azure AD B2C", &[("tier", "Standard"), ("region", "United States")]),
    item("security", "Firewall", &[("tier", "Standard"), ("region", "East US")]),
    item("ai", "Azure OpenAI", &[("model", "gpt-4"), ("capacity", "1"), ("region", "East US")]),
    item("ai", "Cognitive Services", &[("tier", "S0"), ("region", "East US")]),
    item("ai", "Machine Learning", &[("tier", "Basic"), ("region", "East US")]),
    item("integration", "API Management", &[("tier", "Developer"), ("region", "East US")]),
    item("integration", "Service Bus", &[("tier", "Standard"), ("region", "East US")]),
    item("integration", "Event Grid", &[("tier", "Basic"), ("region", "East US")]),
    item("analytics", "Event Hub", &[("tier", "Standard"), ("region", "East US")]),
    item("analytics", "Data Factory", &[("region", "East US")]),
];

pub fn find(label: &str) -> Option<&'static PaletteItem> {
    PALETTE.iter().find(|item| item.label == label)
}

/// The palette entry a bare service node of `category` starts from.
pub fn default_item(category: &Category) -> Option<&'static PaletteItem> {
    let label = match category {
        Category::Compute => "App Service",
        Category::Database => "Azure SQL",
        Category::Storage => "Storage Account",
        Category::Networking => "Virtual Network",
        Category::Security => "Key Vault",
        Category::Ai => "Cognitive Services",
        Category::Integration => "API Management",
        Category::Analytics => "Event Hub",
        Category::Other | Category::Unrecognized(_) => return None,
    };
    find(label)
}

/// The label a fresh service node gets when none is supplied.
pub fn default_label(category: &Category) -> String {
    default_item(category)
        .map_or("New Node", |item| item.label)
        .to_string()
}

pub fn default_group_label(group_type: GroupType) -> String {
    let label = match group_type {
        GroupType::ResourceGroup => "Resource Group",
        GroupType::Subnet => "Subnet",
        GroupType::Tier => "Tier",
        GroupType::VirtualNetwork => "Virtual Network",
        GroupType::AvailabilitySet => "Availability Set",
        GroupType::AppServicePlan => "App Service Plan",
    };
    label.to_string()
}

/// Starting property bag for a category, from the same entry as its label.
pub fn default_properties(category: &Category) -> Properties {
    default_item(category)
        .map(PaletteItem::properties)
        .unwrap_or_default()
}

fn to_properties(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}
