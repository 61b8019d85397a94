//! Offline keyword translator, used when no language-model service is
//! configured.

use azflow_core::{
    Category, Connection, ConnectionType, GroupSpec, GroupType, Infrastructure, Position,
    Properties, ServiceSpec, Size,
};

const GROUP_ID: &str = "rg-main-container";
const SERVICE_SIZE: Size = Size {
    width: 160.0,
    height: 100.0,
};

fn props(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
        .collect()
}

struct Draft {
    grouped: bool,
    services: Vec<ServiceSpec>,
}

impl Draft {
    fn push(
        &mut self,
        id: String,
        name: String,
        service_type: &str,
        category: Category,
        properties: Properties,
        grouped_at: Position,
        loose_at: Position,
    ) {
        self.services.push(ServiceSpec {
            id,
            name,
            service_type: Some(service_type.to_string()),
            category,
            parent_id: self.grouped.then(|| GROUP_ID.to_string()),
            extent: self.grouped.then(|| "parent".to_string()),
            properties,
            position: if self.grouped { grouped_at } else { loose_at },
            size: Some(SERVICE_SIZE),
        });
    }
}

/// Build an infrastructure document from keywords in `prompt`.
pub fn demo_infrastructure(prompt: &str) -> Infrastructure {
    let p = prompt.to_lowercase();
    let has = |word: &str| p.contains(word);

    let grouped = has("resource group")
        || has("container")
        || has("group")
        || (has("vm") && has("sql"));
    let mut b = Draft {
        grouped,
        services: Vec::new(),
    };
    let mut connections = Vec::new();

    if has("vm") || has("virtual machine") {
        let count = if has("2 vm") || has("two vm") { 2 } else { 1 };
        for i in 0..count {
            let at = Position::new(70.0 + 180.0 * i as f64, 80.0);
            b.push(
                format!("vm-{}", b.services.len()),
                format!("Virtual Machine {}", i + 1),
                "Microsoft.Compute/virtualMachines",
                Category::Compute,
                props(&[("size", "Standard_B2s"), ("os", "Windows"), ("region", "East US")]),
                at,
                at,
            );
        }
    }

    if has("web") || has("app") {
        b.push(
            format!("app-service-{}", b.services.len()),
            "App Service".to_string(),
            "Microsoft.Web/sites",
            Category::Compute,
            props(&[("tier", "Standard"), ("size", "S1"), ("region", "East US")]),
            Position::new(70.0, 80.0),
            Position::new(100.0, 100.0),
        );
    }

    if has("database") || has("sql") || has("data") {
        b.push(
            format!("sql-db-{}", b.services.len()),
            "SQL Server".to_string(),
            "Microsoft.Sql/servers",
            Category::Database,
            props(&[("tier", "Standard"), ("size", "S2"), ("region", "East US")]),
            Position::new(280.0, 220.0),
            Position::new(100.0, 300.0),
        );
        if let [first, .., db] = b.services.as_slice() {
            connections.push(Connection {
                id: "service-to-db".to_string(),
                source: first.id.clone(),
                target: db.id.clone(),
                connection_type: ConnectionType::Database,
                properties: Properties::new(),
            });
        }
    }

    if has("storage") || has("upload") || has("file") {
        b.push(
            format!("storage-{}", b.services.len()),
            "Storage Account".to_string(),
            "Microsoft.Storage/storageAccounts",
            Category::Storage,
            props(&[("type", "Standard_LRS"), ("accessTier", "Hot"), ("region", "East US")]),
            Position::new(70.0, 220.0),
            Position::new(400.0, 200.0),
        );
    }

    let groups = if grouped {
        vec![GroupSpec {
            id: GROUP_ID.to_string(),
            name: "Main Resource Group".to_string(),
            node_type: Some("azureGroup".to_string()),
            group_type: GroupType::ResourceGroup,
            category: Some("grouping".to_string()),
            parent_id: None,
            position: Position::new(50.0, 50.0),
            size: Some(Size {
                width: 500.0,
                height: 400.0,
            }),
            properties: props(&[
                ("description", "Main resource group container"),
                ("region", "East US"),
            ]),
        }]
    } else {
        Vec::new()
    };

    tracing::debug!(
        groups = groups.len(),
        services = b.services.len(),
        "built demo infrastructure"
    );
    Infrastructure {
        description: prompt.to_string(),
        groups,
        services: b.services,
        connections,
        resource_group: Some("rg-demo-infrastructure".to_string()),
        region: Some("East US".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(infra: &Infrastructure) -> Vec<&str> {
        infra.node_ids().collect()
    }

    #[test]
    fn web_app_with_database() {
        let infra = demo_infrastructure("Web app with database");
        assert_eq!(ids(&infra), ["app-service-0", "sql-db-1"]);
        assert_eq!(infra.connections.len(), 1);
        assert_eq!(infra.connections[0].source, "app-service-0");
        assert_eq!(infra.connections[0].target, "sql-db-1");
        assert!(infra.services.iter().all(|s| s.parent_id.is_none()));
        assert_eq!(infra.services[0].position, Position::new(100.0, 100.0));
    }

    #[test]
    fn two_vms_and_sql_are_grouped() {
        let infra = demo_infrastructure("2 VMs talking to SQL");
        assert_eq!(ids(&infra), ["rg-main-container", "vm-0", "vm-1", "sql-db-2"]);
        assert!(infra
            .services
            .iter()
            .all(|s| s.parent_id.as_deref() == Some(GROUP_ID) && s.extent.as_deref() == Some("parent")));
        assert_eq!(infra.services[1].position, Position::new(250.0, 80.0));
        assert_eq!(infra.connections[0].source, "vm-0");
    }

    #[test]
    fn lone_database_has_no_connection() {
        let infra = demo_infrastructure("a sql server");
        assert_eq!(ids(&infra), ["sql-db-0"]);
        assert!(infra.connections.is_empty());
    }

    #[test]
    fn nothing_recognised_gives_empty_document() {
        let infra = demo_infrastructure("hello");
        assert!(infra.services.is_empty());
        assert_eq!(infra.resource_group.as_deref(), Some("rg-demo-infrastructure"));
    }
}
