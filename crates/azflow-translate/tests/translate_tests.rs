//! Tests for azflow-translate: parsing, loading, and the offline translator

use azflow_core::{catalog, Category, GraphStore, NewNode};
use azflow_translate::*;

const GENERATED: &str = r#"Sure! Here is the infrastructure:

```json
{
  "description": "web app with storage",
  "groups": [{
    "id": "rg-web",
    "name": "Web Resource Group",
    "type": "azureGroup",
    "groupType": "resource-group",
    "category": "grouping",
    "position": { "x": 50, "y": 50 },
    "size": { "width": 500, "height": 400 },
    "properties": {}
  }],
  "services": [
    {
      "id": "app-service-0",
      "name": "App Service",
      "type": "Microsoft.Web/sites",
      "category": "compute",
      "parentId": "rg-web",
      "extent": "parent",
      "properties": { "tier": "Standard", "size": "S1" },
      "position": { "x": 70, "y": 80 }
    },
    {
      "id": "storage-1",
      "name": "Storage Account",
      "type": "Microsoft.Storage/storageAccounts",
      "category": "storage",
      "properties": { "note": "holds {uploads}" },
      "position": { "x": 400, "y": 200 }
    }
  ],
  "connections": [
    { "id": "web-to-storage", "source": "app-service-0", "target": "storage-1", "connectionType": "storage" }
  ],
  "resourceGroup": "rg-demo",
  "region": "East US"
}
```

Let me know if you need changes."#;

// ===========================================================================
// Parsing and loading
// ===========================================================================

#[test]
fn fenced_output_loads_into_store() {
    let mut store = GraphStore::new();
    apply(&mut store, GENERATED).unwrap();
    assert_eq!(store.node_count(), 3);
    assert_eq!(store.edge_count(), 1);
    assert_eq!(store.children("rg-web").len(), 1);
    assert_eq!(
        store.node("storage-1").and_then(|n| n.category()),
        Some(&Category::Storage)
    );
}

#[test]
fn failed_load_leaves_store_untouched() {
    let mut store = GraphStore::new();
    let id = store.add_node(NewNode::service(Category::Compute)).unwrap();

    let two_blocks = format!("{GENERATED}\n\n{{\"services\": []}}");
    assert!(matches!(
        apply(&mut store, &two_blocks),
        Err(TranslateError::AmbiguousOutput { blocks: 2 })
    ));
    assert!(matches!(
        apply(&mut store, "no diagram today"),
        Err(TranslateError::NoJson)
    ));
    assert_eq!(store.node_count(), 1);
    assert!(store.node(&id).is_some());
}

#[test]
fn structurally_valid_but_wrong_json_is_rejected() {
    let raw = r#"{"services": "not a list"}"#;
    assert!(matches!(
        parse_infrastructure(raw),
        Err(TranslateError::SchemaMismatch(_))
    ));
}

#[test]
fn extracted_object_is_exactly_the_block() {
    let json = extract_json_object(GENERATED).unwrap();
    assert!(json.starts_with('{'));
    assert!(json.ends_with('}'));
    assert!(json.contains("holds {uploads}"));
}

// ===========================================================================
// Demo translator
// ===========================================================================

#[test]
fn demo_output_round_trips_through_parser_and_store() {
    let infra = demo_infrastructure("web app with database and file uploads in a resource group");
    let raw = serde_json::to_string_pretty(&infra).unwrap();
    let parsed = parse_infrastructure(&raw).unwrap();
    assert_eq!(parsed, infra);

    let mut store = GraphStore::new();
    load(&mut store, parsed).unwrap();
    assert_eq!(store.children("rg-main-container").len(), 3);
    assert!(store.node("storage-2").is_some());
    assert_eq!(store.edges_of("sql-db-1").len(), 1);
}

#[test]
fn palette_nodes_survive_a_reload() {
    let mut store = GraphStore::new();
    apply(&mut store, GENERATED).unwrap();
    let item = catalog::find("Key Vault").unwrap();
    let id = store.add_node(NewNode::from_palette(item)).unwrap();
    assert!(store.node(&id).is_some());
    assert_eq!(store.node_count(), 4);
}

#[test]
fn schema_describes_the_document() {
    let schema = serde_json::to_value(snapshot_schema()).unwrap();
    let properties = schema["properties"].as_object().unwrap();
    for key in ["services", "connections", "groups", "resourceGroup", "region"] {
        assert!(properties.contains_key(key), "{key}");
    }
}
