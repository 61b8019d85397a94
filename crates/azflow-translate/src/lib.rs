//! Adapter between a natural-language translator and the diagram store.
//!
//! The translator itself (prompting, network access, credentials) lives with
//! the host application. This crate only sees the text it returned.

mod demo;
mod parse;

use azflow_core::{GraphError, GraphStore, Infrastructure};
use thiserror::Error;

pub use demo::demo_infrastructure;
pub use parse::{extract_json_object, parse_infrastructure};

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("translator output contains no JSON object")]
    NoJson,

    #[error("translator output contains {blocks} top-level JSON objects, expected one")]
    AmbiguousOutput { blocks: usize },

    #[error("translator output does not match the infrastructure schema: {0}")]
    SchemaMismatch(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// JSON Schema of the [`Infrastructure`] document, for embedding in a prompt.
pub fn snapshot_schema() -> schemars::Schema {
    schemars::schema_for!(Infrastructure)
}

/// Replace the store's contents with `infra`. On failure the store is unchanged.
pub fn load(store: &mut GraphStore, infra: Infrastructure) -> Result<(), TranslateError> {
    let groups = infra.groups.len();
    let services = infra.services.len();
    store.load_snapshot(infra.into())?;
    tracing::debug!(groups, services, "loaded translated infrastructure");
    Ok(())
}

/// Parse raw translator output and load it into `store`.
pub fn apply(store: &mut GraphStore, raw: &str) -> Result<(), TranslateError> {
    let infra = parse_infrastructure(raw)?;
    load(store, infra)
}
