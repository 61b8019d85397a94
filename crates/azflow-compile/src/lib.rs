//! Turns a diagram snapshot into deployable infrastructure-as-code in three
//! dialects. Compilation is pure: the same snapshot and settings always give
//! byte-identical output.

mod arm;
mod bicep;
pub mod dispatch;
pub mod naming;
pub mod resource;
mod terraform;

use azflow_core::{GraphSnapshot, Infrastructure, Settings};
use serde::Serialize;

pub use dispatch::{plan, Builder, NodeContext, DISPATCH, LABEL_OVERRIDES};
pub use resource::{Resource, ResourceRef, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Templates {
    /// Azure Resource Manager JSON document.
    pub arm: String,
    /// Terraform configuration for the azurerm provider.
    pub terraform: String,
    pub bicep: String,
}

/// Compile with default settings (East US, `example-resources`).
pub fn compile(snapshot: &GraphSnapshot) -> Templates {
    compile_with(snapshot, &Settings::default())
}

pub fn compile_with(snapshot: &GraphSnapshot, settings: &Settings) -> Templates {
    let resources = plan(snapshot, settings);
    tracing::debug!(
        nodes = snapshot.nodes.len(),
        resources = resources.len(),
        location = %settings.location,
        "compiled snapshot"
    );
    Templates {
        arm: arm::render(&resources),
        terraform: terraform::render(&resources, settings),
        bicep: bicep::render(&resources),
    }
}

/// Compile a translator document directly. Its `region` and `resourceGroup`
/// override the defaults when present.
pub fn compile_infrastructure(infra: &Infrastructure) -> Templates {
    let defaults = Settings::default();
    let settings = Settings {
        location: infra.region.clone().unwrap_or(defaults.location),
        resource_group: infra.resource_group.clone().unwrap_or(defaults.resource_group),
    };
    compile_with(&GraphSnapshot::from(infra.clone()), &settings)
}
