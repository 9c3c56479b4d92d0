//! Blueprint types for environment plans.
//!
//! A plan is an ordered stream of YAML documents, one blueprint per
//! service. Only container-image plugins are understood in full; every
//! other plugin kind is carried through opaquely so that re-serialized
//! plans stay faithful to what the platform produced.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PlanError, Result};

/// Discriminant value identifying a container-image plugin.
pub const CONTAINER_PLUGIN_KIND: &str = "container.BasicPlugin";

/// Container image reference inside a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerImage {
    /// Whether the platform must re-pull the image on every rollout.
    #[serde(rename = "AlwaysPull")]
    pub always_pull: bool,
    /// Image repository.
    #[serde(rename = "Image")]
    pub repository: String,
    /// Image tag.
    #[serde(rename = "Tag")]
    pub tag: String,
}

/// Fully-typed container-image plugin descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPlugin {
    /// Plugin kind discriminant, always [`CONTAINER_PLUGIN_KIND`].
    #[serde(rename = "_type")]
    pub kind: String,
    /// Plugin name; rewriting it forces the platform to see a new revision.
    #[serde(rename = "Name")]
    pub name: String,
    /// The container image reference.
    #[serde(rename = "Image")]
    pub image: ContainerImage,
    /// Fields the schema does not model, preserved for re-serialization.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A blueprint's deployable-unit descriptor.
///
/// Discriminated by the `_type` field: container-image plugins get the
/// typed variant, everything else round-trips untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Plugin {
    /// A container-image plugin, eligible for override mutation.
    Container(ContainerPlugin),
    /// Any other plugin kind, never introspected.
    Opaque(serde_yaml::Value),
}

impl Plugin {
    /// Returns a mutable reference to the container plugin, if this is one.
    pub fn as_container_mut(&mut self) -> Option<&mut ContainerPlugin> {
        match self {
            Self::Container(plugin) => Some(plugin),
            Self::Opaque(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for Plugin {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        let is_container = value
            .get("_type")
            .and_then(serde_yaml::Value::as_str)
            .is_some_and(|kind| kind == CONTAINER_PLUGIN_KIND);

        if is_container {
            let plugin = serde_yaml::from_value(value).map_err(D::Error::custom)?;
            Ok(Self::Container(plugin))
        } else {
            Ok(Self::Opaque(value))
        }
    }
}

impl Serialize for Plugin {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Container(plugin) => plugin.serialize(serializer),
            Self::Opaque(value) => value.serialize(serializer),
        }
    }
}

/// One planned unit within an environment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// The deployable-unit descriptor.
    #[serde(rename = "Plugin")]
    pub plugin: Plugin,
    /// Join key to the service override set.
    #[serde(rename = "ServiceDefinitionName")]
    pub service_definition_name: String,
    /// Fields the schema does not model, preserved for re-serialization.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Parses all `---`-separated documents of a plan stream, in order.
///
/// Empty documents (for example a trailing separator) are skipped.
///
/// # Errors
///
/// Returns a [`PlanError::ParseFailed`] if any document is not a valid
/// blueprint.
pub fn parse_documents(input: &str) -> Result<Vec<Blueprint>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut blueprints = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| {
            PlanError::ParseFailed {
                message: e.to_string(),
            }
        })?;
        if value.is_null() {
            continue;
        }
        let blueprint: Blueprint =
            serde_yaml::from_value(value).map_err(|e| PlanError::ParseFailed {
                message: e.to_string(),
            })?;
        blueprints.push(blueprint);
    }

    Ok(blueprints)
}
