//! Plan reconciliation engine.
//!
//! Merges user-supplied per-service overrides into a fetched baseline
//! plan, validates that every override matched a blueprint, and writes
//! the merged plan to a manifest file for the create/update call.
//!
//! Matched services with a version override get a rewritten plugin name
//! (`{service}-{run_id}`) and `AlwaysPull`; otherwise an image-tag-only
//! change would be skipped by the platform's no-op detection, and a moved
//! tag would be served from the image-layer cache.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::ServiceOverrides;
use crate::error::{PlanError, Result};

use super::blueprint::Blueprint;

/// Merges overrides into a plan and emits the manifest artifact.
pub struct PlanReconciler<'a> {
    /// Override set parsed from the services specification.
    overrides: &'a ServiceOverrides,
    /// Run identifier injected into renamed plugins.
    run_id: &'a str,
}

impl<'a> PlanReconciler<'a> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(overrides: &'a ServiceOverrides, run_id: &'a str) -> Self {
        Self { overrides, run_id }
    }

    /// Merges the override set into the plan.
    ///
    /// One pass over the blueprints, in order. A matched override is
    /// recorded as consumed whether or not it carries a version; only
    /// container plugins with a version override are mutated. After the
    /// pass, unconsumed overrides fail validation as a whole.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError::UnresolvedServices`] naming every override
    /// that matched no blueprint.
    pub fn merge(&self, mut plan: Vec<Blueprint>) -> Result<Vec<Blueprint>> {
        let mut consumed: HashSet<&str> = HashSet::with_capacity(self.overrides.len());

        for blueprint in &mut plan {
            let name = blueprint.service_definition_name.clone();
            let Some(over) = self.overrides.get(&name) else {
                continue;
            };
            consumed.insert(over.name.as_str());

            let Some(version) = over.version.as_deref() else {
                continue;
            };
            let Some(plugin) = blueprint.plugin.as_container_mut() else {
                debug!("Service '{name}' is not a container plugin, leaving it unchanged");
                continue;
            };

            plugin.image.tag = version.to_string();
            // a fresh name per run makes the platform treat this as a new revision
            plugin.name = format!("{name}-{}", self.run_id);
            plugin.image.always_pull = true;
            if let Some(image) = over.image.as_deref() {
                plugin.image.repository = image.to_string();
            }
            debug!("Overrode service '{name}' to tag '{version}'");
        }

        let mut unresolved: Vec<&str> = self
            .overrides
            .names()
            .filter(|name| !consumed.contains(name))
            .collect();

        if !unresolved.is_empty() {
            unresolved.sort_unstable();
            return Err(PlanError::UnresolvedServices {
                services: unresolved.join(", "),
            }
            .into());
        }

        Ok(plan)
    }

    /// Merges the plan and writes the manifest to a fresh temporary file.
    ///
    /// The file is exclusively owned by this run; callers must not reuse
    /// the path across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, a blueprint cannot be
    /// serialized, or the manifest cannot be written.
    pub fn reconcile(&self, plan: Vec<Blueprint>) -> Result<PathBuf> {
        let merged = self.merge(plan)?;

        let mut documents = Vec::with_capacity(merged.len());
        for blueprint in &merged {
            let document = serde_yaml::to_string(blueprint).map_err(|e| {
                PlanError::SerializeFailed {
                    name: blueprint.service_definition_name.clone(),
                    message: e.to_string(),
                }
            })?;
            documents.push(document);
        }

        let mut file = NamedTempFile::new()?;
        file.write_all(documents.join("---\n").as_bytes())?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|e| e.error)?;

        info!(
            "Wrote manifest with {} blueprint(s) to {}",
            merged.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::blueprint::{Plugin, parse_documents};

    const BASELINE: &str = r"
Plugin:
  _type: container.BasicPlugin
  Name: web
  Image:
    AlwaysPull: false
    Image: registry.acme.dev/web
    Tag: '1.0'
ServiceDefinitionName: web
---
Plugin:
  _type: container.BasicPlugin
  Name: api
  Image:
    AlwaysPull: false
    Image: registry.acme.dev/api
    Tag: '2.0'
ServiceDefinitionName: api
";

    fn baseline() -> Vec<Blueprint> {
        parse_documents(BASELINE).unwrap()
    }

    fn overrides(spec: &str) -> ServiceOverrides {
        ServiceOverrides::parse(spec).unwrap()
    }

    fn container(blueprint: &Blueprint) -> &crate::plan::blueprint::ContainerPlugin {
        match &blueprint.plugin {
            Plugin::Container(plugin) => plugin,
            Plugin::Opaque(_) => panic!("expected container plugin"),
        }
    }

    #[test]
    fn test_version_override_applied() {
        let overrides = overrides("web:1.1");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let merged = reconciler.merge(baseline()).unwrap();

        let web = container(&merged[0]);
        assert_eq!(web.image.tag, "1.1");
        assert_eq!(web.name, "web-4242");
        assert!(web.image.always_pull);
        assert_eq!(web.image.repository, "registry.acme.dev/web");

        let api = container(&merged[1]);
        assert_eq!(api.image.tag, "2.0");
        assert_eq!(api.name, "api");
        assert!(!api.image.always_pull);
    }

    #[test]
    fn test_image_and_version_override_applied() {
        let overrides = overrides("web:myrepo/web:1.1");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let merged = reconciler.merge(baseline()).unwrap();

        let web = container(&merged[0]);
        assert_eq!(web.image.repository, "myrepo/web");
        assert_eq!(web.image.tag, "1.1");
    }

    #[test]
    fn test_bare_name_counts_as_resolved_without_mutation() {
        let overrides = overrides("web");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let merged = reconciler.merge(baseline()).unwrap();

        let web = container(&merged[0]);
        assert_eq!(web.image.tag, "1.0");
        assert_eq!(web.name, "web");
        assert!(!web.image.always_pull);
    }

    #[test]
    fn test_unresolved_override_is_fatal() {
        let overrides = overrides("web:1.1,ghost:2.0");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let err = reconciler.merge(baseline()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("some services do not appear in the plan"));
        assert!(message.contains("ghost"));
        assert!(!message.contains("web,"));
    }

    #[test]
    fn test_unresolved_override_lists_all_missing() {
        let overrides = overrides("ghost:1.0,phantom:2.0");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let err = reconciler.merge(baseline()).unwrap_err();
        assert!(err.to_string().contains("ghost, phantom"));
    }

    #[test]
    fn test_opaque_plugin_passes_through_but_resolves() {
        let input = r"
Plugin:
  _type: secrets.VaultPlugin
  Name: vault
  Path: kv/preview
ServiceDefinitionName: vault
";
        let plan = parse_documents(input).unwrap();
        let overrides = overrides("vault:9.9");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let merged = reconciler.merge(plan.clone()).unwrap();
        assert_eq!(merged, plan);
    }

    #[test]
    fn test_manifest_joins_documents_with_separator() {
        let overrides = overrides("web:1.1");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let path = reconciler.reconcile(baseline()).unwrap();

        let manifest = std::fs::read_to_string(&path).unwrap();
        assert!(manifest.contains("\n---\n"));
        assert!(manifest.contains("Tag: '1.1'"));

        let reparsed = parse_documents(&manifest).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed[0].service_definition_name, "web");
        assert_eq!(reparsed[1].service_definition_name, "api");

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reconcile_is_idempotent_for_fixed_run_id() {
        let overrides = overrides("web:1.1,api");
        let reconciler = PlanReconciler::new(&overrides, "4242");

        let first = reconciler.reconcile(baseline()).unwrap();
        let second = reconciler.reconcile(baseline()).unwrap();
        assert_ne!(first, second);

        let a = std::fs::read_to_string(&first).unwrap();
        let b = std::fs::read_to_string(&second).unwrap();
        assert_eq!(a, b);

        std::fs::remove_file(first).unwrap();
        std::fs::remove_file(second).unwrap();
    }

    #[test]
    fn test_validation_happens_before_manifest_write() {
        let overrides = overrides("ghost:1.0");
        let reconciler = PlanReconciler::new(&overrides, "4242");
        let result = reconciler.reconcile(baseline());
        assert!(matches!(
            result.unwrap_err(),
            crate::error::EnvliftError::Plan(PlanError::UnresolvedServices { .. })
        ));
    }
}
