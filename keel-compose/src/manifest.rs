//! Compose manifest handling
//!
//! Manifests are stored verbatim. Before every runner invocation they are
//! normalized: the managed-resource label is stripped from each service and
//! applied again, and a project name is pinned so each stack maps to exactly
//! one compose project.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{Result, RunnerError};

/// Sentinel label marking containers owned by the orchestrator
pub const MANAGED_LABEL: &str = "io.keel.managed";

const MANAGED_VALUE: &str = "true";

/// A parsed, structurally valid compose document
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    document: Value,
}

impl Manifest {
    /// Parse manifest text.
    ///
    /// # Errors
    /// Returns `InvalidManifest` if:
    /// - The text is not valid YAML
    /// - The document is not a mapping
    /// - `services` is missing, empty, or holds a non-mapping service
    pub fn parse(code: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(code)
            .map_err(|e| RunnerError::invalid_manifest(e.to_string()))?;

        if !document.is_mapping() {
            return Err(RunnerError::invalid_manifest(
                "manifest must be a YAML mapping",
            ));
        }

        let services = document
            .get("services")
            .and_then(Value::as_mapping)
            .ok_or_else(|| RunnerError::invalid_manifest("manifest has no `services` mapping"))?;

        if services.is_empty() {
            return Err(RunnerError::invalid_manifest(
                "manifest must declare at least one service",
            ));
        }

        for (name, service) in services {
            if !service.is_mapping() {
                return Err(RunnerError::invalid_manifest(format!(
                    "service `{}` must be a mapping",
                    name.as_str().unwrap_or("?")
                )));
            }
        }

        Ok(Self { document })
    }

    /// Service names, in document order
    pub fn service_names(&self) -> Vec<String> {
        self.services()
            .map(|services| {
                services
                    .keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Top-level compose project name, if declared
    pub fn project_name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    /// Pin the project name unless the manifest declares its own
    pub fn ensure_project_name(&mut self, default: &str) {
        if self.project_name().is_some() {
            return;
        }
        if let Some(root) = self.document.as_mapping_mut() {
            root.insert(Value::from("name"), Value::from(default));
        }
    }

    /// Strip then reapply the managed label on every service
    pub fn apply_managed_label(&mut self) {
        let Some(services) = self
            .document
            .get_mut("services")
            .and_then(Value::as_mapping_mut)
        else {
            return;
        };

        for service in services.values_mut() {
            let Some(service) = service.as_mapping_mut() else {
                continue;
            };
            label_service(service);
        }
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.document)
            .map_err(|e| RunnerError::invalid_manifest(e.to_string()))
    }

    fn services(&self) -> Option<&Mapping> {
        self.document.get("services").and_then(Value::as_mapping)
    }
}

/// Normalize manifest text for a runner invocation.
///
/// # Arguments
/// * `code` - Manifest text as stored
/// * `project` - Project name to pin when the manifest has none
pub fn normalize(code: &str, project: &str) -> Result<String> {
    let mut manifest = Manifest::parse(code)?;
    manifest.apply_managed_label();
    manifest.ensure_project_name(project);

    debug!(
        "Normalized manifest for project {} ({} service(s))",
        manifest.project_name().unwrap_or(project),
        manifest.service_names().len()
    );

    manifest.to_yaml()
}

fn label_service(service: &mut Mapping) {
    match service.get_mut("labels") {
        Some(Value::Mapping(labels)) => {
            labels.remove(MANAGED_LABEL);
            labels.insert(Value::from(MANAGED_LABEL), Value::from(MANAGED_VALUE));
        }
        Some(Value::Sequence(labels)) => {
            labels.retain(|entry| !is_managed_entry(entry));
            labels.push(Value::from(format!("{}={}", MANAGED_LABEL, MANAGED_VALUE)));
        }
        _ => {
            let mut labels = Mapping::new();
            labels.insert(Value::from(MANAGED_LABEL), Value::from(MANAGED_VALUE));
            service.insert(Value::from("labels"), Value::Mapping(labels));
        }
    }
}

/// `KEY=VALUE` or bare `KEY` list entry naming the managed label
fn is_managed_entry(entry: &Value) -> bool {
    entry
        .as_str()
        .map(|s| s.split('=').next().unwrap_or_default().trim() == MANAGED_LABEL)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
services:
  web:
    image: nginx:alpine
    container_name: sample_web
"#;

    fn labels_of(yaml: &str, service: &str) -> Value {
        let doc: Value = serde_yaml::from_str(yaml).unwrap();
        doc["services"][service]["labels"].clone()
    }

    #[test]
    fn test_parse_rejects_non_yaml() {
        let result = Manifest::parse("services: [unclosed");
        assert!(matches!(result, Err(RunnerError::InvalidManifest { .. })));
    }

    #[test]
    fn test_parse_requires_services() {
        assert!(Manifest::parse("version: '3'").is_err());
        assert!(Manifest::parse("services: {}").is_err());
        assert!(Manifest::parse("- just\n- a list").is_err());
        assert!(Manifest::parse("services:\n  web: nginx").is_err());
    }

    #[test]
    fn test_parse_lists_services() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.service_names(), vec!["web".to_string()]);
        assert_eq!(manifest.project_name(), None);
    }

    #[test]
    fn test_normalize_adds_label_and_project() {
        let out = normalize(SAMPLE, "keel-test").unwrap();
        let doc: Value = serde_yaml::from_str(&out).unwrap();

        assert_eq!(doc["name"].as_str(), Some("keel-test"));
        assert_eq!(
            doc["services"]["web"]["labels"][MANAGED_LABEL].as_str(),
            Some("true")
        );
        assert_eq!(
            doc["services"]["web"]["container_name"].as_str(),
            Some("sample_web")
        );
    }

    #[test]
    fn test_normalize_keeps_declared_project_name() {
        let code = "name: mine\nservices:\n  web:\n    image: nginx\n";
        let out = normalize(code, "keel-test").unwrap();
        let doc: Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(doc["name"].as_str(), Some("mine"));
    }

    #[test]
    fn test_normalize_replaces_foreign_managed_label_in_mapping() {
        let code = r#"
services:
  web:
    image: nginx
    labels:
      io.keel.managed: "false"
      team: infra
"#;
        let labels = labels_of(&normalize(code, "p").unwrap(), "web");
        assert_eq!(labels[MANAGED_LABEL].as_str(), Some("true"));
        assert_eq!(labels["team"].as_str(), Some("infra"));
        assert_eq!(labels.as_mapping().unwrap().len(), 2);
    }

    #[test]
    fn test_normalize_replaces_managed_label_in_list() {
        let code = r#"
services:
  web:
    image: nginx
    labels:
      - io.keel.managed=false
      - io.keel.managed
      - team=infra
"#;
        let labels = labels_of(&normalize(code, "p").unwrap(), "web");
        let entries: Vec<&str> = labels
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(entries, vec!["team=infra", "io.keel.managed=true"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(SAMPLE, "p").unwrap();
        let twice = normalize(&once, "p").unwrap();
        assert_eq!(once, twice);
    }
}
