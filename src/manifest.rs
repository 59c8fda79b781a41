//! Resolution of rendered workload manifests into workload references.

use serde::Deserialize;

use crate::error::ManifestError;
use crate::types::{WorkloadKind, WorkloadRef};

const DEFAULT_NAMESPACE: &str = "default";

/// One named, rendered manifest; the content may hold any number of YAML
/// documents.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: String,
    pub content: String,
}

impl Manifest {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// An ordered set of manifests, resolved as one unit.
#[derive(Debug, Clone, Default)]
pub struct Manifests(pub Vec<Manifest>);

#[derive(Debug, Deserialize)]
struct ManifestDoc {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    metadata: DocMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct DocMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

impl Manifests {
    pub fn new(manifests: Vec<Manifest>) -> Self {
        Self(manifests)
    }

    /// Extract every workload document as a [`WorkloadRef`], in manifest
    /// then document order. Empty documents and non-workload kinds are
    /// skipped; malformed YAML and workloads without a `metadata.name` are
    /// errors.
    pub fn resources(&self) -> Result<Vec<WorkloadRef>, ManifestError> {
        let mut resources = Vec::new();
        for manifest in &self.0 {
            for document in serde_yaml::Deserializer::from_str(&manifest.content) {
                let value =
                    serde_yaml::Value::deserialize(document).map_err(|source| {
                        ManifestError::Parse {
                            name: manifest.name.clone(),
                            source,
                        }
                    })?;
                if value.is_null() {
                    continue;
                }
                let doc: ManifestDoc =
                    serde_yaml::from_value(value).map_err(|source| ManifestError::Parse {
                        name: manifest.name.clone(),
                        source,
                    })?;
                let Some(kind_str) = doc.kind else {
                    continue;
                };
                let Some(kind) = WorkloadKind::parse(&kind_str) else {
                    continue;
                };
                let name = doc.metadata.name.ok_or_else(|| ManifestError::MissingName {
                    name: manifest.name.clone(),
                    kind: kind_str,
                })?;
                let namespace = doc
                    .metadata
                    .namespace
                    .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
                resources.push(WorkloadRef::new(kind, name, namespace));
            }
        }
        Ok(resources)
    }
}

impl FromIterator<Manifest> for Manifests {
    fn from_iter<I: IntoIterator<Item = Manifest>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_from_multi_document_yaml() {
        let manifest = Manifest::new(
            "release",
            r#"---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: gateway
  namespace: edge
---
apiVersion: v1
kind: Service
metadata:
  name: gateway
---
apiVersion: batch/v1
kind: Job
metadata:
  name: migrate
"#,
        );
        let resources = Manifests::new(vec![manifest]).resources().unwrap();
        assert_eq!(
            resources,
            vec![
                WorkloadRef::new(WorkloadKind::Deployment, "gateway", "edge"),
                WorkloadRef::new(WorkloadKind::Job, "migrate", "default"),
            ]
        );
    }

    #[test]
    fn empty_documents_are_skipped() {
        let manifest = Manifest::new("empty", "---\n---\n# just a comment\n");
        let resources = Manifests::new(vec![manifest]).resources().unwrap();
        assert!(resources.is_empty());
    }

    #[test]
    fn manifests_resolve_in_order() {
        let first = Manifest::new(
            "first",
            "kind: Pod\nmetadata:\n  name: one\n  namespace: a\n",
        );
        let second = Manifest::new(
            "second",
            "kind: Pod\nmetadata:\n  name: two\n  namespace: b\n",
        );
        let resources = Manifests::new(vec![first, second]).resources().unwrap();
        let names: Vec<_> = resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn workload_without_name_is_an_error() {
        let manifest = Manifest::new("broken", "kind: Deployment\nmetadata: {}\n");
        let err = Manifests::new(vec![manifest]).resources().unwrap_err();
        assert!(matches!(err, ManifestError::MissingName { .. }));
        assert!(err.to_string().contains("Deployment"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let manifest = Manifest::new("broken", "kind: [unclosed\n");
        let err = Manifests::new(vec![manifest]).resources().unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }
}
