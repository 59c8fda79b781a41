//! Collaborator contracts the collection pipeline depends on.
//!
//! Each trait isolates one cluster- or storage-dependent step so the rest of
//! the pipeline stays a pure function of already-known data. Failures are
//! opaque to the pipeline and propagated as-is.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;

use crate::types::{LogStream, LogStreamSpec, StorageObject, WorkloadRef};

/// Resolves a set of deployed resources to the concrete pods they
/// materialize to.
#[async_trait]
pub trait PodFinder: Send + Sync {
    /// Return every pod currently matching the given resources. Pods are
    /// returned per-resource with no deduplication; a resource listed twice
    /// yields its pods twice.
    async fn find_pods(&self, resources: &[WorkloadRef]) -> anyhow::Result<Vec<Pod>>;
}

/// Opens a byte stream of one container's log output.
#[async_trait]
pub trait LogStreamSource: Send + Sync {
    async fn open(&self, spec: &LogStreamSpec) -> anyhow::Result<LogStream>;
}

/// Durably persists a named byte stream at a location.
///
/// Implementations must fully drain the object's stream or reject it, and
/// must be safe for concurrent invocation from many tasks at once.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn save(&self, location: &str, object: StorageObject) -> anyhow::Result<()>;
}
