use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use tracing::{debug, warn};

use crate::error::CollectError;
use crate::options::LogOptions;
use crate::traits::{LogStreamSource, PodFinder};
use crate::types::{LogRequest, WorkloadRef};

/// Deterministic expansion of a pod set into one [`LogRequest`] per
/// container.
///
/// Discovery (the only cluster-dependent step) is delegated to the
/// [`PodFinder`]; expansion itself is a pure function of the pod
/// specifications it is handed.
pub struct LogRequestBuilder {
    pod_finder: Arc<dyn PodFinder>,
    source: Arc<dyn LogStreamSource>,
}

impl LogRequestBuilder {
    pub fn new(pod_finder: Arc<dyn PodFinder>, source: Arc<dyn LogStreamSource>) -> Self {
        Self { pod_finder, source }
    }

    /// One request per container of the pod: standard containers first,
    /// then init containers. A pod with no spec or no containers yields
    /// nothing.
    pub fn build_for_pod(&self, pod: &Pod, options: &LogOptions) -> Vec<LogRequest> {
        let namespace = pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| "default".to_string());
        let pod_name = pod.metadata.name.clone().unwrap_or_default();
        let labels = pod.metadata.labels.clone().unwrap_or_default();
        let Some(spec) = &pod.spec else {
            warn!("pod {}/{} has no spec, skipping", namespace, pod_name);
            return Vec::new();
        };

        let containers = spec
            .containers
            .iter()
            .chain(spec.init_containers.iter().flatten());
        containers
            .map(|container| {
                LogRequest::new(
                    namespace.clone(),
                    pod_name.clone(),
                    labels.clone(),
                    container.name.clone(),
                    options.clone(),
                    Arc::clone(&self.source),
                )
            })
            .collect()
    }

    /// Expand every pod, concatenating in pod order then container order.
    /// No deduplication: a pod listed twice yields its requests twice.
    pub fn build_for_pods(&self, pods: &[Pod], options: &LogOptions) -> Vec<LogRequest> {
        pods.iter()
            .flat_map(|pod| self.build_for_pod(pod, options))
            .collect()
    }

    /// Resolve resources to pods through the finder, then expand. A finder
    /// failure aborts the whole call; nothing is partially built.
    pub async fn from_resources(
        &self,
        resources: &[WorkloadRef],
        options: &LogOptions,
    ) -> Result<Vec<LogRequest>, CollectError> {
        let pods = self
            .pod_finder
            .find_pods(resources)
            .await
            .map_err(CollectError::Discovery)?;
        debug!(
            "discovered {} pod(s) for {} resource(s)",
            pods.len(),
            resources.len()
        );
        Ok(self.build_for_pods(&pods, options))
    }
}
