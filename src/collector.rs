use std::sync::Arc;

use kube::{Client, Config};
use tokio_util::sync::CancellationToken;

use crate::archive::{self, ArchiveReport};
use crate::error::CollectError;
use crate::kubernetes::{KubeLogSource, LabelPodFinder};
use crate::manifest::Manifests;
use crate::options::LogOptions;
use crate::request::LogRequestBuilder;
use crate::traits::{LogStreamSource, PodFinder, StorageClient};
use crate::types::{LogRequest, WorkloadRef};

/// Front door of the pipeline: accepts raw resources or rendered manifests,
/// builds the per-container log requests, and archives them.
pub struct LogCollector {
    builder: LogRequestBuilder,
    options: LogOptions,
}

impl LogCollector {
    /// Collector wired to a cluster: label-selector pod discovery and the
    /// API-server log stream source.
    pub fn new(client: Client) -> Self {
        Self::with_parts(
            Arc::new(LabelPodFinder::new(client.clone())),
            Arc::new(KubeLogSource::new(client)),
        )
    }

    /// Collector over arbitrary collaborators.
    pub fn with_parts(
        pod_finder: Arc<dyn PodFinder>,
        source: Arc<dyn LogStreamSource>,
    ) -> Self {
        Self {
            builder: LogRequestBuilder::new(pod_finder, source),
            options: LogOptions::default(),
        }
    }

    /// Collector for the cluster the environment points at (kubeconfig or
    /// in-cluster service account).
    pub async fn from_cluster() -> Result<Self, CollectError> {
        let config = Config::infer()
            .await
            .map_err(|e| CollectError::ClusterConfig(e.into()))?;
        let client =
            Client::try_from(config).map_err(|e| CollectError::ClusterConfig(e.into()))?;
        Ok(Self::new(client))
    }

    /// Default options applied to every request this collector builds.
    pub fn with_options(mut self, options: LogOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// The underlying builder, for expanding already-known pods directly.
    pub fn request_builder(&self) -> &LogRequestBuilder {
        &self.builder
    }

    /// Resolve manifests to a resource list, then build requests for every
    /// container those resources materialize to.
    pub async fn requests_from_manifests(
        &self,
        manifests: &Manifests,
    ) -> Result<Vec<LogRequest>, CollectError> {
        let resources = manifests.resources()?;
        self.requests_from_resources(&resources).await
    }

    /// Build requests for every container the given resources materialize
    /// to, using this collector's default options.
    pub async fn requests_from_resources(
        &self,
        resources: &[WorkloadRef],
    ) -> Result<Vec<LogRequest>, CollectError> {
        self.builder.from_resources(resources, &self.options).await
    }

    /// Archive all requests at `location`, in parallel. See
    /// [`archive::save_all`] for failure and cancellation semantics.
    pub async fn collect_and_save(
        &self,
        storage: Arc<dyn StorageClient>,
        location: &str,
        requests: Vec<LogRequest>,
        cancel: CancellationToken,
    ) -> Result<ArchiveReport, CollectError> {
        Ok(archive::save_all(storage, location, requests, cancel).await?)
    }
}
