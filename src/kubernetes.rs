//! Cluster-backed implementations of the collaborator traits, built on
//! kube-rs: label-selector pod discovery and the API-server log stream
//! source.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{Api, Client, api::ListParams};
use std::fmt::Debug;
use tracing::debug;

use crate::traits::{LogStreamSource, PodFinder};
use crate::types::{LogStream, LogStreamSpec, WorkloadKind, WorkloadRef};
use crate::utils::{matches_selector, selector_to_labels_string};

trait HasSelector {
    fn selector(&self) -> Option<&LabelSelector>;
}

impl HasSelector for k8s_openapi::api::apps::v1::Deployment {
    fn selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl HasSelector for k8s_openapi::api::apps::v1::StatefulSet {
    fn selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl HasSelector for k8s_openapi::api::apps::v1::DaemonSet {
    fn selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl HasSelector for k8s_openapi::api::apps::v1::ReplicaSet {
    fn selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().map(|s| &s.selector)
    }
}

impl HasSelector for k8s_openapi::api::batch::v1::Job {
    fn selector(&self) -> Option<&LabelSelector> {
        self.spec.as_ref().and_then(|s| s.selector.as_ref())
    }
}

async fn workload_selector<T>(
    client: &Client,
    name: &str,
    namespace: &str,
) -> anyhow::Result<LabelSelector>
where
    T: k8s_openapi::Resource<Scope = k8s_openapi::NamespaceResourceScope>
        + k8s_openapi::Metadata<Ty = k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta>
        + HasSelector
        + serde::de::DeserializeOwned
        + serde::Serialize
        + Clone
        + Debug
        + Send
        + Sync,
{
    let api: Api<T> = Api::namespaced(client.clone(), namespace);
    let workload = api.get(name).await.map_err(|e| {
        anyhow::anyhow!("failed to get {} {}/{}: {}", T::KIND, namespace, name, e)
    })?;
    workload
        .selector()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("{} {}/{} has no selector", T::KIND, namespace, name))
}

/// Discovers pods by resolving each workload's label selector and listing
/// matching pods in its namespace.
pub struct LabelPodFinder {
    client: Client,
}

impl LabelPodFinder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodFinder for LabelPodFinder {
    async fn find_pods(&self, resources: &[WorkloadRef]) -> anyhow::Result<Vec<Pod>> {
        let mut pods = Vec::new();
        for resource in resources {
            let api: Api<Pod> = Api::namespaced(self.client.clone(), &resource.namespace);
            let selector = match resource.kind {
                WorkloadKind::Pod => {
                    let pod = api.get(&resource.name).await.map_err(|e| {
                        anyhow::anyhow!("failed to get pod {}: {}", resource, e)
                    })?;
                    pods.push(pod);
                    continue;
                }
                WorkloadKind::Deployment => {
                    workload_selector::<k8s_openapi::api::apps::v1::Deployment>(
                        &self.client,
                        &resource.name,
                        &resource.namespace,
                    )
                    .await?
                }
                WorkloadKind::StatefulSet => {
                    workload_selector::<k8s_openapi::api::apps::v1::StatefulSet>(
                        &self.client,
                        &resource.name,
                        &resource.namespace,
                    )
                    .await?
                }
                WorkloadKind::DaemonSet => {
                    workload_selector::<k8s_openapi::api::apps::v1::DaemonSet>(
                        &self.client,
                        &resource.name,
                        &resource.namespace,
                    )
                    .await?
                }
                WorkloadKind::ReplicaSet => {
                    workload_selector::<k8s_openapi::api::apps::v1::ReplicaSet>(
                        &self.client,
                        &resource.name,
                        &resource.namespace,
                    )
                    .await?
                }
                WorkloadKind::Job => {
                    workload_selector::<k8s_openapi::api::batch::v1::Job>(
                        &self.client,
                        &resource.name,
                        &resource.namespace,
                    )
                    .await?
                }
            };

            // The list call only understands plain labels; match_expressions
            // are applied client-side afterwards.
            let params = match selector_to_labels_string(&selector) {
                Some(labels) => ListParams::default().labels(&labels),
                None => ListParams::default(),
            };
            let list = api.list(&params).await.map_err(|e| {
                anyhow::anyhow!("failed to list pods for {}: {}", resource, e)
            })?;
            let before = pods.len();
            pods.extend(list.items.into_iter().filter(|pod| {
                let labels = pod.metadata.labels.clone().unwrap_or_default();
                matches_selector(&labels, &selector)
            }));
            debug!("{} matched {} pod(s)", resource, pods.len() - before);
        }
        Ok(pods)
    }
}

/// Opens container log streams through the Kubernetes API server.
pub struct KubeLogSource {
    client: Client,
}

impl KubeLogSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogStreamSource for KubeLogSource {
    async fn open(&self, spec: &LogStreamSpec) -> anyhow::Result<LogStream> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &spec.namespace);
        let params = spec.options.to_log_params(&spec.container);
        debug!(
            "opening log stream for {}/{}/{}",
            spec.namespace, spec.pod_name, spec.container
        );
        let stream = api.log_stream(&spec.pod_name, &params).await.map_err(|e| {
            anyhow::anyhow!(
                "failed to open log stream for {}/{}/{}: {}",
                spec.namespace,
                spec.pod_name,
                spec.container,
                e
            )
        })?;
        let stream: LogStream = Box::pin(stream);
        Ok(stream)
    }
}
