use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use futures::io::AsyncRead;

use crate::options::LogOptions;
use crate::traits::LogStreamSource;

/// Workload kinds whose pods can be log-collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    Pod,
}

impl WorkloadKind {
    /// Parse a manifest `kind` string, case-insensitively. Returns `None`
    /// for kinds that do not materialize pods (Service, ConfigMap, ...).
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "deployment" => Some(Self::Deployment),
            "statefulset" => Some(Self::StatefulSet),
            "daemonset" => Some(Self::DaemonSet),
            "replicaset" => Some(Self::ReplicaSet),
            "job" => Some(Self::Job),
            "pod" => Some(Self::Pod),
            _ => None,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
            Self::DaemonSet => "daemonset",
            Self::ReplicaSet => "replicaset",
            Self::Job => "job",
            Self::Pod => "pod",
        };
        f.write_str(kind)
    }
}

/// A reference to one deployed workload resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
}

impl WorkloadRef {
    pub fn new(kind: WorkloadKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.kind, self.name, self.namespace)
    }
}

/// A container's log output as an opaque byte stream. Dropping the stream
/// closes it, on every exit path.
pub type LogStream = Pin<Box<dyn AsyncRead + Send>>;

/// Everything a [`LogStreamSource`] needs to open one container's logs.
#[derive(Debug, Clone)]
pub struct LogStreamSpec {
    pub namespace: String,
    pub pod_name: String,
    pub container: String,
    pub options: LogOptions,
}

/// One pending log retrieval for exactly one container.
///
/// A request is an immutable snapshot taken at discovery time; the pod may
/// change state afterwards, and no revalidation happens before the stream is
/// opened. Opening consumes the request, so each one is used at most once.
pub struct LogRequest {
    pod_labels: BTreeMap<String, String>,
    spec: LogStreamSpec,
    source: Arc<dyn LogStreamSource>,
}

impl LogRequest {
    pub(crate) fn new(
        namespace: String,
        pod_name: String,
        pod_labels: BTreeMap<String, String>,
        container: String,
        options: LogOptions,
        source: Arc<dyn LogStreamSource>,
    ) -> Self {
        Self {
            pod_labels,
            spec: LogStreamSpec {
                namespace,
                pod_name,
                container,
                options,
            },
            source,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.spec.namespace
    }

    pub fn pod_name(&self) -> &str {
        &self.spec.pod_name
    }

    pub fn container_name(&self) -> &str {
        &self.spec.container
    }

    /// Labels of the owning pod, captured at discovery time.
    pub fn pod_labels(&self) -> &BTreeMap<String, String> {
        &self.pod_labels
    }

    pub fn options(&self) -> &LogOptions {
        &self.spec.options
    }

    /// The archive entry name for this request. Unique per
    /// (namespace, pod, container) triple within one collection run.
    pub fn resource_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.spec.namespace, self.spec.pod_name, self.spec.container
        )
    }

    /// Open the log stream, consuming the request.
    pub async fn open(self) -> anyhow::Result<LogStream> {
        self.source.open(&self.spec).await
    }
}

impl fmt::Debug for LogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRequest")
            .field("spec", &self.spec)
            .field("pod_labels", &self.pod_labels)
            .finish_non_exhaustive()
    }
}

/// The unit handed to a storage client: an archive entry name and the byte
/// stream to persist under it. The stream travels with the object; whoever
/// drops the object closes the stream.
pub struct StorageObject {
    pub name: String,
    pub data: LogStream,
}

impl fmt::Debug for StorageObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageObject")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
