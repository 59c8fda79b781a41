use thiserror::Error;

/// Errors surfaced by collection entry points.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Pod or resource discovery failed upstream. Fatal to the whole run;
    /// no request list is produced.
    #[error("pod discovery failed: {0}")]
    Discovery(#[source] anyhow::Error),

    /// A manifest could not be resolved to a resource list.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The cluster client could not be constructed.
    #[error("failed to initialize cluster client: {0}")]
    ClusterConfig(#[source] anyhow::Error),

    /// One or more log requests failed while archiving.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// A single log request's terminal failure. Every variant names the
/// request's archive entry id.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Opening the log stream failed; no save was attempted.
    #[error("opening log stream for {id} failed: {source}")]
    StreamOpen {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The stream opened but the storage client rejected or failed the save.
    #[error("saving logs for {id} failed: {source}")]
    Save {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The caller's cancellation signal fired before this request finished.
    #[error("log request {id} was cancelled")]
    Cancelled { id: String },

    /// The archive task itself died (panic or runtime shutdown).
    #[error("archive task for {id} aborted: {source}")]
    Aborted {
        id: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl RequestError {
    /// The archive entry id of the request that failed.
    pub fn resource_id(&self) -> &str {
        match self {
            Self::StreamOpen { id, .. }
            | Self::Save { id, .. }
            | Self::Cancelled { id }
            | Self::Aborted { id, .. } => id,
        }
    }
}

/// Aggregate failure of a parallel archive batch.
///
/// Carries every per-request failure, plus the ids that did succeed, so a
/// caller can recover the full success/failure partition from the error
/// alone. Artifacts already written stay written.
#[derive(Debug, Error)]
#[error(
    "{} of {} log request(s) failed to archive: [{}]",
    .failures.len(),
    .attempted,
    failed_ids(.failures)
)]
pub struct ArchiveError {
    /// Total number of requests in the batch.
    pub attempted: usize,
    /// Archive entry ids that were persisted successfully.
    pub saved: Vec<String>,
    /// One entry per failed request.
    pub failures: Vec<RequestError>,
}

fn failed_ids(failures: &[RequestError]) -> String {
    failures
        .iter()
        .map(RequestError::resource_id)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from resolving manifests into workload references.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A manifest document was not valid YAML.
    #[error("manifest {name} is not valid YAML: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A workload document had no `metadata.name`.
    #[error("manifest {name} contains a {kind} with no metadata.name")]
    MissingName { name: String, kind: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_names_its_request() {
        let err = RequestError::StreamOpen {
            id: "edge_gateway-0_web".to_string(),
            source: anyhow::anyhow!("connection reset"),
        };
        assert_eq!(err.resource_id(), "edge_gateway-0_web");
        assert!(err.to_string().contains("edge_gateway-0_web"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn archive_error_lists_every_failed_id() {
        let err = ArchiveError {
            attempted: 3,
            saved: vec!["edge_gateway-0_web".to_string()],
            failures: vec![
                RequestError::StreamOpen {
                    id: "edge_gateway-0_sidecar".to_string(),
                    source: anyhow::anyhow!("boom"),
                },
                RequestError::Save {
                    id: "edge_gateway-1_web".to_string(),
                    source: anyhow::anyhow!("disk full"),
                },
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("2 of 3"));
        assert!(rendered.contains("edge_gateway-0_sidecar"));
        assert!(rendered.contains("edge_gateway-1_web"));
    }

    #[test]
    fn collect_error_wraps_discovery_failure() {
        let err = CollectError::Discovery(anyhow::anyhow!("connection refused"));
        assert!(err.to_string().contains("pod discovery failed"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CollectError>();
        assert_send_sync::<RequestError>();
        assert_send_sync::<ArchiveError>();
        assert_send_sync::<ManifestError>();
    }
}
