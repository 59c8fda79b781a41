//! Concurrent collection and archival of Kubernetes workload logs.
//!
//! Given a set of deployed resources (or the manifests that produced them),
//! this crate discovers every pod they materialize to, builds one log
//! request per container (standard containers first, then init containers),
//! streams all of them in parallel, and persists each stream through a
//! pluggable [`StorageClient`]. Failures are isolated per request and
//! aggregated: one broken container never blocks the rest, and the
//! resulting [`ArchiveError`] names every request that failed alongside the
//! ones that were saved.
//!
//! ```no_run
//! use std::sync::Arc;
//! use kube_log_archive::{
//!     FileStorage, LogCollector, LogOptions, WorkloadKind, WorkloadRef,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let collector = LogCollector::from_cluster()
//!     .await?
//!     .with_options(LogOptions::new().with_previous());
//!
//! let resources = vec![WorkloadRef::new(WorkloadKind::Deployment, "gateway", "edge")];
//! let requests = collector.requests_from_resources(&resources).await?;
//!
//! let storage = Arc::new(FileStorage::new("/tmp/debug"));
//! let report = collector
//!     .collect_and_save(storage, "logs", requests, CancellationToken::new())
//!     .await?;
//! println!("archived {} stream(s)", report.saved.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod collector;
pub mod error;
pub mod kubernetes;
pub mod manifest;
pub mod options;
pub mod request;
pub mod storage;
pub mod traits;
pub mod types;
pub mod utils;

pub use archive::{ArchiveReport, save_all};
pub use collector::LogCollector;
pub use error::{ArchiveError, CollectError, ManifestError, RequestError};
pub use kubernetes::{KubeLogSource, LabelPodFinder};
pub use manifest::{Manifest, Manifests};
pub use options::LogOptions;
pub use request::LogRequestBuilder;
pub use storage::{FileStorage, MemoryStorage};
pub use traits::{LogStreamSource, PodFinder, StorageClient};
pub use types::{LogRequest, LogStream, LogStreamSpec, StorageObject, WorkloadKind, WorkloadRef};
