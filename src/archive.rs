//! Parallel execution of log requests against a storage client.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{ArchiveError, RequestError};
use crate::traits::StorageClient;
use crate::types::{LogRequest, StorageObject};

/// What a fully successful archive run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Archive entry ids persisted at the location, in completion order.
    pub saved: Vec<String>,
}

/// Stream every request's logs to the storage client, all requests in
/// parallel.
///
/// Requests run independently: a failure in one never stops its siblings,
/// and the call returns only once every request has reached a terminal
/// state. Artifacts written by successful requests stay written even when
/// the batch as a whole fails.
///
/// The cancellation token is the caller's deadline: once it fires, requests
/// that have not started stop before opening a stream, and in-flight opens
/// and saves are abandoned (dropping, and thereby closing, their streams).
/// Cancelled requests are reported as failures so the aggregate still
/// accounts for every request.
pub async fn save_all(
    storage: Arc<dyn StorageClient>,
    location: &str,
    requests: Vec<LogRequest>,
    cancel: CancellationToken,
) -> Result<ArchiveReport, ArchiveError> {
    if requests.is_empty() {
        return Ok(ArchiveReport::default());
    }

    let attempted = requests.len();
    let mut tasks: Vec<(String, JoinHandle<Result<(), RequestError>>)> =
        Vec::with_capacity(attempted);
    for request in requests {
        let id = request.resource_id();
        let task = tokio::spawn(archive_one(
            Arc::clone(&storage),
            location.to_string(),
            request,
            cancel.clone(),
        ));
        tasks.push((id, task));
    }

    let mut saved = Vec::new();
    let mut failures = Vec::new();
    for (id, task) in tasks {
        match task.await {
            Ok(Ok(())) => saved.push(id),
            Ok(Err(failure)) => {
                warn!("{}", failure);
                failures.push(failure);
            }
            Err(source) => failures.push(RequestError::Aborted { id, source }),
        }
    }

    if failures.is_empty() {
        info!("archived {} log stream(s) to {}", saved.len(), location);
        Ok(ArchiveReport { saved })
    } else {
        Err(ArchiveError {
            attempted,
            saved,
            failures,
        })
    }
}

async fn archive_one(
    storage: Arc<dyn StorageClient>,
    location: String,
    request: LogRequest,
    cancel: CancellationToken,
) -> Result<(), RequestError> {
    let id = request.resource_id();
    if cancel.is_cancelled() {
        return Err(RequestError::Cancelled { id });
    }

    let stream = tokio::select! {
        () = cancel.cancelled() => return Err(RequestError::Cancelled { id }),
        opened = request.open() => opened.map_err(|source| RequestError::StreamOpen {
            id: id.clone(),
            source,
        })?,
    };

    let object = StorageObject {
        name: id.clone(),
        data: stream,
    };
    tokio::select! {
        // Dropping the abandoned save future closes the stream.
        () = cancel.cancelled() => Err(RequestError::Cancelled { id }),
        result = storage.save(&location, object) => {
            result.map_err(|source| RequestError::Save { id, source })
        }
    }
}
