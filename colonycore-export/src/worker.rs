// colonycore-export/src/worker.rs
// ============================================================================
// Module: Export Worker
// Description: The single-writer background worker that drains queued
// export jobs, renders each template's rows, and writes artifacts to a
// blob store.
// Purpose: Keep export rendering off the request path: EnqueueExport
// validates and returns immediately, the worker thread does the rest.
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use colonycore_core::PersistentStore;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::AuditSink;
use crate::audit::ExportAuditEntry;
use crate::blob::BlobStore;
use crate::format::ExportFormat;
use crate::template::DatasetTemplateRegistry;
use crate::template::ExportScope;

/// An export job's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Accepted, waiting for the worker to pick it up.
    Queued,
    /// The worker is currently rendering and writing this job's artifacts.
    Running,
    /// Every requested format was rendered and written.
    Succeeded,
    /// Rendering or writing failed; see [`ExportRecord::error`].
    Failed,
}

/// One artifact the worker wrote for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    /// The format this artifact was rendered in.
    pub format: ExportFormat,
    /// The blob store key the artifact was written under.
    pub key: String,
    /// The rendered artifact's byte length.
    pub size: usize,
}

/// The caller-supplied request to render a dataset template.
#[derive(Debug, Clone)]
pub struct ExportInput {
    /// Which dataset template to render.
    pub template_slug: String,
    /// Which formats to render it into.
    pub formats: Vec<ExportFormat>,
    /// The scope filter the template's resolver applies.
    pub scope: ExportScope,
    /// Who requested the export, recorded in the audit trail.
    pub requestor: String,
}

/// A tracked export job: its request, current status, and (once terminal)
/// its artifacts or error.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    /// The job's id, used to key blob store artifacts and to poll status.
    pub id: String,
    /// The dataset template slug that was requested.
    pub template_slug: String,
    /// The formats that were requested.
    pub formats: Vec<ExportFormat>,
    /// Who requested the export.
    pub requestor: String,
    /// The job's current lifecycle state.
    pub status: ExportStatus,
    /// Artifacts written so far. Populated incrementally as each format
    /// finishes, even if a later format in the same job fails.
    pub artifacts: Vec<ExportArtifact>,
    /// The failure message, if `status` is [`ExportStatus::Failed`].
    pub error: Option<String>,
}

/// Errors [`ExportWorker::enqueue_export`] can return synchronously.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No dataset template is registered under this slug.
    #[error("unknown dataset template: {0}")]
    UnknownTemplate(String),
    /// The template doesn't support one of the requested formats.
    #[error("dataset template {slug} does not support format {format}")]
    UnsupportedFormat {
        /// The template slug that was requested.
        slug: String,
        /// The unsupported format.
        format: ExportFormat,
    },
    /// No export is tracked under this id.
    #[error("unknown export id: {0}")]
    NotFound(String),
}

/// A prepared, validated export job, handed from `enqueue_export` to the
/// worker thread over the bounded queue.
struct Job {
    /// The export id this job renders artifacts for.
    id: String,
    /// The validated export request.
    input: ExportInput,
}

/// Tracked export records, keyed by id. Shared between the public API and
/// the worker thread.
type Records = Arc<Mutex<BTreeMap<String, ExportRecord>>>;

/// Drains a bounded queue of validated export jobs, one at a time, against
/// a shared store, dataset template registry, blob store, and audit sink.
///
/// `EnqueueExport` validates synchronously and returns immediately; the
/// worker thread does the rest: open a view, resolve rows, render each
/// format, write it to the blob store, and record an audit entry. A
/// template whose resolver or renderer fails never crashes the worker loop
/// -- the job is marked `Failed` and the loop moves to the next one.
pub struct ExportWorker<S> {
    /// The store jobs resolve dataset rows against.
    store: Arc<S>,
    /// Registered dataset templates.
    templates: Arc<DatasetTemplateRegistry>,
    /// Where rendered artifacts are written.
    blob_store: Arc<dyn BlobStore>,
    /// Where per-job audit entries are recorded.
    audit_sink: Arc<dyn AuditSink>,
    /// Tracked export records, keyed by id.
    records: Records,
    /// Sending half of the bounded job queue. `enqueue_export` blocks on
    /// this when the queue is full; it never fails the request. `stop`
    /// takes and drops it so the worker thread's receive loop terminates.
    sender: Mutex<Option<mpsc::SyncSender<Job>>>,
    /// The receiving half, taken by `start` and moved into the worker
    /// thread. `None` once the worker has been started.
    receiver: Mutex<Option<mpsc::Receiver<Job>>>,
    /// The running worker thread, if `start` has been called.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<S> ExportWorker<S>
where
    S: PersistentStore + Send + Sync + 'static,
{
    /// Builds a worker with the given bounded queue capacity. Call
    /// [`ExportWorker::start`] to begin draining it.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        templates: DatasetTemplateRegistry,
        blob_store: Arc<dyn BlobStore>,
        audit_sink: Arc<dyn AuditSink>,
        queue_capacity: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::sync_channel(queue_capacity.max(1));
        Self {
            store,
            templates: Arc::new(templates),
            blob_store,
            audit_sink,
            records: Arc::new(Mutex::new(BTreeMap::new())),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            handle: Mutex::new(None),
        }
    }

    /// Validates the request and queues it for background processing.
    /// Returns the new record in [`ExportStatus::Queued`].
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnknownTemplate`] or
    /// [`ExportError::UnsupportedFormat`] synchronously, before any record
    /// is created, if the template or one of its requested formats isn't
    /// registered.
    pub fn enqueue_export(&self, input: ExportInput) -> Result<ExportRecord, ExportError> {
        let template = self
            .templates
            .get(&input.template_slug)
            .ok_or_else(|| ExportError::UnknownTemplate(input.template_slug.clone()))?;
        for format in &input.formats {
            if !template.supports(*format) {
                return Err(ExportError::UnsupportedFormat {
                    slug: input.template_slug.clone(),
                    format: *format,
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        let record = ExportRecord {
            id: id.clone(),
            template_slug: input.template_slug.clone(),
            formats: input.formats.clone(),
            requestor: input.requestor.clone(),
            status: ExportStatus::Queued,
            artifacts: Vec::new(),
            error: None,
        };

        if let Ok(mut records) = self.records.lock() {
            records.insert(id.clone(), record.clone());
        }

        // Blocks only if the queue is full; never fails the request. `stop`
        // may have already taken and dropped the sender, in which case the
        // job is silently discarded rather than panicking on a closed send.
        let sender = self.sender.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone();
        if let Some(sender) = sender {
            let _ = sender.send(Job { id, input });
        }

        Ok(record)
    }

    /// Looks up a tracked export's current record.
    #[must_use]
    pub fn get_export(&self, id: &str) -> Option<ExportRecord> {
        self.records.lock().ok()?.get(id).cloned()
    }

    /// Spawns the single background worker thread. Idempotent: a second
    /// call while the worker is already running is a no-op.
    pub fn start(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if handle.is_some() {
            return;
        }
        let Some(receiver) =
            self.receiver.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take()
        else {
            return;
        };

        let store = Arc::clone(&self.store);
        let templates = Arc::clone(&self.templates);
        let blob_store = Arc::clone(&self.blob_store);
        let audit_sink = Arc::clone(&self.audit_sink);
        let records = Arc::clone(&self.records);

        *handle = Some(thread::spawn(move || {
            for job in receiver {
                process_job(&store, &templates, &blob_store, &audit_sink, &records, job);
            }
        }));
    }

    /// Stops accepting new work and waits up to `timeout` for the worker
    /// thread to drain its queue and exit. Idempotent: calling `stop` when
    /// no worker is running is a no-op. Jobs already queued are still
    /// processed before the thread exits; `stop` closes the queue by
    /// dropping the sender, which ends the worker's `for job in receiver`
    /// loop once the in-flight job (if any) and any already-queued jobs
    /// finish.
    pub fn stop(&self, timeout: Duration) {
        self.sender.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take();

        let handle = self.handle.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take();
        if let Some(handle) = handle {
            let deadline = std::time::Instant::now() + timeout;
            while !handle.is_finished() && std::time::Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

/// Processes one job end to end: `Queued` -> `Running` -> resolve rows,
/// render and write each format, append an audit entry, and transition to
/// a terminal status. A failure partway through leaves already-written
/// artifacts in place and records the job as `Failed`.
fn process_job<S: PersistentStore>(
    store: &S,
    templates: &DatasetTemplateRegistry,
    blob_store: &Arc<dyn BlobStore>,
    audit_sink: &Arc<dyn AuditSink>,
    records: &Records,
    job: Job,
) {
    set_status(records, &job.id, ExportStatus::Running, None);

    let outcome = render_and_write(store, templates, blob_store, &job);

    let (status, artifacts, error) = match outcome {
        Ok(artifacts) => (ExportStatus::Succeeded, artifacts, None),
        Err((artifacts, message)) => (ExportStatus::Failed, artifacts, Some(message)),
    };

    if let Ok(mut records) = records.lock()
        && let Some(record) = records.get_mut(&job.id)
    {
        record.status = status;
        record.artifacts = artifacts;
        record.error.clone_from(&error);
    }

    audit_sink.record(&ExportAuditEntry {
        export_id: job.id,
        requestor: job.input.requestor,
        template_slug: job.input.template_slug,
        formats: job.input.formats,
        status,
        timestamp: colonycore_core::Timestamp::now().to_string(),
    });
}

/// Resolves the template's rows once and renders/writes every requested
/// format against them. Returns the artifacts written so far alongside the
/// first error encountered, if any.
fn render_and_write<S: PersistentStore>(
    store: &S,
    templates: &DatasetTemplateRegistry,
    blob_store: &Arc<dyn BlobStore>,
    job: &Job,
) -> Result<Vec<ExportArtifact>, (Vec<ExportArtifact>, String)> {
    let Some(template) = templates.get(&job.input.template_slug) else {
        return Err((Vec::new(), format!("unknown dataset template: {}", job.input.template_slug)));
    };

    let scope = job.input.scope.clone();
    let resolve = Arc::clone(&template.resolve);
    let rows = store.view(|view| Ok(resolve(view.as_rule_view(), &scope))).unwrap_or_default();

    let mut artifacts = Vec::new();
    for format in &job.input.formats {
        let bytes = format.render(&rows);
        let key = format!("export/{}/{}.{}", job.id, job.input.template_slug, format.extension());
        match blob_store.put(&key, &bytes, format.content_type()) {
            Ok(()) => artifacts.push(ExportArtifact { format: *format, key, size: bytes.len() }),
            Err(error) => return Err((artifacts, error.to_string())),
        }
    }
    Ok(artifacts)
}

/// Sets a tracked record's status (and optionally its error), if the
/// record still exists.
fn set_status(records: &Records, id: &str, status: ExportStatus, error: Option<String>) {
    if let Ok(mut records) = records.lock()
        && let Some(record) = records.get_mut(id)
    {
        record.status = status;
        if error.is_some() {
            record.error = error;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use colonycore_core::MemoryStore;

    use super::*;
    use crate::blob::InMemoryBlobStore;
    use crate::audit::NoopAuditSink;
    use crate::template::DatasetTemplate;

    fn worker_with_template() -> ExportWorker<MemoryStore> {
        let mut templates = DatasetTemplateRegistry::new();
        templates.register(DatasetTemplate::new(
            "frog-colony-v1",
            vec![ExportFormat::Json],
            |_view, _scope| vec![serde_json::json!({"organism_id": "O1"})],
        ));
        let worker = ExportWorker::new(
            Arc::new(MemoryStore::new()),
            templates,
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(NoopAuditSink),
            8,
        );
        worker.start();
        worker
    }

    fn wait_for_terminal(worker: &ExportWorker<MemoryStore>, id: &str) -> ExportRecord {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            let record = worker.get_export(id).expect("record tracked");
            if matches!(record.status, ExportStatus::Succeeded | ExportStatus::Failed) {
                return record;
            }
            assert!(std::time::Instant::now() < deadline, "export did not finish in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn enqueue_rejects_unsupported_format_synchronously() {
        let worker = worker_with_template();
        let err = worker
            .enqueue_export(ExportInput {
                template_slug: "frog-colony-v1".to_string(),
                formats: vec![ExportFormat::Csv],
                scope: ExportScope::default(),
                requestor: "alice".to_string(),
            })
            .expect_err("csv is unsupported");
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn enqueue_rejects_unknown_template_synchronously() {
        let worker = worker_with_template();
        let err = worker
            .enqueue_export(ExportInput {
                template_slug: "no-such-template".to_string(),
                formats: vec![ExportFormat::Json],
                scope: ExportScope::default(),
                requestor: "alice".to_string(),
            })
            .expect_err("template is unknown");
        assert!(matches!(err, ExportError::UnknownTemplate(_)));
    }

    #[test]
    fn successful_export_writes_an_artifact_and_reaches_succeeded() {
        let worker = worker_with_template();
        let record = worker
            .enqueue_export(ExportInput {
                template_slug: "frog-colony-v1".to_string(),
                formats: vec![ExportFormat::Json],
                scope: ExportScope::default(),
                requestor: "alice".to_string(),
            })
            .expect("enqueue succeeds");
        assert_eq!(record.status, ExportStatus::Queued);

        let finished = wait_for_terminal(&worker, &record.id);
        assert_eq!(finished.status, ExportStatus::Succeeded);
        assert_eq!(finished.artifacts.len(), 1);
        assert!(finished.artifacts[0].size > 0);
        worker.stop(Duration::from_secs(1));
    }
}
