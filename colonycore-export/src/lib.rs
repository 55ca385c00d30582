// colonycore-export/src/lib.rs
// ============================================================================
// Module: ColonyCore Export Library
// Description: The Dataset Export Worker: dataset templates, rendering,
// blob storage, and audit logging for background export jobs.
// Purpose: Turn a registered dataset template and a scope filter into
// written artifacts without blocking the caller that requested them.
// Dependencies: colonycore-core, serde, serde_json, thiserror, uuid
// ============================================================================

//! ## Overview
//! `EnqueueExport` validates a request synchronously -- the template slug
//! must be registered and every requested format must be in that
//! template's supported set -- then queues the job and returns a record in
//! [`worker::ExportStatus::Queued`]. A single background worker thread
//! drains the queue one job at a time: it opens a read-only
//! [`colonycore_core::PersistentStore::view`], runs the template's
//! resolver over the request's [`template::ExportScope`], renders each
//! requested format, writes it to a [`blob::BlobStore`], and appends a
//! [`audit::ExportAuditEntry`] through an [`audit::AuditSink`] before
//! transitioning the job to its terminal status.
//!
//! This crate owns no transport: it's a library consumed by whatever
//! front end installs plugins, registers their dataset templates, and
//! calls [`worker::ExportWorker::enqueue_export`]/`get_export`.

pub mod audit;
pub mod blob;
pub mod format;
pub mod template;
pub mod worker;

pub use audit::AuditSink;
pub use audit::ExportAuditEntry;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use blob::BlobStore;
pub use blob::BlobStoreError;
pub use blob::InMemoryBlobStore;
pub use blob::StoredBlob;
pub use format::ExportFormat;
pub use template::DatasetTemplate;
pub use template::DatasetTemplateRegistry;
pub use template::ExportScope;
pub use template::Resolver;
pub use worker::ExportArtifact;
pub use worker::ExportError;
pub use worker::ExportInput;
pub use worker::ExportRecord;
pub use worker::ExportStatus;
pub use worker::ExportWorker;
