// system-tests/tests/suites/export_worker.rs
// ============================================================================
// Suite: Export Worker
// Description: A registered dataset template renders to a blob artifact in
// the background; an unsupported format is rejected synchronously.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use colonycore_core::MemoryStore;
use colonycore_core::PersistentStore;
use colonycore_core::RuleView;
use colonycore_export::DatasetTemplate;
use colonycore_export::DatasetTemplateRegistry;
use colonycore_export::ExportError;
use colonycore_export::ExportFormat;
use colonycore_export::ExportInput;
use colonycore_export::ExportScope;
use colonycore_export::ExportStatus;
use colonycore_export::ExportWorker;
use colonycore_export::InMemoryBlobStore;
use colonycore_export::NoopAuditSink;

use crate::helpers;

fn worker_with_frog_colony_template() -> ExportWorker<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .run_in_transaction(|tx| Ok(tx.create_facility(helpers::facility("F1"))))
        .expect("fixture facility commits");

    let mut templates = DatasetTemplateRegistry::new();
    templates.register(DatasetTemplate::new(
        "frog-colony-v1",
        vec![ExportFormat::Json],
        |view, _scope| {
            view.list_facilities()
                .iter()
                .map(|facility| serde_json::json!({"facility_id": facility.base.id, "code": facility.code}))
                .collect()
        },
    ));

    let worker = ExportWorker::new(store, templates, Arc::new(InMemoryBlobStore::new()), Arc::new(NoopAuditSink), 8);
    worker.start();
    worker
}

fn wait_for_terminal(worker: &ExportWorker<MemoryStore>, id: &str) -> colonycore_export::ExportRecord {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let record = worker.get_export(id).expect("export is tracked");
        if matches!(record.status, ExportStatus::Succeeded | ExportStatus::Failed) {
            return record;
        }
        assert!(Instant::now() < deadline, "export did not reach a terminal status within the deadline");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn a_queued_export_reaches_succeeded_with_a_written_artifact() {
    let worker = worker_with_frog_colony_template();
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

#[test]
fn an_unsupported_format_is_rejected_before_a_record_is_created() {
    let worker = worker_with_frog_colony_template();
    let err = worker
        .enqueue_export(ExportInput {
            template_slug: "frog-colony-v1".to_string(),
            formats: vec![ExportFormat::Csv],
            scope: ExportScope::default(),
            requestor: "alice".to_string(),
        })
        .expect_err("csv was never registered for this template");
    assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
}

#[test]
fn an_unknown_template_is_rejected_before_a_record_is_created() {
    let worker = worker_with_frog_colony_template();
    let err = worker
        .enqueue_export(ExportInput {
            template_slug: "no-such-template".to_string(),
            formats: vec![ExportFormat::Json],
            scope: ExportScope::default(),
            requestor: "alice".to_string(),
        })
        .expect_err("the template was never registered");
    assert!(matches!(err, ExportError::UnknownTemplate(_)));
}
