// colonycore-export/src/template.rs
// ============================================================================
// Module: Dataset Templates
// Description: Plugin-registered dataset templates and the scope filter
// export requests are resolved against.
// Purpose: Decouple the export worker loop from any particular dataset's
// row-resolution logic.
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use colonycore_core::RuleView;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::format::ExportFormat;

/// The filter an export request narrows its dataset template's rows by.
/// A plugin's resolver decides how each field is interpreted; an empty
/// field means "no restriction on that axis."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportScope {
    /// Restricts rows to these project ids, if non-empty.
    #[serde(default)]
    pub project_ids: Vec<String>,
    /// Restricts rows to these facility ids, if non-empty.
    #[serde(default)]
    pub facility_ids: Vec<String>,
}

/// Resolves a dataset template's rows against a read-only store view and a
/// request's scope. Registered once per template at plugin install time.
pub type Resolver = Arc<dyn Fn(&dyn RuleView, &ExportScope) -> Vec<Value> + Send + Sync>;

/// A named, plugin-registered dataset the export worker can render.
#[derive(Clone)]
pub struct DatasetTemplate {
    /// Unique template identifier, e.g. `"frog-colony-v1"`.
    pub slug: String,
    /// The formats this template can be rendered into.
    pub supported_formats: Vec<ExportFormat>,
    /// Produces the dataset's rows for a given scope.
    pub resolve: Resolver,
}

impl DatasetTemplate {
    /// Declares a new template with the given slug and resolver.
    pub fn new(
        slug: impl Into<String>,
        supported_formats: Vec<ExportFormat>,
        resolve: impl Fn(&dyn RuleView, &ExportScope) -> Vec<Value> + Send + Sync + 'static,
    ) -> Self {
        Self { slug: slug.into(), supported_formats, resolve: Arc::new(resolve) }
    }

    /// Whether this template can be rendered into the given format.
    #[must_use]
    pub fn supports(&self, format: ExportFormat) -> bool {
        self.supported_formats.contains(&format)
    }
}

/// The set of dataset templates plugins have registered, keyed by slug.
#[derive(Clone, Default)]
pub struct DatasetTemplateRegistry {
    /// Registered templates, keyed by slug.
    templates: BTreeMap<String, DatasetTemplate>,
}

impl DatasetTemplateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template, replacing any prior template with the same slug.
    pub fn register(&mut self, template: DatasetTemplate) {
        self.templates.insert(template.slug.clone(), template);
    }

    /// Looks up a template by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&DatasetTemplate> {
        self.templates.get(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_looks_up_by_slug() {
        let mut registry = DatasetTemplateRegistry::new();
        registry.register(DatasetTemplate::new(
            "frog-colony-v1",
            vec![ExportFormat::Json],
            |_view, _scope| Vec::new(),
        ));
        assert!(registry.get("frog-colony-v1").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn template_reports_supported_formats() {
        let template =
            DatasetTemplate::new("t", vec![ExportFormat::Json], |_view, _scope| Vec::new());
        assert!(template.supports(ExportFormat::Json));
        assert!(!template.supports(ExportFormat::Csv));
    }
}
