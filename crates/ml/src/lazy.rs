use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{ModelError, ModelRegistry, QaModel};

pub type ModelLoader = Arc<dyn Fn(&str) -> Result<Arc<dyn QaModel>, ModelError> + Send + Sync>;

/// Process-wide model handle, loaded on first use and shared read-only afterwards.
///
/// Concurrent first callers block on a single initialization; a failed load leaves
/// the cell empty so the next call retries.
pub struct LazyModel {
    name: String,
    loader: ModelLoader,
    cell: OnceCell<Arc<dyn QaModel>>,
}

impl LazyModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_loader(name, Arc::new(ModelRegistry::load))
    }

    pub fn with_loader(name: impl Into<String>, loader: ModelLoader) -> Self {
        Self {
            name: name.into(),
            loader,
            cell: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn QaModel>, ModelError> {
        self.cell
            .get_or_try_init(|| {
                tracing::info!(model = %self.name, "loading QA model");
                (self.loader)(&self.name)
            })
            .cloned()
    }
}

impl std::fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyModel")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
