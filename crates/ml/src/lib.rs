mod lazy;
mod lexical;
mod tokenize;

use std::sync::Arc;

use serde::Serialize;

pub use lazy::{LazyModel, ModelLoader};
pub use lexical::LexicalOverlapModel;
pub use tokenize::tokenize;

pub const DEFAULT_QA_MODEL: &str = "lexical-overlap";

/// Extractive answer span. `start`/`end` are byte offsets into the context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

pub trait QaModel: Send + Sync {
    fn model_name(&self) -> &str;
    fn answer(&self, question: &str, context: &str) -> Option<QaAnswer>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("unknown QA model `{0}`")]
    UnknownModel(String),
    #[error("failed to load QA model `{name}`: {reason}")]
    Load { name: String, reason: String },
}

pub struct ModelRegistry;

impl ModelRegistry {
    pub fn available() -> &'static [&'static str] {
        &[DEFAULT_QA_MODEL]
    }

    pub fn load(name: &str) -> Result<Arc<dyn QaModel>, ModelError> {
        match name.trim() {
            DEFAULT_QA_MODEL => Ok(Arc::new(LexicalOverlapModel::new())),
            other => Err(ModelError::UnknownModel(other.to_string())),
        }
    }
}
