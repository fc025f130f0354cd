use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use crate::tokenize::tokenize;
use crate::{QaAnswer, QaModel, DEFAULT_QA_MODEL};

/// Picks the context sentence sharing the largest fraction of the question's keywords.
#[derive(Debug, Clone, Default)]
pub struct LexicalOverlapModel;

impl LexicalOverlapModel {
    pub fn new() -> Self {
        Self
    }
}

impl QaModel for LexicalOverlapModel {
    fn model_name(&self) -> &str {
        DEFAULT_QA_MODEL
    }

    fn answer(&self, question: &str, context: &str) -> Option<QaAnswer> {
        let keywords = tokenize(question).into_iter().collect::<HashSet<_>>();
        if keywords.is_empty() {
            return None;
        }

        let mut best: Option<QaAnswer> = None;

        for (offset, raw) in context.split_sentence_bound_indices() {
            let sentence = raw.trim();
            if sentence.is_empty() {
                continue;
            }

            let sentence_tokens = tokenize(sentence).into_iter().collect::<HashSet<_>>();
            let overlap = keywords
                .iter()
                .filter(|token| sentence_tokens.contains(*token))
                .count();
            if overlap == 0 {
                continue;
            }

            let score = overlap as f32 / keywords.len() as f32;
            if best.as_ref().is_some_and(|current| current.score >= score) {
                continue;
            }

            let start = offset + (raw.len() - raw.trim_start().len());
            best = Some(QaAnswer {
                answer: sentence.to_string(),
                score,
                start,
                end: start + sentence.len(),
            });
        }

        best
    }
}
