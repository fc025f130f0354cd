use std::path::Path;

use anyhow::{Context, Result};

use crate::fuzzy;
use crate::models::{FaqEntry, FaqMatch};

pub const DEFAULT_FAQ_THRESHOLD: f64 = 70.0;

const BUILTIN_FAQS: &[(&str, &str)] = &[
    ("hi", "Hello! How can I help you?"),
    ("how are you", "Thank You but I'm still learning😊"),
    ("what is your name", "Thank You but I'm still learning😊."),
    ("what can you do", "I can answer your frequently asked questions."),
    (
        "how can i contact support",
        "You can contact support via email at support@example.com.",
    ),
    (
        "what is the basic format and structure of a manuscript",
        "A manuscript generally includes a Title Page, Abstract, Keywords, and the Main Text, which is divided into sections like Introduction, Methods, Results, Discussion, and Conclusion.",
    ),
    (
        "what details should be included on the title page of a manuscript",
        "The title page should have a clear and descriptive title, author names, affiliations, and contact information for the corresponding author.",
    ),
    (
        "how long should the abstract be and what should it cover",
        "The abstract is typically between 150-300 words and should summarize the study's purpose, methods, results, and conclusions.",
    ),
    (
        "what purpose do keywords serve in a manuscript",
        "Keywords, usually 3-10 words or phrases, help to categorize the manuscript by topic and aid in its discoverability.",
    ),
    (
        "what is the typical structure of the main text in a manuscript",
        "The main text is structured into sections: Introduction, Methods, Results, Discussion, and Conclusion.",
    ),
    (
        "what information is typically covered in the introduction section",
        "The Introduction provides background information and the purpose of the study.",
    ),
    (
        "why is the methods section important in a manuscript",
        "The Methods section gives a detailed description of the research methods, allowing others to replicate the study.",
    ),
    (
        "what should the results section of a manuscript include",
        "The Results section presents the findings of the study, often accompanied by tables or figures.",
    ),
    (
        "what is discussed in the discussion section of a manuscript",
        "The Discussion section interprets the results, addresses limitations, and explores the implications of the findings.",
    ),
    (
        "what is the purpose of the conclusion section in a manuscript",
        "The Conclusion summarizes the study and may suggest directions for future research.",
    ),
    (
        "what fonts are generally recommended for manuscript formatting",
        "Manuscripts are typically formatted in standard fonts like Times New Roman or Arial, in size 11 or 12.",
    ),
    (
        "what is the recommended line spacing and margin size for manuscripts",
        "Manuscripts should be double-spaced with margins of at least 1 inch on all sides.",
    ),
    (
        "where should page numbers be placed in a manuscript",
        "Page numbers should appear on all pages, typically in the top or bottom right corner.",
    ),
];

/// Static question/answer table. Questions are lower-cased once at construction.
#[derive(Debug, Clone)]
pub struct FaqTable {
    entries: Vec<FaqEntry>,
    threshold: f64,
}

impl FaqTable {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| FaqEntry {
                question: entry.question.trim().to_lowercase(),
                answer: entry.answer,
            })
            .collect();

        Self {
            entries,
            threshold: DEFAULT_FAQ_THRESHOLD,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_FAQS
                .iter()
                .map(|(question, answer)| FaqEntry::new(*question, *answer))
                .collect(),
        )
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading FAQ table: {}", path.display()))?;
        let entries = serde_json::from_str::<Vec<FaqEntry>>(&raw)
            .with_context(|| format!("invalid FAQ table JSON: {}", path.display()))?;
        Ok(Self::new(entries))
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 100.0);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_match(&self, text: &str) -> Option<FaqMatch> {
        let (index, score) = fuzzy::extract_one(
            text,
            self.entries.iter().map(|entry| entry.question.as_str()),
            self.threshold,
        )?;
        let entry = &self.entries[index];

        Some(FaqMatch {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
            score,
        })
    }
}

impl Default for FaqTable {
    fn default() -> Self {
        Self::builtin()
    }
}
