//! Run report: the terminal artifact of a batch.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCategory;
use crate::schema::ClinicalOutput;

/// Outcome for one input item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    /// Input item name
    pub file: String,

    /// True iff `output` is present and `errors` is empty
    pub ok: bool,

    pub errors: Vec<String>,

    /// Validated output; always `None` for failed items
    pub output: Option<ClinicalOutput>,
}

impl ItemResult {
    /// Classify an item from what the pipeline produced.
    ///
    /// An output is only kept when there are no errors.
    pub fn new(file: impl Into<String>, output: Option<ClinicalOutput>, errors: Vec<String>) -> Self {
        let ok = output.is_some() && errors.is_empty();
        Self {
            file: file.into(),
            ok,
            errors,
            output: if ok { output } else { None },
        }
    }

    /// A failed item with a single error.
    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(file, None, vec![error.into()])
    }
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Template version tag used for every item
    pub prompt_version: String,

    pub total: usize,

    /// Successful items
    pub ok: usize,

    pub failed: usize,

    /// Per-item results in input order
    pub results: Vec<ItemResult>,
}

impl RunReport {
    pub fn new(prompt_version: impl Into<String>) -> Self {
        Self {
            prompt_version: prompt_version.into(),
            total: 0,
            ok: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Append a result and update the counts.
    pub fn push(&mut self, result: ItemResult) {
        self.total += 1;
        if result.ok {
            self.ok += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// Number of recorded errors per category, skipping empty categories.
    pub fn error_counts(&self) -> Vec<(ErrorCategory, usize)> {
        ErrorCategory::ALL
            .into_iter()
            .map(|category| {
                let count = self
                    .results
                    .iter()
                    .flat_map(|r| r.errors.iter())
                    .filter(|e| ErrorCategory::of(e) == Some(category))
                    .count();
                (category, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Indented UTF-8 JSON; non-ASCII text is written verbatim.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
