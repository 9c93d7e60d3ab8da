use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// HR-panel settings applied to new interviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewConfig {
    pub questions: Vec<String>,
    /// Criteria the report evaluates answers against.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
    /// Appends questions generated from the candidate's CV when one is sent.
    #[serde(default)]
    pub ask_from_cv: bool,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            metrics: default_metrics(),
            ask_from_cv: false,
        }
    }
}

fn default_metrics() -> Vec<String> {
    vec![
        "Relevance".to_string(),
        "Clarity".to_string(),
        "Communication".to_string(),
    ]
}

impl InterviewConfig {
    /// Trims entries and rejects blank questions or metrics.
    pub fn normalized(self) -> Result<Self, AppError> {
        Ok(Self {
            questions: normalize_list(self.questions, "question")?,
            metrics: normalize_list(self.metrics, "metric")?,
            ask_from_cv: self.ask_from_cv,
        })
    }
}

pub fn normalize_list(items: Vec<String>, what: &str) -> Result<Vec<String>, AppError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                Err(AppError::Validation(format!("{what} {} is blank", i + 1)))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
