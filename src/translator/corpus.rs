//! Exemplar corpus for the fuzzy stage
//!
//! The corpus file is the same JSON array the style model is trained on:
//!
//! ```json
//! [{ "input": "رنگ پس زمینه رو قرمز کن", "output": { "backgroundColor": "#FF0000" } }]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

use super::SetupError;
use crate::layout::patch::Patch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    pub input: String,
    pub output: Patch,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExemplarCorpus {
    exemplars: Vec<Exemplar>,
}

impl ExemplarCorpus {
    pub fn new(exemplars: Vec<Exemplar>) -> Self {
        Self { exemplars }
    }

    /// Corpus used when no dataset file is configured
    pub fn builtin() -> Self {
        let pairs = [
            ("رنگ پس زمینه رو قرمز کن", json!({"backgroundColor": "#FF0000"})),
            ("فونت متن رو بزرگ کن", json!({"fontSize": "32px"})),
            ("حاشیه رو گرد کن", json!({"borderRadius": "8px"})),
        ];
        let exemplars = pairs
            .into_iter()
            .filter_map(|(input, output)| match output {
                serde_json::Value::Object(output) => Some(Exemplar {
                    input: input.to_string(),
                    output,
                }),
                _ => None,
            })
            .collect();
        Self { exemplars }
    }

    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            exemplars: serde_json::from_str(source)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let source = std::fs::read_to_string(path).map_err(|e| SetupError::Corpus {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&source).map_err(|e| SetupError::Corpus {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn exemplars(&self) -> &[Exemplar] {
        &self.exemplars
    }

    pub fn len(&self) -> usize {
        self.exemplars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty()
    }
}
