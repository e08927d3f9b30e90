//! Fill-mask language model stage
//!
//! The instruction's first color word is replaced with `[MASK]` (or the mask
//! is appended when it has none) and sent to a hosted fill-mask endpoint:
//!
//! ```text
//! POST {url}  {"inputs": "رنگ پس زمینه رو [MASK] کن"}
//! -> [{"token_str": "قرمز", "score": 0.41, ...}, ...]
//! ```
//!
//! The highest scoring token becomes `{"backgroundColor": token}`. Every
//! failure here is logged and reported as "no result".

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::TranslateStage;
use crate::layout::patch::Patch;
use crate::shared::config::FillMaskConfig;

pub const MASK_TOKEN: &str = "[MASK]";

const COLOR_WORDS: &[&str] = &[
    "قرمز", "آبی", "سبز", "زرد", "مشکی", "سیاه", "سفید", "نارنجی", "بنفش", "صورتی", "خاکستری",
    "طلایی", "red", "blue", "green", "yellow", "black", "white", "orange", "purple", "pink",
    "gray", "grey",
];

#[derive(Debug, Deserialize)]
struct Prediction {
    token_str: String,
    score: f64,
}

#[derive(Debug, Error)]
pub enum MaskedModelError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct MaskedModelStage {
    client: Client,
    url: String,
    token: Option<String>,
}

impl MaskedModelStage {
    pub fn new(client: Client, config: &FillMaskConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        }
    }

    /// Highest scoring replacement for the mask, if any
    pub async fn predict(&self, masked: &str) -> Result<Option<String>, MaskedModelError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": masked }));
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MaskedModelError::Status { status, body });
        }

        let predictions: Vec<Prediction> = response.json().await?;
        Ok(predictions
            .into_iter()
            .filter(|p| !p.token_str.trim().is_empty())
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|p| p.token_str.trim().to_string()))
    }
}

/// Mask the first color word, or append the mask when there is none
pub fn mask_text(text: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    match words.iter().position(|word| is_color_word(word)) {
        Some(index) => words[index] = MASK_TOKEN,
        None => words.push(MASK_TOKEN),
    }
    words.join(" ")
}

fn is_color_word(word: &str) -> bool {
    let word = word.to_lowercase();
    COLOR_WORDS.iter().any(|color| *color == word)
}

#[async_trait]
impl TranslateStage for MaskedModelStage {
    fn name(&self) -> &'static str {
        "masked"
    }

    async fn attempt(&self, text: &str) -> Option<Patch> {
        let masked = mask_text(text);
        match self.predict(&masked).await {
            Ok(Some(token)) => {
                let mut patch = Patch::new();
                patch.insert("backgroundColor".to_string(), Value::String(token));
                Some(patch)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("Fill-mask model unavailable, falling back: {}", err);
                None
            }
        }
    }
}
