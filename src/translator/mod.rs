//! Text-to-Patch Translator
//!
//! Turns a free-text style instruction ("عرض رو 300 بذار") into a sparse
//! [`Patch`] by trying an ordered list of [`TranslateStage`]s. The first
//! stage that produces a non-empty patch wins; when none does the
//! instruction is [`TranslateError::Unparseable`].
//!
//! # Stages
//!
//! 1. **`fuzzy`** - nearest exemplar from a fixed corpus by normalized edit
//!    distance; the exemplar's patch is returned verbatim
//! 2. **`masked`** - fill-mask language model over the instruction with its
//!    color word masked; the top prediction becomes `backgroundColor`.
//!    Model and transport failures are logged and treated as no result.
//! 3. **`patterns`** - fixed table of labeled regular expressions, one per
//!    style property; every matching pattern contributes a key

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use thiserror::Error;

use crate::layout::patch::Patch;
use crate::shared::config::AppConfig;

pub mod corpus;
pub mod fuzzy;
pub mod masked;
pub mod patterns;

pub use corpus::{Exemplar, ExemplarCorpus};
pub use fuzzy::FuzzyStage;
pub use masked::MaskedModelStage;
pub use patterns::PatternStage;

/// Runtime translation failure
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslateError {
    #[error("could not understand instruction '{text}'")]
    Unparseable { text: String },
}

/// Failure while building the stage chain at startup
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to load exemplar corpus {path:?}: {message}")]
    Corpus { path: PathBuf, message: String },

    #[error("invalid pattern for '{label}': {source}")]
    Pattern {
        label: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// One tier of the translation chain
#[async_trait]
pub trait TranslateStage: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// A patch for `text`, or `None` to fall through to the next stage
    async fn attempt(&self, text: &str) -> Option<Patch>;
}

/// Ordered chain of stages
pub struct Translator {
    stages: Vec<Box<dyn TranslateStage>>,
}

impl Translator {
    pub fn new(stages: Vec<Box<dyn TranslateStage>>) -> Self {
        Self { stages }
    }

    /// Build the standard chain. The masked-model stage is only included
    /// when a fill-mask endpoint is configured.
    pub fn from_config(config: &AppConfig, client: Client) -> Result<Self, SetupError> {
        let corpus = match &config.translator_dataset {
            Some(path) => ExemplarCorpus::load(path)?,
            None => ExemplarCorpus::builtin(),
        };
        tracing::info!("Translator corpus has {} exemplar(s)", corpus.len());

        let mut stages: Vec<Box<dyn TranslateStage>> =
            vec![Box::new(FuzzyStage::new(corpus, config.fuzzy_threshold))];
        match &config.fill_mask {
            Some(fill_mask) => stages.push(Box::new(MaskedModelStage::new(client, fill_mask))),
            None => tracing::info!("FILL_MASK_URL not set, masked-model stage disabled"),
        }
        stages.push(Box::new(PatternStage::new()?));

        Ok(Self::new(stages))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run the chain until a stage produces a non-empty patch
    pub async fn translate(&self, text: &str) -> Result<Patch, TranslateError> {
        let text = text.trim();
        if !text.is_empty() {
            for stage in &self.stages {
                match stage.attempt(text).await {
                    Some(patch) if !patch.is_empty() => {
                        tracing::debug!("Instruction translated by {} stage: {:?}", stage.name(), patch);
                        return Ok(patch);
                    }
                    _ => tracing::debug!("{} stage produced nothing", stage.name()),
                }
            }
        }
        Err(TranslateError::Unparseable {
            text: text.to_string(),
        })
    }
}

/// Map Persian and Arabic-Indic digits to ASCII
pub(crate) fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        name: &'static str,
        result: Option<Patch>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TranslateStage for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn attempt(&self, _text: &str) -> Option<Patch> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn fixed(name: &'static str, result: Option<serde_json::Value>) -> (Box<dyn TranslateStage>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = result.map(|v| v.as_object().cloned().unwrap());
        (
            Box::new(Fixed {
                name,
                result,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn test_first_successful_stage_wins() {
        let (first, first_calls) = fixed("first", Some(json!({"width": 1})));
        let (second, second_calls) = fixed("second", Some(json!({"width": 2})));
        let translator = Translator::new(vec![first, second]);

        let patch = translator.translate("anything").await.unwrap();
        assert_eq!(patch["width"], 1);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_patch_falls_through() {
        let (empty, _) = fixed("empty", Some(json!({})));
        let (none, _) = fixed("none", None);
        let (last, _) = fixed("last", Some(json!({"color": "red"})));
        let translator = Translator::new(vec![empty, none, last]);

        assert_eq!(translator.translate("x").await.unwrap()["color"], "red");
        assert_eq!(translator.stage_names(), vec!["empty", "none", "last"]);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_unparseable() {
        let (none, calls) = fixed("none", None);
        let translator = Translator::new(vec![none]);

        assert_eq!(
            translator.translate("  ???  ").await.unwrap_err(),
            TranslateError::Unparseable { text: "???".into() }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_text_skips_every_stage() {
        let (stage, calls) = fixed("any", Some(json!({"a": 1})));
        let translator = Translator::new(vec![stage]);

        assert!(translator.translate("   ").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_normalize_digits() {
        assert_eq!(normalize_digits("عرض ۳۰۰ و ٤٥"), "عرض 300 و 45");
        assert_eq!(normalize_digits("plain 12"), "plain 12");
    }

    #[test]
    fn test_from_config_without_fill_mask() {
        let translator = Translator::from_config(&AppConfig::default(), Client::new()).unwrap();
        assert_eq!(translator.stage_names(), vec!["fuzzy", "patterns"]);
    }
}
