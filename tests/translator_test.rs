//! Translator chain integration tests
//!
//! Builds the chain from configuration, with a mocked fill-mask endpoint
//! and a corpus file on disk.

use pretty_assertions::assert_eq;
use reqwest::Client;
use serde_json::{json, Value};
use std::io::Write;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storefront_layout::shared::config::AppConfig;
use storefront_layout::translator::{TranslateError, Translator};

async fn translate(translator: &Translator, text: &str) -> Result<Value, TranslateError> {
    translator.translate(text).await.map(Value::Object)
}

#[tokio::test]
async fn test_chain_without_model_uses_fuzzy_then_patterns() {
    let config = AppConfig::builder().build().unwrap();
    let translator = Translator::from_config(&config, Client::new()).unwrap();
    assert_eq!(translator.stage_names(), vec!["fuzzy", "patterns"]);

    assert_eq!(
        translate(&translator, "حاشیه را گرد کن").await.unwrap(),
        json!({ "borderRadius": "8px" })
    );
    assert_eq!(
        translate(&translator, "عرض رو ۳۰۰ بذار").await.unwrap(),
        json!({ "width": 300 })
    );
    assert_eq!(
        translate(&translator, "   ").await.unwrap_err(),
        TranslateError::Unparseable { text: String::new() }
    );
}

#[tokio::test]
async fn test_masked_model_fills_color() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fill-mask"))
        .and(header("authorization", "Bearer hf-token"))
        .and(body_json(json!({ "inputs": "رنگ دکمه رو [MASK] کن" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "token_str": "سبز", "score": 0.21, "sequence": "رنگ دکمه رو سبز کن" },
            { "token_str": "آبی", "score": 0.64, "sequence": "رنگ دکمه رو آبی کن" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig::builder()
        .fill_mask(format!("{}/fill-mask", server.uri()), Some("hf-token".to_string()))
        .build()
        .unwrap();
    let translator = Translator::from_config(&config, Client::new()).unwrap();
    assert_eq!(translator.stage_names(), vec!["fuzzy", "masked", "patterns"]);

    assert_eq!(
        translate(&translator, "رنگ دکمه رو آبی کن").await.unwrap(),
        json!({ "backgroundColor": "آبی" })
    );
}

#[tokio::test]
async fn test_model_failure_falls_through_to_patterns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
        .mount(&server)
        .await;

    let config = AppConfig::builder()
        .fill_mask(server.uri(), None)
        .build()
        .unwrap();
    let translator = Translator::from_config(&config, Client::new()).unwrap();

    assert_eq!(
        translate(&translator, "عرض رو 300 بذار").await.unwrap(),
        json!({ "width": 300 })
    );
    assert!(matches!(
        translate(&translator, "hello there").await,
        Err(TranslateError::Unparseable { .. })
    ));
}

#[tokio::test]
async fn test_corpus_file_replaces_builtin_exemplars() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!([
            { "input": "سایه رو پررنگ کن", "output": { "boxShadow": "0 4px 12px #0004" } }
        ])
    )
    .unwrap();

    let config = AppConfig::builder()
        .translator_dataset(file.path().to_path_buf())
        .build()
        .unwrap();
    let translator = Translator::from_config(&config, Client::new()).unwrap();

    assert_eq!(
        translate(&translator, "سایه رو پر رنگ کن").await.unwrap(),
        json!({ "boxShadow": "0 4px 12px #0004" })
    );
    // no built-in exemplar any more, so the pattern tier answers instead
    assert_eq!(
        translate(&translator, "رنگ پس زمینه رو قرمز کن").await.unwrap(),
        json!({ "backgroundColor": "قرمز" })
    );
}

#[tokio::test]
async fn test_missing_corpus_file_is_a_setup_error() {
    let config = AppConfig::builder()
        .translator_dataset("/definitely/not/here.json".into())
        .build()
        .unwrap();
    assert!(Translator::from_config(&config, Client::new()).is_err());
}
