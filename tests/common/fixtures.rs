//! Layout document fixtures

use serde_json::{json, Value};

pub const STORE_ID: &str = "shop";

/// Home document in the nested editor shape
pub fn home_document() -> Value {
    json!({
        "sections": {
            "sectionHeader": {
                "type": "Header",
                "setting": { "backgroundColor": "#ffffff", "logo": "/logo.png" }
            },
            "children": {
                "type": "home",
                "sections": [
                    { "type": "Banner", "blocks": { "title": "Welcome" }, "setting": { "paddingTop": 10 } }
                ],
                "order": ["Banner-1"]
            },
            "sectionFooter": {
                "type": "Footer",
                "setting": { "textColor": "#333333" }
            }
        }
    })
}

/// Route document with one rich-text section
pub fn about_document() -> Value {
    json!({
        "children": {
            "type": "about",
            "metaData": { "title": "About us", "description": "Who we are" },
            "sections": [
                { "type": "RichText", "blocks": { "text": "Hello" }, "setting": { "paddingTop": 20 } }
            ],
            "order": ["RichText-1"]
        }
    })
}
