/**
 * Layout API Types
 *
 * Request and response bodies for the layout and route endpoints.
 */

use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::shared::config::StoreBackend;

/// `?backend=` selector accepted by every layout endpoint
#[derive(Debug, Default, Deserialize)]
pub struct BackendQuery {
    pub backend: Option<String>,
}

impl BackendQuery {
    /// Parsed selector; `None` means "use the configured default"
    pub fn selector(&self) -> Result<Option<StoreBackend>, BackendError> {
        match self.backend.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name
                .parse::<StoreBackend>()
                .map(Some)
                .map_err(|_| BackendError::bad_request(format!("unknown backend '{}'", name))),
        }
    }
}

/// Body of `POST /api/layout/{route}/{mode}/instruction`
#[derive(Debug, Deserialize)]
pub struct InstructionRequest {
    #[serde(alias = "inputText")]
    pub text: String,
    /// Dotted path the translated patch is applied under
    #[serde(default)]
    pub target: Option<String>,
}

/// Body of `POST /api/routes`
#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub route: String,
}

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub store_id: String,
    pub backend: StoreBackend,
    pub routes: Vec<String>,
}

/// Acknowledgement for writes that do not echo a document
#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub store_id: String,
    pub route: String,
    pub mode: String,
    pub backend: StoreBackend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selector() {
        let query = BackendQuery { backend: None };
        assert_eq!(query.selector().unwrap(), None);

        let query = BackendQuery {
            backend: Some("GitHub".into()),
        };
        assert_eq!(query.selector().unwrap(), Some(StoreBackend::GitHub));

        let query = BackendQuery {
            backend: Some("ftp".into()),
        };
        let err = query.selector().unwrap_err();
        assert_eq!(err.category(), "bad_request");
    }

    #[test]
    fn test_instruction_request_accepts_input_text() {
        let request: InstructionRequest =
            serde_json::from_str(r#"{"inputText": "عرض رو 300 بذار"}"#).unwrap();
        assert_eq!(request.text, "عرض رو 300 بذار");
        assert!(request.target.is_none());
    }
}
