use serde::{Deserialize, Serialize};

/// Outcome of a dispatch: `{"result": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessResponse {
    Result(String),
    Error(String),
}

impl ProcessResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ProcessResponse::Error(_))
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            ProcessResponse::Result(text) => Some(text),
            ProcessResponse::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProcessResponse::Result(_) => None,
            ProcessResponse::Error(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<String, String> {
        match self {
            ProcessResponse::Result(text) => Ok(text),
            ProcessResponse::Error(message) => Err(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let ok = ProcessResponse::Result("Rezime".to_string());
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"result":"Rezime"}"#);

        let err = ProcessResponse::Error("Document cannot be empty".to_string());
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"Document cannot be empty"}"#
        );
    }

    #[test]
    fn test_accessors() {
        let ok = ProcessResponse::Result("x".into());
        assert!(!ok.is_error());
        assert_eq!(ok.result(), Some("x"));
        assert_eq!(ok.error(), None);

        let err = ProcessResponse::Error("boom".into());
        assert!(err.is_error());
        assert_eq!(err.error(), Some("boom"));
        assert_eq!(err.into_result(), Err("boom".to_string()));
    }
}
