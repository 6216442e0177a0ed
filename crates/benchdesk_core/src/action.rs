use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A form submission to one of the backend's entity endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub endpoint: String,
    pub fields: Vec<(String, String)>,
    /// Title of the task panel while the action runs.
    pub panel_title: String,
    pub success_title: String,
    pub failure_title: String,
}

impl ActionRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            panel_title: endpoint.clone(),
            success_title: format!("{endpoint} succeeded"),
            failure_title: format!("{endpoint} failed"),
            endpoint,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn panel_title(mut self, title: impl Into<String>) -> Self {
        self.panel_title = title.into();
        self
    }

    pub fn titles(mut self, success: impl Into<String>, failure: impl Into<String>) -> Self {
        self.success_title = success.into();
        self.failure_title = failure.into();
        self
    }
}

/// `{status, error?, ...}` body returned by action endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// Error and status text joined the way the error modal shows them.
    pub fn error_text(&self) -> String {
        let mut text = String::new();
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            text.push_str(error);
            text.push('\n');
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(status);
        }
        text.trim_end().to_string()
    }
}
