//! Error body DTO

use serde::{Deserialize, Serialize};

use crate::envelope::Resource;

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStructure {
    #[serde(default)]
    pub error_class: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub parameters: Vec<serde_json::Value>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub trace: Option<String>,
}

impl Resource for ErrorStructure {
    const ROOT: &'static str = "error";
}

impl ErrorStructure {
    /// The message with its `%s` / `%d` placeholders replaced by the
    /// parameters, in order. `%%` renders a literal percent sign.
    pub fn formatted_message(&self) -> Option<String> {
        let message = self.message.as_deref()?;
        let mut params = self.parameters.iter();
        let mut out = String::with_capacity(message.len());
        let mut chars = message.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('s') | Some('d') => {
                    chars.next();
                    match params.next() {
                        Some(serde_json::Value::String(s)) => out.push_str(s),
                        Some(other) => out.push_str(&other.to_string()),
                        None => out.push_str("null"),
                    }
                }
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                _ => out.push('%'),
            }
        }

        Some(out)
    }
}
