//! View rendering seam.
//!
//! Handlers assemble a [`ViewContext`] (session notices, user, current year,
//! plus view-specific data) and hand it to a [`ViewRenderer`] by view name.

pub mod html;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::session::{FlashKind, SessionData, SessionUser};

pub use html::HtmlRenderer;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Unknown view: {0}")]
    UnknownView(String),
    #[error("Invalid view context: {0}")]
    InvalidContext(String),
}

pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, context: &ViewContext) -> Result<String, ViewError>;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewContext {
    pub success_msg: Vec<String>,
    pub error_msg: Vec<String>,
    pub error: Vec<String>,
    pub user: Option<SessionUser>,
    pub year: Option<String>,
    pub data: Map<String, Value>,
}

impl ViewContext {
    pub fn from_session(session: SessionData) -> Self {
        let mut context = Self {
            user: session.user,
            year: session.academic_year,
            ..Default::default()
        };
        for notice in session.flash {
            match notice.kind {
                FlashKind::Success => context.success_msg.push(notice.message),
                FlashKind::Error => context.error_msg.push(notice.message),
                FlashKind::LoginFailure => context.error.push(notice.message),
            }
        }
        context
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.data.insert(key.to_string(), v);
            }
            Err(e) => tracing::error!("Failed to serialize view data '{}': {}", key, e),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Flash;
    use serde_json::json;

    #[test]
    fn notices_are_split_by_channel() {
        let context = ViewContext::from_session(SessionData {
            user: None,
            academic_year: Some("2023-2024".into()),
            flash: vec![
                Flash::success("Academic year selected"),
                Flash::error("Not Authorized"),
                Flash::login_failure("Invalid email or password"),
            ],
        });

        assert_eq!(context.success_msg, ["Academic year selected"]);
        assert_eq!(context.error_msg, ["Not Authorized"]);
        assert_eq!(context.error, ["Invalid email or password"]);
        assert_eq!(context.year.as_deref(), Some("2023-2024"));
    }

    #[test]
    fn with_stores_serialized_data() {
        let context = ViewContext::default().with("result", vec![1, 2]);
        assert_eq!(context.get("result"), Some(&json!([1, 2])));
        assert!(context.get("editResult").is_none());
    }
}
