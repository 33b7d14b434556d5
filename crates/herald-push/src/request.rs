//! Send request validation

use herald_common::{MAX_BODY_CHARS, MAX_TITLE_CHARS};
use serde::{Deserialize, Serialize};

use crate::PushError;

/// Request to notify one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPushRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl SendPushRequest {
    pub fn new(user_id: &str, title: &str, body: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Reject empty or over-long fields
    pub fn validate(&self) -> Result<(), PushError> {
        if self.user_id.trim().is_empty() {
            return Err(PushError::InvalidRequest("user id is empty".into()));
        }
        check_text("title", &self.title, MAX_TITLE_CHARS)?;
        check_text("body", &self.body, MAX_BODY_CHARS)
    }
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), PushError> {
    if value.trim().is_empty() {
        return Err(PushError::InvalidRequest(format!("{field} is empty")));
    }
    let len = value.chars().count();
    if len > max {
        return Err(PushError::InvalidRequest(format!(
            "{field} is {len} characters, limit is {max}"
        )));
    }
    Ok(())
}
