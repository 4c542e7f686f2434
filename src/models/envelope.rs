use serde::Deserialize;

use crate::error::AlertError;

/// Every alert endpoint answers with `{ statusCode, data?, message? }`.
/// Success is decided by `statusCode`, not by the HTTP status line.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<i64>,

    pub data: Option<T>,

    #[serde(default)]
    pub message: Option<String>,
}

pub const STATUS_OK: i64 = 200;

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<Option<T>, AlertError> {
        match self.status_code {
            Some(STATUS_OK) => Ok(self.data),
            Some(status) => Err(AlertError::Application {
                status,
                message: self.message,
            }),
            None => Err(AlertError::Transport(
                "response is missing statusCode".to_string(),
            )),
        }
    }
}
