// Response envelope parsing.
// Every API reply wraps its payload in a `meta` block carrying the status code.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{InstafeedError, Result};

/// Status code the API reports for a successful call.
pub const CODE_OK: i64 = 200;

/// Status block of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Meta {
    pub code: i64,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

/// A parsed reply: status plus optional payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub meta: Meta,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Parse a raw body. Missing `meta` is a parse error.
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Extract the payload, or the error the reply reports.
    pub fn into_payload(self) -> Result<Value> {
        match (self.meta.code, self.data) {
            (CODE_OK, Some(data)) => Ok(data),
            (CODE_OK, None) => Err(InstafeedError::CannotProcess(
                "reply reports success but carries no data".to_string(),
            )),
            (code, _) => Err(InstafeedError::Protocol {
                error_type: self
                    .meta
                    .error_type
                    .unwrap_or_else(|| "UnknownError".to_string()),
                code,
                message: self.meta.error_message.unwrap_or_default(),
            }),
        }
    }
}

/// Validate a response body, if there is one, and return its payload.
pub fn validate(body: Option<&[u8]>) -> Result<Value> {
    let body = body.ok_or_else(|| InstafeedError::CannotProcess("no response".to_string()))?;

    Envelope::parse(body)
        .map_err(|e| InstafeedError::CannotProcess(e.to_string()))?
        .into_payload()
}
