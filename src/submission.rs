//! Parsing and validation of submitted payloads.

use crate::errors::SubmitError;
use chrono::{TimeZone, Utc};
use serde_json::Value;

/// A parsed submission. Holds the raw request text alongside the
/// parsed document so the queue receives exactly what the caller
/// sent, byte for byte.
#[derive(Debug)]
pub struct Submission<'a> {
    raw: &'a str,
    payload: Value,
}

impl<'a> Submission<'a> {
    /// Parse a request body. The body must be a JSON object with a
    /// string `token` and an object `data`; anything else is a
    /// malformed request.
    pub fn parse(raw: &'a str) -> Result<Self, SubmitError> {
        let payload: Value =
            serde_json::from_str(raw).map_err(|_| SubmitError::MalformedRequest)?;
        if !payload.get("token").map_or(false, Value::is_string) {
            return Err(SubmitError::MalformedRequest);
        }
        if !payload.get("data").map_or(false, Value::is_object) {
            return Err(SubmitError::MalformedRequest);
        }
        Ok(Submission { raw, payload })
    }

    /// The caller-supplied token.
    pub fn token(&self) -> &str {
        self.payload["token"].as_str().unwrap_or_default()
    }

    /// The raw request text, forwarded verbatim to the queue.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Check that `data.email_timestream` denotes a renderable
    /// calendar timestamp. Absent means epoch zero. Integer-valued
    /// strings are accepted alongside plain integers. The value is
    /// only checked, never stored.
    pub fn validate_email_timestream(&self) -> Result<(), SubmitError> {
        let seconds = match self.payload["data"].get("email_timestream") {
            None => 0,
            Some(Value::Number(n)) => n.as_i64().ok_or(SubmitError::InvalidField)?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| SubmitError::InvalidField)?,
            Some(_) => return Err(SubmitError::InvalidField),
        };
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or(SubmitError::InvalidField)?;
        Ok(())
    }
}
