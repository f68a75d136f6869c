//! Shared validation helpers for inbound HTTP adapters.

use std::fmt::Display;

use serde_json::json;

use crate::domain::{Error, RequestId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const REQUEST_ID: FieldName = FieldName::new("requestId");

fn field_error(field: FieldName, message: impl Into<String>, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName, message: &str) -> Error {
    field_error(field, message, ErrorCode::MissingField)
}

pub(crate) fn invalid_field_error(field: FieldName, cause: impl Display) -> Error {
    field_error(field, cause.to_string(), ErrorCode::InvalidValue)
}

/// Return the trimmed value, rejecting absent or blank input with `message`.
pub(crate) fn require_text(
    value: Option<String>,
    field: FieldName,
    message: &str,
) -> Result<String, Error> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| missing_field_error(field, message))
}

/// Parse the `requestId` body field.
pub(crate) fn parse_request_id(value: Option<String>) -> Result<RequestId, Error> {
    let raw = require_text(value, REQUEST_ID, "Missing requestId")?;
    RequestId::new(&raw).map_err(|_| {
        Error::invalid_request("requestId must be a valid UUID").with_details(json!({
            "field": REQUEST_ID.as_str(),
            "value": raw,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn blank_text_is_missing(#[case] value: Option<&str>) {
        let err = require_text(
            value.map(str::to_owned),
            FieldName::new("deviceToken"),
            "Missing device token",
        )
        .expect_err("blank");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "Missing device token");
        assert_eq!(
            err.details(),
            Some(&json!({"field": "deviceToken", "code": "missing_field"}))
        );
    }

    #[rstest]
    fn text_is_trimmed() {
        let value = require_text(Some("  tok ".to_owned()), FieldName::new("x"), "missing")
            .expect("present");
        assert_eq!(value, "tok");
    }

    #[rstest]
    fn malformed_request_id_reports_value() {
        let err = parse_request_id(Some("abc".to_owned())).expect_err("invalid");
        assert_eq!(err.message(), "requestId must be a valid UUID");
        assert_eq!(err.details().and_then(|d| d.get("value")), Some(&json!("abc")));
    }

    #[rstest]
    fn valid_request_id_parses() {
        let id = RequestId::random();
        assert_eq!(parse_request_id(Some(id.to_string())).expect("valid"), id);
    }
}
