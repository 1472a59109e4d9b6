//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies deserialise into plain DTOs and are validated here,
//! field by field, so every endpoint reports failures with the same
//! `{ field, code }` detail shape.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, Quantity, RoomName, ThingName, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
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

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: impl Into<String>, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_value_error(field: FieldName, message: impl Into<String>) -> Error {
    field_error(field, message, ErrorCode::InvalidValue)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
        )
    })
}

pub(crate) fn parse_room_name(value: String, field: FieldName) -> Result<RoomName, Error> {
    RoomName::new(value).map_err(|err| invalid_value_error(field, err.to_string()))
}

pub(crate) fn parse_thing_name(value: String, field: FieldName) -> Result<ThingName, Error> {
    ThingName::new(value).map_err(|err| invalid_value_error(field, err.to_string()))
}

/// Parse an optional signed quantity, defaulting to one when absent.
pub(crate) fn parse_quantity(value: Option<i64>, field: FieldName) -> Result<Quantity, Error> {
    match value {
        None => Ok(Quantity::default()),
        Some(raw) => {
            Quantity::try_from(raw).map_err(|err| invalid_value_error(field, err.to_string()))
        }
    }
}

pub(crate) fn user_validation_error(field: FieldName, err: &UserValidationError) -> Error {
    invalid_value_error(field, err.to_string())
}
