#![forbid(unsafe_code)]

use poem_openapi::error::{ParseParamError, ParseRequestPayloadError};
use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("items_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Invalid catalog configuration: {}", .0)]
    InvalidCatalog(String),
}

// ***************************************************************************
//                          HTTP Validation Errors
// ***************************************************************************
/// A single rejected input location.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct ValidationErrorDetail {
    /// Request part followed by the field name, e.g. `["body", "price"]`.
    pub loc: Vec<String>,
    /// Human readable explanation.
    pub msg: String,
    /// Machine readable constraint name, e.g. `greater_than`.
    #[oai(rename = "type")]
    pub kind: String,
}

/// Body of every 422 response.
#[derive(Object, Debug, Clone, PartialEq)]
#[oai(rename = "HTTPValidationError")]
pub struct HttpValidationError {
    pub detail: Vec<ValidationErrorDetail>,
}

impl ValidationErrorDetail {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

impl HttpValidationError {
    pub fn new(detail: Vec<ValidationErrorDetail>) -> Self {
        Self { detail }
    }
}

// ---------------------------------------------------------------------------
// validation_error_from:
// ---------------------------------------------------------------------------
/** Translate a framework extraction error (bad query or path parameter,
 * unusable request payload) into the same shape used for body validation
 * failures.
 */
pub fn validation_error_from(err: &poem::Error) -> HttpValidationError {
    // Path parameters are all text, so only query parameters fail coercion.
    if let Some(e) = err.downcast_ref::<ParseParamError>() {
        return HttpValidationError::new(vec![
            ValidationErrorDetail::new(&["query", e.name], e.reason.clone(), "parse_error"),
        ]);
    }
    if let Some(e) = err.downcast_ref::<ParseRequestPayloadError>() {
        return HttpValidationError::new(vec![
            ValidationErrorDetail::new(&["body"], e.reason.clone(), "json_invalid"),
        ]);
    }
    HttpValidationError::new(vec![ValidationErrorDetail::new(&["request"], err.to_string(), "invalid_request")])
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_error_maps_to_query_location() {
        let err: poem::Error = ParseParamError {
            name: "skip",
            reason: "failed to parse \"integer(int64)\": invalid digit found in string".to_string(),
        }.into();
        let v = validation_error_from(&err);
        assert_eq!(v.detail.len(), 1);
        assert_eq!(v.detail[0].loc, vec!["query".to_string(), "skip".to_string()]);
        assert_eq!(v.detail[0].kind, "parse_error");
    }

    #[test]
    fn unknown_error_is_still_reported() {
        let err = poem::Error::from_string("boom", poem::http::StatusCode::BAD_REQUEST);
        let v = validation_error_from(&err);
        assert_eq!(v.detail[0].loc, vec!["request".to_string()]);
        assert_eq!(v.detail[0].msg, "boom");
    }
}
