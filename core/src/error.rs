//! Error types for the JSON-to-form translation.
//!
//! # Design
//! None of these errors reach the caller of the middleware. They exist so
//! the core can say *why* a request was passed through untouched, which the
//! middleware logs and the tests assert on.

use thiserror::Error;

/// Why a request body could not be decoded into a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body held no JSON value at all.
    #[error("request body is empty")]
    Empty,

    /// The body is not valid JSON.
    #[error("malformed JSON body: {0}")]
    Malformed(String),

    /// The body is valid JSON but its top-level value is not an object.
    #[error("top-level JSON value is {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Why a query string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A `%` not followed by two hex digits.
    #[error("invalid percent escape in {0:?}")]
    InvalidEscape(String),

    /// `;` is not accepted as a pair separator.
    #[error("invalid semicolon separator in query")]
    Semicolon,
}

/// Why the translation step left the request untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("content type is not JSON")]
    ContentType,

    #[error("method does not carry a form body")]
    Method,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
