//! JSON request bodies as form values, without I/O.
//!
//! # Overview
//! Decides whether a request qualifies for translation, decodes a collected
//! JSON body into multi-valued form data and overlays the query string on
//! it. The caller reads the body and stores the result on its own request
//! type, which keeps this crate deterministic and framework-free.
//!
//! # Design
//! - Guards (`should_translate`) are separate from decoding so a caller can
//!   leave non-qualifying request bodies unread.
//! - Nothing here fails loudly: every error is a `SkipReason` telling the
//!   caller to pass the request through unchanged.
//! - `FormValues` is defined here, so the middleware crate and any other
//!   host share one representation.

pub mod error;
pub mod query;
pub mod translate;
pub mod values;

pub use error::{DecodeError, QueryError, SkipReason};
pub use query::parse_query;
pub use translate::{
    accepts_content_type, accepts_method, combine, decode_form, decode_object, should_translate,
    translate, translate_object, JsonRequest, Translated,
};
pub use values::FormValues;
