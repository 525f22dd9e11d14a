//! Form values stored on a request, and the ways handlers read them.

use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::response::{IntoResponse, Response};
use formjson_core::{parse_query, FormValues};
use http::request::Parts;
use http::{Extensions, Request, StatusCode, Uri};

/// Values decoded from the request body alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm(pub FormValues);

/// Body values overlaid with the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form(pub FormValues);

impl Deref for PostForm {
    type Target = FormValues;

    fn deref(&self) -> &FormValues {
        &self.0
    }
}

impl Deref for Form {
    type Target = FormValues;

    fn deref(&self) -> &FormValues {
        &self.0
    }
}

/// Read access to the form values a request carries.
pub trait RequestFormExt {
    fn post_form(&self) -> Option<&FormValues>;

    fn form(&self) -> Option<&FormValues>;

    /// First value for `name`: from `Form` when set, otherwise from the
    /// query string. `None` covers both "not sent" and "not translatable".
    fn form_value(&self, name: &str) -> Option<String>;

    fn post_form_value(&self, name: &str) -> Option<&str> {
        self.post_form().and_then(|values| values.get(name))
    }
}

impl<B> RequestFormExt for Request<B> {
    fn post_form(&self) -> Option<&FormValues> {
        self.extensions().get::<PostForm>().map(|PostForm(values)| values)
    }

    fn form(&self) -> Option<&FormValues> {
        self.extensions().get::<Form>().map(|Form(values)| values)
    }

    fn form_value(&self, name: &str) -> Option<String> {
        form_value(self.extensions(), self.uri(), name)
    }
}

impl RequestFormExt for Parts {
    fn post_form(&self) -> Option<&FormValues> {
        self.extensions.get::<PostForm>().map(|PostForm(values)| values)
    }

    fn form(&self) -> Option<&FormValues> {
        self.extensions.get::<Form>().map(|Form(values)| values)
    }

    fn form_value(&self, name: &str) -> Option<String> {
        form_value(&self.extensions, &self.uri, name)
    }
}

fn form_value(extensions: &Extensions, uri: &Uri, name: &str) -> Option<String> {
    if let Some(Form(values)) = extensions.get::<Form>() {
        return values.get(name).map(str::to_string);
    }
    let query = parse_query(uri.query()?).ok()?;
    query.get(name).map(str::to_string)
}

/// Rejection used when a handler requires form values the request lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormRejection {
    missing: &'static str,
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            format!("request carries no {} values", self.missing),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = FormRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PostForm>()
            .cloned()
            .ok_or(FormRejection { missing: "JSON form" })
    }
}

impl<S> OptionalFromRequestParts<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<PostForm>().cloned())
    }
}

impl<S> FromRequestParts<S> for Form
where
    S: Send + Sync,
{
    type Rejection = FormRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Form>()
            .cloned()
            .ok_or(FormRejection { missing: "combined form" })
    }
}

impl<S> OptionalFromRequestParts<S> for Form
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Form>().cloned())
    }
}
