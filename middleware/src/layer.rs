//! Tower middleware that turns JSON bodies into form values.
//!
//! # Design
//! Two flavors wrap an inner service without changing its interface:
//! `FormJson` serves `Request<B>`, `FormJsonContext` serves `(C, Request<B>)`
//! and hands the context value through untouched. Both run the same
//! [`adapt_request`] step and then always call the inner service, so the
//! middleware never produces an error of its own.
//!
//! A qualifying request has its body read to the end. The request the inner
//! service sees carries `B::default()` as its body; the JSON is only
//! available through the `PostForm` / `Form` extensions.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use formjson_core::{should_translate, translate, JsonRequest, Translated};
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderMap, Request};
use http_body::Body;
use http_body_util::BodyExt;
use tower::{BoxError, Layer, Service};
use tracing::{debug, trace};

use crate::form::{Form, PostForm};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Wrap `inner` so JSON bodies reach it as form values.
pub fn handler<S>(inner: S) -> FormJson<S> {
    FormJsonLayer.layer(inner)
}

/// Context-carrying counterpart of [`handler`].
pub fn handler_with_context<S>(inner: S) -> FormJsonContext<S> {
    FormJsonContextLayer.layer(inner)
}

/// Layer producing [`FormJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormJsonLayer;

impl<S> Layer<S> for FormJsonLayer {
    type Service = FormJson<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FormJson { inner }
    }
}

/// Layer producing [`FormJsonContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormJsonContextLayer;

impl<S> Layer<S> for FormJsonContextLayer {
    type Service = FormJsonContext<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FormJsonContext { inner }
    }
}

#[derive(Debug, Clone)]
pub struct FormJson<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for FormJson<S>
where
    S: Service<Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Body + Default + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        // The readied service goes into the future; a fresh clone stays behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let req = adapt_request(req).await;
            inner.call(req).await
        })
    }
}

#[derive(Debug, Clone)]
pub struct FormJsonContext<S> {
    inner: S,
}

impl<S, C, B> Service<(C, Request<B>)> for FormJsonContext<S>
where
    S: Service<(C, Request<B>)> + Clone + Send + 'static,
    S::Future: Send + 'static,
    C: Send + 'static,
    B: Body + Default + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, (ctx, req): (C, Request<B>)) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let req = adapt_request(req).await;
            inner.call((ctx, req)).await
        })
    }
}

/// Translate a JSON body into `PostForm` / `Form` extensions.
///
/// Requests that are not `POST`/`PUT`/`PATCH` with a JSON content type come
/// back unchanged, body included. Otherwise the body is consumed and the
/// returned request holds `B::default()`; the extensions are only inserted
/// when the body decodes to a JSON object.
pub async fn adapt_request<B>(req: Request<B>) -> Request<B>
where
    B: Body + Default,
    B::Error: Into<BoxError>,
{
    let qualifies = should_translate(
        content_type(req.headers()).as_deref(),
        req.method().as_str(),
    );
    if !qualifies {
        debug!(method = %req.method(), uri = %req.uri(), "request is not a JSON form submission");
        return req;
    }

    let (mut parts, body) = req.into_parts();
    let bytes: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            let err: BoxError = err.into();
            debug!(method = %parts.method, uri = %parts.uri, error = %err, "failed to read JSON body");
            return Request::from_parts(parts, B::default());
        }
    };
    insert_form_values(&mut parts, &bytes);
    Request::from_parts(parts, B::default())
}

// Non-UTF-8 bytes are replaced, so the JSON substring match still sees the
// rest of the value.
fn content_type(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

fn insert_form_values(parts: &mut Parts, body: &[u8]) {
    let content_type = content_type(&parts.headers);
    let request = JsonRequest {
        method: parts.method.as_str(),
        content_type: content_type.as_deref(),
        query: parts.uri.query(),
        body,
    };
    match translate(&request) {
        Ok(Translated { post_form, form }) => {
            trace!(keys = post_form.len(), "translated JSON body into form values");
            if let Some(form) = form {
                parts.extensions.insert(Form(form));
            }
            parts.extensions.insert(PostForm(post_form));
        }
        Err(reason) => {
            debug!(method = %parts.method, uri = %parts.uri, %reason, "leaving request untouched");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use http::HeaderValue;
    use http_body::Frame;
    use tower::{service_fn, ServiceExt};

    use super::*;
    use crate::form::RequestFormExt;

    /// A body whose first read fails, like a connection reset mid-upload.
    #[derive(Default)]
    struct FailingBody;

    impl Body for FailingBody {
        type Data = Bytes;
        type Error = std::io::Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
            Poll::Ready(Some(Err(std::io::Error::other("connection reset"))))
        }
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn qualifying_request_gets_both_extensions_and_an_empty_body() {
        let req = adapt_request(json_request("POST", "/?foo=bar", r#"{"name":"baz"}"#)).await;
        assert_eq!(req.post_form().and_then(|v| v.get("name")), Some("baz"));
        assert_eq!(req.form().and_then(|v| v.get("foo")), Some("bar"));
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn skipped_request_keeps_its_body() {
        let req = adapt_request(json_request("GET", "/", r#"{"name":"baz"}"#)).await;
        assert!(req.post_form().is_none());
        assert!(req.form().is_none());
        assert_eq!(req.body(), r#"{"name":"baz"}"#);
    }

    #[tokio::test]
    async fn malformed_body_is_consumed_without_extensions() {
        let req = adapt_request(json_request("PUT", "/", "{")).await;
        assert!(req.post_form().is_none());
        assert!(req.form().is_none());
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn body_read_error_still_calls_the_inner_service() {
        let req = Request::builder()
            .method("POST")
            .uri("/?foo=bar")
            .header(CONTENT_TYPE, "application/json")
            .body(FailingBody)
            .unwrap();
        let svc = handler(service_fn(|req: Request<FailingBody>| async move {
            Ok::<_, Infallible>((req.post_form().is_some(), req.form().is_some()))
        }));
        assert_eq!(svc.oneshot(req).await.unwrap(), (false, false));
    }

    #[tokio::test]
    async fn content_type_with_non_ascii_bytes_is_still_matched() {
        let value = HeaderValue::from_bytes(b"application/json; x=\xe9").unwrap();
        assert!(value.to_str().is_err());
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, value)
            .body(r#"{"name":"baz"}"#.to_string())
            .unwrap();
        let req = adapt_request(req).await;
        assert_eq!(req.post_form().and_then(|v| v.get("name")), Some("baz"));
    }
}
