//! JSON request bodies as form values for tower and axum services.
//!
//! Wrap a service with [`FormJsonLayer`] (or [`FormJsonContextLayer`] for
//! services taking a `(context, request)` pair) and handlers can keep reading
//! form values by name while clients post JSON. See [`RequestFormExt`] and
//! the [`PostForm`] / [`Form`] extractors.
//!
//! The crate also ships a small demo server, built by [`app`].

pub mod form;
pub mod layer;

use axum::{extract::Request, routing::post, Json, Router};
pub use formjson_core::FormValues;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use form::{Form, FormRejection, PostForm, RequestFormExt};
pub use layer::{
    adapt_request, handler, handler_with_context, FormJson, FormJsonContext,
    FormJsonContextLayer, FormJsonLayer,
};

/// What `/echo` saw on the request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub post_form: Option<FormValues>,
    pub form: Option<FormValues>,
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", post(hello).get(hello))
        .route("/echo", post(echo))
        .layer(FormJsonLayer)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello(req: Request) -> String {
    let name = req.form_value("name").unwrap_or_default();
    format!("Hello {name}!")
}

async fn echo(post_form: Option<PostForm>, form: Option<Form>) -> Json<Echo> {
    Json(Echo {
        post_form: post_form.map(|PostForm(values)| values),
        form: form.map(|Form(values)| values),
    })
}
