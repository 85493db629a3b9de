use anyhow::anyhow;
use axum::{extract::Path, response::Html, routing::get, Router};
use tracing::instrument;

use crate::error::AppError;
use crate::html::{self, PageContext};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/hello/:name", get(hello))
        .route("/error", get(forced_error))
}

#[instrument]
async fn home() -> Html<String> {
    let ctx = PageContext::new("Home");
    Html(html::home_page(&ctx))
}

async fn about() -> Html<&'static str> {
    Html("<h1>About</h1>")
}

#[instrument]
async fn hello(Path(name): Path<String>) -> Html<String> {
    let ctx = PageContext::new("Hello");
    Html(html::hello_page(&ctx, &name))
}

/// Exercises the terminal error responder end to end.
#[instrument]
async fn forced_error() -> Result<Html<String>, AppError> {
    Err(AppError::Internal(anyhow!("testing error")))
}
