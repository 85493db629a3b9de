use std::net::SocketAddr;

use axum::{http::StatusCode, response::Html, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::html;
use crate::site;
use crate::state::AppState;
use crate::users;

pub fn build_app(state: AppState) -> Router {
    let uploads_dir = state.config.uploads_dir.clone();
    Router::new()
        .merge(site::router())
        .merge(users::router())
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback(not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Unmatched routes get their own page; they never reach the error responder.
async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(html::not_found_page()))
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "form-boundary";

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::in_memory(dir.path()).await;
        (build_app(state), dir)
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request")
    }

    fn multipart(
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                    name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                    name=\"image\"; filename=\"{filename}\"\r\n\
                    Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn home_and_about_render() {
        let (app, _dir) = test_app().await;

        let res = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("<h1>Home</h1>"));

        let res = app.oneshot(get("/about")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "<h1>About</h1>");
    }

    #[tokio::test]
    async fn hello_greets_and_escapes_the_path_parameter() {
        let (app, _dir) = test_app().await;

        let res = app
            .clone()
            .oneshot(get("/hello/World"))
            .await
            .unwrap();
        assert!(body_text(res).await.contains("<h1>Hello World</h1>"));

        let res = app
            .oneshot(get("/hello/%3Cscript%3Ealert(1)%3C%2Fscript%3E"))
            .await
            .unwrap();
        let body = body_text(res).await;
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[tokio::test]
    async fn unknown_route_gets_the_not_found_page() {
        let (app, _dir) = test_app().await;
        let res = app.oneshot(get("/no/such/page")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = body_text(res).await;
        assert!(body.contains("<h1>Not Found</h1>"));
        assert!(!body.contains("Error Message:"));
    }

    #[tokio::test]
    async fn forced_error_reaches_the_responder() {
        let (app, _dir) = test_app().await;
        let res = app.oneshot(get("/error")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(res).await;
        assert!(body.contains("Server Error"));
        assert!(body.contains("testing error"));
    }

    #[tokio::test]
    async fn add_form_renders_empty() {
        let (app, _dir) = test_app().await;
        let res = app.oneshot(get("/user/add")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("action=\"/user/add\""));
    }

    #[tokio::test]
    async fn create_with_upload_then_list_shows_user_and_file() {
        let (app, dir) = test_app().await;

        let res = app
            .clone()
            .oneshot(multipart(
                "/user/add",
                &[("name", "Ann"), ("age", "30"), ("dob", "1990-04-01")],
                Some(("a.png", b"png bytes")),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/user/list");

        // Upload landed on disk before the redirect.
        assert_eq!(
            std::fs::read(dir.path().join("a.png")).unwrap(),
            b"png bytes"
        );

        let res = app.clone().oneshot(get("/user/list")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(body.contains("Ann"));
        assert!(body.contains("/uploads/a.png"));

        // The stored file is served back.
        let res = app.oneshot(get("/uploads/a.png")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"png bytes");
    }

    #[tokio::test]
    async fn create_without_name_is_rejected() {
        let (app, _dir) = test_app().await;
        let res = app
            .clone()
            .oneshot(multipart("/user/add", &[("name", ""), ("age", "30")], None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(res).await.contains("name is required"));

        let res = app.oneshot(get("/user/list")).await.unwrap();
        assert!(!body_text(res).await.contains("<td>30</td>"));
    }

    #[tokio::test]
    async fn edit_prefills_updates_and_keeps_unsupplied_fields() {
        let (app, _dir) = test_app().await;

        app.clone()
            .oneshot(multipart("/user/add", &[("name", "Ann"), ("age", "30")], None))
            .await
            .unwrap();

        let res = app.clone().oneshot(get("/user/add/1")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(body.contains("action=\"/user/edit\""));
        assert!(body.contains("value=\"Ann\""));

        // Age changes, the blank name field leaves the stored name alone.
        let res = app
            .clone()
            .oneshot(multipart(
                "/user/edit",
                &[("id", "1"), ("name", ""), ("age", "31")],
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = app.oneshot(get("/user/list")).await.unwrap();
        let body = body_text(res).await;
        assert!(body.contains("Ann"));
        assert!(body.contains("<td>31</td>"));
    }

    #[tokio::test]
    async fn edit_prefill_for_unknown_id_is_not_found() {
        let (app, _dir) = test_app().await;
        let res = app.oneshot(get("/user/add/999")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_text(res).await.contains("no user with id 999"));
    }

    #[tokio::test]
    async fn delete_redirects_even_for_missing_ids() {
        let (app, _dir) = test_app().await;

        app.clone()
            .oneshot(multipart("/user/add", &[("name", "Ann")], None))
            .await
            .unwrap();

        let res = app.clone().oneshot(get("/user/delete/1")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/user/list");

        let res = app.clone().oneshot(get("/user/list")).await.unwrap();
        assert!(!body_text(res).await.contains("Ann"));

        let res = app.oneshot(get("/user/delete/999")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn non_numeric_path_id_is_a_validation_error() {
        let (app, _dir) = test_app().await;
        let res = app.oneshot(get("/user/delete/abc")).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(res).await.contains("user id must be an integer"));
    }
}
