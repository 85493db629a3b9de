use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::html::{self, PageContext};
use crate::state::AppState;

use super::dto::UserSubmission;
use super::repo::{self, NewUser, UserChanges};
use super::services;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/user/add", get(add_form))
        .route("/user/list", get(list_users))
        .route("/user/add/:user_id", get(edit_form))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/user/add", post(create_user))
        .route("/user/edit", post(edit_user))
        .route("/user/delete/:user_id", get(delete_user))
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
}

#[instrument]
async fn add_form() -> Html<String> {
    let ctx = PageContext::new("Add User");
    Html(html::user_form_page(&ctx, None))
}

#[instrument(skip(state, body))]
async fn create_user(
    State(state): State<AppState>,
    body: Multipart,
) -> Result<Redirect, AppError> {
    let submission = UserSubmission::from_multipart(body).await?;
    let profile = services::store_profile(&state, submission.image).await?;
    let id = repo::create(
        &state.db,
        NewUser {
            name: submission.form.name.unwrap_or_default(),
            age: submission.form.age,
            dob: submission.form.dob,
            doj: None,
            profile,
        },
    )
    .await?;
    info!(user_id = id, "user created");
    Ok(Redirect::to("/user/list"))
}

#[instrument(skip(state))]
async fn list_users(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let users = repo::list_summaries(&state.db).await?;
    let ctx = PageContext::new("List User");
    Ok(Html(html::user_list_page(&ctx, &users)))
}

#[instrument(skip(state))]
async fn edit_form(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_path_id(&user_id)?;
    let user = repo::find_by_id(&state.db, id).await?;
    let ctx = PageContext::new("Edit User");
    Ok(Html(html::user_form_page(&ctx, Some(&user))))
}

#[instrument(skip(state, body))]
async fn edit_user(State(state): State<AppState>, body: Multipart) -> Result<Redirect, AppError> {
    let submission = UserSubmission::from_multipart(body).await?;
    let id = submission.require_id()?;
    let profile = services::store_profile(&state, submission.image).await?;
    repo::update(
        &state.db,
        UserChanges {
            id,
            name: submission.form.name,
            age: submission.form.age,
            dob: submission.form.dob,
            profile,
        },
    )
    .await?;
    info!(user_id = id, "user updated");
    Ok(Redirect::to("/user/list"))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = parse_path_id(&user_id)?;
    repo::delete(&state.db, id).await?;
    info!(user_id = id, "user deleted");
    Ok(Redirect::to("/user/list"))
}

fn parse_path_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::Validation(format!("user id must be an integer, got {raw:?}")))
}
