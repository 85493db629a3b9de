use crate::error::AppError;
use crate::state::AppState;

use super::dto::UploadedImage;

/// Persist the submitted image, if any, and return the stored filename to
/// record as `profile`. The write is awaited before any database call so a
/// recorded `profile` always names a file that exists; a failed write
/// aborts the request through the normal error path.
pub async fn store_profile(
    state: &AppState,
    image: Option<UploadedImage>,
) -> Result<Option<String>, AppError> {
    let Some(image) = image else {
        return Ok(None);
    };
    let stored = state.uploads.save(&image.filename, image.body).await?;
    tracing::debug!(file = %stored, "stored profile upload");
    Ok(Some(stored))
}
