use axum::extract::multipart::{Field, Multipart};
use bytes::Bytes;
use time::Date;

use crate::error::AppError;
use crate::html::DATE_FMT;

/// Text fields shared by the add and edit forms. Empty inputs come through
/// as `None`; malformed ones are rejected at the boundary.
#[derive(Debug, Default)]
pub struct UserForm {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub dob: Option<Date>,
}

/// The file part of a submission, if the client attached one.
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub body: Bytes,
}

/// Everything a mutating route reads out of its multipart body.
#[derive(Debug, Default)]
pub struct UserSubmission {
    pub id: Option<i64>,
    pub form: UserForm,
    pub image: Option<UploadedImage>,
}

impl UserSubmission {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, AppError> {
        let mut out = Self::default();
        while let Some(field) = mp
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let body = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.to_string()))?;
                    // A file input left empty still submits a part with an
                    // empty filename and no bytes.
                    if !filename.is_empty() && !body.is_empty() {
                        out.image = Some(UploadedImage { filename, body });
                    }
                }
                "name" => out.form.name = non_empty(text_value(field).await?),
                "age" => out.form.age = parse_age(&text_value(field).await?)?,
                "dob" => out.form.dob = parse_dob(&text_value(field).await?)?,
                "id" => out.id = parse_id(&text_value(field).await?)?,
                other => {
                    return Err(AppError::Validation(format!(
                        "unexpected form field {other:?}"
                    )));
                }
            }
        }
        Ok(out)
    }

    /// The edit route cannot do anything without an id.
    pub fn require_id(&self) -> Result<i64, AppError> {
        self.id
            .ok_or_else(|| AppError::Validation("id is required".into()))
    }
}

async fn text_value(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_age(raw: &str) -> Result<Option<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("age must be an integer, got {raw:?}")))
}

fn parse_dob(raw: &str) -> Result<Option<Date>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Date::parse(raw, DATE_FMT)
        .map(Some)
        .map_err(|_| AppError::Validation(format!("dob must be YYYY-MM-DD, got {raw:?}")))
}

fn parse_id(raw: &str) -> Result<Option<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("id must be an integer, got {raw:?}")))
}
