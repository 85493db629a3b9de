use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use crate::error::AppError;

/// A full `user` row.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub dob: Option<Date>,
    pub doj: OffsetDateTime,
    pub profile: Option<String>,
}

/// The list projection: exactly id, name, age, profile.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub profile: Option<String>,
}

/// Fields for a new record. `doj` falls back to the current time.
#[derive(Debug, Default)]
pub struct NewUser {
    pub name: String,
    pub age: Option<i64>,
    pub dob: Option<Date>,
    pub doj: Option<OffsetDateTime>,
    pub profile: Option<String>,
}

/// A partial update: only supplied fields are written. `doj` is
/// creation-only and cannot be changed here.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub id: i64,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub dob: Option<Date>,
    pub profile: Option<String>,
}

pub async fn ensure_schema(db: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            name    TEXT    NOT NULL,
            age     INTEGER,
            dob     TEXT,
            doj     TEXT    NOT NULL,
            profile TEXT
        )
        "#,
    )
    .execute(db)
    .await?;
    Ok(())
}

/// Insert a new record and return its generated id.
pub async fn create(db: &SqlitePool, user: NewUser) -> Result<i64, AppError> {
    if user.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    let doj = user.doj.unwrap_or_else(OffsetDateTime::now_utc);
    let res = sqlx::query(
        r#"
        INSERT INTO user (name, age, dob, doj, profile)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&user.name)
    .bind(user.age)
    .bind(user.dob)
    .bind(doj)
    .bind(&user.profile)
    .execute(db)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn list_summaries(db: &SqlitePool) -> Result<Vec<UserSummary>, AppError> {
    let rows = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, name, age, profile
        FROM user
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, age, dob, doj, profile
        FROM user
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    user.ok_or(AppError::NotFound(id))
}

/// Overwrite the supplied fields of an existing record, leaving the rest
/// untouched. A field can therefore not be cleared back to NULL here.
pub async fn update(db: &SqlitePool, changes: UserChanges) -> Result<(), AppError> {
    if matches!(&changes.name, Some(n) if n.trim().is_empty()) {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    let res = sqlx::query(
        r#"
        UPDATE user
        SET name    = COALESCE(?2, name),
            age     = COALESCE(?3, age),
            dob     = COALESCE(?4, dob),
            profile = COALESCE(?5, profile)
        WHERE id = ?1
        "#,
    )
    .bind(changes.id)
    .bind(&changes.name)
    .bind(changes.age)
    .bind(changes.dob)
    .bind(&changes.profile)
    .execute(db)
    .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(changes.id));
    }
    Ok(())
}

/// Remove a record. Deleting an id that does not exist is not an error.
pub async fn delete(db: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
