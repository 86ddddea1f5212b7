use sqlx::SqlitePool;

use crate::models::{User, UserListing};

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_super_admin: bool,
    pub company_id: Option<i64>,
    pub profile_id: Option<i64>,
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    new: &NewUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, is_super_admin, company_id, profile_id)
         VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.is_super_admin)
    .bind(new.company_id)
    .bind(new.profile_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Whether a user already holds this username or e-mail.
pub async fn exists<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    username: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
            .bind(username)
            .bind(email)
            .fetch_one(executor)
            .await?;
    Ok(row.0 > 0)
}

pub async fn count_all<'e, E: sqlx::SqliteExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

pub async fn list_with_links(pool: &SqlitePool) -> Result<Vec<UserListing>, sqlx::Error> {
    sqlx::query_as::<_, UserListing>(
        "SELECT u.id, u.username, u.email, u.is_super_admin, u.company_id, u.profile_id,
                c.name AS company_name, p.name AS profile_name
         FROM users u
         LEFT JOIN companies c ON c.id = u.company_id
         LEFT JOIN profiles p ON p.id = u.profile_id
         ORDER BY u.id",
    )
    .fetch_all(pool)
    .await
}

/// Editable account fields; the password is left untouched.
pub struct UserUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub is_super_admin: bool,
    pub company_id: Option<i64>,
    pub profile_id: Option<i64>,
}

pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    changes: &UserUpdate<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users
         SET username = ?, email = ?, is_super_admin = ?, company_id = ?, profile_id = ?
         WHERE id = ?",
    )
    .bind(changes.username)
    .bind(changes.email)
    .bind(changes.is_super_admin)
    .bind(changes.company_id)
    .bind(changes.profile_id)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn count_super_admins<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_super_admin = 1")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

pub async fn username_taken(pool: &SqlitePool, username: &str) -> Result<bool, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(row.0 > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
