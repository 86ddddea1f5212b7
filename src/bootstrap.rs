use sqlx::SqlitePool;

use crate::auth::password;
use crate::config::BootstrapAdmin;
use crate::db;
use crate::db::users::NewUser;

pub const ADMIN_USERNAME: &str = "admin";

/// Create the configured super admin if nobody owns its e-mail yet.
/// Returns whether a user was created.
pub async fn ensure_admin(pool: &SqlitePool, admin: &BootstrapAdmin) -> Result<bool, String> {
    let existing = db::users::find_by_email(pool, &admin.email)
        .await
        .map_err(|e| format!("Failed to look up bootstrap admin: {e}"))?;
    if existing.is_some() {
        return Ok(false);
    }

    let Some(username) = free_username(pool, &admin.email).await? else {
        tracing::warn!(
            email = %admin.email,
            "Bootstrap admin skipped: no free username, create the account from the admin panel"
        );
        return Ok(false);
    };

    let password_hash = password::hash(&admin.password)?;
    let user = db::users::create(
        pool,
        &NewUser {
            username: &username,
            email: &admin.email,
            password_hash: &password_hash,
            is_super_admin: true,
            company_id: None,
            profile_id: None,
        },
    )
    .await
    .map_err(|e| format!("Failed to create bootstrap admin: {e}"))?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        email = %user.email,
        "Bootstrap super admin created"
    );
    Ok(true)
}

/// `admin`, or the local part of the e-mail when `admin` is already taken.
async fn free_username(pool: &SqlitePool, email: &str) -> Result<Option<String>, String> {
    let local_part = email.split('@').next().unwrap_or_default().trim();
    for candidate in [ADMIN_USERNAME, local_part] {
        if candidate.is_empty() {
            continue;
        }
        let taken = db::users::username_taken(pool, candidate)
            .await
            .map_err(|e| format!("Failed to look up bootstrap admin: {e}"))?;
        if !taken {
            return Ok(Some(candidate.to_string()));
        }
    }
    Ok(None)
}
