use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::database::Database;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Resolves the session cookie to a logged-in user. None means the caller
/// must be sent to the login page.
pub async fn get_current_user(cookies: Cookies, db: &Database) -> Option<CurrentUser> {
    let session_id = cookies.get(SESSION_COOKIE)?.value().to_string();

    let row: Option<(i64, String, String)> = sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.email
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.id = ?1 AND s.expires_at > ?2
        "#,
    )
    .bind(&session_id)
    .bind(Utc::now())
    .fetch_optional(db)
    .await
    .ok()?;

    row.map(|(id, name, email)| CurrentUser { id, name, email })
}
