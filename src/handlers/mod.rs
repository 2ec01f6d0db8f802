pub mod auth;
pub mod dashboard;
pub mod products;
pub mod sales;
pub mod stock;

use axum::response::Redirect;

/// Builds a redirect carrying a user-visible notice as a query parameter.
/// The target page renders the notice once and the URL stays shareable.
pub(crate) fn redirect_with_notice(path: &str, message: &str) -> Redirect {
    let encoded = urlencoding::encode(message);
    Redirect::to(&format!("{}?notice={}", path, encoded))
}
