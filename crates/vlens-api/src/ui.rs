//! Embedded single-page UI.

use axum::response::Html;

/// Serve the single page.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}
