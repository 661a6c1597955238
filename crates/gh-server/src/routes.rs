//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{callback, chat, check_auth, home, login, logout};
use crate::server::AppState;

/// Create the router
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        // OAuth
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        // API
        .route("/check_auth", get(check_auth))
        .route("/chat", post(chat))
}
