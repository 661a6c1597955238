//! gh-server: HTTP relay between the chat client, the LLM and GitHub
//!
//! - `GET /login`, `GET /callback`: GitHub OAuth app flow
//! - `GET /check_auth`: validate the stored token
//! - `POST /chat`: prompt → function call → GitHub operation → text
//! - `POST /logout`: drop the stored token

pub mod error;
pub mod handlers;
pub mod oauth;
pub mod routes;
pub mod server;
pub mod store;

pub use error::{Result, ServerError};
pub use handlers::{ChatResponse, CheckAuthResponse};
pub use server::{AppState, router, start_server};
pub use store::TokenStore;
