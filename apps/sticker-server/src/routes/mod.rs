//! # API Routes

mod health;
mod history;
mod print;

use axum::routing::{get, post};
use axum::Router;

use sticker_print::PrintService;

use crate::AppState;

pub use history::{BatchView, DatecodeResponse, MaxResponse};
pub use print::{PasswordRequest, PasswordResponse, SendRequest, SendResponse};

/// Every API route, still waiting for its state.
pub fn api_routes<P>() -> Router<AppState<P>>
where
    P: PrintService + 'static,
{
    Router::new()
        .route("/api/send", post(print::send::<P>))
        .route("/api/password", post(print::password::<P>))
        .route("/api/max", get(history::max::<P>))
        .route("/api/getDatecode", get(history::datecode::<P>))
        .route("/api/batches", get(history::batches::<P>))
        .route("/health", get(health::health::<P>))
}
