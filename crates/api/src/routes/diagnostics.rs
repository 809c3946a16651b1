use axum::routing::get;
use axum::Router;

use crate::handlers::diagnostics;
use crate::state::AppState;

/// Routes mounted at `/diagnostics`.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth", get(diagnostics::auth))
}
