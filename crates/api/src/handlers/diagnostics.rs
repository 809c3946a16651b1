use axum::extract::{Query, State};
use axum::Json;
use fortidash_core::adom::validate_adom_name;
use fortidash_fortimanager::diagnostics::{run_auth_diagnostics, AuthReport};

use crate::error::AppResult;
use crate::query::AdomListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /diagnostics/auth?adoms=a,b
///
/// Always 200: problems are reported as findings in the body.
pub async fn auth(
    State(state): State<AppState>,
    Query(params): Query<AdomListParams>,
) -> AppResult<Json<DataResponse<AuthReport>>> {
    let adoms = params.adoms_or(&state.default_adom);
    for adom in &adoms {
        validate_adom_name(adom)?;
    }
    let report = run_auth_diagnostics(state.fortimanager.as_ref(), &adoms).await;
    Ok(Json(DataResponse { data: report }))
}
