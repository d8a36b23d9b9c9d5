use axum::Json;
use axum::extract::State;
use rentops_core::{AppError, UserId};

use crate::dto::{CheckMode, CheckPermissionsRequest, CheckPermissionsResponse, GrantPayload};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn check_permissions_handler(
    State(state): State<AppState>,
    Json(payload): Json<CheckPermissionsRequest>,
) -> ApiResult<Json<CheckPermissionsResponse>> {
    let grants = payload
        .grants
        .iter()
        .map(GrantPayload::to_grant)
        .collect::<Result<Vec<_>, _>>()?;
    let user_id = UserId::new(payload.user_id);
    let authorization = &state.authorization_service;

    let allowed = match payload.mode {
        CheckMode::Single => {
            let [grant] = grants.as_slice() else {
                return Err(AppError::Validation(
                    "mode 'single' requires exactly one grant".to_owned(),
                )
                .into());
            };
            authorization
                .can(user_id, grant.action, &grant.resource)
                .await
        }
        CheckMode::Any => authorization.can_any(user_id, &grants).await,
        CheckMode::All => authorization.can_all(user_id, &grants).await,
    };

    Ok(Json(CheckPermissionsResponse {
        user_id: payload.user_id,
        allowed,
    }))
}
