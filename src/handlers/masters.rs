//! Lookup data endpoint.

use axum::{Json, extract::State};

use crate::{
    db::DbPool,
    error::{AppError, Resource},
    extract::AppPath,
    models::master::{MasterItem, MasterKind},
    services::master_service,
};

/// `GET /api/v1/masters/{kind}` where `kind` is `wallet-types`,
/// `transaction-types` or `investment-items`. Any other kind is a 404.
pub async fn list_master(
    State(pool): State<DbPool>,
    AppPath(kind): AppPath<String>,
) -> Result<Json<Vec<MasterItem>>, AppError> {
    let kind: MasterKind = kind
        .parse()
        .map_err(|_| AppError::NotFound(Resource::Master))?;
    Ok(Json(master_service::list(&pool, kind).await?))
}
