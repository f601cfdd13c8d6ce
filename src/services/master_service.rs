//! Read-only lookup data.

use crate::{
    db::DbPool,
    error::AppResult,
    models::master::{MasterItem, MasterKind},
    repositories::master_repository,
};

pub async fn list(pool: &DbPool, kind: MasterKind) -> AppResult<Vec<MasterItem>> {
    Ok(master_repository::list(pool, kind).await?)
}
