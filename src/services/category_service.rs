//! Category use cases.
//!
//! Master categories are shared and read-only. Personal categories belong
//! to one account and may only be income or spending categories.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::{
        category::{
            CategoriesV2Response, CreatePersonalCategoryRequest, MasterCategory, PersonalCategory,
            UpdatePersonalCategoryRequest, nest_sub_categories,
        },
        transaction::TransactionType,
    },
    repositories::category_repository,
    validation::Validator,
};

/// Flat list of master categories (v1).
pub async fn list_v1(pool: &DbPool, transaction_type: Option<TransactionType>) -> AppResult<Vec<MasterCategory>> {
    let filter = transaction_type.map(TransactionType::as_str);
    Ok(category_repository::list_master(pool, filter).await?)
}

/// Master categories with nested sub-categories, plus the account's own (v2).
pub async fn list_v2(
    pool: &DbPool,
    account_id: Uuid,
    transaction_type: Option<TransactionType>,
) -> AppResult<CategoriesV2Response> {
    let filter = transaction_type.map(TransactionType::as_str);

    let categories = category_repository::list_master(pool, filter).await?;
    let sub_categories = category_repository::list_sub_categories(pool, filter).await?;
    let personal = category_repository::list_personal(pool, account_id, filter).await?;

    Ok(CategoriesV2Response {
        categories: nest_sub_categories(categories, sub_categories),
        personal,
    })
}

pub async fn create_personal(
    pool: &DbPool,
    account_id: Uuid,
    request: CreatePersonalCategoryRequest,
) -> AppResult<PersonalCategory> {
    let mut validator = Validator::new();
    validator.text("name", &request.name, 64).check(
        request.transaction_type.is_categorized(),
        "invalid_transaction_type",
        "personal categories must be income or spending",
    );
    if let Some(icon) = &request.icon {
        validator.text("icon", icon, 64);
    }
    validator.finish()?;

    let category = category_repository::insert_personal(
        pool,
        account_id,
        request.transaction_type.as_str(),
        request.name.trim(),
        request.icon.as_deref().map(str::trim),
    )
    .await?;

    tracing::info!(%account_id, category_id = %category.id, "Personal category created");
    Ok(category)
}

pub async fn update_personal(
    pool: &DbPool,
    account_id: Uuid,
    category_id: Uuid,
    request: UpdatePersonalCategoryRequest,
) -> AppResult<PersonalCategory> {
    let mut validator = Validator::new();
    if let Some(name) = &request.name {
        validator.text("name", name, 64);
    }
    if let Some(icon) = &request.icon {
        validator.text("icon", icon, 64);
    }
    validator.finish()?;

    category_repository::update_personal(
        pool,
        account_id,
        category_id,
        request.name.as_deref().map(str::trim),
        request.icon.as_deref().map(str::trim),
    )
    .await?
    .ok_or(AppError::NotFound(Resource::Category))
}

/// Delete a personal category. Transactions that used it become
/// uncategorized.
pub async fn delete_personal(pool: &DbPool, account_id: Uuid, category_id: Uuid) -> AppResult<()> {
    if category_repository::delete_personal(pool, account_id, category_id).await? == 0 {
        return Err(AppError::NotFound(Resource::Category));
    }
    Ok(())
}
