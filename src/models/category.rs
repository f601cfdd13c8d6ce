//! Category models for both API versions.
//!
//! v1 exposes the flat master list. v2 nests master sub-categories under
//! their parent and adds the account's own (personal) categories.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::TransactionType;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct MasterCategory {
    pub id: i32,
    pub transaction_type: String,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubCategory {
    pub id: i32,
    #[serde(skip)]
    pub category_id: i32,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PersonalCategory {
    pub id: Uuid,
    #[serde(skip)]
    pub account_id: Uuid,
    pub transaction_type: String,
    pub name: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

/// Master category with its sub-categories (v2).
#[derive(Debug, Serialize)]
pub struct CategoryNode {
    pub id: i32,
    pub transaction_type: String,
    pub name: String,
    pub icon: Option<String>,
    pub sub_categories: Vec<SubCategory>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesV2Response {
    pub categories: Vec<CategoryNode>,
    pub personal: Vec<PersonalCategory>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePersonalCategoryRequest {
    pub transaction_type: TransactionType,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePersonalCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Attach sub-categories to their parents, keeping the parents' order.
/// Sub-categories whose parent is not in `categories` are dropped.
pub fn nest_sub_categories(
    categories: Vec<MasterCategory>,
    sub_categories: Vec<SubCategory>,
) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<i32, Vec<SubCategory>> = HashMap::new();
    for sub in sub_categories {
        by_parent.entry(sub.category_id).or_default().push(sub);
    }

    categories
        .into_iter()
        .map(|category| CategoryNode {
            sub_categories: by_parent.remove(&category.id).unwrap_or_default(),
            id: category.id,
            transaction_type: category.transaction_type,
            name: category.name,
            icon: category.icon,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, name: &str) -> MasterCategory {
        MasterCategory {
            id,
            transaction_type: "spending".to_string(),
            name: name.to_string(),
            icon: None,
        }
    }

    fn sub(id: i32, category_id: i32, name: &str) -> SubCategory {
        SubCategory {
            id,
            category_id,
            name: name.to_string(),
            icon: None,
        }
    }

    #[test]
    fn nests_children_under_parents() {
        let tree = nest_sub_categories(
            vec![category(1, "Food"), category(2, "Bills")],
            vec![sub(10, 1, "Groceries"), sub(11, 2, "Internet"), sub(12, 1, "Restaurant")],
        );

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Food");
        let names: Vec<_> = tree[0].sub_categories.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Groceries", "Restaurant"]);
        assert_eq!(tree[1].sub_categories.len(), 1);
    }

    #[test]
    fn orphans_are_dropped() {
        let tree = nest_sub_categories(vec![category(1, "Food")], vec![sub(10, 99, "Lost")]);
        assert!(tree[0].sub_categories.is_empty());
    }
}
