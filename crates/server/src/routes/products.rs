//! Public catalog routes.

use axum::{Json as JsonResponse, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use grocery_mart_core::{Category, ProductId};

use super::extract::{Path, Query};
use crate::error::Result;
use crate::models::ProductFilter;
use crate::models::product::MAX_LIST_LIMIT;
use crate::services::{CatalogService, ServiceError};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl TryFrom<ListProductsQuery> for ProductFilter {
    type Error = ServiceError;

    fn try_from(query: ListProductsQuery) -> std::result::Result<Self, Self::Error> {
        let category = match query.category.as_deref().map(str::trim) {
            None | Some("" | "All" | "all") => None,
            Some(raw) => Some(
                raw.parse::<Category>()
                    .map_err(|e| ServiceError::Validation(e.to_string()))?,
            ),
        };
        if let Some(limit) = query.limit
            && !(1..=MAX_LIST_LIMIT).contains(&limit)
        {
            return Err(ServiceError::Validation(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}"
            )));
        }

        Ok(Self {
            category,
            search: query.search,
            limit: query.limit,
        })
    }
}

/// `GET /api/products`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<JsonResponse<Value>> {
    let filter = ProductFilter::try_from(query)?;
    let products = CatalogService::new(state.stores()).list(&filter).await?;
    Ok(JsonResponse(json!({ "products": products })))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<JsonResponse<Value>> {
    let product = CatalogService::new(state.stores()).get(id).await?;
    Ok(JsonResponse(json!({ "product": product })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_filter() {
        let filter = ProductFilter::try_from(ListProductsQuery {
            category: Some("Personal Care".to_string()),
            search: Some("soap".to_string()),
            limit: Some(20),
        });
        let filter = filter.ok();
        assert_eq!(
            filter.as_ref().and_then(|f| f.category),
            Some(Category::PersonalCare)
        );

        let all = ProductFilter::try_from(ListProductsQuery {
            category: Some("All".to_string()),
            ..ListProductsQuery::default()
        });
        assert!(all.is_ok_and(|f| f.category.is_none()));
    }

    #[test]
    fn test_query_rejects_bad_values() {
        assert!(ProductFilter::try_from(ListProductsQuery {
            category: Some("Gadgets".to_string()),
            ..ListProductsQuery::default()
        })
        .is_err());
        assert!(ProductFilter::try_from(ListProductsQuery {
            limit: Some(0),
            ..ListProductsQuery::default()
        })
        .is_err());
        assert!(ProductFilter::try_from(ListProductsQuery {
            limit: Some(101),
            ..ListProductsQuery::default()
        })
        .is_err());
    }
}
