//! Catalog inspection.

use grocery_mart_server::store::Stores;

use super::{CommandError, connect};

/// Log the number of products in the catalog.
pub async fn count() -> Result<(), CommandError> {
    let stores = Stores::postgres(connect().await?);
    let count = stores.products.count().await?;

    tracing::info!("Product count: {count}");
    Ok(())
}
