//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Fresh Apples
//!     description: Crispy and sweet red apples
//!     category: Fruits
//!     price: "120"
//!     stock: 50
//!     unit: kg        # optional, default "piece"
//!     rating: "4.5"   # optional, default 0
//!     image: https://… # optional
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use grocery_mart_server::models::NewProduct;
use grocery_mart_server::services::AdminService;
use grocery_mart_server::store::Stores;

use super::{CommandError, connect};

/// Contents of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    pub products: Vec<NewProduct>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub removed: u64,
    pub inserted: usize,
}

/// Parse a seed document.
pub fn parse(content: &str) -> Result<SeedCatalog, CommandError> {
    let catalog: SeedCatalog =
        serde_yaml::from_str(content).map_err(|e| CommandError::Invalid(e.to_string()))?;
    if catalog.products.is_empty() {
        return Err(CommandError::Invalid("seed file has no products".to_string()));
    }
    Ok(catalog)
}

/// Load `catalog` into the store, replacing the existing products unless
/// `keep_existing` is set.
///
/// Products go through the same validation as the admin API, so a bad entry
/// stops the run at that product.
pub async fn seed_catalog(
    stores: &Stores,
    catalog: SeedCatalog,
    keep_existing: bool,
) -> Result<SeedReport, CommandError> {
    let mut report = SeedReport::default();

    if !keep_existing {
        report.removed = stores.products.delete_all().await?;
        info!(removed = report.removed, "Cleared existing products");
    }

    let admin = AdminService::new(stores);
    for product in catalog.products {
        let name = product.name.clone();
        if let Err(err) = admin.add_product(product).await {
            error!(product = %name, "Failed to insert product: {err}");
            return Err(err.into());
        }
        report.inserted += 1;
    }

    Ok(report)
}

/// `gm-cli seed`
pub async fn run(file: &Path, keep_existing: bool) -> Result<(), CommandError> {
    if !file.exists() {
        return Err(CommandError::Invalid(format!(
            "File not found: {}",
            file.display()
        )));
    }

    info!(path = %file.display(), "Loading seed products");

    // Parse before connecting so a broken file never touches the database
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| CommandError::Invalid(e.to_string()))?;
    let catalog = parse(&content)?;
    info!(products = catalog.products.len(), "Parsed seed file");

    let stores = Stores::postgres(connect().await?);
    let report = seed_catalog(&stores, catalog, keep_existing).await?;

    info!("Seeding complete!");
    info!("  Products removed: {}", report.removed);
    info!("  Products inserted: {}", report.inserted);
    Ok(())
}
