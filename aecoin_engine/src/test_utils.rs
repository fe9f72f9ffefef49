//! Helpers for setting up throwaway SQLite databases in integration tests.
use std::path::Path;

use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{NewProduct, Product},
    traits::StorefrontDatabase,
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite://../data/test_store_{}", rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Insert a product with `stock` fresh codes and return it.
pub async fn seed_product(db: &SqliteDatabase, sku: &str, price_sen: i64, stock: usize) -> Product {
    let product = db
        .insert_product(NewProduct {
            sku: sku.to_string(),
            title: format!("AECOIN {sku}"),
            amount_ae: 1000,
            price_original: aec_common::Money::from(price_sen),
            price_now: aec_common::Money::from(price_sen),
            is_active: true,
        })
        .await
        .expect("Error inserting product");
    let codes = (0..stock).map(|i| format!("{}-CODE-{i:04}", sku.to_uppercase())).collect::<Vec<_>>();
    db.insert_codes(product.id, &codes).await.expect("Error inserting codes");
    product
}
