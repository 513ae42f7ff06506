//! Shared application state

use std::env;

use crate::migration::Migrator;
use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Config {
  /// ISO currency code used for new checkouts
  pub currency: String,
  /// Bearer token for the admin routes
  pub admin_token: String,
}

impl Config {
  pub fn from_env(admin_token: String) -> Self {
    Self {
      currency: env::var("CURRENCY").unwrap_or_else(|_| "BRL".into()),
      admin_token,
    }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str, config: Config) -> Self {
    info!("Connecting to database...");
    let db =
      Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, config }
  }
}
