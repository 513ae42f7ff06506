//! Payment provider service - configured back-end records
//!
//! The default flag is a single piece of shared state: switching the
//! default clears every flag and sets exactly one inside one transaction,
//! so readers never observe two defaults.

use chrono::Utc;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
  QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::payment_provider::Column;
use crate::entities::prelude::*;
use crate::error::{AppError, AppResult};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDraft {
  pub name: String,
  pub provider_type: ProviderType,
  pub display_name: String,
  #[serde(default)]
  pub is_active: bool,
  pub config: json::Value,
  #[serde(default)]
  pub webhook_url: Option<String>,
}

pub struct ProviderService;

impl ProviderService {
  pub async fn list(
    db: &DatabaseConnection,
  ) -> AppResult<Vec<PaymentProviderModel>> {
    let providers = PaymentProvider::find()
      .order_by_desc(Column::IsDefault)
      .order_by_desc(Column::CreatedAt)
      .all(db)
      .await?;
    Ok(providers)
  }

  pub async fn active(
    db: &DatabaseConnection,
  ) -> AppResult<Vec<PaymentProviderModel>> {
    let providers = PaymentProvider::find()
      .filter(Column::IsActive.eq(true))
      .order_by_desc(Column::IsDefault)
      .all(db)
      .await?;
    Ok(providers)
  }

  pub async fn get_by_id(
    db: &DatabaseConnection,
    id: &str,
  ) -> AppResult<Option<PaymentProviderModel>> {
    let provider = PaymentProvider::find_by_id(id).one(db).await?;
    Ok(provider)
  }

  /// The active provider of a given type, for fixed webhook routes.
  pub async fn by_type(
    db: &DatabaseConnection,
    provider_type: ProviderType,
  ) -> AppResult<Option<PaymentProviderModel>> {
    let provider = PaymentProvider::find()
      .filter(Column::ProviderType.eq(provider_type))
      .filter(Column::IsActive.eq(true))
      .one(db)
      .await?;
    Ok(provider)
  }

  /// The sole provider used for new checkouts.
  pub async fn default_provider(
    db: &DatabaseConnection,
  ) -> AppResult<Option<PaymentProviderModel>> {
    let provider = PaymentProvider::find()
      .filter(Column::IsActive.eq(true))
      .filter(Column::IsDefault.eq(true))
      .one(db)
      .await?;
    Ok(provider)
  }

  pub async fn create(
    db: &DatabaseConnection,
    draft: ProviderDraft,
  ) -> AppResult<PaymentProviderModel> {
    let now = Utc::now().naive_utc();
    let provider = PaymentProviderActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      name: Set(draft.name),
      provider_type: Set(draft.provider_type),
      display_name: Set(draft.display_name),
      is_active: Set(draft.is_active),
      is_default: Set(false),
      config: Set(draft.config),
      webhook_url: Set(draft.webhook_url),
      created_at: Set(now),
      updated_at: Set(now),
    };
    Ok(provider.insert(db).await?)
  }

  pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    draft: ProviderDraft,
  ) -> AppResult<PaymentProviderModel> {
    let provider = PaymentProvider::find_by_id(id)
      .one(db)
      .await?
      .ok_or(AppError::ProviderNotFound)?;

    let mut provider: PaymentProviderActiveModel = provider.into();
    provider.name = Set(draft.name);
    provider.provider_type = Set(draft.provider_type);
    provider.display_name = Set(draft.display_name);
    provider.is_active = Set(draft.is_active);
    provider.config = Set(draft.config);
    provider.webhook_url = Set(draft.webhook_url);
    provider.updated_at = Set(Utc::now().naive_utc());
    Ok(provider.update(db).await?)
  }

  pub async fn delete(db: &DatabaseConnection, id: &str) -> AppResult<()> {
    let provider = PaymentProvider::find_by_id(id)
      .one(db)
      .await?
      .ok_or(AppError::ProviderNotFound)?;
    PaymentProvider::delete_by_id(provider.id).exec(db).await?;
    Ok(())
  }

  /// Clear every default flag, then set one, in a single transaction.
  pub async fn set_default(db: &DatabaseConnection, id: &str) -> AppResult<()> {
    let txn = db.begin().await?;

    let provider = PaymentProvider::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or(AppError::ProviderNotFound)?;

    PaymentProvider::update_many()
      .col_expr(Column::IsDefault, Expr::value(false))
      .exec(&txn)
      .await?;

    let mut provider: PaymentProviderActiveModel = provider.into();
    provider.is_default = Set(true);
    provider.updated_at = Set(Utc::now().naive_utc());
    provider.update(&txn).await?;

    txn.commit().await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;

  #[tokio::test]
  async fn default_switch_leaves_exactly_one_default() {
    let db = testing::setup_test_db().await;
    let a = testing::seed_provider(
      &db,
      ProviderType::Stripe,
      json::json!({ "secretKey": "sk" }),
      true,
    )
    .await;
    let b = testing::seed_provider(
      &db,
      ProviderType::MercadoPago,
      json::json!({ "accessToken": "t" }),
      false,
    )
    .await;

    ProviderService::set_default(&db, &b.id).await.unwrap();

    let providers = ProviderService::list(&db).await.unwrap();
    let defaults: Vec<_> =
      providers.iter().filter(|p| p.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, b.id);
    assert!(!providers.iter().find(|p| p.id == a.id).unwrap().is_default);
  }

  #[tokio::test]
  async fn default_provider_requires_active_flag() {
    let db = testing::setup_test_db().await;
    let provider = testing::seed_provider(
      &db,
      ProviderType::Stripe,
      json::json!({ "secretKey": "sk" }),
      true,
    )
    .await;

    assert!(
      ProviderService::default_provider(&db).await.unwrap().is_some()
    );

    let mut inactive: PaymentProviderActiveModel = provider.into();
    inactive.is_active = Set(false);
    inactive.update(&db).await.unwrap();

    assert!(ProviderService::default_provider(&db).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn set_default_unknown_provider_fails() {
    let db = testing::setup_test_db().await;
    let result = ProviderService::set_default(&db, "missing").await;
    assert!(matches!(result, Err(AppError::ProviderNotFound)));
  }
}
