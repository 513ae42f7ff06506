//! Entitlement processor - turns verified webhook events into access
//!
//! A confirmed payment grants its subscription, license and idempotency
//! marker in one transaction. The marker is an insert-or-ignore keyed on
//! the upstream payment id, so a redelivered event takes the duplicate
//! branch instead of granting twice. Coupon usage is recorded after the
//! commit and is best-effort: a failure there never voids the grant.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
  ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
  TransactionTrait, sea_query::OnConflict,
};
use tracing::{info, warn};

use crate::entities::prelude::*;
use crate::entities::processed_webhook_event;
use crate::error::AppResult;
use crate::payments::{self, PaymentStatus, WebhookData};
use crate::services::{
  CouponService, LicenseService, SubscriptionService, UserService,
};

#[derive(Debug)]
pub enum EntitlementOutcome {
  /// Access granted: subscription and license created.
  Granted { subscription: SubscriptionModel, license: LicenseModel },
  /// This event id was already processed.
  Duplicate,
  /// Non-success status or unusable metadata; acknowledged but no grant.
  Ignored,
}

pub struct EntitlementService;

impl EntitlementService {
  /// Verify a raw webhook delivery against the provider's gateway and
  /// process the resulting event.
  pub async fn process(
    db: &DatabaseConnection,
    provider: &PaymentProviderModel,
    payload: &[u8],
    signature: Option<&str>,
  ) -> AppResult<EntitlementOutcome> {
    let gateway = payments::gateway_for(provider)?;
    let data = gateway.verify_webhook(payload, signature).await?;
    Self::entitle(db, data).await
  }

  /// Process an already-verified event.
  pub async fn entitle(
    db: &DatabaseConnection,
    data: WebhookData,
  ) -> AppResult<EntitlementOutcome> {
    if data.status != PaymentStatus::Success {
      info!(
        provider = data.provider.as_str(),
        event = %data.event,
        payment_id = %data.payment_id,
        "webhook acknowledged without entitlement"
      );
      return Ok(EntitlementOutcome::Ignored);
    }

    let (Some(user_id), Some(plugin_id)) =
      (data.user_id.clone(), data.plugin_id.clone())
    else {
      warn!(
        payment_id = %data.payment_id,
        "successful payment missing user/plugin metadata"
      );
      return Ok(EntitlementOutcome::Ignored);
    };

    let txn = db.begin().await?;

    let marker = ProcessedWebhookEventActiveModel {
      id: Set(data.payment_id.clone()),
      provider: Set(data.provider.as_str().to_string()),
      event_type: Set(Some(data.event.clone())),
      processed_at: Set(Utc::now().naive_utc()),
    };
    let inserted = ProcessedWebhookEvent::insert(marker)
      .on_conflict(
        OnConflict::column(processed_webhook_event::Column::Id)
          .do_nothing()
          .to_owned(),
      )
      .exec(&txn)
      .await;
    match inserted {
      Ok(_) => {}
      Err(DbErr::RecordNotInserted) => {
        txn.rollback().await?;
        info!(payment_id = %data.payment_id, "duplicate webhook delivery");
        return Ok(EntitlementOutcome::Duplicate);
      }
      Err(err) => return Err(err.into()),
    }

    let email = metadata_str(&data.metadata, "userEmail");
    UserService::get_or_create(&txn, &user_id, email).await?;

    let plan_type = metadata_str(&data.metadata, "planType")
      .and_then(|s| PlanType::parse(&s))
      .unwrap_or(PlanType::Monthly);
    let amount = derive_amount(&data);

    let subscription = SubscriptionService::create(
      &txn, &user_id, &plugin_id, plan_type, amount,
    )
    .await?;
    let license = LicenseService::create(
      &txn,
      &user_id,
      &plugin_id,
      Some(subscription.id.clone()),
      1,
      subscription.end_date,
    )
    .await?;

    txn.commit().await?;
    info!(
      payment_id = %data.payment_id,
      subscription_id = %subscription.id,
      user_id = %user_id,
      plugin_id = %plugin_id,
      "payment entitled"
    );

    if let Err(err) =
      Self::record_coupon_usage(db, &data, &user_id, &subscription.id, amount)
        .await
    {
      warn!(payment_id = %data.payment_id, %err, "coupon usage not recorded");
    }

    Ok(EntitlementOutcome::Granted { subscription, license })
  }

  async fn record_coupon_usage(
    db: &DatabaseConnection,
    data: &WebhookData,
    user_id: &str,
    subscription_id: &str,
    final_amount: Decimal,
  ) -> AppResult<()> {
    let coupon = if let Some(id) = metadata_str(&data.metadata, "couponId") {
      Coupon::find_by_id(id).one(db).await?
    } else if let Some(code) = metadata_str(&data.metadata, "couponCode") {
      Coupon::find()
        .filter(
          crate::entities::coupon::Column::Code
            .eq(CouponService::normalize_code(&code)),
        )
        .one(db)
        .await?
    } else {
      None
    };
    let Some(coupon) = coupon else { return Ok(()) };

    let original = metadata_decimal(&data.metadata, "originalAmount")
      .unwrap_or(final_amount);
    let final_amount = metadata_decimal(&data.metadata, "finalAmount")
      .unwrap_or(final_amount);
    let discount = metadata_decimal(&data.metadata, "discountAmount")
      .unwrap_or(original - final_amount);

    CouponService::record_usage(
      db,
      &coupon.id,
      user_id,
      Some(subscription_id.to_string()),
      original,
      discount,
      final_amount,
    )
    .await?;
    Ok(())
  }
}

/// Paid amount in major units. Stripe reports minor units in
/// `amount_received` (falling back to `amount`); other providers carry a
/// major-unit amount in metadata.
fn derive_amount(data: &WebhookData) -> Decimal {
  if data.provider == ProviderType::Stripe {
    let cents = data
      .metadata
      .get("amount_received")
      .and_then(json::Value::as_i64)
      .filter(|v| *v > 0)
      .or_else(|| data.metadata.get("amount").and_then(json::Value::as_i64));
    if let Some(cents) = cents {
      return Decimal::new(cents, 2);
    }
  }
  metadata_decimal(&data.metadata, "finalAmount")
    .or_else(|| metadata_decimal(&data.metadata, "amount"))
    .unwrap_or_default()
}

fn metadata_str(metadata: &json::Value, key: &str) -> Option<String> {
  metadata.get(key).and_then(json::Value::as_str).map(str::to_string)
}

/// Metadata amounts arrive as strings from Stripe and as numbers elsewhere.
fn metadata_decimal(metadata: &json::Value, key: &str) -> Option<Decimal> {
  match metadata.get(key)? {
    json::Value::String(s) => s.parse().ok(),
    other => other.to_string().parse().ok(),
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{
    ConnectionTrait, Database, DbBackend, PaginatorTrait, Schema,
  };

  use super::*;
  use crate::testing;

  fn succeeded(payment_id: &str) -> WebhookData {
    WebhookData {
      provider: ProviderType::Stripe,
      event: "payment_intent.succeeded".into(),
      payment_id: payment_id.into(),
      status: PaymentStatus::Success,
      user_id: Some("user-1".into()),
      plugin_id: Some("plugin-1".into()),
      metadata: json::json!({
        "planType": "monthly",
        "amount_received": 8000,
      }),
    }
  }

  async fn seeded_db() -> DatabaseConnection {
    let db = testing::setup_test_db().await;
    testing::seed_user(&db, "user-1").await;
    testing::seed_plugin(&db, "plugin-1", None, None, Decimal::new(8000, 2))
      .await;
    db
  }

  #[tokio::test]
  async fn grants_subscription_and_license_once() {
    let db = seeded_db().await;

    let first =
      EntitlementService::entitle(&db, succeeded("pi_1")).await.unwrap();
    let EntitlementOutcome::Granted { subscription, license } = first else {
      panic!("expected grant");
    };
    assert_eq!(subscription.price, Decimal::new(8000, 2));
    assert_eq!(subscription.plan_type, PlanType::Monthly);
    assert_eq!(license.subscription_id.as_deref(), Some(&*subscription.id));
    assert_eq!(license.max_domains, 1);

    let second =
      EntitlementService::entitle(&db, succeeded("pi_1")).await.unwrap();
    assert!(matches!(second, EntitlementOutcome::Duplicate));

    assert_eq!(Subscription::find().count(&db).await.unwrap(), 1);
    assert_eq!(License::find().count(&db).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn non_success_event_is_ignored() {
    let db = seeded_db().await;

    let mut data = succeeded("pi_2");
    data.status = PaymentStatus::Pending;
    let outcome = EntitlementService::entitle(&db, data).await.unwrap();
    assert!(matches!(outcome, EntitlementOutcome::Ignored));

    assert_eq!(Subscription::find().count(&db).await.unwrap(), 0);
    assert_eq!(ProcessedWebhookEvent::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn missing_metadata_is_ignored() {
    let db = seeded_db().await;

    let mut data = succeeded("pi_3");
    data.user_id = None;
    let outcome = EntitlementService::entitle(&db, data).await.unwrap();
    assert!(matches!(outcome, EntitlementOutcome::Ignored));
    assert_eq!(Subscription::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn records_coupon_usage_after_grant() {
    let db = seeded_db().await;
    let coupon = testing::seed_coupon(&db, "SAVE20").await;

    let mut data = succeeded("pi_4");
    data.metadata = json::json!({
      "planType": "monthly",
      "amount_received": 6400,
      "couponId": coupon.id.clone(),
      "originalAmount": "80",
      "finalAmount": "64",
      "discountAmount": "16",
    });
    let outcome = EntitlementService::entitle(&db, data).await.unwrap();
    assert!(matches!(outcome, EntitlementOutcome::Granted { .. }));

    assert_eq!(CouponUsage::find().count(&db).await.unwrap(), 1);
    let coupon = Coupon::find_by_id(coupon.id).one(&db).await.unwrap().unwrap();
    assert_eq!(coupon.usage_count, 1);
  }

  #[tokio::test]
  async fn failed_grant_rolls_back_the_marker() {
    // Every table except licenses, so the license insert fails mid-grant.
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);
    for stmt in [
      schema.create_table_from_entity(crate::entities::user::Entity),
      schema.create_table_from_entity(crate::entities::plugin::Entity),
      schema.create_table_from_entity(crate::entities::subscription::Entity),
      schema
        .create_table_from_entity(crate::entities::processed_webhook_event::Entity),
    ] {
      db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
    }
    testing::seed_user(&db, "user-1").await;
    testing::seed_plugin(&db, "plugin-1", None, None, Decimal::new(8000, 2))
      .await;

    let result = EntitlementService::entitle(&db, succeeded("pi_5")).await;
    assert!(result.is_err());

    assert_eq!(Subscription::find().count(&db).await.unwrap(), 0);
    assert_eq!(ProcessedWebhookEvent::find().count(&db).await.unwrap(), 0);

    // The retry goes through once the fault is gone.
    db.execute(
      db.get_database_backend()
        .build(&schema.create_table_from_entity(crate::entities::license::Entity)),
    )
    .await
    .unwrap();
    let outcome = EntitlementService::entitle(&db, succeeded("pi_5")).await;
    assert!(matches!(outcome, Ok(EntitlementOutcome::Granted { .. })));
  }
}
