//! Checkout orchestrator - plugin, plan, coupon and provider come together

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::info;

use crate::entities::prelude::*;
use crate::error::{AppError, AppResult};
use crate::payments::{self, CreatePaymentRequest, PaymentResponse};
use crate::services::coupon::CouponOutcome;
use crate::services::{CouponService, ProviderService, UserService};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
  pub provider: ProviderType,
  pub original_amount: Decimal,
  pub discount_amount: Decimal,
  pub final_amount: Decimal,
  #[serde(flatten)]
  pub payment: PaymentResponse,
}

/// Priced plan with the coupon already applied.
#[derive(Debug)]
struct Quote {
  plugin: PluginModel,
  original_amount: Decimal,
  discount_amount: Decimal,
  final_amount: Decimal,
  coupon: Option<CouponModel>,
}

pub struct CheckoutService;

impl CheckoutService {
  async fn quote(
    db: &DatabaseConnection,
    user_id: &str,
    plugin_id: &str,
    plan_type: &PlanType,
    coupon_code: Option<&str>,
  ) -> AppResult<Quote> {
    let plugin = Plugin::find_by_id(plugin_id)
      .one(db)
      .await?
      .filter(|p| p.is_active)
      .ok_or(AppError::PluginNotFound)?;

    let original_amount = match plan_type {
      PlanType::Monthly => plugin.monthly_price,
      PlanType::Yearly => plugin.yearly_price,
      PlanType::Lifetime => Some(plugin.price),
    }
    .ok_or(AppError::InvalidPlan)?;

    let mut quote = Quote {
      plugin,
      original_amount,
      discount_amount: Decimal::ZERO,
      final_amount: original_amount,
      coupon: None,
    };
    if let Some(code) = coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
      match CouponService::validate(
        db,
        code,
        user_id,
        original_amount,
        Some(plugin_id),
      )
      .await?
      {
        CouponOutcome::Valid(applied) => {
          quote.discount_amount = applied.discount_amount;
          quote.final_amount = applied.final_amount;
          quote.coupon = Some(applied.coupon);
        }
        CouponOutcome::Invalid(rejection) => {
          return Err(AppError::PaymentFailed(rejection.reason().to_string()));
        }
      }
    }

    Ok(quote)
  }

  /// Start a subscription purchase: price the plan, apply the coupon,
  /// then hand off to the default provider's gateway. A gateway that
  /// reports failure rejects the checkout; fulfilment happens later,
  /// when the provider's webhook confirms the payment.
  pub async fn subscribe(
    db: &DatabaseConnection,
    user_id: &str,
    user_email: &str,
    plugin_id: &str,
    plan_type: PlanType,
    coupon_code: Option<&str>,
    currency: &str,
  ) -> AppResult<CheckoutSession> {
    let quote =
      Self::quote(db, user_id, plugin_id, &plan_type, coupon_code).await?;

    let provider = ProviderService::default_provider(db)
      .await?
      .ok_or(AppError::NoDefaultProvider)?;

    UserService::get_or_create(db, user_id, Some(user_email.to_string()))
      .await?;

    let mut metadata = json::Map::new();
    metadata.insert("userId".into(), json::json!(user_id));
    metadata.insert("userEmail".into(), json::json!(user_email));
    metadata.insert("pluginId".into(), json::json!(quote.plugin.id));
    metadata.insert("pluginSlug".into(), json::json!(quote.plugin.slug));
    metadata.insert("planType".into(), json::json!(plan_type.as_str()));
    metadata.insert(
      "originalAmount".into(),
      json::json!(quote.original_amount.to_string()),
    );
    metadata.insert(
      "finalAmount".into(),
      json::json!(quote.final_amount.to_string()),
    );
    metadata.insert(
      "discountAmount".into(),
      json::json!(quote.discount_amount.to_string()),
    );
    if let Some(coupon) = &quote.coupon {
      metadata.insert("couponId".into(), json::json!(coupon.id));
      metadata.insert("couponCode".into(), json::json!(coupon.code));
    }

    let request = CreatePaymentRequest {
      amount: quote.final_amount,
      currency: currency.to_string(),
      description: format!(
        "{} - {} plan",
        quote.plugin.name,
        plan_type.as_str()
      ),
      user_id: user_id.to_string(),
      user_email: user_email.to_string(),
      plugin_id: quote.plugin.id.clone(),
      plan_type,
      metadata,
    };
    let payment =
      payments::gateway_for(&provider)?.create_payment(&request).await?;

    if !payment.success {
      let error = payment
        .error
        .unwrap_or_else(|| "Payment creation failed".to_string());
      info!(
        user_id,
        plugin_id = %quote.plugin.id,
        provider = provider.provider_type.as_str(),
        %error,
        "checkout rejected by gateway"
      );
      return Err(AppError::PaymentFailed(error));
    }

    info!(
      user_id,
      plugin_id = %quote.plugin.id,
      provider = provider.provider_type.as_str(),
      final_amount = %quote.final_amount,
      "checkout session created"
    );

    Ok(CheckoutSession {
      provider: provider.provider_type,
      original_amount: quote.original_amount,
      discount_amount: quote.discount_amount,
      final_amount: quote.final_amount,
      payment,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;

  fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
  }

  async fn seeded_db() -> DatabaseConnection {
    let db = testing::setup_test_db().await;
    testing::seed_plugin(
      &db,
      "plugin-1",
      Some(dec("49.00")),
      None,
      dec("199.00"),
    )
    .await;
    db
  }

  async fn seed_hotmart(db: &DatabaseConnection) {
    testing::seed_provider(
      db,
      ProviderType::Hotmart,
      json::json!({ "clientId": "id", "clientSecret": "s", "basic": "b" }),
      true,
    )
    .await;
  }

  #[tokio::test]
  async fn unknown_plugin_is_rejected() {
    let db = seeded_db().await;
    seed_hotmart(&db).await;

    let result = CheckoutService::subscribe(
      &db,
      "user-1",
      "u@example.com",
      "missing",
      PlanType::Monthly,
      None,
      "BRL",
    )
    .await;
    assert!(matches!(result, Err(AppError::PluginNotFound)));
  }

  #[tokio::test]
  async fn plan_without_price_is_rejected() {
    let db = seeded_db().await;
    seed_hotmart(&db).await;

    let result = CheckoutService::subscribe(
      &db,
      "user-1",
      "u@example.com",
      "plugin-1",
      PlanType::Yearly,
      None,
      "BRL",
    )
    .await;
    assert!(matches!(result, Err(AppError::InvalidPlan)));
  }

  #[tokio::test]
  async fn missing_default_provider_is_rejected() {
    let db = seeded_db().await;

    let result = CheckoutService::subscribe(
      &db,
      "user-1",
      "u@example.com",
      "plugin-1",
      PlanType::Monthly,
      None,
      "BRL",
    )
    .await;
    assert!(matches!(result, Err(AppError::NoDefaultProvider)));
  }

  #[tokio::test]
  async fn invalid_coupon_aborts_checkout() {
    let db = seeded_db().await;
    seed_hotmart(&db).await;

    let result = CheckoutService::subscribe(
      &db,
      "user-1",
      "u@example.com",
      "plugin-1",
      PlanType::Monthly,
      Some("NOPE"),
      "BRL",
    )
    .await;
    match result {
      Err(AppError::PaymentFailed(reason)) => {
        assert_eq!(reason, "Coupon not found")
      }
      other => panic!("expected coupon rejection, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn coupon_is_applied_to_the_quote() {
    let db = seeded_db().await;
    testing::seed_coupon(&db, "SAVE20").await;

    let quote = CheckoutService::quote(
      &db,
      "user-1",
      "plugin-1",
      &PlanType::Monthly,
      Some("save20"),
    )
    .await
    .unwrap();

    assert_eq!(quote.original_amount, dec("49.00"));
    assert_eq!(quote.discount_amount, dec("9.8000"));
    assert_eq!(quote.final_amount, dec("39.2000"));
    assert_eq!(quote.coupon.unwrap().code, "SAVE20");
  }

  #[tokio::test]
  async fn lifetime_plan_uses_the_base_price() {
    let db = seeded_db().await;

    let quote = CheckoutService::quote(
      &db,
      "user-1",
      "plugin-1",
      &PlanType::Lifetime,
      None,
    )
    .await
    .unwrap();
    assert_eq!(quote.final_amount, dec("199.00"));
  }

  #[tokio::test]
  async fn gateway_failure_rejects_the_checkout() {
    let db = seeded_db().await;
    seed_hotmart(&db).await;
    testing::seed_coupon(&db, "SAVE20").await;

    // The coupon is valid, so the rejection must carry the gateway's
    // error, not a validation reason.
    let result = CheckoutService::subscribe(
      &db,
      "user-1",
      "u@example.com",
      "plugin-1",
      PlanType::Monthly,
      Some("SAVE20"),
      "BRL",
    )
    .await;
    match result {
      Err(AppError::PaymentFailed(error)) => {
        assert!(error.contains("Hotmart integration needs configuration"))
      }
      other => panic!("expected gateway rejection, got {other:?}"),
    }
  }
}
