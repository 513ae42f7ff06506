//! Payment provider adapters
//!
//! One capability trait over heterogeneous payment back-ends, a concrete
//! gateway per provider type, and a factory keyed on the closed
//! `ProviderType` enum. Provider-specific failures never cross this
//! boundary; they are translated into `AppError` / `PaymentResponse`.

pub mod mercadopago;
pub mod redirect;
pub mod stripe;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::prelude::{PaymentProviderModel, PlanType, ProviderType};
use crate::error::{AppError, AppResult};

/// Request to create a payment with any provider. `amount` is in major
/// units; minor-unit conversion (e.g. cents for Stripe) happens once,
/// inside the gateway that needs it.
#[derive(Clone, Debug)]
pub struct CreatePaymentRequest {
  pub amount: Decimal,
  pub currency: String,
  pub description: String,
  pub user_id: String,
  pub user_email: String,
  pub plugin_id: String,
  pub plan_type: PlanType,
  pub metadata: json::Map<String, json::Value>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
  pub success: bool,
  pub payment_id: Option<String>,
  /// Serialized as `paymentUrl`: the name redirect clients consume.
  #[serde(rename = "paymentUrl")]
  pub checkout_url: Option<String>,
  pub client_secret: Option<String>,
  pub error: Option<String>,
}

impl PaymentResponse {
  pub fn failed(error: impl Into<String>) -> Self {
    Self { error: Some(error.into()), ..Self::default() }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Success,
  Pending,
  Failed,
}

/// Uniform shape of a verified webhook event.
#[derive(Clone, Debug)]
pub struct WebhookData {
  pub provider: ProviderType,
  pub event: String,
  pub payment_id: String,
  pub status: PaymentStatus,
  pub user_id: Option<String>,
  pub plugin_id: Option<String>,
  pub metadata: json::Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Create a payment and return a redirect URL or client secret.
  /// Provider API errors come back as a failed `PaymentResponse`, not `Err`.
  async fn create_payment(
    &self,
    req: &CreatePaymentRequest,
  ) -> AppResult<PaymentResponse>;

  /// Verify a raw webhook payload. Must error on a bad or missing
  /// signature where the provider supports signing; an unverified payload
  /// is never treated as trusted.
  async fn verify_webhook(
    &self,
    payload: &[u8],
    signature: Option<&str>,
  ) -> AppResult<WebhookData>;

  async fn cancel_subscription(&self, _subscription_id: &str) -> AppResult<bool> {
    Ok(false)
  }

  async fn get_payment_status(&self, _payment_id: &str) -> AppResult<String> {
    Ok("unknown".into())
  }
}

fn config<T: serde::de::DeserializeOwned>(
  provider: &PaymentProviderModel,
) -> AppResult<T> {
  json::from_value(provider.config.clone())
    .map_err(|err| AppError::ProviderConfig(err.to_string()))
}

/// Select the concrete gateway for a configured provider record.
pub fn gateway_for(
  provider: &PaymentProviderModel,
) -> AppResult<Box<dyn PaymentGateway>> {
  match provider.provider_type {
    ProviderType::Stripe => {
      Ok(Box::new(stripe::StripeGateway::new(config(provider)?)))
    }
    ProviderType::MercadoPago => {
      Ok(Box::new(mercadopago::MercadoPagoGateway::new(config(provider)?)))
    }
    ProviderType::Hotmart => {
      Ok(Box::new(redirect::HotmartGateway::new(config(provider)?)))
    }
    ProviderType::Monetizze => {
      Ok(Box::new(redirect::MonetizzeGateway::new(config(provider)?)))
    }
    ProviderType::Yampi => {
      Ok(Box::new(redirect::YampiGateway::new(config(provider)?)))
    }
    ProviderType::Custom => Err(AppError::UnsupportedProvider(
      provider.provider_type.as_str().into(),
    )),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn provider(provider_type: ProviderType, config: json::Value) -> PaymentProviderModel {
    let now = Utc::now().naive_utc();
    PaymentProviderModel {
      id: "prov-1".into(),
      name: "test".into(),
      provider_type,
      display_name: "Test".into(),
      is_active: true,
      is_default: true,
      config,
      webhook_url: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn factory_rejects_custom_provider() {
    let provider = provider(ProviderType::Custom, json::json!({}));
    let err = gateway_for(&provider).err().unwrap();
    assert!(matches!(err, AppError::UnsupportedProvider(kind) if kind == "custom"));
  }

  #[test]
  fn factory_rejects_malformed_config() {
    let provider = provider(ProviderType::Stripe, json::json!({ "publicKey": 42 }));
    assert!(matches!(gateway_for(&provider), Err(AppError::ProviderConfig(_))));
  }

  #[test]
  fn factory_builds_each_supported_gateway() {
    let cases = [
      (ProviderType::Stripe, json::json!({ "secretKey": "sk_test" })),
      (
        ProviderType::MercadoPago,
        json::json!({ "publicKey": "pk", "accessToken": "token" }),
      ),
      (
        ProviderType::Hotmart,
        json::json!({ "clientId": "id", "clientSecret": "secret", "basic": "b" }),
      ),
      (
        ProviderType::Monetizze,
        json::json!({ "consumerKey": "ck", "token": "t" }),
      ),
      (
        ProviderType::Yampi,
        json::json!({ "alias": "shop", "token": "t", "secretKey": "sk" }),
      ),
    ];

    for (provider_type, config) in cases {
      assert!(gateway_for(&provider(provider_type, config)).is_ok());
    }
  }
}
