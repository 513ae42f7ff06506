//! Stripe gateway - PaymentIntents over the raw REST API
//!
//! Webhook verification follows Stripe's signing scheme: the
//! `stripe-signature` header carries `t=<timestamp>,v1=<hex hmac>` and the
//! signed payload is `"{t}.{raw body}"` with HMAC-SHA256 over the endpoint
//! secret. Verification requires the byte-exact raw body.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use sha2::Sha256;

use crate::entities::prelude::ProviderType;
use crate::error::{AppError, AppResult};
use crate::payments::{
  CreatePaymentRequest, PaymentGateway, PaymentResponse, PaymentStatus,
  WebhookData,
};

const API_BASE: &str = "https://api.stripe.com";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeConfig {
  #[serde(default)]
  pub public_key: Option<String>,
  pub secret_key: String,
  #[serde(default)]
  pub webhook_secret: Option<String>,
}

pub struct StripeGateway {
  config: StripeConfig,
  http: reqwest::Client,
}

impl StripeGateway {
  pub fn new(config: StripeConfig) -> Self {
    Self { config, http: reqwest::Client::new() }
  }

  /// Major units to cents; the single conversion point for Stripe amounts.
  fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).round().to_i64()
  }

  fn webhook_secret(&self) -> AppResult<String> {
    self
      .config
      .webhook_secret
      .clone()
      .or_else(|| std::env::var("STRIPE_WEBHOOK_SECRET").ok())
      .ok_or_else(|| {
        AppError::ProviderConfig("Stripe webhook secret not configured".into())
      })
  }

  fn verify_signature(
    &self,
    payload: &[u8],
    signature: &str,
  ) -> AppResult<()> {
    let secret = self.webhook_secret()?;

    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in signature.split(',') {
      match part.trim().split_once('=') {
        Some(("t", value)) => timestamp = Some(value),
        Some(("v1", value)) => candidates.push(value),
        _ => {}
      }
    }

    let timestamp = timestamp.ok_or_else(|| {
      AppError::WebhookVerification("malformed stripe-signature header".into())
    })?;
    if candidates.is_empty() {
      return Err(AppError::WebhookVerification(
        "no v1 signature in stripe-signature header".into(),
      ));
    }

    let mac = HmacSha256::new_from_slice(secret.as_bytes())
      .map_err(|err| AppError::WebhookVerification(err.to_string()))?;

    let mut signed = Vec::with_capacity(timestamp.len() + 1 + payload.len());
    signed.extend_from_slice(timestamp.as_bytes());
    signed.push(b'.');
    signed.extend_from_slice(payload);

    for candidate in candidates {
      let Ok(expected) = hex::decode(candidate) else { continue };
      let mut mac = mac.clone();
      mac.update(&signed);
      if mac.verify_slice(&expected).is_ok() {
        return Ok(());
      }
    }

    Err(AppError::WebhookVerification("signature mismatch".into()))
  }
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
  #[serde(rename = "type")]
  event_type: String,
  data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
  object: json::Value,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
  async fn create_payment(
    &self,
    req: &CreatePaymentRequest,
  ) -> AppResult<PaymentResponse> {
    let cents = Self::to_minor_units(req.amount).ok_or_else(|| {
      AppError::PaymentFailed("amount not representable in cents".into())
    })?;

    let mut form = vec![
      ("amount".to_string(), cents.to_string()),
      ("currency".to_string(), req.currency.to_lowercase()),
      ("description".to_string(), req.description.clone()),
      ("receipt_email".to_string(), req.user_email.clone()),
      ("metadata[userId]".to_string(), req.user_id.clone()),
      ("metadata[pluginId]".to_string(), req.plugin_id.clone()),
      ("metadata[planType]".to_string(), req.plan_type.as_str().to_string()),
    ];
    for (key, value) in &req.metadata {
      let value = match value {
        json::Value::String(s) => s.clone(),
        other => other.to_string(),
      };
      form.push((format!("metadata[{key}]"), value));
    }

    let response = self
      .http
      .post(format!("{API_BASE}/v1/payment_intents"))
      .bearer_auth(&self.config.secret_key)
      .form(&form)
      .send()
      .await?;

    let status = response.status();
    let body: json::Value = response.json().await?;

    if !status.is_success() {
      let message = body
        .pointer("/error/message")
        .and_then(json::Value::as_str)
        .unwrap_or("Stripe payment creation failed");
      return Ok(PaymentResponse::failed(message));
    }

    Ok(PaymentResponse {
      success: true,
      payment_id: body.get("id").and_then(json::Value::as_str).map(String::from),
      client_secret: body
        .get("client_secret")
        .and_then(json::Value::as_str)
        .map(String::from),
      checkout_url: None,
      error: None,
    })
  }

  async fn verify_webhook(
    &self,
    payload: &[u8],
    signature: Option<&str>,
  ) -> AppResult<WebhookData> {
    let signature = signature.ok_or_else(|| {
      AppError::WebhookVerification("Stripe signature is required".into())
    })?;
    self.verify_signature(payload, signature)?;

    let event: StripeEvent = json::from_slice(payload)
      .map_err(|err| AppError::WebhookVerification(err.to_string()))?;
    let object = event.data.object;

    if event.event_type == "payment_intent.succeeded" {
      let intent_metadata = object.get("metadata").cloned().unwrap_or_default();
      let user_id = intent_metadata
        .get("userId")
        .and_then(json::Value::as_str)
        .map(String::from);
      let plugin_id = intent_metadata
        .get("pluginId")
        .and_then(json::Value::as_str)
        .map(String::from);

      let mut metadata = match intent_metadata {
        json::Value::Object(map) => map,
        _ => json::Map::new(),
      };
      for key in ["amount", "amount_received", "currency"] {
        if let Some(value) = object.get(key) {
          metadata.insert(key.into(), value.clone());
        }
      }

      return Ok(WebhookData {
        provider: ProviderType::Stripe,
        event: event.event_type,
        payment_id: object
          .get("id")
          .and_then(json::Value::as_str)
          .unwrap_or_default()
          .to_string(),
        status: PaymentStatus::Success,
        user_id,
        plugin_id,
        metadata: json::Value::Object(metadata),
      });
    }

    Ok(WebhookData {
      provider: ProviderType::Stripe,
      event: event.event_type,
      payment_id: object
        .get("id")
        .and_then(json::Value::as_str)
        .unwrap_or_default()
        .to_string(),
      status: PaymentStatus::Pending,
      user_id: None,
      plugin_id: None,
      metadata: json::Value::Null,
    })
  }

  async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<bool> {
    let response = self
      .http
      .delete(format!("{API_BASE}/v1/subscriptions/{subscription_id}"))
      .bearer_auth(&self.config.secret_key)
      .send()
      .await?;
    Ok(response.status().is_success())
  }

  async fn get_payment_status(&self, payment_id: &str) -> AppResult<String> {
    let response = self
      .http
      .get(format!("{API_BASE}/v1/payment_intents/{payment_id}"))
      .bearer_auth(&self.config.secret_key)
      .send()
      .await?;
    let body: json::Value = response.json().await?;
    Ok(
      body
        .get("status")
        .and_then(json::Value::as_str)
        .unwrap_or("unknown")
        .to_string(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "whsec_test_secret";

  fn gateway() -> StripeGateway {
    StripeGateway::new(StripeConfig {
      public_key: None,
      secret_key: "sk_test".into(),
      webhook_secret: Some(SECRET.into()),
    })
  }

  fn sign(payload: &str, secret: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
  }

  fn succeeded_event() -> String {
    json::json!({
      "type": "payment_intent.succeeded",
      "data": {
        "object": {
          "id": "pi_123",
          "amount": 10000,
          "amount_received": 10000,
          "currency": "brl",
          "metadata": {
            "userId": "user-1",
            "pluginId": "plugin-1",
            "planType": "monthly"
          }
        }
      }
    })
    .to_string()
  }

  #[tokio::test]
  async fn verifies_and_parses_succeeded_intent() {
    let payload = succeeded_event();
    let header = sign(&payload, SECRET);

    let data = gateway()
      .verify_webhook(payload.as_bytes(), Some(&header))
      .await
      .unwrap();

    assert_eq!(data.status, PaymentStatus::Success);
    assert_eq!(data.payment_id, "pi_123");
    assert_eq!(data.user_id.as_deref(), Some("user-1"));
    assert_eq!(data.plugin_id.as_deref(), Some("plugin-1"));
    assert_eq!(data.metadata["amount_received"], json::json!(10000));
  }

  #[tokio::test]
  async fn rejects_missing_signature() {
    let payload = succeeded_event();
    let result = gateway().verify_webhook(payload.as_bytes(), None).await;
    assert!(matches!(result, Err(AppError::WebhookVerification(_))));
  }

  #[tokio::test]
  async fn rejects_wrong_secret() {
    let payload = succeeded_event();
    let header = sign(&payload, "whsec_other");
    let result = gateway().verify_webhook(payload.as_bytes(), Some(&header)).await;
    assert!(matches!(result, Err(AppError::WebhookVerification(_))));
  }

  #[tokio::test]
  async fn rejects_tampered_payload() {
    let payload = succeeded_event();
    let header = sign(&payload, SECRET);
    let tampered = payload.replace("user-1", "user-2");
    let result = gateway().verify_webhook(tampered.as_bytes(), Some(&header)).await;
    assert!(matches!(result, Err(AppError::WebhookVerification(_))));
  }

  #[tokio::test]
  async fn non_success_events_are_pending() {
    let payload = json::json!({
      "type": "payment_intent.created",
      "data": { "object": { "id": "pi_456" } }
    })
    .to_string();
    let header = sign(&payload, SECRET);

    let data =
      gateway().verify_webhook(payload.as_bytes(), Some(&header)).await.unwrap();
    assert_eq!(data.status, PaymentStatus::Pending);
    assert_eq!(data.payment_id, "pi_456");
  }

  #[test]
  fn converts_major_units_to_cents_once() {
    assert_eq!(StripeGateway::to_minor_units("49.90".parse().unwrap()), Some(4990));
    assert_eq!(StripeGateway::to_minor_units("100".parse().unwrap()), Some(10000));
  }
}
