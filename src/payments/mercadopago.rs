//! Mercado Pago gateway - Pix payments over the REST API
//!
//! Mercado Pago webhooks carry no signature; events are acknowledged as
//! delivered and the payment status is taken from the notification body.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::entities::prelude::ProviderType;
use crate::error::AppResult;
use crate::payments::{
  CreatePaymentRequest, PaymentGateway, PaymentResponse, PaymentStatus,
  WebhookData,
};

const API_BASE: &str = "https://api.mercadopago.com";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MercadoPagoConfig {
  #[serde(default)]
  pub public_key: Option<String>,
  pub access_token: String,
}

pub struct MercadoPagoGateway {
  config: MercadoPagoConfig,
  http: reqwest::Client,
}

impl MercadoPagoGateway {
  pub fn new(config: MercadoPagoConfig) -> Self {
    Self { config, http: reqwest::Client::new() }
  }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
  async fn create_payment(
    &self,
    req: &CreatePaymentRequest,
  ) -> AppResult<PaymentResponse> {
    let mut metadata = json::json!({
      "user_id": req.user_id,
      "plugin_id": req.plugin_id,
      "plan_type": req.plan_type.as_str(),
    });
    for (key, value) in &req.metadata {
      metadata[key] = value.clone();
    }

    let body = json::json!({
      "transaction_amount": req.amount.to_f64(),
      "description": req.description,
      "payment_method_id": "pix",
      "payer": { "email": req.user_email },
      "metadata": metadata,
    });

    let idempotency_key =
      format!("{}-{}", req.user_id, chrono::Utc::now().timestamp_millis());

    let response = self
      .http
      .post(format!("{API_BASE}/v1/payments"))
      .bearer_auth(&self.config.access_token)
      .header("X-Idempotency-Key", idempotency_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    let data: json::Value = response.json().await?;

    if !status.is_success() {
      let message = data
        .get("message")
        .and_then(json::Value::as_str)
        .unwrap_or("Mercado Pago payment creation failed");
      return Ok(PaymentResponse::failed(message));
    }

    Ok(PaymentResponse {
      success: true,
      payment_id: data.get("id").map(|id| id.to_string().trim_matches('"').into()),
      checkout_url: data
        .pointer("/point_of_interaction/transaction_data/ticket_url")
        .and_then(json::Value::as_str)
        .map(String::from),
      client_secret: None,
      error: None,
    })
  }

  async fn verify_webhook(
    &self,
    payload: &[u8],
    _signature: Option<&str>,
  ) -> AppResult<WebhookData> {
    let body: json::Value = json::from_slice(payload).map_err(|err| {
      crate::error::AppError::WebhookVerification(err.to_string())
    })?;

    let action = body
      .get("action")
      .or_else(|| body.get("type"))
      .and_then(json::Value::as_str)
      .unwrap_or("unknown")
      .to_string();

    let payment_id = body
      .pointer("/data/id")
      .or_else(|| body.get("id"))
      .map(|id| id.to_string().trim_matches('"').to_string())
      .unwrap_or_default();

    let data_status =
      body.pointer("/data/status").and_then(json::Value::as_str);
    let status = if action == "payment.updated" || action == "payment.created" {
      match data_status {
        Some("approved") => PaymentStatus::Success,
        Some("rejected") | Some("cancelled") => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
      }
    } else {
      PaymentStatus::Pending
    };

    let metadata = body.get("data").cloned().unwrap_or(json::Value::Null);
    let user_id = metadata
      .pointer("/metadata/user_id")
      .and_then(json::Value::as_str)
      .map(String::from);
    let plugin_id = metadata
      .pointer("/metadata/plugin_id")
      .and_then(json::Value::as_str)
      .map(String::from);

    Ok(WebhookData {
      provider: ProviderType::MercadoPago,
      event: action,
      payment_id,
      status,
      user_id,
      plugin_id,
      metadata,
    })
  }

  async fn get_payment_status(&self, payment_id: &str) -> AppResult<String> {
    let response = self
      .http
      .get(format!("{API_BASE}/v1/payments/{payment_id}"))
      .bearer_auth(&self.config.access_token)
      .send()
      .await?;
    let data: json::Value = response.json().await?;
    Ok(
      data
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

  fn gateway() -> MercadoPagoGateway {
    MercadoPagoGateway::new(MercadoPagoConfig {
      public_key: None,
      access_token: "token".into(),
    })
  }

  #[tokio::test]
  async fn maps_approved_payment_to_success() {
    let payload = json::json!({
      "action": "payment.updated",
      "data": {
        "id": 1234,
        "status": "approved",
        "metadata": { "user_id": "user-1", "plugin_id": "plugin-1" }
      }
    })
    .to_string();

    let data = gateway().verify_webhook(payload.as_bytes(), None).await.unwrap();
    assert_eq!(data.status, PaymentStatus::Success);
    assert_eq!(data.payment_id, "1234");
    assert_eq!(data.user_id.as_deref(), Some("user-1"));
  }

  #[tokio::test]
  async fn maps_rejected_payment_to_failed() {
    let payload = json::json!({
      "action": "payment.updated",
      "data": { "id": "99", "status": "rejected" }
    })
    .to_string();

    let data = gateway().verify_webhook(payload.as_bytes(), None).await.unwrap();
    assert_eq!(data.status, PaymentStatus::Failed);
  }

  #[tokio::test]
  async fn unrelated_actions_stay_pending() {
    let payload = json::json!({ "type": "test.ping", "id": "1" }).to_string();
    let data = gateway().verify_webhook(payload.as_bytes(), None).await.unwrap();
    assert_eq!(data.status, PaymentStatus::Pending);
    assert_eq!(data.event, "test.ping");
  }
}
