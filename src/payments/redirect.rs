//! Redirect-checkout gateways: Hotmart, Monetizze and Yampi
//!
//! These providers sell through hosted checkout pages keyed by product
//! codes configured on their side. Until the account-specific codes are
//! wired in, payment creation reports an explicit failure with the
//! templated checkout URL instead of fabricating success. Their webhooks
//! are fully mapped onto the uniform status vocabulary.

use async_trait::async_trait;
use serde::Deserialize;

use crate::entities::prelude::ProviderType;
use crate::error::{AppError, AppResult};
use crate::payments::{
  CreatePaymentRequest, PaymentGateway, PaymentResponse, PaymentStatus,
  WebhookData,
};

fn parse(payload: &[u8]) -> AppResult<json::Value> {
  json::from_slice(payload)
    .map_err(|err| AppError::WebhookVerification(err.to_string()))
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotmartConfig {
  pub client_id: String,
  pub client_secret: String,
  pub basic: String,
}

pub struct HotmartGateway {
  #[allow(dead_code)]
  config: HotmartConfig,
}

impl HotmartGateway {
  pub fn new(config: HotmartConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl PaymentGateway for HotmartGateway {
  async fn create_payment(
    &self,
    req: &CreatePaymentRequest,
  ) -> AppResult<PaymentResponse> {
    Ok(PaymentResponse {
      checkout_url: Some(format!("https://pay.hotmart.com/{}", req.plugin_id)),
      ..PaymentResponse::failed(
        "Hotmart integration needs configuration. Set your product code in \
         admin settings before enabling this provider.",
      )
    })
  }

  async fn verify_webhook(
    &self,
    payload: &[u8],
    _signature: Option<&str>,
  ) -> AppResult<WebhookData> {
    let body = parse(payload)?;

    let event = body
      .get("event")
      .and_then(json::Value::as_str)
      .unwrap_or("unknown")
      .to_string();
    let payment_id = body
      .pointer("/data/purchase/transaction")
      .and_then(json::Value::as_str)
      .unwrap_or_default()
      .to_string();
    let status = match body
      .pointer("/data/purchase/status")
      .and_then(json::Value::as_str)
    {
      Some("approved") | Some("complete") => PaymentStatus::Success,
      Some("cancelled") | Some("refunded") => PaymentStatus::Failed,
      _ => PaymentStatus::Pending,
    };

    Ok(WebhookData {
      provider: ProviderType::Hotmart,
      event,
      payment_id,
      status,
      user_id: None,
      plugin_id: None,
      metadata: body.get("data").cloned().unwrap_or(json::Value::Null),
    })
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetizzeConfig {
  pub consumer_key: String,
  pub token: String,
}

pub struct MonetizzeGateway {
  #[allow(dead_code)]
  config: MonetizzeConfig,
}

impl MonetizzeGateway {
  pub fn new(config: MonetizzeConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl PaymentGateway for MonetizzeGateway {
  async fn create_payment(
    &self,
    req: &CreatePaymentRequest,
  ) -> AppResult<PaymentResponse> {
    Ok(PaymentResponse {
      checkout_url: Some(format!(
        "https://checkout.monetizze.com.br/checkout/{}",
        req.plugin_id
      )),
      ..PaymentResponse::failed(
        "Monetizze integration needs configuration. Set your product code in \
         admin settings before enabling this provider.",
      )
    })
  }

  async fn verify_webhook(
    &self,
    payload: &[u8],
    _signature: Option<&str>,
  ) -> AppResult<WebhookData> {
    let body = parse(payload)?;

    let event = body
      .get("tipoEvento")
      .or_else(|| body.get("tipo_evento"))
      .map(|v| v.to_string().trim_matches('"').to_string())
      .unwrap_or_else(|| "unknown".into());
    let payment_id = body
      .pointer("/venda/id")
      .or_else(|| body.get("id"))
      .map(|id| id.to_string().trim_matches('"').to_string())
      .unwrap_or_default();

    // Monetizze reports status either as a numeric code or a label
    let status_code = body
      .pointer("/venda/status")
      .or_else(|| body.get("status"))
      .map(|v| match v {
        json::Value::String(s) => s.clone(),
        other => other.to_string(),
      })
      .unwrap_or_default();
    let status = match status_code.as_str() {
      "2" | "Completo" => PaymentStatus::Success,
      "3" | "Cancelado" => PaymentStatus::Failed,
      _ => PaymentStatus::Pending,
    };

    Ok(WebhookData {
      provider: ProviderType::Monetizze,
      event,
      payment_id,
      status,
      user_id: None,
      plugin_id: None,
      metadata: body,
    })
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YampiConfig {
  pub alias: String,
  pub token: String,
  pub secret_key: String,
}

pub struct YampiGateway {
  config: YampiConfig,
}

impl YampiGateway {
  pub fn new(config: YampiConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl PaymentGateway for YampiGateway {
  async fn create_payment(
    &self,
    req: &CreatePaymentRequest,
  ) -> AppResult<PaymentResponse> {
    Ok(PaymentResponse {
      checkout_url: Some(format!(
        "https://{}.yampi.io/checkout?sku={}",
        self.config.alias, req.plugin_id
      )),
      ..PaymentResponse::failed(
        "Yampi integration needs configuration. Set your alias and SKU codes \
         in admin settings before enabling this provider.",
      )
    })
  }

  async fn verify_webhook(
    &self,
    payload: &[u8],
    _signature: Option<&str>,
  ) -> AppResult<WebhookData> {
    let body = parse(payload)?;

    let event = body
      .get("event")
      .or_else(|| body.get("type"))
      .and_then(json::Value::as_str)
      .unwrap_or("unknown")
      .to_string();
    let payment_id = body
      .pointer("/data/id")
      .or_else(|| body.get("id"))
      .map(|id| id.to_string().trim_matches('"').to_string())
      .unwrap_or_default();
    let status =
      match body.pointer("/data/status").and_then(json::Value::as_str) {
        Some("paid") | Some("approved") => PaymentStatus::Success,
        Some("cancelled") | Some("refunded") => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
      };

    Ok(WebhookData {
      provider: ProviderType::Yampi,
      event,
      payment_id,
      status,
      user_id: None,
      plugin_id: None,
      metadata: body.get("data").cloned().unwrap_or(json::Value::Null),
    })
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal::Decimal;

  use super::*;
  use crate::entities::prelude::PlanType;

  fn request() -> CreatePaymentRequest {
    CreatePaymentRequest {
      amount: Decimal::from(50),
      currency: "BRL".into(),
      description: "Test".into(),
      user_id: "user-1".into(),
      user_email: "user@example.com".into(),
      plugin_id: "plugin-1".into(),
      plan_type: PlanType::Monthly,
      metadata: json::Map::new(),
    }
  }

  #[tokio::test]
  async fn unconfigured_gateways_never_fabricate_success() {
    let hotmart = HotmartGateway::new(HotmartConfig {
      client_id: "id".into(),
      client_secret: "secret".into(),
      basic: "b".into(),
    });
    let response = hotmart.create_payment(&request()).await.unwrap();
    assert!(!response.success);
    assert!(response.error.is_some());
    assert_eq!(
      response.checkout_url.as_deref(),
      Some("https://pay.hotmart.com/plugin-1")
    );
  }

  #[tokio::test]
  async fn hotmart_maps_purchase_status() {
    let gateway = HotmartGateway::new(HotmartConfig {
      client_id: "id".into(),
      client_secret: "secret".into(),
      basic: "b".into(),
    });
    let payload = json::json!({
      "event": "PURCHASE_APPROVED",
      "data": { "purchase": { "transaction": "HP123", "status": "approved" } }
    })
    .to_string();

    let data = gateway.verify_webhook(payload.as_bytes(), None).await.unwrap();
    assert_eq!(data.status, PaymentStatus::Success);
    assert_eq!(data.payment_id, "HP123");
  }

  #[tokio::test]
  async fn monetizze_accepts_numeric_and_label_statuses() {
    let gateway = MonetizzeGateway::new(MonetizzeConfig {
      consumer_key: "ck".into(),
      token: "t".into(),
    });

    for status in [json::json!(2), json::json!("2"), json::json!("Completo")] {
      let payload =
        json::json!({ "tipoEvento": "venda", "venda": { "id": 7, "status": status } })
          .to_string();
      let data = gateway.verify_webhook(payload.as_bytes(), None).await.unwrap();
      assert_eq!(data.status, PaymentStatus::Success);
      assert_eq!(data.payment_id, "7");
    }

    let payload =
      json::json!({ "tipoEvento": "venda", "venda": { "id": 7, "status": 3 } })
        .to_string();
    let data = gateway.verify_webhook(payload.as_bytes(), None).await.unwrap();
    assert_eq!(data.status, PaymentStatus::Failed);
  }

  #[tokio::test]
  async fn yampi_checkout_url_uses_alias() {
    let gateway = YampiGateway::new(YampiConfig {
      alias: "mystore".into(),
      token: "t".into(),
      secret_key: "sk".into(),
    });
    let response = gateway.create_payment(&request()).await.unwrap();
    assert!(!response.success);
    assert_eq!(
      response.checkout_url.as_deref(),
      Some("https://mystore.yampi.io/checkout?sku=plugin-1")
    );
  }
}
