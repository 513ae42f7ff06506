//! Error types for the marketplace billing core

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Plugin not found")]
  PluginNotFound,

  #[error("User not found")]
  UserNotFound,

  #[error("Coupon not found")]
  CouponNotFound,

  #[error("Payment provider not found")]
  ProviderNotFound,

  #[error(
    "No payment provider configured. Configure a payment provider in admin settings."
  )]
  NoDefaultProvider,

  #[error("Invalid plan type or price not available")]
  InvalidPlan,

  #[error("Unsupported payment provider: {0}")]
  UnsupportedProvider(String),

  #[error("Invalid provider config: {0}")]
  ProviderConfig(String),

  #[error("Webhook verification failed: {0}")]
  WebhookVerification(String),

  #[error("Payment failed: {0}")]
  PaymentFailed(String),

  #[error("License not found")]
  LicenseNotFound,

  #[error("{0}")]
  LicenseInvalid(String),

  #[error("Maximum domains ({0}) reached")]
  DomainLimitReached(i32),

  #[error("Subscription not found")]
  SubscriptionNotFound,

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Unauthorized")]
  Unauthorized,

  #[error("Internal error: {0}")]
  Internal(String),
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match &self {
      AppError::Database(_) | AppError::Internal(_) | AppError::Http(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      AppError::PluginNotFound
      | AppError::UserNotFound
      | AppError::CouponNotFound
      | AppError::ProviderNotFound
      | AppError::LicenseNotFound
      | AppError::SubscriptionNotFound => StatusCode::NOT_FOUND,
      AppError::NoDefaultProvider
      | AppError::InvalidPlan
      | AppError::UnsupportedProvider(_)
      | AppError::ProviderConfig(_)
      | AppError::WebhookVerification(_)
      | AppError::PaymentFailed(_) => StatusCode::BAD_REQUEST,
      AppError::LicenseInvalid(_) => StatusCode::FORBIDDEN,
      AppError::DomainLimitReached(_) => StatusCode::CONFLICT,
      AppError::Unauthorized => StatusCode::UNAUTHORIZED,
    };

    let body = json::json!({
      "success": false,
      "message": self.to_string(),
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type AppResult<T> = Result<T, AppError>;
