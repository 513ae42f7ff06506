//! HTTP handlers and request extractors
//!
//! Authentication lives in front of this service: an upstream gateway
//! terminates sessions and forwards the verified identity in
//! `x-user-id` / `x-user-email`. Admin routes additionally require the
//! shared `x-admin-token` secret.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::{HeaderMap, request::Parts};
use serde::Deserialize;

use crate::prelude::*;
use crate::entities::prelude::*;
use crate::services::checkout::CheckoutSession;
use crate::services::coupon::{CouponDraft, CouponOutcome};
use crate::services::provider::ProviderDraft;
use crate::services::{
  CheckoutService, CouponService, EntitlementService, LicenseService,
  ProviderService, SubscriptionService,
};
use crate::state::AppState;

/// Identity forwarded by the auth gateway.
pub struct CurrentUser {
  pub id: String,
  pub email: String,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
  type Rejection = AppError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let header = |name: &str| {
      parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
    };

    let id = header("x-user-id").ok_or(AppError::Unauthorized)?;
    let email = header("x-user-email").unwrap_or_default();
    Ok(Self { id, email })
  }
}

/// Admission ticket for the admin routes.
pub struct AdminGuard;

impl FromRequestParts<Arc<AppState>> for AdminGuard {
  type Rejection = AppError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<AppState>,
  ) -> Result<Self, Self::Rejection> {
    let token = parts
      .headers
      .get("x-admin-token")
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default();

    if token.is_empty() || token != state.config.admin_token {
      return Err(AppError::Unauthorized);
    }
    Ok(Self)
  }
}

pub async fn health() -> Json<json::Value> {
  Json(json::json!({ "status": "ok" }))
}

// --- checkout ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeReq {
  pub plugin_id: String,
  pub plan_type: PlanType,
  #[serde(default)]
  pub coupon_code: Option<String>,
}

pub async fn subscribe(
  State(app): State<Arc<AppState>>,
  user: CurrentUser,
  Json(req): Json<SubscribeReq>,
) -> AppResult<Json<CheckoutSession>> {
  let session = CheckoutService::subscribe(
    &app.db,
    &user.id,
    &user.email,
    &req.plugin_id,
    req.plan_type,
    req.coupon_code.as_deref(),
    &app.config.currency,
  )
  .await?;
  Ok(Json(session))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponReq {
  pub code: String,
  pub amount: Decimal,
  #[serde(default)]
  pub plugin_id: Option<String>,
}

pub async fn validate_coupon(
  State(app): State<Arc<AppState>>,
  user: CurrentUser,
  Json(req): Json<ValidateCouponReq>,
) -> AppResult<Json<json::Value>> {
  let outcome = CouponService::validate(
    &app.db,
    &req.code,
    &user.id,
    req.amount,
    req.plugin_id.as_deref(),
  )
  .await?;

  let body = match outcome {
    CouponOutcome::Valid(quote) => json::json!({
      "valid": true,
      "code": quote.coupon.code,
      "discountAmount": quote.discount_amount,
      "finalAmount": quote.final_amount,
    }),
    CouponOutcome::Invalid(rejection) => json::json!({
      "valid": false,
      "reason": rejection.reason(),
    }),
  };
  Ok(Json(body))
}

// --- webhooks ---

/// Stripe signs the exact bytes it sends; the body must stay raw until
/// the signature is checked.
pub async fn stripe_webhook(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  body: Bytes,
) -> AppResult<Json<json::Value>> {
  let provider = ProviderService::by_type(&app.db, ProviderType::Stripe)
    .await?
    .ok_or(AppError::ProviderNotFound)?;
  let signature =
    headers.get("stripe-signature").and_then(|v| v.to_str().ok());

  EntitlementService::process(&app.db, &provider, &body, signature).await?;
  Ok(Json(json::json!({ "received": true })))
}

pub async fn provider_webhook(
  State(app): State<Arc<AppState>>,
  Path(provider_id): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> AppResult<Json<json::Value>> {
  let provider = ProviderService::get_by_id(&app.db, &provider_id)
    .await?
    .ok_or(AppError::ProviderNotFound)?;
  let signature = headers.get("x-signature").and_then(|v| v.to_str().ok());

  EntitlementService::process(&app.db, &provider, &body, signature).await?;
  Ok(Json(json::json!({ "received": true })))
}

// --- licenses ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCheckReq {
  pub license_key: String,
  #[serde(default)]
  pub domain: Option<String>,
}

pub async fn validate_license(
  State(app): State<Arc<AppState>>,
  Json(req): Json<LicenseCheckReq>,
) -> AppResult<Json<crate::services::license::LicenseVerdict>> {
  let verdict =
    LicenseService::verify(&app.db, &req.license_key, req.domain.as_deref())
      .await?;
  Ok(Json(verdict))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateDomainReq {
  pub license_key: String,
  pub domain: String,
}

pub async fn activate_license(
  State(app): State<Arc<AppState>>,
  Json(req): Json<ActivateDomainReq>,
) -> AppResult<Json<LicenseModel>> {
  let license =
    LicenseService::activate_domain(&app.db, &req.license_key, &req.domain)
      .await?;
  Ok(Json(license))
}

pub async fn my_licenses(
  State(app): State<Arc<AppState>>,
  user: CurrentUser,
) -> AppResult<Json<Vec<LicenseModel>>> {
  Ok(Json(LicenseService::by_user(&app.db, &user.id).await?))
}

// --- subscriptions ---

pub async fn my_subscriptions(
  State(app): State<Arc<AppState>>,
  user: CurrentUser,
) -> AppResult<Json<Vec<SubscriptionModel>>> {
  Ok(Json(SubscriptionService::by_user(&app.db, &user.id).await?))
}

pub async fn cancel_subscription(
  State(app): State<Arc<AppState>>,
  user: CurrentUser,
  Path(id): Path<String>,
) -> AppResult<Json<SubscriptionModel>> {
  Ok(Json(SubscriptionService::cancel(&app.db, &id, &user.id).await?))
}

// --- admin: coupons ---

pub async fn list_coupons(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
) -> AppResult<Json<Vec<CouponModel>>> {
  Ok(Json(CouponService::list(&app.db).await?))
}

pub async fn create_coupon(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Json(draft): Json<CouponDraft>,
) -> AppResult<Json<CouponModel>> {
  Ok(Json(CouponService::create(&app.db, draft).await?))
}

pub async fn update_coupon(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Path(id): Path<String>,
  Json(draft): Json<CouponDraft>,
) -> AppResult<Json<CouponModel>> {
  Ok(Json(CouponService::update(&app.db, &id, draft).await?))
}

pub async fn delete_coupon(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Path(id): Path<String>,
) -> AppResult<Json<json::Value>> {
  CouponService::delete(&app.db, &id).await?;
  Ok(Json(json::json!({ "success": true })))
}

// --- admin: providers ---

pub async fn list_providers(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
) -> AppResult<Json<Vec<PaymentProviderModel>>> {
  Ok(Json(ProviderService::list(&app.db).await?))
}

pub async fn create_provider(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Json(draft): Json<ProviderDraft>,
) -> AppResult<Json<PaymentProviderModel>> {
  Ok(Json(ProviderService::create(&app.db, draft).await?))
}

pub async fn update_provider(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Path(id): Path<String>,
  Json(draft): Json<ProviderDraft>,
) -> AppResult<Json<PaymentProviderModel>> {
  Ok(Json(ProviderService::update(&app.db, &id, draft).await?))
}

pub async fn delete_provider(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Path(id): Path<String>,
) -> AppResult<Json<json::Value>> {
  ProviderService::delete(&app.db, &id).await?;
  Ok(Json(json::json!({ "success": true })))
}

pub async fn set_default_provider(
  State(app): State<Arc<AppState>>,
  _admin: AdminGuard,
  Path(id): Path<String>,
) -> AppResult<Json<json::Value>> {
  ProviderService::set_default(&app.db, &id).await?;
  Ok(Json(json::json!({ "success": true })))
}
