//! Coupon service - validation rules and redemption bookkeeping
//!
//! Validation is pure: it reads coupon state and prior usage but never
//! writes. Usage rows and the usage counter are touched only through
//! `record_usage`, at confirmed-redemption time, so an abandoned checkout
//! never consumes a coupon's limited uses.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
  EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::coupon::{ApplicablePlugins, Column, DiscountType};
use crate::entities::coupon_usage::Column as UsageColumn;
use crate::entities::prelude::*;
use crate::error::{AppError, AppResult};

/// Why a coupon was rejected; the display strings are user-facing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CouponRejection {
  NotFound,
  Inactive,
  NotStarted,
  Expired,
  UsageLimitReached,
  UserLimitReached,
  NotApplicable,
  BelowMinimum,
}

impl CouponRejection {
  pub fn reason(&self) -> &'static str {
    match self {
      Self::NotFound => "Coupon not found",
      Self::Inactive => "Coupon is inactive",
      Self::NotStarted => "Coupon is not active yet",
      Self::Expired => "Coupon has expired",
      Self::UsageLimitReached => "Coupon usage limit reached",
      Self::UserLimitReached => {
        "You have already used this coupon the maximum number of times"
      }
      Self::NotApplicable => "Coupon is not applicable to this plugin",
      Self::BelowMinimum => "Amount is below the minimum for this coupon",
    }
  }
}

#[derive(Clone, Debug)]
pub struct CouponQuote {
  pub coupon: CouponModel,
  pub discount_amount: Decimal,
  pub final_amount: Decimal,
}

#[derive(Clone, Debug)]
pub enum CouponOutcome {
  Valid(CouponQuote),
  Invalid(CouponRejection),
}

/// Admin-supplied coupon definition.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDraft {
  pub code: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub discount_type: DiscountType,
  pub discount_value: Decimal,
  #[serde(default)]
  pub minimum_amount: Option<Decimal>,
  #[serde(default)]
  pub maximum_discount: Option<Decimal>,
  #[serde(default)]
  pub usage_limit: Option<i32>,
  #[serde(default = "default_user_usage_limit")]
  pub user_usage_limit: Option<i32>,
  #[serde(default = "default_true")]
  pub is_active: bool,
  #[serde(default)]
  pub starts_at: Option<chrono::NaiveDateTime>,
  #[serde(default)]
  pub expires_at: Option<chrono::NaiveDateTime>,
  #[serde(default)]
  pub applicable_plugins: Option<Vec<String>>,
}

fn default_user_usage_limit() -> Option<i32> {
  Some(1)
}

fn default_true() -> bool {
  true
}

pub struct CouponService;

impl CouponService {
  /// Codes are case-insensitive; stored and looked up in uppercase.
  pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
  }

  pub async fn get_by_code(
    db: &DatabaseConnection,
    code: &str,
  ) -> AppResult<Option<CouponModel>> {
    let coupon = Coupon::find()
      .filter(Column::Code.eq(Self::normalize_code(code)))
      .one(db)
      .await?;
    Ok(coupon)
  }

  pub async fn list(db: &DatabaseConnection) -> AppResult<Vec<CouponModel>> {
    let coupons = Coupon::find().order_by_desc(Column::CreatedAt).all(db).await?;
    Ok(coupons)
  }

  pub async fn create(
    db: &DatabaseConnection,
    draft: CouponDraft,
  ) -> AppResult<CouponModel> {
    let now = Utc::now().naive_utc();
    let coupon = CouponActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      code: Set(Self::normalize_code(&draft.code)),
      name: Set(draft.name),
      description: Set(draft.description),
      discount_type: Set(draft.discount_type),
      discount_value: Set(draft.discount_value),
      minimum_amount: Set(draft.minimum_amount),
      maximum_discount: Set(draft.maximum_discount),
      usage_limit: Set(draft.usage_limit),
      usage_count: Set(0),
      user_usage_limit: Set(draft.user_usage_limit),
      is_active: Set(draft.is_active),
      starts_at: Set(draft.starts_at),
      expires_at: Set(draft.expires_at),
      applicable_plugins: Set(draft.applicable_plugins.map(ApplicablePlugins)),
      created_at: Set(now),
      updated_at: Set(now),
    };
    Ok(coupon.insert(db).await?)
  }

  pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    draft: CouponDraft,
  ) -> AppResult<CouponModel> {
    let coupon = Coupon::find_by_id(id)
      .one(db)
      .await?
      .ok_or(AppError::CouponNotFound)?;

    let mut coupon: CouponActiveModel = coupon.into();
    coupon.code = Set(Self::normalize_code(&draft.code));
    coupon.name = Set(draft.name);
    coupon.description = Set(draft.description);
    coupon.discount_type = Set(draft.discount_type);
    coupon.discount_value = Set(draft.discount_value);
    coupon.minimum_amount = Set(draft.minimum_amount);
    coupon.maximum_discount = Set(draft.maximum_discount);
    coupon.usage_limit = Set(draft.usage_limit);
    coupon.user_usage_limit = Set(draft.user_usage_limit);
    coupon.is_active = Set(draft.is_active);
    coupon.starts_at = Set(draft.starts_at);
    coupon.expires_at = Set(draft.expires_at);
    coupon.applicable_plugins =
      Set(draft.applicable_plugins.map(ApplicablePlugins));
    coupon.updated_at = Set(Utc::now().naive_utc());
    Ok(coupon.update(db).await?)
  }

  pub async fn delete(db: &DatabaseConnection, id: &str) -> AppResult<()> {
    let coupon = Coupon::find_by_id(id)
      .one(db)
      .await?
      .ok_or(AppError::CouponNotFound)?;
    Coupon::delete_by_id(coupon.id).exec(db).await?;
    Ok(())
  }

  /// Run the validation checks in order; the first failure wins and no
  /// discount is computed for rejected coupons.
  pub async fn validate(
    db: &DatabaseConnection,
    code: &str,
    user_id: &str,
    amount: Decimal,
    plugin_id: Option<&str>,
  ) -> AppResult<CouponOutcome> {
    use CouponOutcome::Invalid;

    let Some(coupon) = Self::get_by_code(db, code).await? else {
      return Ok(Invalid(CouponRejection::NotFound));
    };

    if !coupon.is_active {
      return Ok(Invalid(CouponRejection::Inactive));
    }

    let now = Utc::now().naive_utc();
    if let Some(starts_at) = coupon.starts_at
      && now < starts_at
    {
      return Ok(Invalid(CouponRejection::NotStarted));
    }
    if let Some(expires_at) = coupon.expires_at
      && now > expires_at
    {
      return Ok(Invalid(CouponRejection::Expired));
    }

    if let Some(limit) = coupon.usage_limit
      && coupon.usage_count >= limit
    {
      return Ok(Invalid(CouponRejection::UsageLimitReached));
    }

    if let Some(user_limit) = coupon.user_usage_limit {
      let used = CouponUsage::find()
        .filter(UsageColumn::CouponId.eq(coupon.id.clone()))
        .filter(UsageColumn::UserId.eq(user_id))
        .count(db)
        .await?;
      if used >= user_limit as u64 {
        return Ok(Invalid(CouponRejection::UserLimitReached));
      }
    }

    if let Some(ApplicablePlugins(plugins)) = &coupon.applicable_plugins
      && !plugins.is_empty()
    {
      let applies =
        plugin_id.is_some_and(|id| plugins.iter().any(|p| p == id));
      if !applies {
        return Ok(Invalid(CouponRejection::NotApplicable));
      }
    }

    if let Some(minimum) = coupon.minimum_amount
      && amount < minimum
    {
      return Ok(Invalid(CouponRejection::BelowMinimum));
    }

    let (discount_amount, final_amount) = Self::compute_discount(&coupon, amount);
    Ok(CouponOutcome::Valid(CouponQuote {
      coupon,
      discount_amount,
      final_amount,
    }))
  }

  /// Percentage or fixed discount, clamped to the cap; the final amount
  /// never goes negative.
  pub fn compute_discount(
    coupon: &CouponModel,
    amount: Decimal,
  ) -> (Decimal, Decimal) {
    let mut discount = match coupon.discount_type {
      DiscountType::Percentage => {
        amount * coupon.discount_value / Decimal::from(100)
      }
      DiscountType::Fixed => coupon.discount_value,
    };

    if let Some(cap) = coupon.maximum_discount {
      discount = discount.min(cap);
    }

    let final_amount = (amount - discount).max(Decimal::ZERO);
    (discount, final_amount)
  }

  /// Insert the immutable usage row and bump the coupon's usage counter.
  /// Generic over the connection so it composes with transactions.
  /// Limit enforcement stays best-effort: concurrent confirmations near
  /// the limit may overshoot by a few uses.
  pub async fn record_usage<C: ConnectionTrait>(
    conn: &C,
    coupon_id: &str,
    user_id: &str,
    subscription_id: Option<String>,
    original_amount: Decimal,
    discount_amount: Decimal,
    final_amount: Decimal,
  ) -> AppResult<CouponUsageModel> {
    let usage = CouponUsageActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      coupon_id: Set(coupon_id.to_string()),
      user_id: Set(user_id.to_string()),
      subscription_id: Set(subscription_id),
      original_amount: Set(original_amount),
      discount_amount: Set(discount_amount),
      final_amount: Set(final_amount),
      used_at: Set(Utc::now().naive_utc()),
    };
    let usage = usage.insert(conn).await?;

    let coupon = Coupon::find_by_id(coupon_id)
      .one(conn)
      .await?
      .ok_or(AppError::CouponNotFound)?;
    let count = coupon.usage_count;
    let mut coupon: CouponActiveModel = coupon.into();
    coupon.usage_count = Set(count + 1);
    coupon.updated_at = Set(Utc::now().naive_utc());
    coupon.update(conn).await?;

    Ok(usage)
  }
}
