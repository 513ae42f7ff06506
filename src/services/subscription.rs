//! Subscription service

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
  EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::prelude::*;
use crate::entities::subscription::Column;
use crate::error::{AppError, AppResult};

pub struct SubscriptionService;

impl SubscriptionService {
  pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    plugin_id: &str,
    plan_type: PlanType,
    price: Decimal,
  ) -> AppResult<SubscriptionModel> {
    let now = Utc::now().naive_utc();
    let end_date = match plan_type {
      PlanType::Monthly => Some(now + Duration::days(30)),
      PlanType::Yearly => Some(now + Duration::days(365)),
      PlanType::Lifetime => None,
    };
    let subscription = SubscriptionActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      user_id: Set(user_id.to_string()),
      plugin_id: Set(plugin_id.to_string()),
      plan_type: Set(plan_type),
      status: Set(SubscriptionStatus::Active),
      price: Set(price),
      start_date: Set(now),
      end_date: Set(end_date),
      auto_renew: Set(end_date.is_some()),
      created_at: Set(now),
    };
    Ok(subscription.insert(db).await?)
  }

  pub async fn by_user(
    db: &DatabaseConnection,
    user_id: &str,
  ) -> AppResult<Vec<SubscriptionModel>> {
    let subscriptions = Subscription::find()
      .filter(Column::UserId.eq(user_id))
      .order_by_desc(Column::CreatedAt)
      .all(db)
      .await?;
    Ok(subscriptions)
  }

  pub async fn cancel(
    db: &DatabaseConnection,
    id: &str,
    user_id: &str,
  ) -> AppResult<SubscriptionModel> {
    let subscription = Subscription::find_by_id(id)
      .filter(Column::UserId.eq(user_id))
      .one(db)
      .await?
      .ok_or(AppError::SubscriptionNotFound)?;

    let mut subscription: SubscriptionActiveModel = subscription.into();
    subscription.status = Set(SubscriptionStatus::Cancelled);
    subscription.auto_renew = Set(false);
    Ok(subscription.update(db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;

  #[tokio::test]
  async fn lifetime_plan_has_no_end_date() {
    let db = testing::setup_test_db().await;
    testing::seed_user(&db, "user-1").await;
    testing::seed_plugin(&db, "plugin-1", None, None, Decimal::new(19900, 2))
      .await;

    let sub = SubscriptionService::create(
      &db,
      "user-1",
      "plugin-1",
      PlanType::Lifetime,
      Decimal::new(19900, 2),
    )
    .await
    .unwrap();

    assert!(sub.end_date.is_none());
    assert!(!sub.auto_renew);
  }

  #[tokio::test]
  async fn cancel_is_scoped_to_owner() {
    let db = testing::setup_test_db().await;
    testing::seed_user(&db, "user-1").await;
    testing::seed_user(&db, "user-2").await;
    testing::seed_plugin(&db, "plugin-1", None, None, Decimal::new(4900, 2))
      .await;

    let sub = SubscriptionService::create(
      &db,
      "user-1",
      "plugin-1",
      PlanType::Monthly,
      Decimal::new(4900, 2),
    )
    .await
    .unwrap();

    let denied = SubscriptionService::cancel(&db, &sub.id, "user-2").await;
    assert!(matches!(denied, Err(AppError::SubscriptionNotFound)));

    let cancelled =
      SubscriptionService::cancel(&db, &sub.id, "user-1").await.unwrap();
    assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
    assert!(!cancelled.auto_renew);
  }
}
