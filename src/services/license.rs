//! License service - key generation, verification and domain activation

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
  EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::license::{ActivatedDomains, Column};
use crate::entities::prelude::*;
use crate::error::{AppError, AppResult};

/// Outcome of a key check, shaped for the public validate endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseVerdict {
  pub valid: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub plugin_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<NaiveDateTime>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

impl LicenseVerdict {
  fn invalid(reason: &str) -> Self {
    Self {
      valid: false,
      plugin_id: None,
      expires_at: None,
      reason: Some(reason.to_string()),
    }
  }
}

pub struct LicenseService;

impl LicenseService {
  /// Four groups of eight uppercase hex chars, e.g.
  /// `A1B2C3D4-E5F60718-293A4B5C-6D7E8F90`.
  pub fn generate_key() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    hex
      .as_bytes()
      .chunks(8)
      .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
      .collect::<Vec<_>>()
      .join("-")
  }

  pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    plugin_id: &str,
    subscription_id: Option<String>,
    max_domains: i32,
    expires_at: Option<NaiveDateTime>,
  ) -> AppResult<LicenseModel> {
    let now = Utc::now().naive_utc();
    let license = LicenseActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      user_id: Set(user_id.to_string()),
      plugin_id: Set(plugin_id.to_string()),
      subscription_id: Set(subscription_id),
      license_key: Set(Self::generate_key()),
      max_domains: Set(max_domains),
      activated_domains: Set(ActivatedDomains::default()),
      status: Set(LicenseStatus::Active),
      expires_at: Set(expires_at),
      created_at: Set(now),
      updated_at: Set(now),
    };
    Ok(license.insert(db).await?)
  }

  pub async fn get_by_key(
    db: &DatabaseConnection,
    key: &str,
  ) -> AppResult<Option<LicenseModel>> {
    let license = License::find()
      .filter(Column::LicenseKey.eq(key))
      .one(db)
      .await?;
    Ok(license)
  }

  pub async fn by_user(
    db: &DatabaseConnection,
    user_id: &str,
  ) -> AppResult<Vec<LicenseModel>> {
    let licenses = License::find()
      .filter(Column::UserId.eq(user_id))
      .order_by_desc(Column::CreatedAt)
      .all(db)
      .await?;
    Ok(licenses)
  }

  /// Check a key. A supplied domain passes when it is already activated
  /// or when an activation slot remains for it.
  pub async fn verify(
    db: &DatabaseConnection,
    key: &str,
    domain: Option<&str>,
  ) -> AppResult<LicenseVerdict> {
    let Some(license) = Self::get_by_key(db, key).await? else {
      return Ok(LicenseVerdict::invalid("License key not found"));
    };

    if license.status != LicenseStatus::Active {
      return Ok(LicenseVerdict::invalid("License is not active"));
    }
    if let Some(expires_at) = license.expires_at
      && expires_at < Utc::now().naive_utc()
    {
      return Ok(LicenseVerdict::invalid("License has expired"));
    }
    if let Some(domain) = domain {
      let activated =
        license.activated_domains.0.iter().any(|d| d == domain);
      let slot_remains =
        (license.activated_domains.0.len() as i32) < license.max_domains;
      if !activated && !slot_remains {
        return Ok(LicenseVerdict::invalid(
          "License is not activated for this domain",
        ));
      }
    }

    Ok(LicenseVerdict {
      valid: true,
      plugin_id: Some(license.plugin_id),
      expires_at: license.expires_at,
      reason: None,
    })
  }

  /// Record a domain activation. Re-activating the same domain is a no-op;
  /// a new domain past max_domains is rejected.
  pub async fn activate_domain(
    db: &DatabaseConnection,
    key: &str,
    domain: &str,
  ) -> AppResult<LicenseModel> {
    let license =
      Self::get_by_key(db, key).await?.ok_or(AppError::LicenseNotFound)?;

    if license.status != LicenseStatus::Active {
      return Err(AppError::LicenseInvalid("License is not active".into()));
    }
    if let Some(expires_at) = license.expires_at
      && expires_at < Utc::now().naive_utc()
    {
      return Err(AppError::LicenseInvalid("License has expired".into()));
    }

    let domain = domain.trim().to_lowercase();
    if license.activated_domains.0.iter().any(|d| *d == domain) {
      return Ok(license);
    }
    if license.activated_domains.0.len() as i32 >= license.max_domains {
      return Err(AppError::DomainLimitReached(license.max_domains));
    }

    let mut domains = license.activated_domains.clone();
    domains.0.push(domain);

    let mut license: LicenseActiveModel = license.into();
    license.activated_domains = Set(domains);
    license.updated_at = Set(Utc::now().naive_utc());
    Ok(license.update(db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;
  use rust_decimal::Decimal;

  async fn seed_license(db: &DatabaseConnection, max_domains: i32) -> LicenseModel {
    testing::seed_user(db, "user-1").await;
    testing::seed_plugin(db, "plugin-1", None, None, Decimal::new(4900, 2))
      .await;
    LicenseService::create(db, "user-1", "plugin-1", None, max_domains, None)
      .await
      .unwrap()
  }

  #[test]
  fn key_has_four_groups_of_eight_hex_chars() {
    let key = LicenseService::generate_key();
    let groups: Vec<_> = key.split('-').collect();
    assert_eq!(groups.len(), 4);
    for group in groups {
      assert_eq!(group.len(), 8);
      assert!(group.chars().all(|c| c.is_ascii_hexdigit()));
      assert_eq!(group, group.to_uppercase());
    }
  }

  #[test]
  fn keys_are_unique() {
    assert_ne!(LicenseService::generate_key(), LicenseService::generate_key());
  }

  #[tokio::test]
  async fn verify_known_key() {
    let db = testing::setup_test_db().await;
    let license = seed_license(&db, 1).await;

    let verdict =
      LicenseService::verify(&db, &license.license_key, None).await.unwrap();
    assert!(verdict.valid);
    assert_eq!(verdict.plugin_id.as_deref(), Some("plugin-1"));

    let verdict = LicenseService::verify(&db, "NOPE", None).await.unwrap();
    assert!(!verdict.valid);
  }

  #[tokio::test]
  async fn activate_domain_is_idempotent() {
    let db = testing::setup_test_db().await;
    let license = seed_license(&db, 1).await;

    let first =
      LicenseService::activate_domain(&db, &license.license_key, "example.com")
        .await
        .unwrap();
    assert_eq!(first.activated_domains.0, vec!["example.com"]);

    // Same domain again, at capacity: still fine.
    let second =
      LicenseService::activate_domain(&db, &license.license_key, "EXAMPLE.com")
        .await
        .unwrap();
    assert_eq!(second.activated_domains.0, vec!["example.com"]);
  }

  #[tokio::test]
  async fn activation_rejected_past_capacity() {
    let db = testing::setup_test_db().await;
    let license = seed_license(&db, 1).await;

    LicenseService::activate_domain(&db, &license.license_key, "a.com")
      .await
      .unwrap();
    let result =
      LicenseService::activate_domain(&db, &license.license_key, "b.com").await;
    assert!(matches!(result, Err(AppError::DomainLimitReached(1))));
  }

  #[tokio::test]
  async fn domain_scoped_verify() {
    let db = testing::setup_test_db().await;
    let license = seed_license(&db, 1).await;

    // No slot used yet: any domain could still be activated.
    let open = LicenseService::verify(&db, &license.license_key, Some("a.com"))
      .await
      .unwrap();
    assert!(open.valid);

    LicenseService::activate_domain(&db, &license.license_key, "a.com")
      .await
      .unwrap();

    let ok = LicenseService::verify(&db, &license.license_key, Some("a.com"))
      .await
      .unwrap();
    assert!(ok.valid);

    let bad = LicenseService::verify(&db, &license.license_key, Some("b.com"))
      .await
      .unwrap();
    assert!(!bad.valid);
    assert!(bad.reason.unwrap().contains("domain"));
  }
}
