//! User service - identities arrive from the external auth layer

use chrono::Utc;
use sea_orm::{
  ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set,
};

use crate::entities::prelude::*;
use crate::error::AppResult;

pub struct UserService;

impl UserService {
  /// Get or create a user row for an externally authenticated identity.
  pub async fn get_or_create<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    email: Option<String>,
  ) -> AppResult<UserModel> {
    if let Some(user) = User::find_by_id(user_id).one(conn).await? {
      return Ok(user);
    }

    let user = UserActiveModel {
      id: Set(user_id.to_string()),
      email: Set(email),
      is_admin: Set(false),
      created_at: Set(Utc::now().naive_utc()),
    };
    Ok(user.insert(conn).await?)
  }

  pub async fn get_by_id(
    db: &DatabaseConnection,
    user_id: &str,
  ) -> AppResult<Option<UserModel>> {
    let user = User::find_by_id(user_id).one(db).await?;
    Ok(user)
  }
}
