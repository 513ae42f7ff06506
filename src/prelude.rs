pub use rust_decimal::Decimal;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database,
  DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
  Set, TransactionTrait,
};
pub use sea_orm_migration::MigratorTrait;
pub use tracing::{error, info, warn};

pub use crate::error::{AppError, AppResult};
