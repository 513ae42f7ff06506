//! SeaORM entity definitions
//!
//! This module contains all database entity definitions for the marketplace
//! billing core.

pub mod coupon;
pub mod coupon_usage;
pub mod license;
pub mod payment_provider;
pub mod plugin;
pub mod prelude;
pub mod processed_webhook_event;
pub mod subscription;
pub mod user;
