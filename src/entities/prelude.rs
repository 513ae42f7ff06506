//! Entity prelude for convenient imports

pub use super::coupon::{
  ActiveModel as CouponActiveModel, DiscountType, Entity as Coupon,
  Model as CouponModel,
};
pub use super::coupon_usage::{
  ActiveModel as CouponUsageActiveModel, Entity as CouponUsage,
  Model as CouponUsageModel,
};
pub use super::license::{
  ActiveModel as LicenseActiveModel, Entity as License, LicenseStatus,
  Model as LicenseModel,
};
pub use super::payment_provider::{
  ActiveModel as PaymentProviderActiveModel, Entity as PaymentProvider,
  Model as PaymentProviderModel, ProviderType,
};
pub use super::plugin::{
  ActiveModel as PluginActiveModel, Entity as Plugin, Model as PluginModel,
};
pub use super::processed_webhook_event::{
  ActiveModel as ProcessedWebhookEventActiveModel,
  Entity as ProcessedWebhookEvent,
};
pub use super::subscription::{
  ActiveModel as SubscriptionActiveModel, Entity as Subscription,
  Model as SubscriptionModel, PlanType, SubscriptionStatus,
};
pub use super::user::{
  ActiveModel as UserActiveModel, Entity as User, Model as UserModel,
};
