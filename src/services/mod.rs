//! Business logic services

pub mod checkout;
pub mod coupon;
pub mod entitlement;
pub mod license;
pub mod provider;
pub mod subscription;
pub mod user;

pub use checkout::CheckoutService;
pub use coupon::CouponService;
pub use entitlement::EntitlementService;
pub use license::LicenseService;
pub use provider::ProviderService;
pub use subscription::SubscriptionService;
pub use user::UserService;
