pub mod admin;
pub mod entry;
pub mod payout;
pub mod rollover;

pub use admin::BountyParams;
