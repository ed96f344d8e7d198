//! Data models for coupon extraction and persistence.

pub mod config;
pub mod coupon;
pub mod record;
