//! HTTP handlers for the Entitlements domain

pub mod entitlements;
pub mod identity;
pub mod payments;
