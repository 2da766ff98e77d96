//! HTTP handlers

pub mod health;
pub mod auth;
pub mod compliance;
