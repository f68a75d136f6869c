//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for database-less runs and tests
//! - **security**: JWT bearer tokens and Argon2 password hashing
//! - **push**: FCM push notifications
//! - **realtime**: the broadcast hub behind the WebSocket endpoint
//! - **captcha**: reCAPTCHA verification
//! - **oauth**: Google sign-in
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod captcha;
pub mod memory;
pub mod oauth;
pub mod persistence;
pub mod push;
pub mod realtime;
pub mod security;
