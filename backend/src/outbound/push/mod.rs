//! Push notification adapters.
//!
//! This module provides a thin HTTP implementation of the `PushNotifier`
//! port against the FCM legacy send endpoint.

mod fcm;

pub use fcm::{FCM_LEGACY_ENDPOINT, FcmPushNotifier};
