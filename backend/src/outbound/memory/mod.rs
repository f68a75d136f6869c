//! In-process repository adapters.
//!
//! Used when no database URL is configured and by service and HTTP tests.
//! Each repository keeps its state behind a single mutex, which also makes
//! the responder append atomic.

mod blood_request_repository;
mod user_repository;

pub use blood_request_repository::InMemoryBloodRequestRepository;
pub use user_repository::InMemoryUserRepository;
