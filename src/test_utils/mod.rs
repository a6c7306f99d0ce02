//! Helpers shared by the unit tests and, through the `test-util` feature,
//! the integration tests.

pub mod errors;
pub mod events;
pub mod shared_buf;
