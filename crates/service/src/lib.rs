//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod cake;
#[cfg(test)]
pub mod test_support;
