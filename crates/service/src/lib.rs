//! Service layer providing business operations on top of models.
//! - Separates business logic from HTTP handling.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod tasks;
pub mod storage;
pub mod store_service;
pub mod region_service;
pub mod user_service;
pub mod egrn_service;
pub mod payment_service;
pub mod document_service;
pub mod mail;
pub mod renewal;
pub mod seed;
pub mod development;
pub mod geo_service;
#[cfg(test)]
pub mod test_support;
