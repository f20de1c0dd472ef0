//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Username/password login with argon2 hashes and HS256 bearer tokens.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
