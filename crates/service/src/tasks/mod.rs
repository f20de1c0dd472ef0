//! Licensing tasks and their subtasks.
//!
//! Same layering as `auth`: domain types, a repository trait with SeaORM and
//! in-memory implementations, and `TaskService` on top. `stats` holds the pure
//! list computations behind the dashboard endpoints.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;
pub mod stats;

pub use service::TaskService;
