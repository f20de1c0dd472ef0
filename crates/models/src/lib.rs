pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod region;
pub mod store;
pub mod task;
pub mod payment;
pub mod payment_store;
pub mod document;
pub mod egrn_extract;
pub mod dev_store;
pub mod project;
pub mod project_task;
pub mod project_document;

#[cfg(test)]
mod tests;
