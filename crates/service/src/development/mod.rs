//! Development portal: new-store projects, their tasks and documents.

pub mod documents;
pub mod gantt;
pub mod projects;
pub mod stores;
pub mod tasks;
