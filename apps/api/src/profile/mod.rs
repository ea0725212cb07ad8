pub mod completeness;
pub mod form;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod store;
pub mod text;
pub mod upload;
