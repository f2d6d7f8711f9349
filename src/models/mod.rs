pub mod form_schema;
pub mod integration;
pub mod workflow;
