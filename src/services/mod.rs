pub mod dispatcher;
pub mod form_schemas;
pub mod integration_app;
pub mod storage;
