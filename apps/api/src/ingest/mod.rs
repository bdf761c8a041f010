pub mod coordinator;
pub mod field_mapper;
pub mod handlers;
pub mod row_parser;
pub mod store;
pub mod validator;

pub use coordinator::{IngestError, IngestionRegistry};
