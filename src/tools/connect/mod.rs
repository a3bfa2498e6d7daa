pub mod handler;
pub mod schema;
