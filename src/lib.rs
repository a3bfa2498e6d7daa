pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod exec;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;
