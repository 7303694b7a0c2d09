pub mod http;
pub mod memory;
pub mod observability;
pub mod persistence;
pub mod runtime;
