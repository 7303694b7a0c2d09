pub mod engine;
pub mod services;

pub use engine::{Engine, EngineSettings};
