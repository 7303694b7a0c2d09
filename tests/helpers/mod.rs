#![allow(dead_code)]
pub mod engine_helpers;

pub use engine_helpers::*;
