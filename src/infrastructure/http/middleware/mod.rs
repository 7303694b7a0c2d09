pub mod error;

pub use error::{ApiError, ApiResult};

use crate::application::Engine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}
