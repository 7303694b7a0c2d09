//! In-process adapters, used when `DATABASE_URL=memory` and throughout the tests.

mod lock;
mod store;

pub use lock::InMemoryDistributedLock;
pub use store::InMemoryStore;
