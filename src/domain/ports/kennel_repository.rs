use crate::domain::entities::Kennel;
use crate::domain::errors::EngineResult;

/// Storage for the kennel catalog.
#[async_trait::async_trait]
pub trait KennelRepository: Send + Sync {
    async fn create_kennel(&self, kennel: &Kennel) -> EngineResult<()>;

    /// Looks up a kennel by id, archived ones included.
    async fn get_kennel(&self, id: &str) -> EngineResult<Option<Kennel>>;

    /// Non-archived kennels ordered by building, floor, name, id.
    async fn list_kennels(&self) -> EngineResult<Vec<Kennel>>;

    /// Overwrites name, capacity, location, active flag and archive marker.
    async fn update_kennel(&self, kennel: &Kennel) -> EngineResult<()>;

    /// Hard delete. Callers must have checked that no segment references it.
    async fn delete_kennel(&self, id: &str) -> EngineResult<()>;
}
