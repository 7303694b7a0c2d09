use crate::application::services::lock_scope::{kennel_key, LockScope};
use crate::application::services::placement::{ensure_capacity, load_target_kennel};
use crate::domain::entities::{
    location_or_default, CascadeStrategy, CreateKennelRequest, DateRange, Kennel, KennelRemoval,
    Segment, UpdateKennelRequest, DEFAULT_BUILDING, DEFAULT_FLOOR,
};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::{
    booking_repository::{BookingRepository, PlacementChange},
    kennel_repository::KennelRepository,
    time_service::TimeService,
};
use crate::domain::services::ConflictDetector;
use std::sync::Arc;

/// The kennel catalog: creation, edits, maintenance mode and removal.
#[derive(Clone)]
pub struct CatalogService {
    kennel_repo: Arc<dyn KennelRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    time_service: Arc<dyn TimeService>,
    lock_scope: LockScope,
    detector: ConflictDetector,
}

impl CatalogService {
    pub fn new(
        kennel_repo: Arc<dyn KennelRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        time_service: Arc<dyn TimeService>,
        lock_scope: LockScope,
        detector: ConflictDetector,
    ) -> Self {
        Self {
            kennel_repo,
            booking_repo,
            time_service,
            lock_scope,
            detector,
        }
    }

    pub async fn create_kennel(&self, request: CreateKennelRequest) -> EngineResult<Kennel> {
        let name = validate_name(&request.name)?;
        if request.capacity < 1 {
            return Err(EngineError::Validation(
                "Kennel capacity must be at least 1".to_string(),
            ));
        }

        let kennel = Kennel::new(name, request.capacity, request.building, request.floor);
        self.kennel_repo.create_kennel(&kennel).await?;
        tracing::info!(
            "Created kennel {} ({}, capacity {}) in {} / {}",
            kennel.id,
            kennel.name,
            kennel.capacity,
            kennel.building,
            kennel.floor
        );
        Ok(kennel)
    }

    pub async fn list_kennels(&self) -> EngineResult<Vec<Kennel>> {
        self.kennel_repo.list_kennels().await
    }

    pub async fn get_kennel(&self, id: &str) -> EngineResult<Kennel> {
        self.kennel_repo
            .get_kennel(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Kennel {} not found", id)))
    }

    /// Edits name, location or capacity. Capacity may not drop below the
    /// busiest current or future day.
    pub async fn update_kennel(
        &self,
        id: &str,
        request: UpdateKennelRequest,
    ) -> EngineResult<Kennel> {
        self.lock_scope
            .run(vec![kennel_key(id)], || async {
                let mut kennel = self.require_live_kennel(id).await?;

                if let Some(name) = request.name.as_deref() {
                    kennel.name = validate_name(name)?;
                }
                if request.building.is_some() {
                    kennel.building = location_or_default(request.building.clone(), DEFAULT_BUILDING);
                }
                if request.floor.is_some() {
                    kennel.floor = location_or_default(request.floor.clone(), DEFAULT_FLOOR);
                }
                if let Some(capacity) = request.capacity {
                    if capacity < 1 {
                        return Err(EngineError::Validation(
                            "Kennel capacity must be at least 1".to_string(),
                        ));
                    }
                    if capacity < kennel.capacity {
                        let peak = self.upcoming_peak(&kennel).await?;
                        if peak > capacity {
                            return Err(EngineError::CapacityExceeded(format!(
                                "Kennel {} has {} occupants on its busiest upcoming day; capacity cannot drop to {}",
                                kennel.id, peak, capacity
                            )));
                        }
                    }
                    kennel.capacity = capacity;
                }

                kennel.updated_at = chrono::Utc::now().to_rfc3339();
                self.kennel_repo.update_kennel(&kennel).await?;
                tracing::info!("Updated kennel {}", kennel.id);
                Ok(kennel)
            })
            .await
    }

    /// Maintenance toggle. Only the flag changes; existing segments stay
    /// where they are.
    pub async fn set_active(&self, id: &str, is_active: bool) -> EngineResult<Kennel> {
        self.lock_scope
            .run(vec![kennel_key(id)], || async {
                let mut kennel = self.require_live_kennel(id).await?;
                if kennel.is_active == is_active {
                    return Ok(kennel);
                }

                kennel.is_active = is_active;
                kennel.updated_at = chrono::Utc::now().to_rfc3339();
                self.kennel_repo.update_kennel(&kennel).await?;
                tracing::info!(
                    "Kennel {} {}",
                    kennel.id,
                    if is_active {
                        "back in service"
                    } else {
                        "placed in maintenance"
                    }
                );
                Ok(kennel)
            })
            .await
    }

    /// Removes a kennel according to `strategy`.
    ///
    /// A kennel still referenced by historical segments is archived instead
    /// of hard-deleted; one with current or future active segments is only
    /// removed when those are reassigned first.
    pub async fn delete_kennel(
        &self,
        id: &str,
        strategy: CascadeStrategy,
    ) -> EngineResult<KennelRemoval> {
        let mut keys = vec![kennel_key(id)];
        if let CascadeStrategy::Reassign { target_kennel_id } = &strategy {
            keys.push(kennel_key(target_kennel_id));
        }

        self.lock_scope
            .run(keys, || async {
                let kennel = self.require_live_kennel(id).await?;
                let today = self.time_service.today();
                let referencing = self.booking_repo.segments_for_kennel(id, None).await?;
                let (upcoming, historical): (Vec<Segment>, Vec<Segment>) = referencing
                    .into_iter()
                    .partition(|s| s.is_active() && s.end_date >= today);

                match &strategy {
                    CascadeStrategy::Reject if !upcoming.is_empty() || !historical.is_empty() => {
                        return Err(EngineError::Guard(format!(
                            "Kennel {} is referenced by {} current or future and {} past segments; \
                             choose keep_historical or reassign",
                            kennel.id,
                            upcoming.len(),
                            historical.len()
                        )));
                    }
                    CascadeStrategy::KeepHistorical if !upcoming.is_empty() => {
                        return Err(EngineError::Guard(format!(
                            "Kennel {} has {} current or future segments; reassign them first",
                            kennel.id,
                            upcoming.len()
                        )));
                    }
                    CascadeStrategy::Reassign { target_kennel_id } => {
                        self.reassign_all(&kennel, target_kennel_id, &upcoming).await?;
                    }
                    _ => {}
                }

                self.remove_or_archive(kennel, historical.len()).await
            })
            .await
    }

    async fn reassign_all(
        &self,
        kennel: &Kennel,
        target_kennel_id: &str,
        upcoming: &[Segment],
    ) -> EngineResult<()> {
        if target_kennel_id == kennel.id {
            return Err(EngineError::Validation(
                "A kennel cannot be reassigned onto itself".to_string(),
            ));
        }
        let target = load_target_kennel(self.kennel_repo.as_ref(), target_kennel_id).await?;
        if upcoming.is_empty() {
            return Ok(());
        }

        let span = DateRange {
            start: upcoming.iter().map(|s| s.start_date).min().unwrap_or(self.time_service.today()),
            end: upcoming.iter().map(|s| s.end_date).max().unwrap_or(self.time_service.today()),
        };
        // Segments already planned onto the target count against the next ones.
        let mut on_target = self
            .booking_repo
            .segments_for_kennel(&target.id, Some(span))
            .await?;
        let mut changes = Vec::with_capacity(upcoming.len());
        for segment in upcoming {
            ensure_capacity(&self.detector, &target, &on_target, segment.range(), None)?;
            let mut planned = segment.clone();
            planned.kennel_id = target.id.clone();
            on_target.push(planned);
            changes.push(PlacementChange {
                segment_id: segment.id.clone(),
                kennel_id: target.id.clone(),
                range: segment.range(),
                expected_version: segment.version,
            });
        }

        self.booking_repo.apply_placements(&changes).await?;
        metrics::counter!("kennelbook_reassignments_total").increment(changes.len() as u64);
        tracing::info!(
            "Reassigned {} segments from kennel {} to kennel {}",
            changes.len(),
            kennel.id,
            target.id
        );
        Ok(())
    }

    async fn remove_or_archive(
        &self,
        mut kennel: Kennel,
        historical: usize,
    ) -> EngineResult<KennelRemoval> {
        if historical == 0 {
            self.kennel_repo.delete_kennel(&kennel.id).await?;
            tracing::info!("Deleted kennel {}", kennel.id);
            return Ok(KennelRemoval::Deleted {
                kennel_id: kennel.id,
            });
        }

        let now = chrono::Utc::now().to_rfc3339();
        kennel.is_active = false;
        kennel.archived_at = Some(now.clone());
        kennel.updated_at = now;
        self.kennel_repo.update_kennel(&kennel).await?;
        tracing::info!(
            "Archived kennel {} ({} historical segments keep referencing it)",
            kennel.id,
            historical
        );
        Ok(KennelRemoval::Archived {
            kennel_id: kennel.id,
            historical_segments: historical,
        })
    }

    async fn require_live_kennel(&self, id: &str) -> EngineResult<Kennel> {
        self.kennel_repo
            .get_kennel(id)
            .await?
            .filter(|k| !k.is_archived())
            .ok_or_else(|| EngineError::NotFound(format!("Kennel {} not found", id)))
    }

    /// Busiest day from today onwards among active segments.
    async fn upcoming_peak(&self, kennel: &Kennel) -> EngineResult<u32> {
        let today = self.time_service.today();
        let segments = self
            .booking_repo
            .segments_for_kennel(&kennel.id, None)
            .await?;
        let last = segments
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.end_date)
            .max();
        match last {
            Some(end) if end >= today => Ok(self.detector.peak_occupancy(
                kennel,
                &segments,
                DateRange { start: today, end },
                None,
            )),
            _ => Ok(0),
        }
    }
}

fn validate_name(name: &str) -> EngineResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(
            "Kennel name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
