pub mod assignment_service;
pub mod booking_service;
pub mod catalog_service;
pub mod lock_scope;
pub mod occupancy_service;
mod placement;
pub mod reassignment_service;

pub use assignment_service::AssignmentService;
pub use booking_service::BookingService;
pub use catalog_service::CatalogService;
pub use lock_scope::LockScope;
pub use occupancy_service::OccupancyService;
pub use reassignment_service::ReassignmentService;
