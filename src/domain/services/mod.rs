pub mod aggregation;
pub mod booking_status;
pub mod conflict_detector;
pub mod occupancy_calculator;
pub mod overlap;
pub mod segment_index;

pub use aggregation::*;
pub use booking_status::*;
pub use conflict_detector::*;
pub use occupancy_calculator::*;
pub use overlap::*;
pub use segment_index::*;
