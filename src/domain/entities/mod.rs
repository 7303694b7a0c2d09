pub mod booking;
pub mod kennel;
pub mod occupancy;

pub use booking::*;
pub use kennel::*;
pub use occupancy::*;
