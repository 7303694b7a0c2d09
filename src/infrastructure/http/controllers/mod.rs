pub mod bookings;
pub mod kennels;
pub mod occupancy;
pub mod segments;
