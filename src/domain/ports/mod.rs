pub mod booking_repository;
pub mod distributed_lock;
pub mod kennel_repository;
pub mod time_service;
