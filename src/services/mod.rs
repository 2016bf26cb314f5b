pub mod aggregation;
pub mod session_service;
pub mod tracks;
