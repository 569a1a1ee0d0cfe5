//! Control logic for a single-lane vehicle entry gate: ticket request,
//! supervised transit with timeout and anti-tailgating, and a daily vehicle
//! counter. Hardware and services are reached through the [`hal::Platform`]
//! trait so the same logic runs on the board and in host tests.

pub mod app;
pub mod config;
pub mod hal;
pub mod svc;
