pub mod checkin;
pub mod config;
pub mod notify;
pub mod report;
