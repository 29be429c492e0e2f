pub mod capture;
pub mod client;
pub mod config;
pub mod hand;
pub mod payload;
pub mod rig;
pub mod scheduler;
