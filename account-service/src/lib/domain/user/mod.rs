pub mod errors;
pub mod gatekeeper;
pub mod models;
pub mod ports;
pub mod service;
pub mod status;
