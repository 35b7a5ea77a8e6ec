pub mod constants;
pub mod error;
pub mod config;
pub mod aircraft;
pub mod display;
pub mod notify;
pub mod reconciler;
pub mod net;
pub mod status;
