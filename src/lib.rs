pub mod logging;
pub mod services;
pub mod types;
