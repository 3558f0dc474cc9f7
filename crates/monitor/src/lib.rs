mod monitor;
pub use monitor::{Monitor, MonitorParams, INTERFACE_RETRY_DELAY};

mod error;
pub use error::MonitorError;

#[cfg(test)]
mod tests;
