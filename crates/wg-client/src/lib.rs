mod client;
pub use client::{Client as WgClient, DEFAULT_WG_PATH, WG_ENV_VAR};

mod api;
pub use api::WgApi;

#[cfg(any(test, feature = "mocks"))]
pub use api::MockWgApi;

mod error;
pub use error::{ProbeError, Result};

mod parse;
pub use parse::parse_latest_handshakes;
