mod api;
pub use api::Notify;

#[cfg(any(test, feature = "mocks"))]
pub use api::MockNotify;

mod dispatcher;
pub use dispatcher::{DispatchMode, Dispatcher, DispatcherConfig};

mod command;
pub use command::CommandChannel;

mod http;
pub use http::{UrlChannel, MAX_ATTEMPTS, REQUEST_TIMEOUT, RETRY_DELAY};

mod error;
pub use error::NotifyError;
