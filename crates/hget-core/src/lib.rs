pub mod config;
pub mod logging;

pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod fs;
pub mod getter;
pub mod http;
pub mod locator;
pub mod mode;
pub mod netrc;
pub mod range;

pub use dispatch::{Dispatcher, HttpDispatcher};
pub use error::FetchError;
pub use getter::{FileOutcome, HttpGetter};
pub use mode::ClientMode;
