//! Browser automation module
//!
//! A single Chrome instance driven over the Chrome DevTools Protocol.

pub mod actions;
pub mod errors;
pub mod session;

pub use actions::NaverActions;
pub use errors::BrowserError;
pub use session::{BrowserSession, BrowserSessionConfig};
