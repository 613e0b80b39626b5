mod config;
mod dialer;
mod error;
mod media;
mod orchestrator;
mod roles;
mod session;
mod signaling;

pub mod rtc;

pub use config::*;
pub use dialer::*;
pub use error::*;
pub use media::*;
pub use orchestrator::*;
pub use roles::*;
pub use session::*;
pub use signaling::*;
