mod config;
mod error;
mod logging;
mod registry;
mod router;
mod signaling;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use registry::*;
pub use router::*;
pub use signaling::*;
