//! Session backend on top of webrtc-rs.

mod audio;
mod session;

pub use audio::*;
pub use session::*;
