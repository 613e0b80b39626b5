mod peer_meta;
mod room_registry;

pub use peer_meta::*;
pub use room_registry::*;
