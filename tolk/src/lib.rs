pub use tolk_core::model::{PeerKey, Role, RoomName};

pub mod model {
    pub use tolk_core::model::*;
}

pub mod topology {
    pub use tolk_core::topology::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tolk_client::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tolk_server::*;
}
