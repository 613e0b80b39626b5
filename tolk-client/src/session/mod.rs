mod manager;
mod object;
mod state;

pub use manager::*;
pub use object::*;
pub use state::*;
