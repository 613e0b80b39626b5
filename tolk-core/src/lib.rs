pub mod model;
pub mod topology;
pub mod utils;

pub use model::*;
