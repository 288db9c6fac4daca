pub mod edit;
pub mod id;
pub mod model;

pub use id::*;
pub use model::*;
