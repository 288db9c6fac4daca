//! Expression documents: the JSON wire format exchanged with the management API,
//! validation of untrusted uploads, and binary graph snapshots.

pub mod policy;
pub mod snapshot;
pub mod validate;
pub mod wire;

pub use policy::*;
pub use validate::*;
pub use wire::*;
