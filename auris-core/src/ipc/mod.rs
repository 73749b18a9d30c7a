//! Event types serialised over the host event bus.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` so a host
//! application can forward them verbatim to its UI layer.

pub mod events;
