//! Built-in meter drivers
//!
//! Each driver is an opcode table plus the transform choices for its
//! measurement groups. Register a new model in
//! [`crate::registry::BUILTIN_DRIVERS`].

pub mod pqplus;
pub mod sdm;

pub use pqplus::PqPlusProducer;
pub use sdm::SdmProducer;
