//! Domain models for repository provisioning.

pub mod action;
pub mod operation;
pub mod request;

pub use action::*;
pub use operation::*;
pub use request::*;
