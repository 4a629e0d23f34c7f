//! Core types for modelrelay.

pub mod message;
pub mod request;

pub use message::*;
pub use request::*;
