//! Core business logic for socialnet.

pub mod policy;
pub mod services;

pub use policy::{Owned, authorize_mutation, can_mutate, require_actor};
pub use services::*;
