//! `orderflow-core`: domain building blocks shared by the ordering crates.
//!
//! Pure domain primitives only; storage and transport live in `orderflow-infra`.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::AggregateId;
pub use value_object::ValueObject;
