//! Request-surface layer: translates the spec.md §6 operations into calls
//! on [`codesearch_application::Engine`] and shapes every outcome into the
//! uniform [`envelope::Envelope`].

pub mod api;
pub mod envelope;
pub mod error_mapping;

pub use envelope::{Envelope, EnvelopeError, Metadata, Recovery};
