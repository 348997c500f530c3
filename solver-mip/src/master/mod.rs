//! Master problem (LP relaxation) management.

mod backend;
mod simplex_backend;

pub use backend::MasterBackend;
