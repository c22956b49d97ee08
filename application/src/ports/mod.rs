//! Ports — interfaces to external collaborators.
//!
//! Implementations (adapters) live in the infrastructure layer. The
//! application layer only sees these traits.

pub mod completion_gateway;
pub mod observability;
pub mod transcript_store;
