//! Completion backend adapters.

mod litellm;

pub use litellm::LiteLlmGateway;
