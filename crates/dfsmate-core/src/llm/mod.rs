//! Provider seam for chat completion.

pub mod provider;

pub use provider::ChatProvider;
