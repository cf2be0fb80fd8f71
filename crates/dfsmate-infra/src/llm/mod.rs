//! Chat-completion providers.

mod openrouter;

pub use openrouter::OpenRouterProvider;
