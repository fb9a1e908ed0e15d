//! Generative provider implementations
//!
//! Concrete implementations of the GenerativeProvider trait. The engine only
//! sees the trait; swapping the backing service is a construction-time choice.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig, GeminiProvider};
