//! Reasoning-service provider implementations for Dataloom.
//!
//! Currently one backend: Google's Generative Language API (Gemini). The
//! [`dataloom_core::Provider`] trait keeps the rest of the system ignorant
//! of which service is behind the prompt.

pub mod gemini;

pub use gemini::GeminiProvider;
