//! # ragchat-model
//!
//! Chat model integrations implementing [`ragchat_core::Llm`].
//!
//! - [`OpenAIChatModel`] - OpenAI and OpenAI-compatible servers (feature `openai`, default)
//! - [`MockLlm`] - scripted model for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ragchat_model::openai::{OpenAIChatConfig, OpenAIChatModel};
//!
//! let model = OpenAIChatModel::new(
//!     OpenAIChatConfig::compatible("ollama", "http://localhost:11434/v1", "llama3"),
//! )?;
//! ```

pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::{OPENAI_API_BASE, OpenAIChatConfig, OpenAIChatModel};
