//! OpenAI provider.
//!
//! Talks to `/chat/completions` on the OpenAI API or any compatible server.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat_model::openai::{OpenAIChatConfig, OpenAIChatModel};
//!
//! let model = OpenAIChatModel::new(OpenAIChatConfig::new(
//!     std::env::var("OPENAI_API_KEY").unwrap(),
//!     "gpt-4o-mini",
//! ))?;
//! ```

mod client;
mod config;

pub use client::OpenAIChatModel;
pub use config::{OPENAI_API_BASE, OpenAIChatConfig};
