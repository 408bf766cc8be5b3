//! # agent-runtime
//!
//! Concrete provider integrations for the agent framework.
//!
//! Currently ships an OpenAI-compatible chat-completions provider with
//! native function calling and JSON-object response enforcement. Any
//! endpoint speaking the same wire format (OpenAI, Azure, local
//! gateways) works by pointing `OPENAI_BASE_URL` at it.

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider};
