//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and extensible tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Engine                                │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Two-Round  │  │    Tools    │  │   ChatProvider      │  │
//! │  │   Cycle     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ChatProvider` trait enables swapping between OpenAI-compatible
//! backends or any other provider without changing agent logic. The
//! engine performs at most one tool round per cycle.

pub mod engine;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

pub use engine::{CycleOutput, Engine};
pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{ChatProvider, ChatRequest, Completion, GenerationOptions, ToolChoice};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
