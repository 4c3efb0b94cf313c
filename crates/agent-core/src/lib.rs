//! # agent-core
//!
//! Core agent logic: a provider-agnostic chat gateway with priority fallback,
//! a tool capability registry, and a bounded reasoning loop that alternates
//! model turns with tool invocations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             Agent                                │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────────────────┐  │
//! │  │  Reasoning  │   │    Tools    │   │      ChatGateway       │  │
//! │  │    Loop     │───│   Registry  │   │ primary → secondary →… │  │
//! │  └──────┬──────┘   └─────────────┘   └───────────┬────────────┘  │
//! │         └────────────────────────────────────────┘               │
//! │                                         LlmProvider (Strategy)   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenAI-compatible
//! endpoints, Ollama, or any other backend without changing agent logic.

pub mod error;
pub mod gateway;
pub mod message;
pub mod mock;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use error::{AgentError, Result};
pub use gateway::{ChatGateway, GatewayConfig, GatewayReply, DEGRADED_RESPONSE};
pub use message::{Conversation, Message, Role};
pub use provider::{LlmProvider, ProviderKind, ProviderProfile};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentOutcome, AgentState};
pub use tool::{
    ParameterSchema, Tool, ToolCall, ToolInvocation, ToolOutcome, ToolRegistry, ToolSchema,
};
