//! Client for hosted chat/vision model endpoints.
//!
//! Wraps an OpenAI-compatible `chat/completions` endpoint (OpenRouter by
//! default) behind [`ModelGateway::call`], which always returns display
//! text: transport failures, error payloads and unexpected shapes are
//! folded into the returned string instead of being raised.

pub mod config;
pub mod gateway;
pub mod image;
pub mod messages;
pub mod transport;

pub use config::{GatewayConfig, ModelSelection};
pub use gateway::{ChatModel, ModelGateway, NOT_CONFIGURED};
pub use messages::{ChatMessage, ContentPart, MessageContent, Role};
