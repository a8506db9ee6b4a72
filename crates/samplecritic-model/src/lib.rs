mod openai;
mod output;
mod traits;

pub use openai::{OpenAiChatClient, DEFAULT_BASE_URL};
pub use output::CompletionOutput;
pub use traits::{ApiKey, ChatMessage, CompletionRequest, ModelClient, ModelError, Role};

/// Re-exported so callers build tokens from the same crate version
pub use tokio_util::sync::CancellationToken;
