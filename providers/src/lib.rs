pub mod anthropic;
pub mod models;
pub mod retry;

pub use models::{
    BaseProvider, Message, Provider, ProviderSettings, ProviderType, Role, ToolCall,
};
pub use retry::{RetryPolicy, SafeProvider};

pub use anthropic::AnthropicProvider;
