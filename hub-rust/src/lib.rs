mod assistant;
pub mod auth;
pub mod config;
mod context;
mod errors;
pub mod history;
mod ideas;
pub mod instruction;
pub mod models;
pub mod reply;
pub mod routes;
pub mod store;

pub use assistant::{Assistant, AssistantParams, AssistantRequest};
pub use context::{MaterialSnapshot, ProjectContext, TodoSnapshot};
pub use errors::{AssistantError, HubError, StoreError, ASSISTANT_UNAVAILABLE};
pub use history::{ConversationTurn, Role, TurnContent};
pub use ideas::ProjectIdea;
pub use instruction::InstructionParam;
pub use reply::{ReplyPolicy, StructuredReply};

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
