pub mod auth;
pub mod chunk;
pub mod command;
pub mod prompts;
pub mod replies;
pub mod router;

pub use crate::domain::model::{
    ChatTurn, CompletionRequest, DispatchOutcome, DispatchRequest, SendOptions, WorkflowRun,
};
pub use crate::domain::ports::{Completion, Messenger, SourceControl};
pub use crate::utils::error::Result;
