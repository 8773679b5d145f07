pub mod cleanup;
pub mod manager;
pub mod types;

pub use cleanup::{SESSION_TIMEOUT_SECS, SweepResult};
pub use manager::{SessionHandle, SessionStore};
pub use types::{ConversationSession, Message, Role};
