pub mod error;
pub mod events;
pub mod types;

pub use error::{ChatError, ChatResult};
pub use events::SendOutcome;
pub use types::{ChatMessage, SendAck, SendMessageRequest};
