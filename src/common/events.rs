use super::error::ChatError;
use super::types::SendAck;

/// Completion of a send, delivered from the network task back to the UI.
#[derive(Debug)]
pub struct SendOutcome {
    /// Id of the optimistic echo inserted for this send, if any.
    pub echo_id: Option<String>,
    pub result: Result<SendAck, ChatError>,
}
