//! Queue message wrapper.

use bytes::Bytes;

/// One delivery of a queued message.
///
/// `id` is stable across redeliveries; `receipt` identifies this delivery
/// and is what acknowledgement consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub id: String,
    pub receipt: String,
    /// Times this message has been received, including this delivery.
    pub receive_count: u32,
    /// Raw VAA bytes.
    pub body: Bytes,
}
