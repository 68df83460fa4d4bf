/// Extra request-body headroom for multipart boundaries and form fields.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;
/// Longest chat message echoed back to the sender.
pub const MAX_CHAT_MESSAGE_CHARS: usize = 500;
