//! Incremental frame parser.
//!
//! Reassembles `"\n\n"`-delimited frames from byte chunks split at arbitrary
//! positions, including inside the delimiter or inside a multi-byte UTF-8
//! sequence.

use tracing::debug;

use crate::error::SyncError;

/// Separator between two frames.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Marker stripped from the start of a frame.
pub const DATA_MARKER: &str = "data:";

/// Lifecycle of a [`FrameParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Accepting bytes
    #[default]
    Open,
    /// The producer finished cleanly
    Completed,
    /// The producer failed
    Failed,
}

/// Stateful parser turning byte chunks into frame payloads.
///
/// The buffer always holds exactly the bytes received after the last
/// complete delimiter. Bytes still buffered when the parser is completed or
/// failed are discarded, never emitted as a partial payload.
///
/// # Example
///
/// ```
/// use realtime_bindings::sse::FrameParser;
///
/// let mut parser = FrameParser::new();
/// assert!(parser.feed(b"data:{\"a\"").unwrap().is_empty());
/// assert_eq!(parser.feed(b":1}\n\ndata:").unwrap(), vec!["{\"a\":1}".to_string()]);
/// assert_eq!(parser.complete(), 5);
/// ```
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Bytes after the last delimiter seen
    buffer: Vec<u8>,
    state: ParserState,
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Whether `complete()` or `fail()` has been called.
    pub fn is_closed(&self) -> bool {
        self.state != ParserState::Open
    }

    /// Number of bytes waiting for a delimiter.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a chunk, returning every payload completed by it, in order.
    ///
    /// Returns:
    /// - `Ok(payloads)` - zero or more payloads with one leading `data:` stripped
    /// - `Err(SyncError::Decode)` - the buffered bytes are not valid UTF-8
    /// - `Err(SyncError::ParserClosed)` - the parser was already completed or failed
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, SyncError> {
        if self.is_closed() {
            return Err(SyncError::ParserClosed);
        }

        self.buffer.extend_from_slice(chunk);

        let (payloads, consumed) = {
            let text = decoded_prefix(&self.buffer)?;
            let mut frames: Vec<&str> = text.split(FRAME_DELIMITER).collect();
            // split always yields at least one piece: the trailing remainder
            let remainder = frames.pop().unwrap_or("");
            let consumed = text.len() - remainder.len();

            let payloads: Vec<String> = frames
                .into_iter()
                .map(|frame| strip_marker(frame).to_string())
                .collect();
            (payloads, consumed)
        };

        self.buffer.drain(..consumed);
        Ok(payloads)
    }

    /// Mark the stream as finished, discarding any unterminated remainder.
    ///
    /// Returns the number of bytes discarded.
    pub fn complete(&mut self) -> usize {
        self.close(ParserState::Completed)
    }

    /// Mark the stream as failed, discarding any unterminated remainder.
    ///
    /// Returns the number of bytes discarded.
    pub fn fail(&mut self, error: &SyncError) -> usize {
        debug!("Frame parser failed: {}", error);
        self.close(ParserState::Failed)
    }

    fn close(&mut self, state: ParserState) -> usize {
        if self.is_closed() {
            return 0;
        }
        let discarded = self.buffer.len();
        if discarded > 0 {
            debug!("Dropping {} unterminated bytes at end of stream", discarded);
        }
        self.buffer = Vec::new();
        self.state = state;
        discarded
    }
}

/// Strip a single leading `data:` marker; everything after it is kept verbatim.
pub fn strip_marker(frame: &str) -> &str {
    frame.strip_prefix(DATA_MARKER).unwrap_or(frame)
}

/// Decode the longest valid UTF-8 prefix of `bytes`.
///
/// A multi-byte sequence cut off at the very end is not an error: its bytes
/// stay buffered until the next chunk completes them.
fn decoded_prefix(bytes: &[u8]) -> Result<&str, SyncError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&bytes[..e.valid_up_to()])
            .map_err(|e| SyncError::Decode {
                valid_up_to: e.valid_up_to(),
            }),
        Err(e) => Err(SyncError::Decode {
            valid_up_to: e.valid_up_to(),
        }),
    }
}
