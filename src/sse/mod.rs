//! Change feed framing.
//!
//! The change feed is a long-lived response body carrying frames separated
//! by a blank line (`"\n\n"`). A frame may start with the marker `data:`;
//! the rest of the frame is the payload, verbatim.
//!
//! # Module structure
//! - `parser` - Incremental parsing (FrameParser)
//! - `stream` - Adapter from a transport body to a payload stream

mod parser;
mod stream;

pub use parser::{strip_marker, FrameParser, ParserState, DATA_MARKER, FRAME_DELIMITER};
pub use stream::{payload_stream, PayloadStream};
