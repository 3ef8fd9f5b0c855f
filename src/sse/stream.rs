//! Adapts a transport byte stream into a stream of frame payloads.

use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

use super::parser::FrameParser;
use crate::error::SyncError;
use crate::traits::ByteStream;

/// Boxed stream of payloads, ending after the first error.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<String, SyncError>> + Send>>;

struct PayloadState {
    body: ByteStream,
    parser: FrameParser,
    ready: VecDeque<String>,
    finished: bool,
}

/// Drive a [`FrameParser`] from `body`.
///
/// Payloads are yielded in order. A clean end of `body` completes the parser
/// (dropping any unterminated remainder) and ends the stream. A transport
/// error or a decode error is yielded once, after which the stream ends.
pub fn payload_stream(body: ByteStream) -> PayloadStream {
    let state = PayloadState {
        body,
        parser: FrameParser::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    let payloads = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(payload) = state.ready.pop_front() {
                return Some((Ok(payload), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => match state.parser.feed(&chunk) {
                    Ok(payloads) => state.ready.extend(payloads),
                    Err(e) => {
                        state.parser.fail(&e);
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    let err = SyncError::Transport(e);
                    state.parser.fail(&err);
                    state.finished = true;
                    return Some((Err(err), state));
                }
                None => {
                    state.parser.complete();
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(payloads)
}
