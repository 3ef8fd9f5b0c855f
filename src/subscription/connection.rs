//! The change feed body, shared between a subscription and its inbound task.
//!
//! The task reads the body through [`Connection`]; the subscription can drop
//! it at any time with [`Connection::close`], which closes the underlying
//! connection before returning instead of waiting for the task to be
//! polled again.

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use crate::traits::{ByteStream, HttpError};

#[derive(Default)]
struct Slot {
    body: Option<ByteStream>,
    closed: bool,
}

#[derive(Clone, Default)]
pub(crate) struct Connection {
    slot: Arc<Mutex<Slot>>,
}

impl Connection {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Take ownership of an opened body and return a stream reading from it.
    ///
    /// Returns `None`, dropping `body`, if the connection was closed while
    /// the body was being opened.
    pub(crate) fn attach(&self, body: ByteStream) -> Option<ByteStream> {
        let mut slot = self.lock();
        if slot.closed {
            return None;
        }
        slot.body = Some(body);
        Some(Box::pin(self.clone()))
    }

    /// Drop the body. Returns whether one was attached.
    ///
    /// Readers see the end of the stream from then on.
    pub(crate) fn close(&self) -> bool {
        let body = {
            let mut slot = self.lock();
            slot.closed = true;
            slot.body.take()
        };
        body.is_some()
    }
}

impl Stream for Connection {
    type Item = Result<Bytes, HttpError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut slot = self.lock();
        match slot.body.as_mut() {
            Some(body) => body.as_mut().poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}
