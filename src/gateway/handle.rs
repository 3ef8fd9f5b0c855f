use tokio::task::JoinHandle;

use crate::error::{SyncError, SyncResult};
use crate::traits::HttpError;

/// A write running in its own task.
///
/// Dropping the handle or calling [`cancel`](Self::cancel) aborts the task,
/// which drops the in-flight request.
#[derive(Debug)]
pub struct WriteHandle {
    task: Option<JoinHandle<SyncResult<()>>>,
}

impl WriteHandle {
    pub(crate) fn new(task: JoinHandle<SyncResult<()>>) -> Self {
        Self { task: Some(task) }
    }

    /// Abort the write. Has no effect once the write has finished.
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Wait for the write to finish.
    ///
    /// A cancelled write reports `Transport(HttpError::Cancelled)`.
    pub async fn outcome(mut self) -> SyncResult<()> {
        let Some(task) = self.task.take() else {
            return Err(SyncError::Transport(HttpError::Cancelled));
        };
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SyncError::Transport(HttpError::Cancelled)),
            Err(e) => Err(SyncError::Transport(HttpError::Other(e.to_string()))),
        }
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
