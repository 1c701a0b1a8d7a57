// src/exec/stream.rs

//! Per-subscriber view of a run's log.
//!
//! A [`LogSubscription`] yields every line of the run from the first one
//! onwards and ends when the run completes. Dropping it early detaches it
//! from the run without affecting the process or other subscribers.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::exec::record::RunRecord;
use crate::types::RunId;

/// Item carried by a subscriber queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogEvent {
    Line(String),
    /// No more lines will follow.
    End,
}

#[derive(Debug)]
pub struct LogSubscription {
    record: Arc<RunRecord>,
    /// `None` once detached (or if never registered).
    subscriber_id: Option<u64>,
    rx: mpsc::UnboundedReceiver<LogEvent>,
    finished: bool,
}

impl LogSubscription {
    pub(crate) fn new(
        record: Arc<RunRecord>,
        subscriber_id: Option<u64>,
        rx: mpsc::UnboundedReceiver<LogEvent>,
    ) -> Self {
        Self {
            record,
            subscriber_id,
            rx,
            finished: false,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.record.id()
    }

    /// Wait for the next line; `None` once the run has completed.
    pub async fn next_line(&mut self) -> Option<String> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    fn detach(&mut self) {
        if let Some(id) = self.subscriber_id.take() {
            self.record.unsubscribe(id);
        }
    }
}

impl Stream for LogSubscription {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match ready!(self.rx.poll_recv(cx)) {
            Some(LogEvent::Line(line)) => Poll::Ready(Some(line)),
            Some(LogEvent::End) | None => {
                self.finished = true;
                self.detach();
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}
