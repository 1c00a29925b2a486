use std::time::Duration;

use tokio::task::JoinHandle;

use crate::events::{EventSender, UiEvent};

/// One-shot timer that posts an event back to the loop.
///
/// Dropping the timer aborts it, so replacing or clearing the slot that
/// holds it is enough to cancel.
#[derive(Debug)]
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    pub fn schedule(after: Duration, tx: &EventSender, event: UiEvent) -> Self {
        let tx = tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the page is being torn down.
            let _ = tx.send(event);
        });
        Self { handle }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = Timer::schedule(Duration::from_millis(500), &tx, UiEvent::RedirectDue);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(matches!(rx.try_recv(), Ok(UiEvent::RedirectDue)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = Timer::schedule(Duration::from_millis(500), &tx, UiEvent::RedirectDue);
        drop(timer);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }
}
