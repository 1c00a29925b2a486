use std::time::Duration;

use crate::{
    error::AppError,
    events::{EventSender, UiEvent},
    timer::Timer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Validation(_) => Notice::warning(err.user_message()),
            _ => Notice::error(err.user_message()),
        }
    }
}

#[derive(Debug)]
struct ActiveNotice {
    id: u64,
    notice: Notice,
    _dismiss: Timer,
}

/// Transient messages. Each one dismisses itself after `ttl`.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    next_id: u64,
    active: Vec<ActiveNotice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            active: Vec::new(),
        }
    }

    pub fn push(&mut self, notice: Notice, tx: &EventSender) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        match notice.level {
            NoticeLevel::Error => tracing::warn!(notice_id = id, text = %notice.text, "notice shown"),
            _ => tracing::debug!(notice_id = id, text = %notice.text, "notice shown"),
        }
        let dismiss = Timer::schedule(self.ttl, tx, UiEvent::NoticeExpired { id });
        self.active.push(ActiveNotice {
            id,
            notice,
            _dismiss: dismiss,
        });
        id
    }

    /// Removes a notice; returns false when it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        before != self.active.len()
    }

    pub fn active(&self) -> impl Iterator<Item = (u64, &Notice)> {
        self.active.iter().map(|n| (n.id, &n.notice))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn notices_expire_through_the_loop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut board = NoticeBoard::new(Duration::from_millis(3000));
        let id = board.push(Notice::warning("Máximo 20"), &tx);
        assert_eq!(board.len(), 1);

        match rx.recv().await {
            Some(UiEvent::NoticeExpired { id: expired }) => {
                assert_eq!(expired, id);
                assert!(board.dismiss(expired));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(board.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut board = NoticeBoard::new(Duration::from_millis(3000));
        let id = board.push(Notice::info("hola"), &tx);
        assert!(board.dismiss(id));
        assert!(!board.dismiss(id));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
