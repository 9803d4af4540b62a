//! One-slot buffers between a battle session and its agent

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandoffError {
    #[error("hand-off cancelled")]
    Cancelled,
}

/// Cancellation signal shared by everything belonging to one battle
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called, immediately if it already was
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once cancelled
        rx.wait_for(|cancelled| *cancelled).await.ok();
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a one-slot hand-off tied to `token`
pub fn channel<T>(token: &CancelToken) -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (
        HandoffSender {
            tx,
            token: token.clone(),
        },
        HandoffReceiver {
            rx,
            token: token.clone(),
        },
    )
}

#[derive(Debug)]
pub struct HandoffSender<T> {
    tx: mpsc::Sender<T>,
    token: CancelToken,
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            token: self.token.clone(),
        }
    }
}

impl<T> HandoffSender<T> {
    /// Place an item, waiting while the previous one has not been taken
    pub async fn put(&self, item: T) -> Result<(), HandoffError> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(HandoffError::Cancelled),
            sent = self.tx.send(item) => sent.map_err(|_| HandoffError::Cancelled),
        }
    }
}

#[derive(Debug)]
pub struct HandoffReceiver<T> {
    rx: mpsc::Receiver<T>,
    token: CancelToken,
}

impl<T> HandoffReceiver<T> {
    /// Wait for the next item
    pub async fn take(&mut self) -> Result<T, HandoffError> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(HandoffError::Cancelled),
            item = self.rx.recv() => item.ok_or(HandoffError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_put_then_take() {
        let token = CancelToken::new();
        let (tx, mut rx) = channel(&token);
        tx.put(1).await.unwrap();
        assert_eq!(rx.take().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_waits_for_take() {
        let token = CancelToken::new();
        let (tx, mut rx) = channel(&token);
        tx.put("first").await.unwrap();

        let second = tokio::time::timeout(Duration::from_millis(20), tx.put("second")).await;
        assert!(second.is_err());

        assert_eq!(rx.take().await.unwrap(), "first");
        tx.put("third").await.unwrap();
        assert_eq!(rx.take().await.unwrap(), "third");
    }

    #[tokio::test]
    async fn test_cancel_wakes_both_ends() {
        let token = CancelToken::new();
        let (tx, mut rx) = channel::<u8>(&token);
        tx.put(1).await.unwrap();

        let blocked_put = tokio::spawn(async move { tx.put(2).await });
        let waiter = token.clone();
        tokio::spawn(async move { waiter.cancel() });

        assert_eq!(blocked_put.await.unwrap(), Err(HandoffError::Cancelled));
        assert_eq!(rx.take().await, Err(HandoffError::Cancelled));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_peer() {
        let token = CancelToken::new();
        let (tx, mut rx) = channel::<u8>(&token);
        drop(tx);
        assert_eq!(rx.take().await, Err(HandoffError::Cancelled));
    }
}
