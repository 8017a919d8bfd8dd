//! Cancellation observed at remote-call boundaries

use crate::error::{ProviderError, Result};
use std::future::Future;
use tokio::sync::watch;

/// Receiving half of the host's cancellation channel
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Create a linked sender/signal pair
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx: Some(rx) })
    }

    /// Another signal fed by an existing sender
    pub fn subscribe(tx: &watch::Sender<bool>) -> Self {
        Self {
            rx: Some(tx.subscribe()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling
                return std::future::pending().await;
            }
        }
    }

    /// Run `fut` unless cancellation arrives first
    pub async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ProviderError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_guard_passes_through() {
        let signal = CancelSignal::never();
        let result = signal.guard(async { Ok::<_, ProviderError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_guard_observes_cancellation() {
        let (tx, signal) = CancelSignal::channel();
        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ProviderError>(())
        };
        let handle = tokio::spawn({
            let signal = signal.clone();
            async move { signal.guard(slow).await }
        });
        tx.send(true).unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }

    #[test]
    fn test_already_cancelled() {
        let (tx, signal) = CancelSignal::channel();
        tx.send(true).unwrap();
        let result = tokio_test::block_on(signal.guard(async { Ok::<_, ProviderError>(()) }));
        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }
}
