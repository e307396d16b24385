//! Request-scoped context
//!
//! Every RPC gets a Context carrying its request id and the provider's stop
//! signal. StopProvider flips the signal for every context created from the
//! same [`StopSignal`], including requests still in flight.

use std::sync::Arc;
use tokio::sync::watch;

/// Passed as the first parameter to every provider, resource and data source
/// method
#[derive(Clone)]
pub struct Context {
    request_id: Arc<str>,
    stopped: watch::Receiver<bool>,
}

impl Context {
    /// A context that is never stopped
    pub fn new() -> Self {
        let (_, stopped) = watch::channel(false);
        Self::with_signal(stopped)
    }

    fn with_signal(stopped: watch::Receiver<bool>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string().into(),
            stopped,
        }
    }

    /// Identifier attached to every log line emitted while serving the RPC
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// True once Terraform has asked the provider to stop
    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Resolves when the provider is stopped. Never resolves for a context
    /// without a live stop signal.
    pub async fn stopped(&self) {
        let mut stopped = self.stopped.clone();
        if stopped.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop signal shared by all request contexts of one provider server
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Context for a new request, stopped together with this signal
    pub fn context(&self) -> Context {
        Context::with_signal(self.tx.subscribe())
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn context_carries_unique_request_ids() {
        let a = Context::new();
        let b = Context::new();
        assert_ne!(a.request_id(), b.request_id());
        assert!(uuid::Uuid::parse_str(a.request_id()).is_ok());
    }

    #[tokio::test]
    async fn standalone_context_is_never_stopped() {
        let ctx = Context::new();
        assert!(!ctx.is_stopped());
        assert!(timeout(Duration::from_millis(20), ctx.stopped())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn stop_reaches_contexts_created_before_and_after() {
        let signal = StopSignal::new();
        let before = signal.context();
        assert!(!before.is_stopped());

        let waiter = tokio::spawn({
            let ctx = before.clone();
            async move { ctx.stopped().await }
        });

        signal.stop();

        assert!(signal.is_stopped());
        assert!(before.is_stopped());
        assert!(signal.context().is_stopped());
        timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
