//! Stop signal for the local server.

use std::future::Future;

use tokio::sync::watch;

/// Handle that stops a running [`ApiServer`](crate::ApiServer).
///
/// The server drains when either ctrl-c arrives or [`Shutdown::trigger`]
/// is called. A trigger that lands before the server starts waiting still
/// counts.
#[derive(Debug, Clone)]
pub struct Shutdown {
    stop: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            stop: watch::Sender::new(false),
        }
    }

    pub fn trigger(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stop.borrow()
    }

    /// Resolves on ctrl-c or once [`trigger`](Self::trigger) has been called.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut stop = self.stop.subscribe();
        async move {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                    std::future::pending::<()>().await;
                }
            };
            let triggered = async {
                if stop.wait_for(|stopped| *stopped).await.is_err() {
                    std::future::pending::<()>().await;
                }
            };

            tokio::select! {
                _ = ctrl_c => {}
                _ = triggered => {}
            }
            tracing::info!("Shutdown signal received");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
