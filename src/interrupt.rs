//! Process-wide interrupt flag shared by every stage of a run.

use std::future::Future;

use tokio::sync::watch;

use crate::StravaError;

/// Cloneable view of a flag that is raised at most once.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    /// A lowered flag and the sender that raises it.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// Raises the flag on the first Ctrl-C.
    ///
    /// The handler is installed once and stays installed until the process
    /// exits. Must be called inside a tokio runtime.
    pub fn on_ctrl_c() -> Self {
        let (tx, interrupt) = Self::channel();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(true);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                    // Holding the sender keeps receivers waiting instead of erroring.
                    std::future::pending::<()>().await;
                }
            }
        });
        interrupt
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the flag is raised.
    ///
    /// Pends forever if the sender goes away without raising it.
    pub async fn raised(mut self) {
        if self.rx.wait_for(|raised| *raised).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Drives `fut` to completion unless the flag is raised first.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, StravaError>
    where
        F: Future<Output = Result<T, StravaError>>,
    {
        tokio::select! {
            biased;
            result = fut => result,
            () = self.clone().raised() => Err(StravaError::Interrupted),
        }
    }
}
