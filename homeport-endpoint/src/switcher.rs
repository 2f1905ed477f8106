//! Per-account base URL switching.
//!
//! The switcher owns at most one subscription to the best-URL stream at a
//! time and keeps one account's persisted base URL in step with it.
//! Starting it for another account is a single cancel-then-replace: the
//! old task is aborted before the new one is spawned, so writes from two
//! accounts can never interleave.

use crate::chooser::BestUrlSource;
use crate::store::AccountStore;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Subscription {
    account: String,
    handle: JoinHandle<()>,
}

/// Keeps one account's persisted base URL synchronized with the
/// best-URL stream.
pub struct AccountUrlSwitcher {
    urls: Arc<dyn BestUrlSource>,
    accounts: Arc<dyn AccountStore>,
    subscription: Option<Subscription>,
}

impl AccountUrlSwitcher {
    /// Creates an idle switcher.
    pub fn new(urls: Arc<dyn BestUrlSource>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            urls,
            accounts,
            subscription: None,
        }
    }

    /// Starts watching the best URL on behalf of `account`. Any previous
    /// subscription is torn down first.
    pub fn start(&mut self, account: impl Into<String>) {
        let account = account.into();
        self.stop();

        let stream = self.urls.observe_best_url();
        let accounts = Arc::clone(&self.accounts);
        let task_account = account.clone();

        let handle = tokio::spawn(async move {
            let mut stream = stream;
            while let Some(resolved) = stream.next().await {
                let current = accounts.account_base_url(&task_account);
                if current.as_deref() == resolved.as_deref() {
                    debug!(account = %task_account, "resolved URL unchanged");
                    continue;
                }
                // A failed write is recoverable: the subscription stays up
                // and the next transition is tried again.
                match accounts.set_account_base_url(&task_account, resolved.as_deref()) {
                    Ok(()) => {
                        info!(account = %task_account, url = ?resolved, "account base URL updated");
                    }
                    Err(e) => {
                        warn!(account = %task_account, error = %e, "failed to persist base URL");
                    }
                }
            }
            debug!(account = %task_account, "best-URL stream ended");
        });

        info!(account = %account, "watching best URL");
        self.subscription = Some(Subscription { account, handle });
    }

    /// Stops the current subscription, if any. No further writes occur
    /// after this returns.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.handle.abort();
            info!(account = %subscription.account, "stopped watching best URL");
        }
    }

    /// Whether a subscription is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// The account currently being watched, if any.
    #[must_use]
    pub fn active_account(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.account.as_str())
    }

    /// Stops the subscription and releases owned scheduling resources.
    pub fn dispose(&mut self) {
        self.stop();
    }
}

impl Drop for AccountUrlSwitcher {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.handle.abort();
        }
    }
}
