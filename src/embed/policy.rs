//! Security Policy Violation Bus
//!
//! Process-wide channel carrying content-security-policy violation reports.
//! Uses a tokio broadcast channel; each mounted dashboard holds one
//! [`PolicySubscription`] and hands it back through
//! [`PolicyBus::unsubscribe`] when it unmounts or switches links.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// A browser-reported denial of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyViolation {
    /// The resource that was blocked
    pub blocked_uri: String,
    /// Directive that caused the block (e.g. `frame-src`)
    #[serde(default)]
    pub violated_directive: String,
    /// Page the violation was reported on
    #[serde(default)]
    pub document_uri: Option<String>,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

impl PolicyViolation {
    pub fn new(blocked_uri: impl Into<String>, violated_directive: impl Into<String>) -> Self {
        Self {
            blocked_uri: blocked_uri.into(),
            violated_directive: violated_directive.into(),
            document_uri: None,
            observed_at: Utc::now(),
        }
    }

    /// Lowercased host of the blocked resource
    ///
    /// Reports sometimes carry a bare origin without a scheme.
    pub fn blocked_host(&self) -> Option<String> {
        let uri = self.blocked_uri.trim();
        let parsed = Url::parse(uri)
            .ok()
            .filter(|u| u.host_str().is_some())
            .or_else(|| Url::parse(&format!("https://{}", uri)).ok());

        parsed
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .filter(|h| !h.is_empty())
    }

    /// Whether the blocked resource belongs to one of `domains`
    pub fn blocks_domain(&self, domains: &[String]) -> bool {
        let Some(host) = self.blocked_host() else {
            return false;
        };
        domains.iter().any(|domain| host_matches(&host, domain))
    }
}

/// `host` is `domain` or a subdomain of it
pub fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Host of a dashboard link, always treated as a provider
pub fn link_host(link: &str) -> Option<String> {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
}

/// Identifier of one subscription
pub type SubscriptionId = u64;

/// Process-wide violation channel
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct PolicyBus {
    tx: broadcast::Sender<PolicyViolation>,
    next_id: Arc<AtomicU64>,
}

impl Default for PolicyBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl PolicyBus {
    /// Create a bus buffering up to `capacity` undelivered reports per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Report a violation; returns how many subscribers will see it
    pub fn publish(&self, violation: PolicyViolation) -> usize {
        tracing::debug!(
            blocked_uri = %violation.blocked_uri,
            directive = %violation.violated_directive,
            "Policy violation reported"
        );
        self.tx.send(violation).unwrap_or(0)
    }

    /// Start receiving reports published from now on
    pub fn subscribe(&self) -> PolicySubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(subscription_id = id, "Policy subscription opened");
        PolicySubscription {
            id,
            rx: self.tx.subscribe(),
        }
    }

    /// Release a subscription
    pub fn unsubscribe(&self, subscription: PolicySubscription) {
        tracing::trace!(subscription_id = subscription.id, "Policy subscription released");
        drop(subscription);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving end held by one mounted dashboard
#[derive(Debug)]
pub struct PolicySubscription {
    id: SubscriptionId,
    rx: broadcast::Receiver<PolicyViolation>,
}

impl PolicySubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next buffered report, without waiting
    pub fn try_next(&mut self) -> Option<PolicyViolation> {
        loop {
            match self.rx.try_recv() {
                Ok(v) => return Some(v),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(subscription_id = self.id, skipped, "Policy reports dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Wait for the next report; `None` once the bus is gone
    pub async fn next(&mut self) -> Option<PolicyViolation> {
        loop {
            match self.rx.recv().await {
                Ok(v) => return Some(v),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(subscription_id = self.id, skipped, "Policy reports dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> Vec<String> {
        vec!["lookerstudio.google.com".to_string()]
    }

    #[test]
    fn test_blocked_host() {
        let v = PolicyViolation::new("https://LookerStudio.google.com/embed/reporting/x", "frame-src");
        assert_eq!(v.blocked_host().as_deref(), Some("lookerstudio.google.com"));

        let bare = PolicyViolation::new("lookerstudio.google.com", "frame-src");
        assert_eq!(bare.blocked_host().as_deref(), Some("lookerstudio.google.com"));

        let inline = PolicyViolation::new("inline", "script-src");
        assert_eq!(inline.blocked_host().as_deref(), Some("inline"));
        assert!(!inline.blocks_domain(&domains()));
    }

    #[test]
    fn test_blocks_domain_matches_subdomains_only() {
        let sub = PolicyViolation::new("https://eu.lookerstudio.google.com/x", "frame-src");
        assert!(sub.blocks_domain(&domains()));

        let lookalike = PolicyViolation::new("https://evillookerstudio.google.com/x", "frame-src");
        assert!(!lookalike.blocks_domain(&domains()));

        let other = PolicyViolation::new("https://cdn.example.com/app.js", "script-src");
        assert!(!other.blocks_domain(&domains()));
    }

    #[test]
    fn test_link_host() {
        assert_eq!(link_host("https://x/reporting/r1").as_deref(), Some("x"));
        assert_eq!(link_host("not a url"), None);
    }

    #[test]
    fn test_subscribe_unsubscribe_counts() {
        let bus = PolicyBus::default();
        assert_eq!(bus.subscriber_count(), 0);

        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_ne!(a.id(), b.id());
        assert_eq!(bus.subscriber_count(), 2);

        bus.unsubscribe(a);
        assert_eq!(bus.subscriber_count(), 1);
        bus.unsubscribe(b);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_reaches_live_subscribers() {
        let bus = PolicyBus::default();
        assert_eq!(bus.publish(PolicyViolation::new("https://a", "frame-src")), 0);

        let mut sub = bus.subscribe();
        assert_eq!(bus.publish(PolicyViolation::new("https://b", "frame-src")), 1);
        assert_eq!(sub.try_next().unwrap().blocked_uri, "https://b");
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_lagged_subscriber_keeps_latest() {
        let bus = PolicyBus::new(2);
        let mut sub = bus.subscribe();
        for i in 0..5 {
            bus.publish(PolicyViolation::new(format!("https://h{}", i), "frame-src"));
        }
        assert_eq!(sub.try_next().unwrap().blocked_uri, "https://h3");
        assert_eq!(sub.try_next().unwrap().blocked_uri, "https://h4");
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn test_async_next() {
        let bus = PolicyBus::default();
        let mut sub = bus.subscribe();
        let publisher = bus.clone();
        tokio::spawn(async move {
            publisher.publish(PolicyViolation::new("https://late", "frame-src"));
        });
        let v = sub.next().await.unwrap();
        assert_eq!(v.blocked_uri, "https://late");
    }
}
