//! Dashboard embed lifecycle
//!
//! ```text
//!            frame loaded
//! Loading ───────────────▶ Ready
//!    │  policy violation
//!    ├──────────────────▶ Blocked
//!    │  frame error
//!    └──────────────────▶ Failed
//! ```
//!
//! All three outcomes are terminal for a mount. A new dashboard link is a
//! new mount and starts again at `Loading`.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::EmbedError;
use super::policy::{link_host, PolicyBus, PolicySubscription, PolicyViolation};
use super::url::EmbedRule;
use super::view::{EmbedView, ExternalLink, FrameSpec};

/// Identifies one mount, so frame events from a previous link can be told apart
pub type MountId = u64;

static NEXT_MOUNT: AtomicU64 = AtomicU64::new(1);

fn next_mount_id() -> MountId {
    NEXT_MOUNT.fetch_add(1, Ordering::Relaxed)
}

/// View state of one mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedState {
    Loading,
    Ready,
    Blocked { blocked_uri: String },
    Failed { reason: String },
}

impl EmbedState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EmbedState::Loading)
    }

    /// Error carried by the state, if any
    pub fn error(&self) -> Option<EmbedError> {
        match self {
            EmbedState::Blocked { blocked_uri } => Some(EmbedError::Blocked {
                blocked_uri: blocked_uri.clone(),
            }),
            EmbedState::Failed { reason } => Some(EmbedError::LoadFailed(reason.clone())),
            EmbedState::Loading | EmbedState::Ready => None,
        }
    }
}

/// Signals from the frame itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    Loaded,
    Failed(String),
}

/// A mounted dashboard frame
///
/// Borrows the [`PolicyBus`] at mount, relink and unmount; it never keeps the
/// bus itself, only its own subscription.
#[derive(Debug)]
pub struct DashboardEmbed {
    mount_id: MountId,
    dashboard_link: String,
    title: String,
    embed_url: String,
    provider_domains: Vec<String>,
    state: EmbedState,
    subscription: Option<PolicySubscription>,
}

impl DashboardEmbed {
    /// Mount a frame for `dashboard_link`
    ///
    /// The link's own host counts as a provider alongside `provider_domains`.
    pub fn mount(
        dashboard_link: &str,
        title: &str,
        rule: &EmbedRule,
        provider_domains: &[String],
        bus: &PolicyBus,
    ) -> Self {
        let embed = Self {
            mount_id: next_mount_id(),
            dashboard_link: dashboard_link.to_string(),
            title: title.to_string(),
            embed_url: rule.embed_url(dashboard_link),
            provider_domains: resolve_domains(dashboard_link, provider_domains),
            state: EmbedState::Loading,
            subscription: Some(bus.subscribe()),
        };

        tracing::info!(
            mount_id = embed.mount_id,
            embed_url = %embed.embed_url,
            "Dashboard mounted"
        );
        embed
    }

    pub fn mount_id(&self) -> MountId {
        self.mount_id
    }

    pub fn state(&self) -> &EmbedState {
        &self.state
    }

    pub fn dashboard_link(&self) -> &str {
        &self.dashboard_link
    }

    pub fn embed_url(&self) -> &str {
        &self.embed_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// The link the external-open action targets (never rewritten)
    pub fn external_url(&self) -> &str {
        &self.dashboard_link
    }

    /// Point the frame at a different link
    ///
    /// Releases the old subscription before taking a new one. The same link
    /// keeps the current mount and only updates the title.
    pub fn change_link(
        &mut self,
        dashboard_link: &str,
        title: &str,
        rule: &EmbedRule,
        provider_domains: &[String],
        bus: &PolicyBus,
    ) {
        if dashboard_link == self.dashboard_link {
            self.title = title.to_string();
            return;
        }
        if let Some(old) = self.subscription.take() {
            bus.unsubscribe(old);
        }
        *self = Self::mount(dashboard_link, title, rule, provider_domains, bus);
    }

    /// Tear down: release the policy subscription
    pub fn unmount(mut self, bus: &PolicyBus) {
        if let Some(subscription) = self.subscription.take() {
            bus.unsubscribe(subscription);
        }
        tracing::debug!(mount_id = self.mount_id, "Dashboard unmounted");
    }

    /// Apply a frame signal; returns true if the state changed
    pub fn on_frame_event(&mut self, event: FrameEvent) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = match event {
            FrameEvent::Loaded => EmbedState::Ready,
            FrameEvent::Failed(reason) => EmbedState::Failed { reason },
        };
        self.log_transition();
        true
    }

    /// Apply a policy report; returns true if it blocked this dashboard
    pub fn on_policy_violation(&mut self, violation: &PolicyViolation) -> bool {
        if self.state.is_terminal() || !violation.blocks_domain(&self.provider_domains) {
            return false;
        }
        self.state = EmbedState::Blocked {
            blocked_uri: violation.blocked_uri.clone(),
        };
        self.log_transition();
        true
    }

    /// Drain buffered policy reports; returns true if one blocked this dashboard
    pub fn poll_policy(&mut self) -> bool {
        let mut changed = false;
        while let Some(violation) = self.subscription.as_mut().and_then(|s| s.try_next()) {
            changed |= self.on_policy_violation(&violation);
        }
        changed
    }

    /// Wait for the next policy report on this mount's subscription
    pub async fn next_violation(&mut self) -> Option<PolicyViolation> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.next().await,
            None => None,
        }
    }

    fn log_transition(&self) {
        match &self.state {
            EmbedState::Ready => {
                tracing::info!(mount_id = self.mount_id, "Dashboard ready")
            }
            EmbedState::Blocked { blocked_uri } => tracing::warn!(
                mount_id = self.mount_id,
                blocked_uri = %blocked_uri,
                "Dashboard blocked by security policy"
            ),
            EmbedState::Failed { reason } => tracing::warn!(
                mount_id = self.mount_id,
                reason = %reason,
                "Dashboard failed to load"
            ),
            EmbedState::Loading => {}
        }
    }

    /// Render the view model
    pub fn render(&self, external_label: &str) -> EmbedView {
        let external = ExternalLink::new(&self.dashboard_link, external_label);
        let frame = FrameSpec::new(self.mount_id, &self.embed_url, &self.title);

        match &self.state {
            EmbedState::Loading => EmbedView::Loading { frame },
            EmbedState::Ready => EmbedView::Ready { frame, external },
            EmbedState::Blocked { .. } | EmbedState::Failed { .. } => {
                let error = self
                    .state
                    .error()
                    .unwrap_or_else(|| EmbedError::LoadFailed("unknown".to_string()));
                EmbedView::Error {
                    message: error.user_message().to_string(),
                    blocked: error.is_blocked(),
                    detail: error.to_string(),
                    external,
                }
            }
        }
    }
}

/// Configured provider domains plus the link's own host
fn resolve_domains(dashboard_link: &str, configured: &[String]) -> Vec<String> {
    let mut domains = configured.to_vec();
    if let Some(host) = link_host(dashboard_link) {
        if !domains.iter().any(|d| d.eq_ignore_ascii_case(&host)) {
            domains.push(host);
        }
    }
    domains
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://lookerstudio.google.com/reporting/r1";

    fn domains() -> Vec<String> {
        vec!["lookerstudio.google.com".to_string()]
    }

    fn mount(bus: &PolicyBus) -> DashboardEmbed {
        DashboardEmbed::mount(LINK, "Acme", &EmbedRule::default(), &domains(), bus)
    }

    #[test]
    fn test_mount_starts_loading_with_embed_url() {
        let bus = PolicyBus::default();
        let embed = mount(&bus);
        assert_eq!(embed.state(), &EmbedState::Loading);
        assert_eq!(
            embed.embed_url(),
            "https://lookerstudio.google.com/embed/reporting/r1"
        );
        assert_eq!(embed.external_url(), LINK);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_frame_loaded_is_terminal() {
        let bus = PolicyBus::default();
        let mut embed = mount(&bus);
        assert!(embed.on_frame_event(FrameEvent::Loaded));
        assert_eq!(embed.state(), &EmbedState::Ready);

        assert!(!embed.on_frame_event(FrameEvent::Failed("late".into())));
        bus.publish(PolicyViolation::new(LINK, "frame-src"));
        assert!(!embed.poll_policy());
        assert_eq!(embed.state(), &EmbedState::Ready);
    }

    #[test]
    fn test_frame_error_is_generic_failure() {
        let bus = PolicyBus::default();
        let mut embed = mount(&bus);
        embed.on_frame_event(FrameEvent::Failed("net::ERR_TIMED_OUT".into()));
        match embed.render("Open") {
            EmbedView::Error { blocked, message, .. } => {
                assert!(!blocked);
                assert_eq!(message, "Failed to load the dashboard.");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_policy_violation_for_provider_blocks() {
        let bus = PolicyBus::default();
        let mut embed = mount(&bus);
        bus.publish(PolicyViolation::new(
            "https://lookerstudio.google.com/embed/reporting/r1",
            "frame-src",
        ));
        assert!(embed.poll_policy());
        assert!(matches!(embed.state(), EmbedState::Blocked { .. }));

        match embed.render("Open in Looker Studio") {
            EmbedView::Error {
                blocked, external, ..
            } => {
                assert!(blocked);
                assert_eq!(external.url, LINK);
                assert!(external.new_context);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_unrelated_violation_ignored() {
        let bus = PolicyBus::default();
        let mut embed = mount(&bus);
        bus.publish(PolicyViolation::new("https://fonts.example.com/a.woff", "font-src"));
        assert!(!embed.poll_policy());
        assert_eq!(embed.state(), &EmbedState::Loading);
    }

    #[test]
    fn test_only_one_transition_per_mount() {
        let bus = PolicyBus::default();
        let mut embed = mount(&bus);
        bus.publish(PolicyViolation::new("https://lookerstudio.google.com/a", "frame-src"));
        bus.publish(PolicyViolation::new("https://lookerstudio.google.com/b", "frame-src"));
        assert!(embed.poll_policy());
        assert_eq!(
            embed.state(),
            &EmbedState::Blocked {
                blocked_uri: "https://lookerstudio.google.com/a".into()
            }
        );
    }

    #[test]
    fn test_change_link_resubscribes_and_resets() {
        let bus = PolicyBus::default();
        let mut embed = mount(&bus);
        embed.on_frame_event(FrameEvent::Loaded);
        let first = embed.mount_id();

        embed.change_link(
            "https://lookerstudio.google.com/reporting/r2",
            "Globex",
            &EmbedRule::default(),
            &domains(),
            &bus,
        );
        assert_ne!(embed.mount_id(), first);
        assert_eq!(embed.state(), &EmbedState::Loading);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_unmount_releases_subscription() {
        let bus = PolicyBus::default();
        let embed = mount(&bus);
        assert_eq!(bus.subscriber_count(), 1);
        embed.unmount(&bus);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_falls_back_to_link_host() {
        let bus = PolicyBus::default();
        let mut embed =
            DashboardEmbed::mount("https://bi.internal/reporting/9", "X", &EmbedRule::default(), &[], &bus);
        bus.publish(PolicyViolation::new("https://bi.internal/embed/reporting/9", "frame-src"));
        assert!(embed.poll_policy());
    }

    #[test]
    fn test_link_host_blocks_alongside_configured_domains() {
        let bus = PolicyBus::default();
        let mut embed =
            DashboardEmbed::mount("https://x/reporting/r1", "X", &EmbedRule::default(), &domains(), &bus);
        bus.publish(PolicyViolation::new("https://x/embed/reporting/r1", "frame-src"));
        assert!(embed.poll_policy());
        assert_eq!(
            embed.state(),
            &EmbedState::Blocked {
                blocked_uri: "https://x/embed/reporting/r1".into()
            }
        );
    }

    #[test]
    fn test_configured_domain_still_blocks_foreign_link() {
        let bus = PolicyBus::default();
        let mut embed =
            DashboardEmbed::mount("https://x/reporting/r1", "X", &EmbedRule::default(), &domains(), &bus);
        bus.publish(PolicyViolation::new("https://lookerstudio.google.com/embed", "frame-src"));
        assert!(embed.poll_policy());
    }
}
