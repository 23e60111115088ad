//! Application controller
//!
//! Owns the selection and everything that must reset with it. Every reset is
//! an explicit step of [`AppController::apply`]: selecting a company rebinds
//! the upload manager, relinks the dashboard and, on narrow viewports,
//! closes the sidebar.

use crate::config::{Config, ConfigError};
use crate::directory::{Company, CompanySource, DataLoader, LoadResult, SidebarItem};
use crate::embed::{DashboardEmbed, EmbedRule, FrameEvent, MountId, PolicyBus, PolicyViolation};
use crate::sidebar::{Sidebar, SidebarEvent, SidebarOutput, Viewport, DEFAULT_TITLE};
use crate::upload::{LogoFile, UploadManager, UploadReceipt, UploadResult, UploadTicket};

use super::error::ActionError;
use super::view::{AppView, MainView};

use std::sync::Arc;

/// Presentation and embedding settings resolved from [`Config`]
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub rule: EmbedRule,
    pub provider_domains: Vec<String>,
    pub frame_title: String,
    pub external_link_label: String,
    pub sidebar_title: String,
    pub viewport: Viewport,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from_config(&Config::default()).unwrap_or_else(|_| Self {
            rule: EmbedRule::default(),
            provider_domains: Vec::new(),
            frame_title: "Client dashboard".to_string(),
            external_link_label: "Open in Looker Studio".to_string(),
            sidebar_title: DEFAULT_TITLE.to_string(),
            viewport: Viewport::new(1280, 600),
        })
    }
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            rule: config.embed.rule()?,
            provider_domains: config.embed.provider_domains.clone(),
            frame_title: config.embed.frame_title.clone(),
            external_link_label: config.embed.external_link_label.clone(),
            sidebar_title: DEFAULT_TITLE.to_string(),
            viewport: Viewport::new(
                config.viewport.width_px,
                config.viewport.narrow_breakpoint_px,
            ),
        })
    }
}

/// Externally triggered transitions
#[derive(Debug, Clone)]
pub enum AppEvent {
    LoadFinished(LoadResult<Vec<Company>>),
    Sidebar(SidebarEvent),
    SelectCompany(String),
    ToggleSidebar,
    Resize { width_px: u32 },
    Frame { mount_id: MountId, event: FrameEvent },
    PolicyViolation(PolicyViolation),
    PickLogo(LogoFile),
    CancelLogo,
    ConfirmUpload,
    UploadFinished {
        ticket: UploadTicket,
        result: UploadResult<UploadReceipt>,
    },
    OpenExternal,
}

/// Work the controller hands back to its driver
#[derive(Debug, Clone)]
pub enum Command {
    StartUpload(UploadTicket),
    /// Open this URL in a new browsing context
    OpenExternal(String),
}

pub struct AppController {
    settings: AppSettings,
    bus: PolicyBus,
    loader: DataLoader,
    selection: Option<Company>,
    sidebar: Sidebar,
    sidebar_open: bool,
    upload: UploadManager,
    embed: Option<DashboardEmbed>,
    viewport: Viewport,
}

impl AppController {
    pub fn new(settings: AppSettings, source: Arc<dyn CompanySource>, bus: PolicyBus) -> Self {
        let viewport = settings.viewport;
        let mut sidebar = Sidebar::new(settings.sidebar_title.clone());
        sidebar.apply(SidebarEvent::SetLoading(true), viewport);

        Self {
            sidebar,
            // Drawer starts open on wide screens, closed on narrow ones
            sidebar_open: !viewport.is_narrow(),
            settings,
            bus,
            loader: DataLoader::new(source),
            selection: None,
            upload: UploadManager::new(),
            embed: None,
            viewport,
        }
    }

    pub fn selection(&self) -> Option<&Company> {
        self.selection.as_ref()
    }

    pub fn companies(&self) -> &[Company] {
        &self.loader.state().companies
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn upload(&self) -> &UploadManager {
        &self.upload
    }

    pub fn embed(&self) -> Option<&DashboardEmbed> {
        self.embed.as_ref()
    }

    pub fn bus(&self) -> &PolicyBus {
        &self.bus
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Claim the one-per-session company fetch
    ///
    /// Returns the source to fetch from, or `None` if the fetch was already issued.
    pub fn begin_load(&mut self) -> Option<Arc<dyn CompanySource>> {
        if self.loader.begin() {
            Some(self.loader.source())
        } else {
            None
        }
    }

    /// Apply one event
    pub fn apply(&mut self, event: AppEvent) -> Result<Option<Command>, ActionError> {
        match event {
            AppEvent::LoadFinished(result) => {
                self.finish_load(result);
                Ok(None)
            }
            AppEvent::Sidebar(event) => {
                if let Some(SidebarOutput::Selected { company, collapse }) =
                    self.sidebar.apply(event, self.viewport)
                {
                    self.select(company);
                    if collapse {
                        self.sidebar_open = false;
                    }
                }
                Ok(None)
            }
            AppEvent::SelectCompany(id) => {
                let company = self
                    .companies()
                    .iter()
                    .find(|c| c.id == id)
                    .cloned()
                    .ok_or(ActionError::UnknownCompany(id))?;
                self.select(company);
                if self.viewport.is_narrow() {
                    self.sidebar_open = false;
                }
                Ok(None)
            }
            AppEvent::ToggleSidebar => {
                self.sidebar_open = !self.sidebar_open;
                Ok(None)
            }
            AppEvent::Resize { width_px } => {
                self.viewport.width_px = width_px;
                Ok(None)
            }
            AppEvent::Frame { mount_id, event } => {
                match self.embed.as_mut() {
                    Some(embed) if embed.mount_id() == mount_id => {
                        embed.on_frame_event(event);
                    }
                    _ => tracing::debug!(mount_id, "Ignoring frame event for stale mount"),
                }
                Ok(None)
            }
            AppEvent::PolicyViolation(violation) => {
                if let Some(embed) = self.embed.as_mut() {
                    embed.on_policy_violation(&violation);
                }
                Ok(None)
            }
            AppEvent::PickLogo(file) => {
                self.upload.pick(file)?;
                Ok(None)
            }
            AppEvent::CancelLogo => {
                self.upload.cancel()?;
                Ok(None)
            }
            AppEvent::ConfirmUpload => {
                let ticket = self.upload.begin()?;
                Ok(Some(Command::StartUpload(ticket)))
            }
            AppEvent::UploadFinished { ticket, result } => {
                self.upload.complete(&ticket, result);
                Ok(None)
            }
            AppEvent::OpenExternal => {
                let embed = self.embed.as_ref().ok_or(ActionError::NoDashboard)?;
                Ok(Some(Command::OpenExternal(embed.external_url().to_string())))
            }
        }
    }

    /// Drain policy reports buffered on the mounted dashboard's subscription
    pub fn poll_policy(&mut self) -> bool {
        self.embed.as_mut().map(|e| e.poll_policy()).unwrap_or(false)
    }

    /// Wait for the next policy report for the mounted dashboard
    ///
    /// Pending forever while nothing is mounted.
    pub async fn next_violation(&mut self) -> Option<PolicyViolation> {
        match self.embed.as_mut() {
            Some(embed) => embed.next_violation().await,
            None => std::future::pending().await,
        }
    }

    fn finish_load(&mut self, result: LoadResult<Vec<Company>>) {
        if !self.loader.state().loading {
            tracing::debug!("Ignoring load result outside of a load");
            return;
        }
        self.loader.finish(result);

        let items = SidebarItem::project(&self.loader.state().companies);
        self.sidebar.apply(SidebarEvent::SetItems(items), self.viewport);
        self.sidebar.apply(SidebarEvent::SetLoading(false), self.viewport);
    }

    fn select(&mut self, company: Company) {
        if self.selection.as_ref() == Some(&company) {
            return;
        }

        tracing::info!(company_id = %company.id, company = %company.name, "Company selected");

        let title = format!("{} - {}", self.settings.frame_title, company.name);
        match self.embed.as_mut() {
            Some(embed) => embed.change_link(
                &company.dashboard_link,
                &title,
                &self.settings.rule,
                &self.settings.provider_domains,
                &self.bus,
            ),
            None => {
                self.embed = Some(DashboardEmbed::mount(
                    &company.dashboard_link,
                    &title,
                    &self.settings.rule,
                    &self.settings.provider_domains,
                    &self.bus,
                ))
            }
        }

        self.upload.reset_for(Some(&company.id));
        self.sidebar.mark_selected(Some(&company.id));
        self.selection = Some(company);
    }

    /// Release the dashboard's policy subscription
    pub fn shutdown(&mut self) {
        if let Some(embed) = self.embed.take() {
            embed.unmount(&self.bus);
        }
    }

    pub fn render(&self) -> AppView {
        let state = self.loader.state();
        let banner = state
            .error
            .as_ref()
            .map(|e| format!("Failed to load companies: {}", e));

        let main = match (&self.selection, &self.embed) {
            (Some(company), Some(embed)) => MainView::Dashboard {
                company: company.clone(),
                embed: embed.render(&self.settings.external_link_label),
                upload: self.upload.render(),
            },
            _ if banner.is_some() => MainView::Blank,
            _ if state.loading || !self.loader.started() => MainView::Message(MainView::LOADING),
            _ if state.companies.is_empty() => MainView::Message(MainView::NO_COMPANIES),
            _ => MainView::Message(MainView::PROMPT),
        };

        AppView {
            sidebar_open: self.sidebar_open,
            banner,
            sidebar: self.sidebar.render(),
            main,
        }
    }
}
