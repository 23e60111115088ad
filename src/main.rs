//! Clientboard CLI
//!
//! Terminal front-end for the client dashboard directory:
//! - List and search companies
//! - Show a company's dashboard embed
//! - Upload a company logo
//! - Drive an interactive session

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use clientboard::app::{ActionError, App, AppController, AppEvent, AppSettings, MainView};
use clientboard::config::{generate_default_config, Config};
use clientboard::directory::{CompanySource, HttpCompanySource};
use clientboard::embed::{FrameEvent, PolicyBus, PolicyViolation};
use clientboard::logging::init_logging;
use clientboard::sidebar::{SidebarEvent, SortDirection, SortKey};
use clientboard::upload::{HttpLogoUploader, LogoFile, LogoUploader, UploadState};

#[derive(Parser)]
#[command(name = "clientboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse client companies and their embedded dashboards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Company list endpoint (overrides config)
    #[arg(long, global = true)]
    pub companies_url: Option<String>,

    /// Logo upload endpoint (overrides config)
    #[arg(long, global = true)]
    pub upload_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List companies
    List {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,
        /// Sort key (name, id)
        #[arg(long, default_value = "name")]
        sort: SortKey,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show a company's dashboard embed
    Show {
        /// Company id
        id: String,
    },

    /// Upload a logo for a company
    Upload {
        /// Company id
        id: String,
        /// Image file
        path: PathBuf,
    },

    /// Run an interactive session on stdin
    Interactive,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing config to {:?}", path))?;
                println!("Wrote default config to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging(&config.logging)?;
    tracing::debug!("Clientboard v{}", env!("CARGO_PKG_VERSION"));

    let mut app = build_app(&config)?;

    match cli.command {
        Commands::List { search, sort, desc } => {
            app.start();
            wait_for_load(&mut app).await;
            fail_on_banner(&app)?;

            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            for event in [
                SidebarEvent::Search(search),
                SidebarEvent::SortBy(sort),
                SidebarEvent::SetDirection(direction),
            ] {
                app.dispatch(AppEvent::Sidebar(event))?;
            }

            let sidebar = app.controller().sidebar();
            let visible = sidebar.visible();
            match cli.format.as_str() {
                "json" => {
                    let companies: Vec<_> = visible.iter().map(|i| &i.source_company).collect();
                    println!("{}", serde_json::to_string_pretty(&companies)?);
                }
                _ => {
                    if visible.is_empty() {
                        println!("No companies found");
                    } else {
                        println!("{:<10} {}", "ID", "Name");
                        println!("{}", "-".repeat(40));
                        for item in &visible {
                            println!("{:<10} {}", item.id, item.name);
                        }
                    }
                    println!();
                    println!("{}", sidebar.render().footer);
                }
            }
        }

        Commands::Show { id } => {
            app.start();
            wait_for_load(&mut app).await;
            fail_on_banner(&app)?;
            app.dispatch(AppEvent::SelectCompany(id))?;

            match (cli.format.as_str(), app.render().main) {
                ("json", MainView::Dashboard { embed, .. }) => {
                    println!("{}", serde_json::to_string_pretty(&embed)?);
                }
                (_, main) => {
                    if let MainView::Dashboard { company, embed, .. } = main {
                        println!("{} ({})", company.name, company.id);
                        println!("Link:  {}", company.dashboard_link);
                        println!("{}", embed);
                    }
                }
            }
        }

        Commands::Upload { id, path } => {
            app.start();
            wait_for_load(&mut app).await;
            fail_on_banner(&app)?;

            let file = LogoFile::from_path(&path).await?;
            app.dispatch(AppEvent::SelectCompany(id))?;
            app.dispatch(AppEvent::PickLogo(file))?;
            app.dispatch(AppEvent::ConfirmUpload)?;

            while app.controller().upload().state().is_uploading() {
                if let Some(Err(e)) = app.step().await {
                    tracing::warn!(error = %e, "Action refused");
                }
            }

            let outcome = upload_outcome(app.controller().upload().state());
            app.shutdown();
            outcome?;
            println!("Uploaded {:?}", path);
            return Ok(());
        }

        Commands::Interactive => interactive(&mut app).await?,

        Commands::Config { .. } => unreachable!("handled before config load"),
    }

    app.shutdown();
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.companies_url {
        config.endpoints.companies_url = Some(url.clone());
    }
    if let Some(url) = &cli.upload_url {
        config.endpoints.upload_url = Some(url.clone());
    }
    Ok(config)
}

fn build_app(config: &Config) -> anyhow::Result<App> {
    let endpoints = config.validate()?;
    let timeout = Duration::from_secs(endpoints.request_timeout_secs);

    let source: Arc<dyn CompanySource> =
        Arc::new(HttpCompanySource::new(endpoints.companies_url, timeout)?);
    let uploader: Arc<dyn LogoUploader> =
        Arc::new(HttpLogoUploader::new(endpoints.upload_url, timeout)?);

    let settings = AppSettings::from_config(config)?;
    let controller = AppController::new(settings, source, PolicyBus::default());
    Ok(App::new(controller, uploader))
}

async fn wait_for_load(app: &mut App) {
    while app.controller().loader().state().loading {
        if app.step().await.is_none() {
            break;
        }
    }
}

/// Final upload state as a command result
fn upload_outcome(state: &UploadState) -> anyhow::Result<()> {
    match state {
        UploadState::Success => Ok(()),
        UploadState::Error(message) => anyhow::bail!(message.clone()),
        other => anyhow::bail!("Upload ended in state {}", other.name()),
    }
}

fn fail_on_banner(app: &App) -> anyhow::Result<()> {
    match app.render().banner {
        Some(banner) => anyhow::bail!(banner),
        None => Ok(()),
    }
}

/// One line of interactive input
enum Input {
    Event(AppEvent),
    Pick(PathBuf),
    Violation(String),
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  search <term>        filter companies by name
  sort <name|id>       choose sort key
  toggle-sort          flip sort direction
  select <id>          select a company
  sidebar              toggle the sidebar
  resize <px>          set viewport width
  loaded               report the dashboard frame loaded
  frame-error <why>    report the dashboard frame failed
  violation <uri>      report a security policy violation
  open                 open the dashboard externally
  pick <path>          pick a logo file
  cancel               discard the picked logo
  confirm              upload the picked logo
  show                 redraw
  quit";

fn parse_input(line: &str, app: &App) -> Result<Input, String> {
    let line = line.trim();
    let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();
    let mount_id = || {
        app.controller()
            .embed()
            .map(|e| e.mount_id())
            .ok_or_else(|| "no dashboard is shown".to_string())
    };

    let input = match command {
        "" | "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "search" => Input::Event(AppEvent::Sidebar(SidebarEvent::Search(arg.to_string()))),
        "sort" => Input::Event(AppEvent::Sidebar(SidebarEvent::SortBy(arg.parse()?))),
        "toggle-sort" => Input::Event(AppEvent::Sidebar(SidebarEvent::ToggleDirection)),
        "select" => Input::Event(AppEvent::Sidebar(SidebarEvent::Select(arg.to_string()))),
        "sidebar" => Input::Event(AppEvent::ToggleSidebar),
        "resize" => Input::Event(AppEvent::Resize {
            width_px: arg.parse().map_err(|_| format!("invalid width '{}'", arg))?,
        }),
        "loaded" => Input::Event(AppEvent::Frame {
            mount_id: mount_id()?,
            event: FrameEvent::Loaded,
        }),
        "frame-error" => Input::Event(AppEvent::Frame {
            mount_id: mount_id()?,
            event: FrameEvent::Failed(arg.to_string()),
        }),
        "violation" => Input::Violation(arg.to_string()),
        "open" => Input::Event(AppEvent::OpenExternal),
        "pick" => Input::Pick(PathBuf::from(arg)),
        "cancel" => Input::Event(AppEvent::CancelLogo),
        "confirm" => Input::Event(AppEvent::ConfirmUpload),
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(input)
}

fn report(outcome: Result<Option<String>, ActionError>) {
    match outcome {
        Ok(Some(url)) => println!("-> open in new window: {}", url),
        Ok(None) => {}
        Err(e) => println!("! {}", e),
    }
}

async fn pick(app: &mut App, path: &Path) {
    match LogoFile::from_path(path).await {
        Ok(file) => report(app.dispatch(AppEvent::PickLogo(file))),
        Err(e) => println!("! {}", e),
    }
}

async fn interactive(app: &mut App) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    app.start();
    println!("{}", HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line, app) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{}", HELP),
                    Ok(Input::Show) => {}
                    Ok(Input::Event(event)) => report(app.dispatch(event)),
                    Ok(Input::Pick(path)) => pick(app, &path).await,
                    Ok(Input::Violation(uri)) => {
                        app.controller().bus().publish(PolicyViolation::new(uri, "frame-src"));
                        continue;
                    }
                    Err(e) => {
                        println!("! {}", e);
                        continue;
                    }
                }
                println!("\n{}\n", app.render());
            }
            outcome = app.step() => {
                if let Some(outcome) = outcome {
                    report(outcome);
                    println!("\n{}\n", app.render());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_outcome() {
        assert!(upload_outcome(&UploadState::Success).is_ok());

        let err = upload_outcome(&UploadState::Error(
            "Upload rejected with HTTP 413: file too large".into(),
        ))
        .unwrap_err();
        assert_eq!(err.to_string(), "Upload rejected with HTTP 413: file too large");

        let err = upload_outcome(&UploadState::Idle).unwrap_err();
        assert!(err.to_string().contains("idle"));
    }

    #[test]
    fn test_parse_sort_command() {
        let cli = Cli::try_parse_from(["clientboard", "list", "--sort", "id", "--desc"]).unwrap();
        match cli.command {
            Commands::List { sort, desc, .. } => {
                assert_eq!(sort, SortKey::Id);
                assert!(desc);
            }
            _ => panic!("expected list"),
        }
    }
}
