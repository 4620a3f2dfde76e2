use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use story_to_tests_lib::config::{
    default_config_path, load_config_file, ConfigMerger, PartialJiraSettings, PartialLlmSettings,
    PartialServerSettings, PartialSettings,
};
use story_to_tests_lib::server::{self, ServerAppState};
use story_to_tests_lib::shutdown::{register_signal_handlers, ShutdownState};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Story To Tests - generate QA test cases from user stories
#[derive(Parser, Debug)]
#[command(name = "story-to-tests")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Allowed CORS origins, comma-separated (default: any origin)
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// TOML config file (default: ~/.story-to-tests/config.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "groq_API_BASE")]
    llm_base_url: Option<String>,

    /// LLM API key
    #[arg(long, env = "groq_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// LLM model name
    #[arg(long, env = "groq_MODEL")]
    llm_model: Option<String>,

    /// Jira Cloud site URL, e.g. https://acme.atlassian.net
    #[arg(long, env = "JIRA_BASE_URL")]
    jira_base_url: Option<String>,

    /// Jira account email
    #[arg(long, env = "JIRA_USER_EMAIL")]
    jira_user_email: Option<String>,

    /// Jira API token
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    jira_api_token: Option<String>,
}

impl Cli {
    fn overrides(&self) -> PartialSettings {
        let cors_origins: Vec<String> = self
            .cors_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        PartialSettings {
            server: Some(PartialServerSettings {
                port: self.port,
                bind: self.bind.clone(),
                cors_origins: Some(cors_origins),
            }),
            llm: Some(PartialLlmSettings {
                base_url: self.llm_base_url.clone(),
                api_key: self.llm_api_key.clone(),
                model: self.llm_model.clone(),
            }),
            jira: Some(PartialJiraSettings {
                base_url: self.jira_base_url.clone(),
                user_email: self.jira_user_email.clone(),
                api_token: self.jira_api_token.clone(),
            }),
        }
    }

    /// An explicit --config must load; the default location is optional
    fn file_settings(&self) -> anyhow::Result<Option<PartialSettings>> {
        if let Some(path) = &self.config {
            let partial = load_config_file(path)?;
            log::info!("Loaded config from {}", path.display());
            return Ok(Some(partial));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let partial = load_config_file(&path)?;
                log::info!("Loaded config from {}", path.display());
                Ok(Some(partial))
            }
            _ => Ok(None),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = ConfigMerger::new()
        .with_file(cli.file_settings()?)
        .with_cli(Some(cli.overrides()))
        .merge();
    log::debug!("Resolved settings: {:?}", settings);

    let http = reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    rt.block_on(async {
        let shutdown_state = ShutdownState::new();
        if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        let state = ServerAppState::from_settings(&settings, http, shutdown_state);

        server::run_server(&settings.server, state)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    })
}
