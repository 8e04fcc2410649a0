use serde::Deserialize;

/// Runtime configuration, loaded exclusively from the environment.
///
/// Provider credentials are never read from source or from request payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Per-call HTTP timeout for every outbound provider request, in seconds.
    pub http_timeout_secs: u64,
    pub search_base_url: String,
    pub search_api_key: String,
    pub enrich_base_url: String,
    pub enrich_api_key: String,
    pub generator_base_url: String,
    pub generator_api_key: String,
    pub generator_model: String,
    pub web_search_base_url: Option<String>,
    pub web_search_api_key: Option<String>,
    pub mailer_base_url: Option<String>,
    pub mailer_api_key: Option<String>,
    pub mailer_user_id: String,
    /// Whether completed enrichment runs also send outreach emails.
    pub outreach_enabled: bool,
}

fn required_env(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    Ok(value)
}

fn required_url(name: &str) -> anyhow::Result<String> {
    let value = required_env(name)?;
    url::Url::parse(&value).map_err(|_| anyhow::anyhow!("{} must be a valid URL", name))?;
    if !value.starts_with("http://") && !value.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a positive number"))?,
            search_base_url: required_url("PROSPECT_SEARCH_BASE_URL")?,
            search_api_key: required_env("PROSPECT_SEARCH_API_KEY")?,
            enrich_base_url: required_url("PROFILE_ENRICH_BASE_URL")?,
            enrich_api_key: required_env("PROFILE_ENRICH_API_KEY")?,
            generator_base_url: optional_env("GENERATOR_BASE_URL")
                .unwrap_or_else(|| "https://api.anthropic.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            generator_api_key: required_env("GENERATOR_API_KEY")?,
            generator_model: optional_env("GENERATOR_MODEL")
                .unwrap_or_else(|| "claude-3-sonnet-20240229".to_string()),
            web_search_base_url: optional_env("WEB_SEARCH_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
            web_search_api_key: optional_env("WEB_SEARCH_API_KEY"),
            mailer_base_url: optional_env("MAILER_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
            mailer_api_key: optional_env("MAILER_API_KEY"),
            mailer_user_id: optional_env("MAILER_USER_ID").unwrap_or_else(|| "me".to_string()),
            outreach_enabled: std::env::var("OUTREACH_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("People search base URL: {}", config.search_base_url);
        tracing::debug!("Profile enrichment base URL: {}", config.enrich_base_url);
        tracing::debug!("Generator base URL: {}", config.generator_base_url);
        if config.web_search_base_url.is_some() {
            tracing::info!("Companion web search configured");
        }
        if config.mailer_base_url.is_some() {
            tracing::info!(
                "Mailer configured, outreach_enabled: {}",
                config.outreach_enabled
            );
        }
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}
