use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Contact, MatchQuery, MatchResponse, SearchParameters};
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

/// Maximum attempts for one enrichment lookup.
pub const MAX_LOOKUP_ATTEMPTS: u32 = 3;

/// Wait between attempts after a non-rate-limit failure.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Backoff before retrying a rate-limited (429) lookup: exponential in the
/// attempt number, capped at 8 seconds.
pub fn rate_limit_backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt).min(8))
}

fn build_client(timeout_secs: u64) -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))
}

// ============ People Search ============

pub struct ProspectSearchService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ProspectSearchService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(config.http_timeout_secs)?,
            base_url: config.search_base_url.clone(),
            api_key: config.search_api_key.clone(),
        })
    }

    /// Runs one people search.
    ///
    /// The search is never retried: a failed call or a response without a
    /// people collection is logged and comes back as zero results, which the
    /// caller treats as a normal outcome.
    pub async fn search(&self, params: &SearchParameters) -> Vec<Contact> {
        let url = format!("{}/people/search", self.base_url);
        tracing::info!("Searching people with params: {:?}", params);

        let response = match self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Cache-Control", "no-cache")
            .json(params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("People search request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("People search returned status {}: {}", status, error_text);
            return Vec::new();
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to parse people search response: {}", e);
                return Vec::new();
            }
        };

        let contacts = contacts_from_search_body(&body);
        tracing::info!("People search returned {} contact(s)", contacts.len());
        contacts
    }
}

/// Pulls identity fields out of a loosely typed search response.
///
/// The people collection may arrive under `people` or `results`; a missing
/// collection is an empty result, not an error. Only identity fields and the
/// profile URL are populated here.
pub fn contacts_from_search_body(body: &Value) -> Vec<Contact> {
    let people = match body
        .get("people")
        .or_else(|| body.get("results"))
        .and_then(|v| v.as_array())
    {
        Some(list) => list,
        None => {
            tracing::warn!("People search response had no people/results collection");
            return Vec::new();
        }
    };

    people
        .iter()
        .map(|person| Contact {
            first_name: str_field(person, "first_name"),
            last_name: str_field(person, "last_name"),
            organization_name: str_field(person, "organization_name"),
            linkedin_url: person
                .get("linkedin_url")
                .or_else(|| person.get("linkedin_profile_url"))
                .and_then(|v| v.as_str())
                .map(String::from),
            ..Contact::default()
        })
        .collect()
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

// ============ Profile Enrichment ============

pub struct ProfileEnrichService {
    client: Client,
    base_url: String,
    api_key: String,
    /// Match responses cached to spare repeat lookups of the same person.
    match_cache: Cache<String, MatchResponse>,
}

impl ProfileEnrichService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(config.http_timeout_secs)?,
            base_url: config.enrich_base_url.clone(),
            api_key: config.enrich_api_key.clone(),
            match_cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10_000)
                .build(),
        })
    }

    /// Looks up a fuller profile for one person.
    ///
    /// Retries up to `MAX_LOOKUP_ATTEMPTS` times: exponential backoff on 429,
    /// a flat pause on any other failure. Exhausted attempts degrade to a
    /// no-match response so the contact survives with its fields unset.
    pub async fn match_person(&self, query: &MatchQuery) -> MatchResponse {
        let cache_key = format!(
            "{}|{}",
            query.name,
            query.organization_name.as_deref().unwrap_or("")
        );
        if let Some(cached) = self.match_cache.get(&cache_key).await {
            tracing::debug!("Profile match served from cache: {}", query.name);
            return cached;
        }

        let url = match reqwest::Url::parse_with_params(
            &format!("{}/people/match", self.base_url),
            &[("reveal_personal_emails", "true")],
        ) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to build profile match URL: {}", e);
                return MatchResponse::default();
            }
        };

        tracing::info!("Matching profile for: {}", query.name);

        for attempt in 0..MAX_LOOKUP_ATTEMPTS {
            match self
                .client
                .post(url.clone())
                .header("x-api-key", &self.api_key)
                .json(query)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    match response.json::<MatchResponse>().await {
                        Ok(matched) => {
                            self.match_cache.insert(cache_key, matched.clone()).await;
                            return matched;
                        }
                        Err(e) => {
                            // A malformed body will not improve on retry.
                            tracing::warn!("Failed to parse profile match response: {}", e);
                            return MatchResponse::default();
                        }
                    }
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let wait = rate_limit_backoff(attempt);
                    tracing::warn!(
                        "Profile match rate limited, waiting {:?} before retry",
                        wait
                    );
                    if attempt + 1 < MAX_LOOKUP_ATTEMPTS {
                        sleep(wait).await;
                    }
                }
                Ok(response) => {
                    let status = response.status();
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    tracing::warn!("Profile match returned status {}: {}", status, error_text);
                    if attempt + 1 < MAX_LOOKUP_ATTEMPTS {
                        sleep(RETRY_PAUSE).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("Profile match request failed: {}", e);
                    if attempt + 1 < MAX_LOOKUP_ATTEMPTS {
                        sleep(RETRY_PAUSE).await;
                    }
                }
            }
        }

        tracing::warn!("Profile match attempts exhausted for {}", query.name);
        MatchResponse::default()
    }

    /// Secondary lookup for a direct work email address.
    ///
    /// Shares the retry policy of `match_person`; exhaustion yields `None`.
    pub async fn work_email(&self, linkedin_profile_url: &str) -> Option<String> {
        let url = match reqwest::Url::parse_with_params(
            &format!("{}/profile/email", self.base_url),
            &[("linkedin_profile_url", linkedin_profile_url)],
        ) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to build work email URL: {}", e);
                return None;
            }
        };

        for attempt in 0..MAX_LOOKUP_ATTEMPTS {
            match self
                .client
                .get(url.clone())
                .header("x-api-key", &self.api_key)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    return match response.json::<Value>().await {
                        Ok(body) => body
                            .get("email")
                            .and_then(|v| v.as_str())
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                        Err(e) => {
                            tracing::warn!("Failed to parse work email response: {}", e);
                            None
                        }
                    };
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let wait = rate_limit_backoff(attempt);
                    tracing::warn!("Work email lookup rate limited, waiting {:?}", wait);
                    if attempt + 1 < MAX_LOOKUP_ATTEMPTS {
                        sleep(wait).await;
                    }
                }
                Ok(response) => {
                    tracing::warn!(
                        "Work email lookup returned status {}",
                        response.status()
                    );
                    if attempt + 1 < MAX_LOOKUP_ATTEMPTS {
                        sleep(RETRY_PAUSE).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("Work email lookup failed: {}", e);
                    if attempt + 1 < MAX_LOOKUP_ATTEMPTS {
                        sleep(RETRY_PAUSE).await;
                    }
                }
            }
        }

        tracing::warn!(
            "Work email lookup attempts exhausted for {}",
            linkedin_profile_url
        );
        None
    }
}

// ============ Companion Web Search ============

pub struct WebSearchService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WebSearchService {
    /// Built only when both the endpoint and the key are configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let (base_url, api_key) =
            match (&config.web_search_base_url, &config.web_search_api_key) {
                (Some(url), Some(key)) => (url.clone(), key.clone()),
                _ => return Ok(None),
            };

        Ok(Some(Self {
            client: build_client(config.http_timeout_secs)?,
            base_url,
            api_key,
        }))
    }

    /// One web search, no retries.
    ///
    /// Snippet results stay opaque; a failed call comes back as an empty
    /// list so enrichment keeps going.
    pub async fn search(&self, query: &str) -> Vec<Value> {
        let url = match reqwest::Url::parse_with_params(
            &format!("{}/res/v1/web/search", self.base_url),
            &[("q", query), ("count", "3")],
        ) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to build web search URL: {}", e);
                return Vec::new();
            }
        };

        let response = match self
            .client
            .get(url)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Web search request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Web search returned status {}", response.status());
            return Vec::new();
        }

        match response.json::<Value>().await {
            Ok(body) => body
                .get("web")
                .and_then(|w| w.get("results"))
                .and_then(|r| r.as_array())
                .cloned()
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to parse web search response: {}", e);
                Vec::new()
            }
        }
    }
}

// ============ Outreach Mailer ============

pub struct MailerService {
    client: Client,
    base_url: String,
    api_key: String,
    user_id: String,
}

impl MailerService {
    /// Built only when both the endpoint and the key are configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let (base_url, api_key) = match (&config.mailer_base_url, &config.mailer_api_key) {
            (Some(url), Some(key)) => (url.clone(), key.clone()),
            _ => return Ok(None),
        };

        Ok(Some(Self {
            client: build_client(config.http_timeout_secs)?,
            base_url,
            api_key,
            user_id: config.mailer_user_id.clone(),
        }))
    }

    /// Sends one outreach email and returns the provider's delivery status.
    pub async fn send_email(
        &self,
        recipient_email: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> Result<String, AppError> {
        let url = format!("{}/messages/send", self.base_url);

        let payload = json!({
            "user_id": self.user_id,
            "recipient_email": recipient_email,
            "subject": subject,
            "body": body,
            "is_html": is_html,
        });

        tracing::info!("Sending outreach email to {}", recipient_email);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Email send failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Mailer returned status {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse mailer response: {}", e))
        })?;

        let status = body
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("sent")
            .to_string();
        tracing::info!("✓ Email to {} accepted: {}", recipient_email, status);
        Ok(status)
    }
}
