use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Search Parameters ============

/// Country filter applied when parameter derivation produced none.
pub const DEFAULT_COUNTRY: &str = "US";

/// Page size used when parameter derivation produced none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameters accepted by the people-search provider.
///
/// When a field carries several alternatives they form a single
/// `"A OR B"` string, never a collection and never a comma-joined list.
/// `person_titles` is the one genuinely list-valued field. Absent fields are
/// omitted from the serialized request entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_role_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industries: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_titles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl SearchParameters {
    /// Fills the declared defaults for fields derivation left empty.
    pub fn with_defaults(mut self) -> Self {
        self.country
            .get_or_insert_with(|| DEFAULT_COUNTRY.to_string());
        self.per_page.get_or_insert(DEFAULT_PAGE_SIZE);
        self
    }
}

// ============ Contacts ============

/// One prospect record.
///
/// Identity fields (`first_name`, `last_name`, `organization_name`) are set
/// by the search stage and never modified afterwards; everything else is
/// optional enrichment that may stay absent. A contact is never removed from
/// a result list: failed enrichment hands the record back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub organization_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_emails: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    /// Raw companion web-search snippets, attached for human review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_snippets: Option<Vec<Value>>,
}

impl Contact {
    /// Space-joined display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// ============ Profile Enrichment Provider ============

/// Request payload for the profile match endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

/// Profile provider response: a matched person payload, or no match.
///
/// Owned transiently while one contact is processed, never retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchResponse {
    pub person: Option<PersonPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonPayload {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub seniority: Option<String>,
    pub personal_emails: Option<Vec<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub organization: Option<OrganizationPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationPayload {
    pub size: Option<String>,
    pub industry: Option<String>,
    pub website_url: Option<String>,
}

// ============ Extraction ============

/// Result of recovering a contact list from unstructured text: either a
/// parsed ordered sequence, or a labeled failure keeping the original text
/// for diagnostic display.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Parsed(Vec<Contact>),
    Failed { raw: String },
}

impl ExtractionOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ExtractionOutcome::Parsed(_))
    }
}

// ============ Job Lifecycle ============

/// Lifecycle states of a job. There is no payment integration; the initial
/// state exists to satisfy the external job-lifecycle convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "awaiting payment")]
    AwaitingPayment,
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "completed")]
    Completed,
}

/// One submitted job. Job state lives in process memory only and does not
/// survive a restart.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: String,
    pub payment_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub input_data: String,
    pub result: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct StartJobRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ProvideInputRequest {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub job_id: String,
}
