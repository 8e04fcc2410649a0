/// Contact enrichment: the core of the prospect pipeline.
///
/// Every contact that enters this module leaves it again. Enrichment only
/// ever adds fields; a provider failure of any kind hands the contact back
/// with its identity fields untouched and its enrichment fields unset.
use crate::models::{Contact, MatchQuery, PersonPayload};
use crate::services::{ProfileEnrichService, WebSearchService};
use std::time::Duration;
use tokio::time::sleep;

/// Pause after every companion web-search call, failed ones included.
pub const WEB_SEARCH_COOLDOWN: Duration = Duration::from_secs(1);

/// Guesses a company web domain from its display name.
///
/// First whitespace token, lower-cased, commas and periods stripped, `.com`
/// appended. A name that yields no usable token produces no domain at all
/// rather than an empty or malformed one.
pub fn guess_domain(organization_name: &str) -> Option<String> {
    let lowered = organization_name.to_lowercase();
    let first_token = lowered.split_whitespace().next()?;
    let token: String = first_token
        .chars()
        .filter(|c| *c != ',' && *c != '.')
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(format!("{}.com", token))
    }
}

/// Builds the profile match query for one contact: space-joined full name,
/// the organization name when known, and a guessed domain when derivable.
pub fn match_query_for(contact: &Contact) -> MatchQuery {
    let organization = contact.organization_name.trim();
    MatchQuery {
        name: contact.full_name(),
        domain: guess_domain(&contact.organization_name),
        organization_name: if organization.is_empty() {
            None
        } else {
            Some(organization.to_string())
        },
    }
}

/// Overlays provider-reported fields onto a copy of the contact.
///
/// Absent provider values never clear a field that is already present.
/// Organization metadata is attached only when the payload carries a nested
/// organization object.
pub fn overlay_person(contact: &Contact, person: &PersonPayload) -> Contact {
    let mut merged = contact.clone();

    if let Some(ref email) = person.email {
        merged.email = Some(email.clone());
    }
    if let Some(ref phone) = person.phone {
        merged.phone = Some(phone.clone());
    }
    if let Some(ref title) = person.title {
        merged.title = Some(title.clone());
    }
    if let Some(ref seniority) = person.seniority {
        merged.seniority = Some(seniority.clone());
    }
    if let Some(ref personal_emails) = person.personal_emails {
        merged.personal_emails = Some(personal_emails.clone());
    }
    if let Some(ref city) = person.city {
        merged.city = Some(city.clone());
    }
    if let Some(ref state) = person.state {
        merged.state = Some(state.clone());
    }
    if let Some(ref country) = person.country {
        merged.country = Some(country.clone());
    }

    if let Some(ref organization) = person.organization {
        if let Some(ref size) = organization.size {
            merged.company_size = Some(size.clone());
        }
        if let Some(ref industry) = organization.industry {
            merged.company_industry = Some(industry.clone());
        }
        if let Some(ref website_url) = organization.website_url {
            merged.company_website = Some(website_url.clone());
        }
    }

    merged
}

/// Enriches one contact.
///
/// Profile match first, then the work-email lookup (a direct work address
/// wins over whatever the match reported), then the companion web search
/// with its courtesy pause.
pub async fn enrich_contact(
    contact: &Contact,
    enrich: &ProfileEnrichService,
    web_search: Option<&WebSearchService>,
) -> Contact {
    let query = match_query_for(contact);
    tracing::info!("Enriching contact: {}", query.name);

    let matched = enrich.match_person(&query).await;
    let mut enriched = match matched.person {
        Some(ref person) => overlay_person(contact, person),
        None => contact.clone(),
    };

    if let Some(linkedin_url) = enriched.linkedin_url.clone() {
        if let Some(work_email) = enrich.work_email(&linkedin_url).await {
            enriched.email = Some(work_email);
        }
    }

    if let Some(web) = web_search {
        let organization = contact.organization_name.trim();
        if !organization.is_empty() {
            let snippets = web.search(organization).await;
            tracing::info!(
                "Attached {} web snippet(s) for {}",
                snippets.len(),
                query.name
            );
            enriched.search_snippets = Some(snippets);
            sleep(WEB_SEARCH_COOLDOWN).await;
        }
    }

    enriched
}

/// Enriches a whole contact list, one contact at a time, in input order.
///
/// The output always has exactly one entry per input contact, whatever mix
/// of provider successes and failures occurred along the way.
pub async fn enrich_contacts(
    contacts: &[Contact],
    enrich: &ProfileEnrichService,
    web_search: Option<&WebSearchService>,
) -> Vec<Contact> {
    let mut enriched = Vec::with_capacity(contacts.len());
    for contact in contacts {
        enriched.push(enrich_contact(contact, enrich, web_search).await);
    }
    enriched
}
