/// End-to-end prospect workflow.
///
/// The workflow never aborts: every failure mode along the way degrades to
/// fewer populated fields or an empty collection, and the report says which.
use crate::enrichment;
use crate::extraction;
use crate::generate::TextGenerator;
use crate::models::{Contact, ExtractionOutcome};
use crate::query_builder;
use crate::services::{
    MailerService, ProfileEnrichService, ProspectSearchService, WebSearchService,
};
use serde_json::{json, Value};

/// Instructions handed to the generator when the provider search came back
/// empty and the model is asked to compile a prospect list itself.
const PROSPECT_LIST_HINT: &str = "\
You source professional contacts for outreach.
Reply with a JSON array of people matching the request, each object shaped as
{\"first_name\": \"...\", \"last_name\": \"...\", \"organization_name\": \"...\", \"linkedin_url\": \"...\"}.
Only return the JSON array, no explanation.";

/// Asks the generator itself for a prospect list and recovers the JSON array
/// from its reply, which may wrap the array in commentary.
pub async fn discover_contacts(
    generator: &dyn TextGenerator,
    goal: &str,
) -> ExtractionOutcome {
    let reply = match generator.generate(goal, Some(PROSPECT_LIST_HINT)).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Prospect list generation failed: {}", e);
            return ExtractionOutcome::Failed { raw: String::new() };
        }
    };

    extraction::extract_contacts(&reply)
}

/// Runs the full workflow for one goal text.
///
/// 1. Derive search parameters (never fails, defaults fill the gaps).
/// 2. Search the provider; on zero results, fall back to a model-compiled
///    list recovered via extraction.
/// 3. Enrich every contact in order.
/// 4. Send outreach emails when a mailer is wired in.
pub async fn run_prospect_workflow(
    generator: &dyn TextGenerator,
    search: &ProspectSearchService,
    enrich: &ProfileEnrichService,
    web_search: Option<&WebSearchService>,
    mailer: Option<&MailerService>,
    goal: &str,
) -> Value {
    tracing::info!("Step 1: Deriving search parameters");
    let params = query_builder::build_search_params(generator, goal)
        .await
        .with_defaults();

    tracing::info!("Step 2: Searching for contacts");
    let mut contacts = search.search(&params).await;

    if contacts.is_empty() {
        tracing::warn!("Provider search found nothing, asking the generator for a list");
        match discover_contacts(generator, goal).await {
            ExtractionOutcome::Parsed(list) => contacts = list,
            ExtractionOutcome::Failed { raw } => {
                tracing::warn!("Prospect list extraction failed");
                return json!({
                    "status": "no_contacts",
                    "contacts": [],
                    "raw_output": raw,
                });
            }
        }
    }

    if contacts.is_empty() {
        tracing::info!("No contacts found, stopping");
        return json!({
            "status": "no_contacts",
            "contacts": [],
        });
    }

    tracing::info!("Step 3: Enriching {} contact(s)", contacts.len());
    let enriched = enrichment::enrich_contacts(&contacts, enrich, web_search).await;

    let mut report = json!({
        "status": "ok",
        "contacts": enriched,
    });

    if let Some(mailer) = mailer {
        tracing::info!("Step 4: Sending outreach emails");
        report["outreach"] = json!(send_outreach(mailer, &enriched).await);
    }

    report
}

/// Sends one templated email per enriched contact that has an address.
///
/// A failed send is recorded in the status list and the loop keeps going.
pub async fn send_outreach(mailer: &MailerService, contacts: &[Contact]) -> Vec<Value> {
    let mut statuses = Vec::with_capacity(contacts.len());

    for contact in contacts {
        let recipient = match contact.email.as_deref() {
            Some(email) if !email.is_empty() => email,
            _ => {
                statuses.push(json!({
                    "recipient": contact.full_name(),
                    "status": "skipped",
                    "reason": "no email address",
                }));
                continue;
            }
        };

        let subject = outreach_subject(contact);
        let body = outreach_body(contact);

        match mailer.send_email(recipient, &subject, &body, true).await {
            Ok(status) => statuses.push(json!({
                "recipient": recipient,
                "status": status,
            })),
            Err(e) => {
                tracing::warn!("Outreach email to {} failed: {}", recipient, e);
                statuses.push(json!({
                    "recipient": recipient,
                    "status": "failed",
                    "error": e.to_string(),
                }));
            }
        }
    }

    statuses
}

fn outreach_subject(contact: &Contact) -> String {
    if contact.organization_name.trim().is_empty() {
        format!("Quick introduction, {}", contact.first_name)
    } else {
        format!("Quick introduction to {}", contact.organization_name)
    }
}

fn outreach_body(contact: &Contact) -> String {
    let role = contact
        .title
        .as_deref()
        .map(|t| format!(" as {}", t))
        .unwrap_or_default();

    format!(
        "<p>Hi {},</p>\
         <p>I came across your work{} at {} and wanted to reach out. \
         We are building tooling for early-stage investors and I would value \
         fifteen minutes of your perspective.</p>\
         <p>Would a short call next week work for you?</p>",
        contact.first_name, role, contact.organization_name
    )
}
