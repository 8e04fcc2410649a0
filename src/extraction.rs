use crate::models::{Contact, ExtractionOutcome};
use regex::Regex;

/// Recovers a contact list from text that should contain a JSON array but
/// may be wrapped in commentary.
///
/// Strict parse of the whole text first; on failure, the greedy
/// bracket-to-bracket span `[ ... { ... } ... ]` is located and parsed on its
/// own. When both fail the outcome carries the original text so callers can
/// show it, never an error.
pub fn extract_contacts(text: &str) -> ExtractionOutcome {
    if let Ok(contacts) = serde_json::from_str::<Vec<Contact>>(text) {
        return ExtractionOutcome::Parsed(contacts);
    }

    let pattern = Regex::new(r"(?s)\[\s*\{.*\}\s*\]").unwrap();
    if let Some(found) = pattern.find(text) {
        match serde_json::from_str::<Vec<Contact>>(found.as_str()) {
            Ok(contacts) => return ExtractionOutcome::Parsed(contacts),
            Err(e) => {
                tracing::debug!("Bracket-scan candidate was not valid JSON: {}", e);
            }
        }
    }

    ExtractionOutcome::Failed {
        raw: text.to_string(),
    }
}
