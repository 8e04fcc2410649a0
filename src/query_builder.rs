use crate::generate::TextGenerator;
use crate::models::SearchParameters;
use serde_json::Value;

/// Instructions handed to the generator when deriving search parameters.
const PARAMS_SCHEMA_HINT: &str = "\
You build search parameters for a people-search API.
Given a natural-language description of a target person, reply with a raw JSON object of search parameters.
- When the user gives multiple alternatives for one field, separate them with \" OR \" inside a single string value. Example: \"current_company_name\": \"Acme OR Initech\". Never separate alternatives with commas or the word \"and\".
- Allowed fields: country, first_name, last_name, current_role_title, past_role_title, current_job_description, past_job_description, current_company_name, past_company_name, languages, city, industries, interests, skills, person_titles, q_keywords, page, per_page.
- person_titles is a JSON array of title strings.
- Omit anything you cannot map to an allowed field.
- Do not explain your response. Only return raw JSON.";

/// Derives provider search parameters from a free-text goal.
///
/// Derivation never fails: a generator error or an unparseable reply yields
/// an empty parameter set and the caller proceeds on the declared defaults.
pub async fn build_search_params(
    generator: &dyn TextGenerator,
    goal: &str,
) -> SearchParameters {
    let reply = match generator.generate(goal, Some(PARAMS_SCHEMA_HINT)).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Search parameter derivation failed: {}", e);
            return SearchParameters::default();
        }
    };

    params_from_reply(&reply)
}

/// Maps a generator reply onto the parameter allow-list.
///
/// Unrecognized keys are dropped silently. A scalar field that arrives as an
/// array is collapsed into one `" OR "`-joined string.
pub fn params_from_reply(reply: &str) -> SearchParameters {
    let value: Value = match serde_json::from_str(reply.trim()) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Generator reply was not valid JSON: {}", e);
            return SearchParameters::default();
        }
    };

    let map = match value.as_object() {
        Some(m) => m,
        None => {
            tracing::warn!("Generator reply was not a JSON object");
            return SearchParameters::default();
        }
    };

    let mut params = SearchParameters::default();
    for (key, field) in map {
        match key.as_str() {
            "country" => params.country = or_joined(field),
            "first_name" => params.first_name = or_joined(field),
            "last_name" => params.last_name = or_joined(field),
            "current_role_title" => params.current_role_title = or_joined(field),
            "past_role_title" => params.past_role_title = or_joined(field),
            "current_job_description" => params.current_job_description = or_joined(field),
            "past_job_description" => params.past_job_description = or_joined(field),
            "current_company_name" => params.current_company_name = or_joined(field),
            "past_company_name" => params.past_company_name = or_joined(field),
            "languages" => params.languages = or_joined(field),
            "city" => params.city = or_joined(field),
            "industries" => params.industries = or_joined(field),
            "interests" => params.interests = or_joined(field),
            "skills" => params.skills = or_joined(field),
            "person_titles" => params.person_titles = string_list(field),
            "q_keywords" => params.q_keywords = or_joined(field),
            "page" => params.page = page_number(field),
            "per_page" | "page_size" => params.per_page = page_number(field),
            _ => {}
        }
    }

    params
}

/// Single string value, or array collapsed with the literal `" OR "` joiner.
fn or_joined(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" OR "))
            }
        }
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
        Value::Array(items) => {
            let list: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if list.is_empty() {
                None
            } else {
                Some(list)
            }
        }
        _ => None,
    }
}

/// Accepts numeric values or numeric strings, the way model output tends to
/// deliver them.
fn page_number(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .map(|n| n as u32)
}
