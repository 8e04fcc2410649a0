/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs: identity immutability,
/// no-drop enrichment, domain-guess shape, extraction totality.
use proptest::prelude::*;
use rust_prospect_api::enrichment::{guess_domain, overlay_person};
use rust_prospect_api::extraction::extract_contacts;
use rust_prospect_api::models::{Contact, ExtractionOutcome, PersonPayload, SearchParameters};
use rust_prospect_api::query_builder::params_from_reply;

fn contact_strategy() -> impl Strategy<Value = Contact> {
    (
        "[a-zA-Z0-9 .,']{0,24}",
        "[a-zA-Z0-9 .,']{0,24}",
        "[a-zA-Z0-9 .,']{0,32}",
        proptest::option::of("[a-z0-9@.]{3,24}"),
    )
        .prop_map(|(first_name, last_name, organization_name, email)| Contact {
            first_name,
            last_name,
            organization_name,
            email,
            ..Contact::default()
        })
}

fn payload_strategy() -> impl Strategy<Value = PersonPayload> {
    (
        proptest::option::of("[a-z0-9@.]{3,24}"),
        proptest::option::of("[a-zA-Z ]{0,16}"),
        proptest::option::of("[a-zA-Z ]{0,16}"),
    )
        .prop_map(|(email, title, city)| PersonPayload {
            email,
            title,
            city,
            ..PersonPayload::default()
        })
}

// Property: the merge never touches identity fields and never drops a value
// the provider did not replace.
proptest! {
    #[test]
    fn overlay_preserves_identity_fields(
        contact in contact_strategy(),
        payload in payload_strategy()
    ) {
        let merged = overlay_person(&contact, &payload);
        prop_assert_eq!(&merged.first_name, &contact.first_name);
        prop_assert_eq!(&merged.last_name, &contact.last_name);
        prop_assert_eq!(&merged.organization_name, &contact.organization_name);
    }

    #[test]
    fn overlay_never_clears_a_present_email(
        contact in contact_strategy(),
        payload in payload_strategy()
    ) {
        let merged = overlay_person(&contact, &payload);
        if payload.email.is_none() {
            prop_assert_eq!(merged.email, contact.email);
        } else {
            prop_assert_eq!(merged.email, payload.email);
        }
    }

    // Simulates an arbitrary mix of match successes and failures: the output
    // list always has one entry per input, in input order.
    #[test]
    fn enrichment_outcome_mix_never_drops_or_reorders(
        contacts in proptest::collection::vec(contact_strategy(), 0..8),
        outcomes in proptest::collection::vec(
            proptest::option::of(payload_strategy()), 0..8
        )
    ) {
        let merged: Vec<Contact> = contacts
            .iter()
            .enumerate()
            .map(|(i, contact)| match outcomes.get(i).and_then(|o| o.as_ref()) {
                Some(payload) => overlay_person(contact, payload),
                None => contact.clone(),
            })
            .collect();

        prop_assert_eq!(merged.len(), contacts.len());
        for (before, after) in contacts.iter().zip(merged.iter()) {
            prop_assert_eq!(&after.first_name, &before.first_name);
            prop_assert_eq!(&after.last_name, &before.last_name);
            prop_assert_eq!(&after.organization_name, &before.organization_name);
        }
    }
}

// Property: a guessed domain is always usable.
proptest! {
    #[test]
    fn guess_domain_never_panics(org in "\\PC*") {
        let _ = guess_domain(&org);
    }

    #[test]
    fn guessed_domains_are_well_formed(org in "[a-zA-Z0-9 .,]{0,40}") {
        if let Some(domain) = guess_domain(&org) {
            prop_assert!(domain.ends_with(".com"));
            prop_assert!(domain.len() > ".com".len());
            prop_assert!(!domain.contains(','));
            prop_assert!(!domain.contains(char::is_whitespace));
            prop_assert_eq!(domain.clone(), domain.to_lowercase());
        }
    }
}

// Property: extraction is total and idempotent.
proptest! {
    #[test]
    fn extraction_never_panics(text in "\\PC*") {
        let _ = extract_contacts(&text);
    }

    #[test]
    fn extraction_failure_retains_the_input(text in "[a-z ]{1,40}") {
        // Plain prose has no JSON array to find.
        match extract_contacts(&text) {
            ExtractionOutcome::Failed { raw } => prop_assert_eq!(raw, text),
            ExtractionOutcome::Parsed(_) => prop_assert!(false, "prose must not parse"),
        }
    }

    #[test]
    fn extraction_is_idempotent_over_its_own_output(
        contacts in proptest::collection::vec(contact_strategy(), 1..6)
    ) {
        let serialized = serde_json::to_string(&contacts).unwrap();
        match extract_contacts(&serialized) {
            ExtractionOutcome::Parsed(parsed) => {
                prop_assert_eq!(&parsed, &contacts);

                let reserialized = serde_json::to_string(&parsed).unwrap();
                match extract_contacts(&reserialized) {
                    ExtractionOutcome::Parsed(again) => prop_assert_eq!(again, parsed),
                    ExtractionOutcome::Failed { .. } => {
                        prop_assert!(false, "round trip must parse")
                    }
                }
            }
            ExtractionOutcome::Failed { .. } => prop_assert!(false, "array must parse"),
        }
    }
}

// Property: alternatives always join with " OR ", never a comma.
proptest! {
    #[test]
    fn alternatives_join_with_or(
        values in proptest::collection::vec("[a-zA-Z0-9]{1,12}", 1..5)
    ) {
        let reply = serde_json::to_string(&serde_json::json!({ "city": values })).unwrap();
        let params = params_from_reply(&reply);
        let joined = params.city.expect("city should be derived");

        for value in &values {
            prop_assert!(joined.contains(value.as_str()));
        }
        prop_assert_eq!(joined.matches(" OR ").count(), values.len() - 1);
        prop_assert!(!joined.contains(','));
    }
}

// Property: defaults always land, and only on absent fields.
proptest! {
    #[test]
    fn defaults_fill_only_the_gaps(
        country in proptest::option::of("[A-Z]{2}"),
        per_page in proptest::option::of(1u32..100)
    ) {
        let params = SearchParameters {
            country: country.clone(),
            per_page,
            ..SearchParameters::default()
        }
        .with_defaults();

        match country {
            Some(c) => prop_assert_eq!(params.country, Some(c)),
            None => prop_assert_eq!(params.country.as_deref(), Some("US")),
        }
        match per_page {
            Some(n) => prop_assert_eq!(params.per_page, Some(n)),
            None => prop_assert_eq!(params.per_page, Some(10)),
        }
    }
}
