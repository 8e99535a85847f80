//! Property-based tests for the metadata hierarchy and the negotiator.

use proptest::prelude::*;
use tessera_core::prelude::*;
use tessera_core::{language, media_type};

fn media_type_name() -> impl Strategy<Value = (String, String)> {
    ("[a-z][a-z0-9]{0,7}", "[a-z][a-z0-9.-]{0,9}")
}

fn language_tag() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..4)
}

// ============================================================================
// Media Types
// ============================================================================

proptest! {
    #[test]
    fn prop_media_type_includes_itself((main, sub) in media_type_name()) {
        let value = MediaType::parse(&format!("{main}/{sub}")).unwrap();
        prop_assert!(value.includes(&value));
        prop_assert!(value.includes_with_parameters(&value));
    }

    #[test]
    fn prop_all_includes_everything((main, sub) in media_type_name(), param in "[a-z]{1,6}") {
        let value = MediaType::parse(&format!("{main}/{sub}; {param}=1")).unwrap();
        prop_assert!(media_type::ALL.includes(&value));
        prop_assert!(media_type::ALL.includes_with_parameters(&value));
    }

    #[test]
    fn prop_concrete_media_type_does_not_include_all(
        (main, sub) in media_type_name(),
        param in "[a-z]{1,6}",
    ) {
        for name in [format!("{main}/{sub}"), format!("{main}/{sub}; {param}=1")] {
            let value = MediaType::parse(&name).unwrap();
            prop_assert!(value.is_concrete());
            prop_assert!(media_type::ALL.includes(&value));
            prop_assert!(!value.includes(&media_type::ALL));
            prop_assert!(!value.includes_with_parameters(&media_type::ALL));
        }
    }

    #[test]
    fn prop_wildcard_subtype_includes_same_main((main, sub) in media_type_name()) {
        let range = MediaType::parse(&format!("{main}/*")).unwrap();
        let value = MediaType::parse(&format!("{main}/{sub}")).unwrap();
        prop_assert!(range.includes(&value));
        prop_assert!(!value.includes(&range));
    }

    #[test]
    fn prop_media_type_case_insensitive((main, sub) in media_type_name()) {
        let lower = MediaType::parse(&format!("{main}/{sub}")).unwrap();
        let upper = MediaType::parse(&format!("{}/{}", main.to_uppercase(), sub.to_uppercase())).unwrap();
        prop_assert_eq!(&lower, &upper);
        prop_assert_eq!(lower.name(), upper.name());
    }

    #[test]
    fn prop_media_type_ancestors_end_at_all((main, sub) in media_type_name(), param in "[a-z]{1,6}") {
        let value = MediaType::parse(&format!("{main}/{sub}; {param}=x")).unwrap();
        let chain: Vec<MediaType> = value.ancestors().collect();
        prop_assert_eq!(chain.len(), 3);
        prop_assert_eq!(chain.last(), Some(&*media_type::ALL));
        for ancestor in &chain {
            prop_assert!(ancestor.includes(&value));
            prop_assert!(ancestor.specificity() < value.specificity());
        }
    }
}

// ============================================================================
// Languages
// ============================================================================

proptest! {
    #[test]
    fn prop_language_ancestors_end_at_all(subtags in language_tag()) {
        let value = Language::parse(&subtags.join("-")).unwrap();
        let chain: Vec<Language> = value.ancestors().collect();
        prop_assert_eq!(chain.len(), subtags.len());
        prop_assert_eq!(chain.last(), Some(&*language::ALL));
        for ancestor in &chain {
            prop_assert!(ancestor.includes(&value));
        }
    }

    #[test]
    fn prop_language_case_insensitive(subtags in language_tag()) {
        let tag = subtags.join("-");
        let lower = Language::parse(&tag).unwrap();
        let upper = Language::parse(&tag.to_uppercase().replace('-', "_")).unwrap();
        prop_assert_eq!(lower, upper);
    }
}

// ============================================================================
// Negotiation
// ============================================================================

proptest! {
    #[test]
    fn prop_negotiation_is_deterministic(
        qualities in prop::collection::vec(0.0f32..=1.0, 1..5),
        picks in prop::collection::vec(0usize..6, 1..6),
    ) {
        let pool = [
            media_type::TEXT_HTML.clone(),
            media_type::TEXT_PLAIN.clone(),
            media_type::TEXT_ALL.clone(),
            media_type::APPLICATION_JSON.clone(),
            media_type::APPLICATION_XML.clone(),
            media_type::ALL.clone(),
        ];

        let mut preferences = ClientPreferences::new();
        for (index, quality) in qualities.iter().enumerate() {
            preferences
                .media_types_mut()
                .add_with_quality(pool[index % pool.len()].clone(), *quality)
                .unwrap();
        }
        let variants: Vec<Variant> = picks
            .iter()
            .filter(|&&pick| pool[pick].is_concrete())
            .map(|&pick| Variant::new(pool[pick].clone()))
            .collect();

        let service = MetadataService::new();
        let first = tessera_core::preferred_variant(&variants, &preferences, &service);
        let second = tessera_core::preferred_variant(&variants, &preferences, &service);

        prop_assert_eq!(first.map(|v| v as *const Variant), second.map(|v| v as *const Variant));
        if let Some(selected) = first {
            let score = tessera_core::score_variant(selected, &preferences, &service).unwrap();
            for variant in &variants {
                if let Some(other) = tessera_core::score_variant(variant, &preferences, &service) {
                    prop_assert!(other <= score);
                }
            }
        }
    }
}
