//! End-to-end negotiation scenarios.

use tessera_core::prelude::*;
use tessera_core::{character_set, encoding, language, media_type};

fn html(language: &Language) -> Variant {
    Variant::new(media_type::TEXT_HTML.clone()).with_language(language.clone())
}

#[test]
fn test_browser_accept_header() {
    // text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8
    let preferences = ClientPreferences::new()
        .accept_media_type(media_type::TEXT_HTML.clone(), 1.0)
        .unwrap()
        .accept_media_type(media_type::APPLICATION_XHTML.clone(), 1.0)
        .unwrap()
        .accept_media_type(media_type::APPLICATION_XML.clone(), 0.9)
        .unwrap()
        .accept_media_type(media_type::ALL.clone(), 0.8)
        .unwrap();

    let variants = [
        Variant::new(media_type::APPLICATION_JSON.clone()),
        Variant::new(media_type::APPLICATION_XML.clone()),
        Variant::new(media_type::TEXT_HTML.clone()),
    ];

    let service = MetadataService::new();
    let selected = preferences.preferred_variant(&variants, &service).unwrap();
    assert_eq!(selected.media_type(), Some(&*media_type::TEXT_HTML));

    // Without html the explicit xml preference beats the */* range.
    let selected = preferences.preferred_variant(&variants[..2], &service).unwrap();
    assert_eq!(selected.media_type(), Some(&*media_type::APPLICATION_XML));

    // json only matches through */*.
    let selected = preferences.preferred_variant(&variants[..1], &service).unwrap();
    assert_eq!(selected.media_type(), Some(&*media_type::APPLICATION_JSON));
}

#[test]
fn test_language_fallback_to_primary_tag() {
    let preferences = ClientPreferences::new()
        .accept_language(language::ENGLISH_US.clone(), 1.0)
        .unwrap()
        .accept_language(language::FRENCH_FRANCE.clone(), 0.9)
        .unwrap();

    let variants = [html(&language::FRENCH), html(&language::ENGLISH)];
    let selected = preferences.preferred_variant(&variants, &MetadataService::new()).unwrap();
    assert_eq!(selected.languages(), &[language::ENGLISH.clone()]);
}

#[test]
fn test_exact_language_beats_fallback() {
    let preferences = ClientPreferences::new()
        .accept_language(language::ENGLISH_US.clone(), 0.6)
        .unwrap()
        .accept_language(language::FRENCH.clone(), 0.5)
        .unwrap();

    let variants = [html(&language::ENGLISH), html(&language::FRENCH)];
    let selected = preferences.preferred_variant(&variants, &MetadataService::new()).unwrap();
    assert_eq!(selected.languages(), &[language::FRENCH.clone()]);
}

#[test]
fn test_full_variant_selection() {
    let preferences = ClientPreferences::new()
        .accept_media_type(media_type::TEXT_ALL.clone(), 1.0)
        .unwrap()
        .accept_language(language::GERMAN.clone(), 1.0)
        .unwrap()
        .accept_language(language::ENGLISH.clone(), 0.7)
        .unwrap()
        .accept_character_set(character_set::UTF_8.clone(), 1.0)
        .unwrap()
        .accept_encoding(encoding::GZIP.clone(), 1.0)
        .unwrap()
        .accept_encoding(encoding::IDENTITY.clone(), 0.5)
        .unwrap();

    let service = MetadataService::new();
    let variants = [
        service.variant_for_file_name("docs/index.html.en"),
        service.variant_for_file_name("docs/index.html.de.gz"),
        service.variant_for_file_name("docs/index.txt.de"),
    ];

    let selected = preferences.preferred_variant(&variants, &service).unwrap();
    assert_eq!(selected.identifier(), Some("docs/index.html.de.gz"));
}

#[test]
fn test_not_acceptable() {
    let preferences = ClientPreferences::new()
        .accept_media_type(media_type::IMAGE_ALL.clone(), 1.0)
        .unwrap();
    let variants = [
        Variant::new(media_type::TEXT_HTML.clone()),
        Variant::new(media_type::APPLICATION_PDF.clone()),
    ];

    let err = tessera_core::require_preferred_variant(&variants, &preferences, &MetadataService::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotAcceptable(_)));
    assert_eq!(err.status_code(), 406);
    assert!(err.is_client_error());
}

#[test]
fn test_strict_mode_rejects_language_mismatch() {
    let preferences = ClientPreferences::new()
        .accept_language(language::JAPANESE.clone(), 1.0)
        .unwrap();
    let variants = [html(&language::ENGLISH), html(&language::SPANISH)];

    let flexible = MetadataService::new();
    assert!(preferences.preferred_variant(&variants, &flexible).is_some());

    let strict = MetadataService::new().with_mode(NegotiationMode::Strict);
    assert!(preferences.preferred_variant(&variants, &strict).is_none());
}

#[test]
fn test_service_defaults_guide_silent_clients() {
    let mut service = MetadataService::new();
    service.set_default_language(language::FRENCH.clone());

    let variants = [html(&language::ENGLISH), html(&language::FRENCH)];
    let selected = ClientPreferences::new()
        .preferred_variant(&variants, &service)
        .unwrap();
    assert_eq!(selected.languages(), &[language::FRENCH.clone()]);
}

#[test]
fn test_single_dimension_helpers() {
    let preferences = ClientPreferences::new()
        .accept_encoding(encoding::BROTLI.clone(), 1.0)
        .unwrap()
        .accept_encoding(encoding::GZIP.clone(), 0.8)
        .unwrap()
        .accept_character_set(character_set::ISO_8859_1.clone(), 1.0)
        .unwrap();

    let service = MetadataService::new();
    let encodings = [encoding::DEFLATE.clone(), encoding::GZIP.clone()];
    assert_eq!(preferences.preferred_encoding(&encodings, &service), Some(&encodings[1]));

    let charsets = [character_set::UTF_8.clone(), character_set::ISO_8859_1.clone()];
    assert_eq!(preferences.preferred_character_set(&charsets, &service), Some(&charsets[1]));
}
