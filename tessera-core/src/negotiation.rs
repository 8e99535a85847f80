//! Content negotiation: choosing the variant that best fits client
//! preferences.
//!
//! Every variant is scored in four dimensions (language, media type,
//! character set and encoding) against the matching [`PreferenceList`]. The
//! dimension scores are combined with weights 4, 3, 2 and 1, and the highest
//! total wins; on a tie the earlier variant is kept.
//!
//! # Scoring a dimension
//!
//! | Situation                                      | Score                             |
//! |------------------------------------------------|-----------------------------------|
//! | variant has no value                           | `0`                               |
//! | client gave no preference                      | `DEFAULT_QUALITY × bonus` if the service default matches, else `0` |
//! | preference equals the value                    | `q`                               |
//! | preference is a range including the value      | `q × 0.9^steps`                   |
//! | value is a parent of the preference            | `q × 0.1 × 0.9^(steps - 1)`       |
//! | nothing matches                                | mismatch                          |
//!
//! A preference with quality 0 rejects the variant when it equals the value,
//! or when it is a range including the value and no more specific positive
//! preference also matches. A media type mismatch
//! always rejects it; other mismatches only do in [`NegotiationMode::Strict`].
//!
//! # Examples
//!
//! ```
//! use tessera_core::{language, media_type};
//! use tessera_core::negotiation::preferred_variant;
//! use tessera_core::preference::ClientPreferences;
//! use tessera_core::service::MetadataService;
//! use tessera_core::variant::Variant;
//!
//! # fn main() -> tessera_core::Result<()> {
//! let prefs = ClientPreferences::new()
//!     .accept_language(language::ENGLISH_US.clone(), 1.0)?
//!     .accept_language(language::FRENCH_FRANCE.clone(), 0.9)?;
//!
//! let variants = [
//!     Variant::new(media_type::TEXT_XML.clone()).with_language(language::ENGLISH.clone()),
//!     Variant::new(media_type::TEXT_XML.clone()).with_language(language::FRENCH.clone()),
//! ];
//!
//! let best = preferred_variant(&variants, &prefs, &MetadataService::new()).unwrap();
//! assert_eq!(best.languages(), &[language::ENGLISH.clone()]);
//! # Ok(())
//! # }
//! ```

use crate::metadata::{Metadata, MetadataKind};
use crate::preference::{ClientPreferences, PreferenceList};
use crate::service::{MetadataService, NegotiationMode};
use crate::variant::Variant;
use crate::{Error, Result};
use tessera_log::{debug, trace};

/// Weight of a matching service default when the client is silent.
pub const DEFAULT_QUALITY: f32 = 0.003;

/// Decay applied per specificity step between a range and the value.
pub const RANGE_DECAY: f32 = 0.9;

/// Factor applied when the variant only offers a parent of the preference.
pub const FALLBACK_FACTOR: f32 = 0.1;

pub const LANGUAGE_WEIGHT: f32 = 4.0;
pub const MEDIA_TYPE_WEIGHT: f32 = 3.0;
pub const CHARACTER_SET_WEIGHT: f32 = 2.0;
pub const ENCODING_WEIGHT: f32 = 1.0;

const TOTAL_WEIGHT: f32 = LANGUAGE_WEIGHT + MEDIA_TYPE_WEIGHT + CHARACTER_SET_WEIGHT + ENCODING_WEIGHT;

const TARGET: &str = "tessera::conneg";

// ============================================================================
// Matching
// ============================================================================

/// How a preference relates to a variant value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Match {
    Exact,
    Range { steps: u8 },
    Fallback { steps: u8 },
}

impl Match {
    fn bonus(self) -> f32 {
        match self {
            Match::Exact => 1.0,
            Match::Range { steps } => RANGE_DECAY.powi(i32::from(steps)),
            Match::Fallback { steps } => FALLBACK_FACTOR * RANGE_DECAY.powi(i32::from(steps) - 1),
        }
    }
}

fn match_of<T: Metadata>(preference: &T, value: &T) -> Option<Match> {
    if preference == value {
        Some(Match::Exact)
    } else if preference.includes_with_parameters(value) {
        let steps = value.specificity().saturating_sub(preference.specificity()).max(1);
        Some(Match::Range { steps })
    } else if value.includes_with_parameters(preference) {
        let steps = preference.specificity().saturating_sub(value.specificity()).max(1);
        Some(Match::Fallback { steps })
    } else {
        None
    }
}

/// Outcome of scoring one dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Dimension {
    Scored(f32),
    Mismatch,
    Rejected,
}

impl Dimension {
    /// Combine the outcomes of several values of one variant: any score
    /// beats a mismatch, and an explicit rejection only stands when nothing
    /// scored.
    fn best(self, other: Dimension) -> Dimension {
        match (self, other) {
            (Dimension::Scored(a), Dimension::Scored(b)) => Dimension::Scored(a.max(b)),
            (Dimension::Scored(a), _) | (_, Dimension::Scored(a)) => Dimension::Scored(a),
            (Dimension::Rejected, _) | (_, Dimension::Rejected) => Dimension::Rejected,
            _ => Dimension::Mismatch,
        }
    }
}

fn score_value<T: Metadata>(preferences: &PreferenceList<T>, value: &T, default: &T) -> Dimension {
    if preferences.is_empty() {
        let hint = match_of(default, value).map_or(0.0, |m| DEFAULT_QUALITY * m.bonus());
        return Dimension::Scored(hint);
    }

    let mut best = 0.0_f32;
    let mut accepted_at: Option<u8> = None;
    let mut excluded_at: Option<u8> = None;
    for preference in preferences {
        let Some(found) = match_of(preference.metadata(), value) else {
            continue;
        };
        let specificity = preference.metadata().specificity();
        match found {
            Match::Exact if preference.quality() == 0.0 => return Dimension::Rejected,
            Match::Range { .. } if preference.quality() == 0.0 => {
                excluded_at = excluded_at.max(Some(specificity));
            }
            _ if preference.quality() == 0.0 => {}
            _ => {
                best = best.max(preference.quality() * found.bonus());
                accepted_at = accepted_at.max(Some(specificity));
            }
        }
    }

    // A zero-quality range excludes the value unless a more specific
    // preference accepts it.
    if let Some(excluded) = excluded_at
        && accepted_at.is_none_or(|accepted| excluded > accepted)
    {
        return Dimension::Rejected;
    }

    if best > 0.0 {
        Dimension::Scored(best)
    } else {
        Dimension::Mismatch
    }
}

fn score_values<'v, T: Metadata>(
    preferences: &PreferenceList<T>,
    values: impl IntoIterator<Item = &'v T>,
    default: &T,
) -> Dimension {
    values
        .into_iter()
        .map(|value| score_value(preferences, value, default))
        .reduce(Dimension::best)
        .unwrap_or(Dimension::Scored(0.0))
}

fn resolve(kind: MetadataKind, dimension: Dimension, mode: NegotiationMode) -> Option<f32> {
    match dimension {
        Dimension::Scored(score) => Some(score),
        Dimension::Rejected => None,
        Dimension::Mismatch if kind == MetadataKind::MediaType => None,
        Dimension::Mismatch => match mode {
            NegotiationMode::Strict => None,
            NegotiationMode::Flexible => Some(0.0),
        },
    }
}

// ============================================================================
// Negotiation
// ============================================================================

/// Score one variant, or `None` if it is disqualified.
pub fn score_variant(
    variant: &Variant,
    preferences: &ClientPreferences,
    service: &MetadataService,
) -> Option<f32> {
    let mode = service.mode();

    let language = score_values(
        preferences.languages(),
        variant.languages(),
        service.default_language(),
    );
    let media_type = score_values(
        preferences.media_types(),
        variant.media_type(),
        service.default_media_type(),
    );
    let character_set = score_values(
        preferences.character_sets(),
        variant.character_set(),
        service.default_character_set(),
    );
    let encoding = score_values(
        preferences.encodings(),
        variant.encodings(),
        service.default_encoding(),
    );

    let language = resolve(MetadataKind::Language, language, mode)?;
    let media_type = resolve(MetadataKind::MediaType, media_type, mode)?;
    let character_set = resolve(MetadataKind::CharacterSet, character_set, mode)?;
    let encoding = resolve(MetadataKind::Encoding, encoding, mode)?;

    Some(
        (LANGUAGE_WEIGHT * language
            + MEDIA_TYPE_WEIGHT * media_type
            + CHARACTER_SET_WEIGHT * character_set
            + ENCODING_WEIGHT * encoding)
            / TOTAL_WEIGHT,
    )
}

/// Select the variant that best matches the client preferences.
///
/// Returns `None` when there are no variants or every variant is
/// disqualified.
pub fn preferred_variant<'a>(
    variants: &'a [Variant],
    preferences: &ClientPreferences,
    service: &MetadataService,
) -> Option<&'a Variant> {
    match variants {
        [] => {
            trace!(target: TARGET, "No variant to negotiate");
            return None;
        }
        [only] if preferences.is_empty() => return Some(only),
        _ => {}
    }

    let mut best: Option<(usize, f32)> = None;
    for (index, variant) in variants.iter().enumerate() {
        match score_variant(variant, preferences, service) {
            Some(score) => {
                trace!(target: TARGET, "Variant scored"; index = index, variant = variant, score = score);
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((index, score));
                }
            }
            None => trace!(target: TARGET, "Variant disqualified"; index = index, variant = variant),
        }
    }

    match best {
        Some((index, score)) => {
            debug!(target: TARGET, "Variant selected"; index = index, score = score, candidates = variants.len());
            variants.get(index)
        }
        None => {
            debug!(target: TARGET, "No acceptable variant"; candidates = variants.len());
            None
        }
    }
}

/// Like [`preferred_variant`], but reports an empty outcome as
/// [`Error::NotAcceptable`].
pub fn require_preferred_variant<'a>(
    variants: &'a [Variant],
    preferences: &ClientPreferences,
    service: &MetadataService,
) -> Result<&'a Variant> {
    preferred_variant(variants, preferences, service).ok_or_else(|| {
        Error::NotAcceptable(format!(
            "none of {} variant(s) matches the client preferences",
            variants.len()
        ))
    })
}
