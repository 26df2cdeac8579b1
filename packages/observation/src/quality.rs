//! Condition code to [`QualityTier`] mapping.
//!
//! Codes are compared ASCII case-insensitively after trimming, so the
//! mapping never depends on the host locale.

use outdoor_map_unit_models::QualityTier;

/// Fixed condition code table.
const QUALITY_CODES: &[(&str, QualityTier)] = &[
    ("good", QualityTier::Good),
    ("satisfactory", QualityTier::Satisfactory),
    ("unusable", QualityTier::Unusable),
    ("unknown", QualityTier::Unknown),
];

/// Maps a machine-readable condition code to its tier.
///
/// Unrecognized codes map to [`QualityTier::Unknown`].
#[must_use]
pub fn quality_from_code(code: &str) -> QualityTier {
    let code = code.trim();
    QUALITY_CODES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map_or_else(
            || {
                log::debug!("Unrecognized quality code {code:?}, treating as unknown");
                QualityTier::Unknown
            },
            |(_, tier)| *tier,
        )
}

/// Returns the ordinal rank of `tier` for comparisons (1 = best).
#[must_use]
pub const fn enumerable_quality(tier: QualityTier) -> u8 {
    tier.rank()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(quality_from_code("good"), QualityTier::Good);
        assert_eq!(quality_from_code("satisfactory"), QualityTier::Satisfactory);
        assert_eq!(quality_from_code("unusable"), QualityTier::Unusable);
        assert_eq!(quality_from_code("unknown"), QualityTier::Unknown);
    }

    #[test]
    fn ignores_ascii_case_and_padding() {
        assert_eq!(quality_from_code(" GOOD\n"), QualityTier::Good);
    }

    #[test]
    fn unknown_fallback() {
        assert_eq!(quality_from_code("slushy"), QualityTier::Unknown);
        assert_eq!(quality_from_code(""), QualityTier::Unknown);
    }

    #[test]
    fn rank_is_bijective() {
        let mut ranks: Vec<u8> = QualityTier::all()
            .iter()
            .map(|t| enumerable_quality(*t))
            .collect();
        ranks.dedup();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        for tier in QualityTier::all() {
            assert_eq!(QualityTier::from_rank(enumerable_quality(*tier)), Ok(*tier));
        }
    }

    #[test]
    fn rank_follows_tier_order() {
        for pair in QualityTier::all().windows(2) {
            assert!(enumerable_quality(pair[0]) < enumerable_quality(pair[1]));
        }
    }
}
