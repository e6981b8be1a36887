use serde::Serialize;

use super::types::Outcome;

/// Narrative tier for the remaining sentence length.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SentenceTier {
    BornFree,
    FinalStretch,
    LongGrind,
    LifeSentence,
}

/// Robustness tier for the post-threshold growth rate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GrowthTier {
    Eroding,
    Fragile,
    Steady,
    Compounding,
}

// Ordered (inclusive upper bound, tier) tables; the first matching row
// wins, anything past the last row falls through to the terminal tier.
const SENTENCE_TIERS: [(u32, SentenceTier); 3] = [
    (0, SentenceTier::BornFree),
    (5, SentenceTier::FinalStretch),
    (15, SentenceTier::LongGrind),
];

const GROWTH_TIERS: [(f64, GrowthTier); 3] = [
    (0.0, GrowthTier::Eroding),
    (2.0, GrowthTier::Fragile),
    (4.0, GrowthTier::Steady),
];

pub fn classify_sentence(outcome: Outcome) -> SentenceTier {
    let Some(years) = outcome.years_to_freedom() else {
        return SentenceTier::LifeSentence;
    };

    SENTENCE_TIERS
        .iter()
        .find(|(upper, _)| years <= *upper)
        .map(|(_, tier)| *tier)
        .unwrap_or(SentenceTier::LifeSentence)
}

pub fn classify_growth(growth_rate_percent: f64) -> GrowthTier {
    GROWTH_TIERS
        .iter()
        .find(|(upper, _)| growth_rate_percent < *upper)
        .map(|(_, tier)| *tier)
        .unwrap_or(GrowthTier::Compounding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_tier_boundaries() {
        assert_eq!(classify_sentence(Outcome::Free), SentenceTier::BornFree);
        assert_eq!(
            classify_sentence(Outcome::Calculated { years: 0 }),
            SentenceTier::BornFree
        );
        assert_eq!(
            classify_sentence(Outcome::Calculated { years: 1 }),
            SentenceTier::FinalStretch
        );
        assert_eq!(
            classify_sentence(Outcome::Calculated { years: 5 }),
            SentenceTier::FinalStretch
        );
        assert_eq!(
            classify_sentence(Outcome::Calculated { years: 6 }),
            SentenceTier::LongGrind
        );
        assert_eq!(
            classify_sentence(Outcome::Calculated { years: 15 }),
            SentenceTier::LongGrind
        );
        assert_eq!(
            classify_sentence(Outcome::Calculated { years: 16 }),
            SentenceTier::LifeSentence
        );
        assert_eq!(
            classify_sentence(Outcome::LifeSentence),
            SentenceTier::LifeSentence
        );
    }

    #[test]
    fn growth_tier_boundaries() {
        assert_eq!(classify_growth(-1.0), GrowthTier::Eroding);
        assert_eq!(classify_growth(0.0), GrowthTier::Fragile);
        assert_eq!(classify_growth(1.99), GrowthTier::Fragile);
        assert_eq!(classify_growth(2.0), GrowthTier::Steady);
        assert_eq!(classify_growth(3.99), GrowthTier::Steady);
        assert_eq!(classify_growth(4.0), GrowthTier::Compounding);
        assert_eq!(classify_growth(12.0), GrowthTier::Compounding);
    }
}
