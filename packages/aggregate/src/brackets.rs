//! Income bracket tables and quantile interpolation.

/// Assumed upper bound for the open-ended top income bracket. The ACS
/// publishes "$200,000 or more" with no ceiling; the median interpolation
/// needs a finite one.
pub const TOP_BRACKET_CAP_USD: f64 = 300_000.0;

/// One output income bracket: the source fields folded into it and its
/// dollar range.
#[derive(Debug, Clone, Copy)]
pub struct BracketSpec {
    /// Source field names summed into this bracket.
    pub fields: &'static [&'static str],
    /// Inclusive lower bound in dollars.
    pub low: f64,
    /// Exclusive upper bound in dollars.
    pub high: f64,
}

/// The eleven output brackets, folded from the sixteen B19001 fields.
pub const INCOME_BRACKET_SPECS: &[BracketSpec] = &[
    BracketSpec {
        fields: &["income_lt_10k"],
        low: 0.0,
        high: 10_000.0,
    },
    BracketSpec {
        fields: &["income_10_15k"],
        low: 10_000.0,
        high: 15_000.0,
    },
    BracketSpec {
        fields: &["income_15_20k", "income_20_25k"],
        low: 15_000.0,
        high: 25_000.0,
    },
    BracketSpec {
        fields: &["income_25_30k", "income_30_35k"],
        low: 25_000.0,
        high: 35_000.0,
    },
    BracketSpec {
        fields: &["income_35_40k", "income_40_45k", "income_45_50k"],
        low: 35_000.0,
        high: 50_000.0,
    },
    BracketSpec {
        fields: &["income_50_60k", "income_60_75k"],
        low: 50_000.0,
        high: 75_000.0,
    },
    BracketSpec {
        fields: &["income_75_100k"],
        low: 75_000.0,
        high: 100_000.0,
    },
    BracketSpec {
        fields: &["income_100_125k"],
        low: 100_000.0,
        high: 125_000.0,
    },
    BracketSpec {
        fields: &["income_125_150k"],
        low: 125_000.0,
        high: 150_000.0,
    },
    BracketSpec {
        fields: &["income_150_200k"],
        low: 150_000.0,
        high: 200_000.0,
    },
    BracketSpec {
        fields: &["income_200k_plus"],
        low: 200_000.0,
        high: TOP_BRACKET_CAP_USD,
    },
];

/// Interpolates a quantile from a bucketed distribution.
///
/// `brackets` holds `(low, high, count)` triples. Entries with zero
/// count are ignored; the rest are walked in ascending `low` order until
/// the cumulative count reaches `quantile × total`, and the answer is
/// linearly interpolated inside that bracket. Returns 0 when every count
/// is zero, and the top bracket's upper bound if no bracket reaches the
/// target rank (structurally impossible when the counts sum correctly,
/// but guarded anyway).
#[must_use]
pub fn quantile_from_brackets(brackets: &[(f64, f64, f64)], quantile: f64) -> f64 {
    let mut populated: Vec<(f64, f64, f64)> = brackets
        .iter()
        .copied()
        .filter(|(_, _, count)| *count > 0.0)
        .collect();

    if populated.is_empty() {
        return 0.0;
    }

    populated.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total: f64 = populated.iter().map(|(_, _, count)| count).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let target = quantile * total;
    let mut cumulative = 0.0;

    for (low, high, count) in &populated {
        if cumulative + count >= target {
            let remaining = target - cumulative;
            return low + remaining / count * (high - low);
        }
        cumulative += count;
    }

    populated.last().map_or(0.0, |(_, high, _)| *high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_inside_the_target_bracket() {
        // Total 100, target rank 50, cumulative before [15, 25) is 30:
        // 15 + (50 - 30) / 30 × 10 = 21.67.
        let brackets = [
            (0.0, 10.0, 10.0),
            (10.0, 15.0, 20.0),
            (15.0, 25.0, 30.0),
            (25.0, 35.0, 40.0),
        ];
        let median = quantile_from_brackets(&brackets, 0.5);
        assert!((median - 21.666_666).abs() < 1e-3, "median {median}");
    }

    #[test]
    fn all_zero_counts_return_exactly_zero() {
        let brackets = [(0.0, 10.0, 0.0), (10.0, 20.0, 0.0)];
        assert!(quantile_from_brackets(&brackets, 0.5).abs() < f64::EPSILON);
        assert!(quantile_from_brackets(&[], 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn single_bracket_interpolates_linearly() {
        let brackets = [(50_000.0, 75_000.0, 40.0)];
        let median = quantile_from_brackets(&brackets, 0.5);
        assert!((median - 62_500.0).abs() < 1e-9);
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let brackets = [
            (25.0, 35.0, 40.0),
            (0.0, 10.0, 10.0),
            (15.0, 25.0, 30.0),
            (10.0, 15.0, 20.0),
        ];
        let median = quantile_from_brackets(&brackets, 0.5);
        assert!((median - 21.666_666).abs() < 1e-3);
    }

    #[test]
    fn unreachable_target_returns_top_bound() {
        // A quantile above 1 can never be reached by the cumulative walk.
        let brackets = [(0.0, 10.0, 10.0), (10.0, 20.0, 10.0)];
        let result = quantile_from_brackets(&brackets, 1.5);
        assert!((result - 20.0).abs() < 1e-9);
    }

    #[test]
    fn bracket_specs_cover_the_source_table() {
        let field_count: usize = INCOME_BRACKET_SPECS.iter().map(|s| s.fields.len()).sum();
        assert_eq!(field_count, 16);
        assert_eq!(INCOME_BRACKET_SPECS.len(), 11);

        // Contiguous, ascending ranges up to the documented cap.
        for pair in INCOME_BRACKET_SPECS.windows(2) {
            assert!((pair[0].high - pair[1].low).abs() < f64::EPSILON);
        }
        let top = INCOME_BRACKET_SPECS.last().unwrap();
        assert!((top.high - TOP_BRACKET_CAP_USD).abs() < f64::EPSILON);
    }
}
