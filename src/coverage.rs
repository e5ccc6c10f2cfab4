//! Decides if a pair of sequences matches from the part of the reference covered by alignments.

use crate::summary::AlignmentSummary;

/// a pair matches when strictly more than this percentage of the reference is aligned
pub const COVERAGE_THRESHOLD: f64 = 12.0;

/// aligned length as a percentage of sequence lengths
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoverageRatios {
    pub target: f64,
    pub query: f64,
}

/// result of the coverage filter for one pair
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Verdict {
    /// target span is null, no ratio computed
    NoAlignment,
    /// ratio above threshold
    Match(CoverageRatios),
    /// something aligned but not enough
    Below(CoverageRatios),
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match(_))
    }
}

/// percentage of length covered by span. length must not be 0.
#[inline]
pub fn coverage_ratio(span: i64, length: usize) -> f64 {
    100. * span as f64 / length as f64
}

/// Applies the coverage filter to a summary. ref_len is always positive,
/// a null query_len gives a query ratio of 0.
pub fn evaluate(summary: &AlignmentSummary, ref_len: usize, query_len: usize) -> Verdict {
    if summary.target_span == 0 {
        return Verdict::NoAlignment;
    }
    let target = coverage_ratio(summary.target_span, ref_len);
    let query = if query_len > 0 { coverage_ratio(summary.query_span, query_len) } else { 0. };
    let ratios = CoverageRatios { target, query };
    if target > COVERAGE_THRESHOLD {
        Verdict::Match(ratios)
    } else {
        Verdict::Below(ratios)
    }
} // end of evaluate

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(query_span: i64, target_span: i64) -> AlignmentSummary {
        AlignmentSummary { mismatches: 0, query_span, target_span }
    }

    #[test]
    fn ratio_is_percentage() {
        assert_eq!(coverage_ratio(200, 1000), 20.);
        assert_eq!(coverage_ratio(100, 500), 20.);
    }

    #[test]
    fn zero_span_short_circuits() {
        assert_eq!(evaluate(&summary(100, 0), 1000, 500), Verdict::NoAlignment);
        // even a null reference length does not reach the division
        assert_eq!(evaluate(&summary(0, 0), 0, 0), Verdict::NoAlignment);
    }

    #[test]
    fn threshold_is_strict() {
        // 120 / 1000 is exactly 12%
        assert!(!evaluate(&summary(10, 120), 1000, 500).is_match());
        // 120001 / 1000000 is 12.0001%
        assert!(evaluate(&summary(10, 120_001), 1_000_000, 500).is_match());
    }

    #[test]
    fn match_carries_both_ratios() {
        match evaluate(&summary(100, 200), 1000, 500) {
            Verdict::Match(r) => {
                assert_eq!(r.target, 20.);
                assert_eq!(r.query, 20.);
            }
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(
            evaluate(&summary(10, 50), 1000, 500),
            Verdict::Below(CoverageRatios { target: 5., query: 2. })
        );
    }
}
