//! # Kruskal-Wallis Rank Significance Test
//!
//! Nonparametric test for distributional differences between three groups of
//! scores, evaluated at the single significance level the pipeline uses:
//! alpha = 0.01, i.e. the H statistic is compared against the chi-square
//! critical value for 2 degrees of freedom.
//!
//! Ranks use the standard average-tie convention: all scores are pooled,
//! ranked 1..=N, and tied values receive the mean of the ranks their tie
//! block spans. The rank table is indexed by position in the pooled
//! sequence, so equal score values in different groups cannot alias each
//! other's rank contributions (equal values still receive equal ranks, which
//! is what the tie convention guarantees anyway).

use ndarray::ArrayView1;
use std::fmt;
use thiserror::Error;

/// Chi-square critical value for 2 degrees of freedom at alpha = 0.01.
pub const CRITICAL_VALUE: f64 = 9.21034;

/// Failures of the significance test on degenerate input.
#[derive(Error, Debug)]
pub enum SignificanceError {
    #[error("group {0} is empty; every group must contain at least one score")]
    EmptyGroup(usize),
    #[error("score {value} in group {group} is not finite")]
    NonFiniteScore { group: usize, value: f64 },
    #[error("all scores are tied; the rank variance is zero and H is undefined")]
    ZeroRankVariance,
}

/// Outcome of a Kruskal-Wallis test.
///
/// `Display` renders the human-readable report (H to 3 decimal places plus a
/// plain-language conclusion).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceReport {
    /// The Kruskal-Wallis H statistic.
    pub h: f64,
    /// Whether `h` exceeds [`CRITICAL_VALUE`].
    pub significant: bool,
}

impl fmt::Display for SignificanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "H statistic = {:.3}.", self.h)?;
        if self.significant {
            write!(
                f,
                "There are significant differences between these data groups at \
                 significance level alpha = 0.01. Reject the null hypothesis."
            )
        } else {
            write!(
                f,
                "There are no significant differences between these data groups at \
                 significance level alpha = 0.01. Cannot reject the null hypothesis."
            )
        }
    }
}

/// Average-tie ranks (1-based) for `scores`, indexed by position.
fn fractional_ranks(scores: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_unstable_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Tie block spans sorted positions start..end; each member gets the
        // mean of ranks start+1 ..= end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &position in &order[start..end] {
            ranks[position] = rank;
        }
        start = end;
    }
    ranks
}

/// Computes the Kruskal-Wallis H statistic for three score groups.
///
/// `H = (N - 1) * Σ_g n_g (r̄_g - r̄)² / Σ_i (r_i - r̄)²` where ranks are
/// average-tie ranks over the pooled scores and `r̄ = (N + 1) / 2`. This is
/// the tie-corrected form of the usual `12 / (N (N + 1))` expression.
pub fn h_statistic<'a>(
    group1: ArrayView1<'a, f64>,
    group2: ArrayView1<'a, f64>,
    group3: ArrayView1<'a, f64>,
) -> Result<f64, SignificanceError> {
    let groups = [group1, group2, group3];
    for (number, group) in groups.iter().enumerate() {
        if group.is_empty() {
            return Err(SignificanceError::EmptyGroup(number + 1));
        }
        if let Some(&value) = group.iter().find(|v| !v.is_finite()) {
            return Err(SignificanceError::NonFiniteScore {
                group: number + 1,
                value,
            });
        }
    }

    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let ranks = fractional_ranks(&pooled);
    let n = pooled.len() as f64;
    let rbar = (n + 1.0) / 2.0;

    let mut numerator = 0.0;
    let mut offset = 0;
    for group in &groups {
        let group_ranks = &ranks[offset..offset + group.len()];
        let mean_rank = group_ranks.iter().sum::<f64>() / group.len() as f64;
        numerator += group.len() as f64 * (mean_rank - rbar).powi(2);
        offset += group.len();
    }

    let denominator: f64 = ranks.iter().map(|&r| (r - rbar).powi(2)).sum();
    if denominator == 0.0 {
        return Err(SignificanceError::ZeroRankVariance);
    }

    Ok(numerator / denominator * (n - 1.0))
}

/// Runs the test and reports whether the groups differ significantly.
///
/// The report is logged at info level as a side effect; callers wanting the
/// text for themselves use the returned report's `Display` impl.
pub fn test<'a>(
    group1: ArrayView1<'a, f64>,
    group2: ArrayView1<'a, f64>,
    group3: ArrayView1<'a, f64>,
) -> Result<SignificanceReport, SignificanceError> {
    let h = h_statistic(group1, group2, group3)?;
    let report = SignificanceReport {
        h,
        significant: h > CRITICAL_VALUE,
    };
    log::info!("{report}");
    Ok(report)
}
