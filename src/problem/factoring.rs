//! Factoring `ax² + bx + c` over the integers by the ac method.
//!
//! The search tries every integer pair multiplying to `a·c`, one per
//! interval, looking for the pair that sums to `b`. When it exists the
//! middle term is split and grouped; otherwise the walkthrough ends in the
//! not-factorable phase.

use std::fmt;

use crate::derive::{DerivedOutput, DerivedStrategy, FactorSearch, OutputValue, SearchOutcome, TickContext};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::math::{Fraction, gcd};
use crate::phase::{Phase, Timeline};

use super::{FlagKind, FlagSpec, Pacing, ProblemKind, ProblemParameters, SETUP_TICKS, Walkthrough};

/// Largest accepted coefficient magnitude.
pub const MAX_COEFFICIENT: i64 = 100;

/// Ticks spent pointing out `a·c` and `b`.
pub const IDENTIFY_TICKS: u64 = 15;

/// Ticks per candidate pair.
pub const CANDIDATE_STEP: u64 = 8;

/// Ticks spent on the factored or not-factorable result.
pub const RESULT_TICKS: u64 = 20;

/// Ticks spent reading off the roots.
pub const ROOTS_TICKS: u64 = 20;

pub(super) const FLAGS: &[FlagSpec] = &[FlagSpec {
    name: "show_roots",
    kind: FlagKind::Bool,
    default: "false",
    description: "After factoring, read off the roots",
}];

/// `(g1·x + g2)(h1·x + h2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Factored {
    /// First factor `(x coefficient, constant)`
    pub first: (i64, i64),
    /// Second factor `(x coefficient, constant)`
    pub second: (i64, i64),
}

impl Factored {
    /// Roots of each factor. A factor with no `x` term has none.
    #[must_use]
    pub fn roots(&self) -> Vec<Fraction> {
        let mut roots: Vec<Fraction> = [self.first, self.second]
            .iter()
            .filter_map(|(coef, constant)| Fraction::new(-constant, *coef))
            .map(Fraction::reduced)
            .collect();
        roots.dedup();
        roots
    }
}

impl fmt::Display for Factored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})({})",
            super::linear(self.first.0, self.first.1),
            super::linear(self.second.0, self.second.1)
        )
    }
}

/// A quadratic to factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoringProblem {
    a: i64,
    b: i64,
    c: i64,
    show_roots: bool,
}

impl FactoringProblem {
    pub(super) fn from_params(
        operands: &[f64],
        params: &ProblemParameters,
    ) -> Result<Self, InvalidProblemError> {
        let a = super::whole("a", operands[0], -MAX_COEFFICIENT, MAX_COEFFICIENT)?;
        let b = super::whole("b", operands[1], -MAX_COEFFICIENT, MAX_COEFFICIENT)?;
        let c = super::whole("c", operands[2], -MAX_COEFFICIENT, MAX_COEFFICIENT)?;
        if a == 0 {
            return Err(InvalidProblemError::ZeroLeadingCoefficient);
        }
        let show_roots = params.bool_flag("show_roots", false)?;
        Ok(Self {
            a,
            b,
            c,
            show_roots,
        })
    }

    /// The candidate search for this quadratic.
    #[must_use]
    pub fn search(&self) -> FactorSearch {
        FactorSearch::new(self.a * self.c, self.b)
    }

    /// Groups `ax² + px + qx + c` into two linear factors.
    ///
    /// With `g = gcd(a, p)` carrying the sign of `a`, the first group is
    /// `g·x(A·x + P)` and the second is `(q / A)(A·x + P)`, giving
    /// `(A·x + P)(g·x + q / A)`.
    #[must_use]
    pub fn group(&self, (p, q): (i64, i64)) -> Factored {
        let g = gcd(self.a, p) * self.a.signum();
        let big_a = self.a / g;
        let big_p = p / g;
        let g2 = q / big_a;
        Factored {
            first: (big_a, big_p),
            second: (g, g2),
        }
    }

    /// Factored form, if the quadratic factors over the integers.
    #[must_use]
    pub fn factored(&self) -> Option<Factored> {
        match self.search().outcome() {
            SearchOutcome::Found { pair } => Some(self.group(pair)),
            SearchOutcome::Exhausted => None,
        }
    }

    pub(super) fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        let search = self.search();
        let found = matches!(search.outcome(), SearchOutcome::Found { .. });
        let candidates = search.len() as u64;
        let timeline = Timeline::builder()
            .hold(Phase::Setup, pacing.ticks(SETUP_TICKS))
            .hold(Phase::Identify, pacing.ticks(IDENTIFY_TICKS))
            .hold(Phase::Search, pacing.ticks(candidates * CANDIDATE_STEP))
            .hold_if(found, Phase::Factored, pacing.ticks(RESULT_TICKS))
            .hold_if(!found, Phase::NotFactorable, pacing.ticks(RESULT_TICKS))
            .hold_if(found && self.show_roots, Phase::Roots, pacing.ticks(ROOTS_TICKS))
            .finish()?;
        Ok(Walkthrough {
            timeline,
            strategy: Box::new(FactoringStrategy {
                problem: self.clone(),
                search,
                interval: pacing.ticks(CANDIDATE_STEP),
            }),
        })
    }
}

impl fmt::Display for FactoringProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lead = match self.a {
            1 => String::new(),
            -1 => "-".to_owned(),
            a => a.to_string(),
        };
        write!(f, "{lead}x²")?;
        match self.b {
            0 => {}
            1 => write!(f, " + x")?,
            -1 => write!(f, " - x")?,
            b if b < 0 => write!(f, " - {}x", -b)?,
            b => write!(f, " + {b}x")?,
        }
        match self.c {
            0 => Ok(()),
            c if c < 0 => write!(f, " - {}", -c),
            c => write!(f, " + {c}"),
        }
    }
}

#[derive(Debug)]
struct FactoringStrategy {
    problem: FactoringProblem,
    search: FactorSearch,
    interval: u64,
}

impl FactoringStrategy {
    fn evaluated(&self, ctx: &TickContext<'_>) -> usize {
        if ctx.has_passed(Phase::Search) {
            self.search.len()
        } else if ctx.is_in(Phase::Search) {
            self.search.evaluated_after(ctx.elapsed(), self.interval)
        } else {
            0
        }
    }
}

fn pair_value((p, q): (i64, i64)) -> OutputValue {
    OutputValue::List(vec![OutputValue::Int(p), OutputValue::Int(q)])
}

impl DerivedStrategy for FactoringStrategy {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Factoring
    }

    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput {
        let p = &self.problem;
        let mut out = DerivedOutput::new()
            .with("expression", p.to_string())
            .with("a", p.a)
            .with("b", p.b)
            .with("c", p.c);

        if ctx.has_reached(Phase::Identify) {
            out.set("product", self.search.product())
                .set("target_sum", self.search.target_sum());
        }

        let evaluated = self.evaluated(ctx);
        if evaluated > 0 {
            let tried = &self.search.candidates()[..evaluated];
            out.set("candidates_tried", evaluated).set(
                "candidates",
                OutputValue::List(tried.iter().copied().map(pair_value).collect()),
            );
            if let Some(&current) = tried.last() {
                out.set("current", pair_value(current))
                    .set("current_sum", current.0 + current.1)
                    .set("current_matches", self.search.matches(current));
            }
        }

        if ctx.has_reached(Phase::Factored) {
            if let SearchOutcome::Found { pair } = self.search.outcome() {
                let factored = p.group(pair);
                out.set("pair", pair_value(pair))
                    .set("factored", factored.to_string())
                    .set("factorable", true);
                if ctx.has_reached(Phase::Roots) {
                    out.set("roots", factored.roots());
                }
            }
        }
        if ctx.has_reached(Phase::NotFactorable) {
            out.set("factorable", false)
                .set("message", "not factorable over the integers");
        }

        out.set("complete", ctx.phase.is_terminal());
        out
    }

    fn gate_open(&self, next: Phase, ctx: &TickContext<'_>) -> bool {
        // Leaving the search requires every candidate to have been shown.
        if ctx.is_in(Phase::Search) && next != Phase::Search {
            return self.evaluated(ctx) == self.search.len();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{FlagValue, Problem, ProblemSpec};

    fn problem(a: f64, b: f64, c: f64) -> Result<FactoringProblem, InvalidProblemError> {
        match Problem::validate(&ProblemSpec::new(ProblemKind::Factoring, vec![a, b, c]))? {
            Problem::Factoring(p) => Ok(p),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_monic_factoring() {
        let p = problem(1.0, 7.0, 12.0).unwrap();
        let f = p.factored().unwrap();
        assert_eq!(f.to_string(), "(x + 3)(x + 4)");
        assert_eq!(
            f.roots(),
            vec![Fraction { num: -3, den: 1 }, Fraction { num: -4, den: 1 }]
        );
    }

    #[test]
    fn test_non_monic_factoring() {
        // 2x² + 7x + 3 = (2x + 1)(x + 3)
        let p = problem(2.0, 7.0, 3.0).unwrap();
        let f = p.factored().unwrap();
        let (g1, g2) = f.first;
        let (h1, h2) = f.second;
        assert_eq!(g1 * h1, 2);
        assert_eq!(g1 * h2 + g2 * h1, 7);
        assert_eq!(g2 * h2, 3);
    }

    #[test]
    fn test_negative_leading_coefficient() {
        // -x² + x + 6 = -(x - 3)(x + 2)
        let p = problem(-1.0, 1.0, 6.0).unwrap();
        let f = p.factored().unwrap();
        let (g1, g2) = f.first;
        let (h1, h2) = f.second;
        assert_eq!(g1 * h1, -1);
        assert_eq!(g1 * h2 + g2 * h1, 1);
        assert_eq!(g2 * h2, 6);
    }

    #[test]
    fn test_zero_constant() {
        let p = problem(3.0, 6.0, 0.0).unwrap();
        let f = p.factored().unwrap();
        let (g1, g2) = f.first;
        let (h1, h2) = f.second;
        assert_eq!(g1 * h1, 3);
        assert_eq!(g1 * h2 + g2 * h1, 6);
        assert_eq!(g2 * h2, 0);
    }

    #[test]
    fn test_not_factorable_timeline() {
        let p = problem(1.0, 1.0, 1.0).unwrap();
        assert!(p.factored().is_none());
        let w = p.walkthrough(Pacing::NORMAL).unwrap();
        assert!(w.timeline.contains(Phase::NotFactorable));
        assert!(!w.timeline.contains(Phase::Factored));
    }

    #[test]
    fn test_roots_phase_requires_flag() {
        let spec = ProblemSpec::new(ProblemKind::Factoring, vec![1.0, 5.0, 6.0])
            .with_flag("show_roots", FlagValue::Bool(true));
        let w = Problem::validate(&spec)
            .unwrap()
            .walkthrough(Pacing::NORMAL)
            .unwrap();
        assert!(w.timeline.contains(Phase::Roots));

        let w = problem(1.0, 5.0, 6.0)
            .unwrap()
            .walkthrough(Pacing::NORMAL)
            .unwrap();
        assert!(!w.timeline.contains(Phase::Roots));
    }

    #[test]
    fn test_zero_leading_coefficient_rejected() {
        assert_eq!(
            problem(0.0, 2.0, 1.0),
            Err(InvalidProblemError::ZeroLeadingCoefficient)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(problem(1.0, 7.0, 12.0).unwrap().to_string(), "x² + 7x + 12");
        assert_eq!(problem(-2.0, -1.0, 0.0).unwrap().to_string(), "-2x² - x");
    }
}
