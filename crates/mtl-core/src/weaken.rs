//! Trace-guided interval weakening.
//!
//! A single recursion handles both polarities because
//! [`crate::context::partial_nnf`] normalises the context to positive
//! polarity first, collapsing what would otherwise be a doubled
//! positive/negative case split into one case per operator, with direct
//! weakening covering `Eventually`, `Always`, `Until` and `Release` alike.

use crate::context::{self, Ctx};
use crate::error::{WeakenError, WeakenResult};
use crate::formula::Formula;
use crate::interval::{Hi, Interval};
use crate::marking::Marking;
use crate::path::format_path;
use crate::pretty::NO_WEAKENING_MESSAGE;
use crate::trace::Trace;
use std::fmt;
use std::rc::Rc;

/// Outcome of attempting to weaken the temporal operator found at a path.
#[derive(Debug, Clone)]
pub struct WeakenOutcome {
    pub path: Vec<usize>,
    pub node: &'static str,
    pub original_interval: Interval,
    /// `None` when no candidate interval makes the formula hold at `at`.
    pub weakened_interval: Option<Interval>,
    /// The full formula with the weakened interval substituted in, if found.
    pub weakened_formula: Option<Rc<Formula>>,
}

impl fmt::Display for WeakenOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.weakened_interval {
            Some(interval) => write!(
                f,
                "path {}: {} {} -> {}",
                format_path(&self.path),
                self.node,
                self.original_interval,
                interval
            ),
            None => write!(f, "{NO_WEAKENING_MESSAGE}"),
        }
    }
}

fn require_temporal(f: &Rc<Formula>) -> WeakenResult<()> {
    match f.as_ref() {
        Formula::Eventually(..) | Formula::Always(..) | Formula::Until(..) | Formula::Release(..) => {
            Ok(())
        }
        other => Err(WeakenError::UnsupportedWeakenTarget {
            node: other.node_name(),
        }),
    }
}

/// Attempt to weaken the temporal operator at `path` inside `formula` so that
/// the whole formula holds at time `at` on `trace`, moving only the upper
/// endpoint of that operator's interval and minimising the distance moved.
pub fn weaken(
    formula: &Rc<Formula>,
    path: &[usize],
    trace: &Trace,
    at: usize,
) -> WeakenResult<WeakenOutcome> {
    let (ctx, target) = context::split(formula, path)?;
    require_temporal(&target)?;

    let (ctx2, target2) = context::partial_nnf(&ctx, &target);
    require_temporal(&target2)?;

    let node = target2.node_name();
    let original_interval = target2
        .interval()
        .expect("temporal node always carries an interval");

    let marking = Marking::new(trace);
    let weakened_interval = aux(&ctx2, &target2, original_interval, &marking, trace, at)?;
    let weakened_formula = weakened_interval
        .map(|iv| context::substitute(&ctx2, target2.with_interval(iv)));

    Ok(WeakenOutcome {
        path: path.to_vec(),
        node,
        original_interval,
        weakened_interval,
        weakened_formula,
    })
}

/// Resolve `Ctx::Hole`'s own polarity-normalised shape, exposed for callers
/// (e.g. the CLI) that want to display the PNNF-rewritten context without
/// running the full search.
pub fn normalise(formula: &Rc<Formula>, path: &[usize]) -> WeakenResult<(Ctx, Rc<Formula>)> {
    let (ctx, target) = context::split(formula, path)?;
    require_temporal(&target)?;
    Ok(context::partial_nnf(&ctx, &target))
}

/// The upper end of a scan range starting at `t` for `interval`: `t + hi`
/// when bounded, `trace.right_idx` of the wrapped position when `hi = ∞`.
fn scan_end(marking: &Marking, t: usize, interval: Interval) -> WeakenResult<usize> {
    marking.window_end(t, interval)
}

fn step(trace: &Trace, t: usize, i: usize) -> WeakenResult<usize> {
    trace.idx_checked(t + i).ok_or(WeakenError::NoLoopDetected)
}

/// "A weakening valid at trace-index `t`":
/// implemented as a single positive-polarity-only recursion over the
/// context's spine (PNNF has already removed `Not`/`Implies` from it).
fn aux(
    ctx: &Ctx,
    target: &Rc<Formula>,
    original: Interval,
    marking: &Marking,
    trace: &Trace,
    t: usize,
) -> WeakenResult<Option<Interval>> {
    match ctx {
        Ctx::Hole => direct_weaken(target, original, marking, trace, t),

        Ctx::AndLeft(inner, sibling) | Ctx::AndRight(sibling, inner) => {
            if !marking.get(sibling, t)? {
                return Ok(None);
            }
            aux(inner, target, original, marking, trace, t)
        }

        Ctx::OrLeft(inner, sibling) | Ctx::OrRight(sibling, inner) => {
            if marking.get(sibling, t)? {
                return Ok(Some(original));
            }
            aux(inner, target, original, marking, trace, t)
        }

        Ctx::ImpliesLeft(..) | Ctx::ImpliesRight(..) => {
            unreachable!("partial_nnf desugars Implies out of the context before weakening")
        }

        Ctx::Not(_) => unreachable!("partial_nnf leaves no Not above the hole"),

        Ctx::Next(inner) => {
            let shifted = step(trace, t, 1)?;
            aux(inner, target, original, marking, trace, shifted)
        }

        Ctx::Eventually(inner, interval) => {
            let end = scan_end(marking, t, *interval)?;
            let lo = interval.lo as usize;
            let mut best: Option<Interval> = None;
            if t + lo <= end {
                let mut i = lo;
                loop {
                    if let Some(candidate) = aux(inner, target, original, marking, trace, step(trace, t, i)?)? {
                        best = Some(match best {
                            None => candidate,
                            Some(b) if candidate.diff(&original) < b.diff(&original) => candidate,
                            Some(b) => b,
                        });
                    }
                    if t + i >= end {
                        break;
                    }
                    i += 1;
                }
            }
            Ok(best)
        }

        Ctx::Always(inner, interval) => {
            let end = scan_end(marking, t, *interval)?;
            let lo = interval.lo as usize;
            let mut worst: Option<Interval> = None;
            if t + lo <= end {
                let mut i = lo;
                loop {
                    match aux(inner, target, original, marking, trace, step(trace, t, i)?)? {
                        None => return Ok(None),
                        Some(candidate) => {
                            worst = Some(match worst {
                                None => candidate,
                                Some(w) if candidate.diff(&original) > w.diff(&original) => candidate,
                                Some(w) => w,
                            });
                        }
                    }
                    if t + i >= end {
                        break;
                    }
                    i += 1;
                }
            }
            Ok(worst)
        }

        Ctx::UntilLeft(inner, right, interval) => {
            // Scan increasing i; stop once the right operand witnesses the
            // Until (no further weakening of the left side is needed) or a
            // required position has no weakening at all.
            let end = scan_end(marking, t, *interval)?;
            let lo = interval.lo as usize;
            let mut acc: Option<Interval> = None;
            if t + lo <= end {
                let mut i = lo;
                loop {
                    let offset = step(trace, t, i)?;
                    if marking.get(right, t + i)? {
                        break;
                    }
                    match aux(inner, target, original, marking, trace, offset)? {
                        None => break,
                        Some(candidate) => {
                            acc = Some(match acc {
                                None => candidate,
                                Some(a) if candidate.diff(&original) > a.diff(&original) => candidate,
                                Some(a) => a,
                            });
                        }
                    }
                    if t + i >= end {
                        break;
                    }
                    i += 1;
                }
            }
            Ok(acc.or(Some(original)))
        }

        Ctx::UntilRight(left, inner, interval) => {
            // Accumulate candidates while the left operand holds; stop the
            // moment it fails (no further witnesses are possible beyond it).
            let end = scan_end(marking, t, *interval)?;
            let lo = interval.lo as usize;
            let mut acc: Option<Interval> = None;
            if t + lo <= end {
                let mut i = lo;
                loop {
                    let offset = step(trace, t, i)?;
                    if let Some(candidate) = aux(inner, target, original, marking, trace, offset)? {
                        acc = Some(match acc {
                            None => candidate,
                            Some(a) if candidate.diff(&original) < a.diff(&original) => candidate,
                            Some(a) => a,
                        });
                    }
                    if !marking.get(left, t + i)? {
                        break;
                    }
                    if t + i >= end {
                        break;
                    }
                    i += 1;
                }
            }
            Ok(acc)
        }

        Ctx::ReleaseLeft(inner, right, interval) => {
            // Scan increasing i; stop once the right operand fails (the
            // release is broken beyond that point).
            let end = scan_end(marking, t, *interval)?;
            let lo = interval.lo as usize;
            let mut acc: Option<Interval> = None;
            if t + lo <= end {
                let mut i = lo;
                loop {
                    let offset = step(trace, t, i)?;
                    if !marking.get(right, t + i)? {
                        break;
                    }
                    if let Some(candidate) = aux(inner, target, original, marking, trace, offset)? {
                        acc = Some(match acc {
                            None => candidate,
                            Some(a) if candidate.diff(&original) < a.diff(&original) => candidate,
                            Some(a) => a,
                        });
                    }
                    if t + i >= end {
                        break;
                    }
                    i += 1;
                }
            }
            Ok(acc)
        }

        Ctx::ReleaseRight(left, inner, interval) => {
            // Scan increasing i; stop as soon as the left operand discharges
            // the release, or a required position has no weakening.
            let end = scan_end(marking, t, *interval)?;
            let lo = interval.lo as usize;
            let mut acc: Option<Interval> = None;
            if t + lo <= end {
                let mut i = lo;
                loop {
                    let offset = step(trace, t, i)?;
                    match aux(inner, target, original, marking, trace, offset)? {
                        None => return Ok(None),
                        Some(candidate) => {
                            acc = Some(match acc {
                                None => candidate,
                                Some(a) if candidate.diff(&original) > a.diff(&original) => candidate,
                                Some(a) => a,
                            });
                        }
                    }
                    if marking.get(left, t + i)? {
                        break;
                    }
                    if t + i >= end {
                        break;
                    }
                    i += 1;
                }
            }
            Ok(acc)
        }
    }
}

/// Direct weakening of the target temporal operator itself, found at
/// `Ctx::Hole`. Only the upper endpoint moves; the lower endpoint is fixed.
fn direct_weaken(
    target: &Rc<Formula>,
    original: Interval,
    marking: &Marking,
    trace: &Trace,
    t: usize,
) -> WeakenResult<Option<Interval>> {
    match target.as_ref() {
        Formula::Eventually(child, interval) => {
            if interval.hi.is_infinite() {
                return Err(WeakenError::UnboundedDirectWeaken { node: "Eventually" });
            }
            let lo = interval.lo as usize;
            let bound = trace.right_idx(step(trace, t, lo)?);
            let mut i = lo;
            loop {
                if marking.get(child, step(trace, t, i)?)? {
                    let hi = interval.hi.finite().unwrap().max(i as u64);
                    return Ok(Some(Interval::bounded(interval.lo, hi)?));
                }
                if t + i >= bound {
                    break;
                }
                i += 1;
            }
            Ok(None)
        }
        Formula::Always(child, interval) => {
            let lo = interval.lo as usize;
            let scan_bound = match interval.hi {
                Hi::Finite(h) => t + h as usize,
                Hi::Infinite => trace.right_idx(step(trace, t, lo)?),
            };
            let mut i = lo;
            loop {
                if !marking.get(child, step(trace, t, i)?)? {
                    if i == lo {
                        return Ok(None);
                    }
                    return Ok(Some(Interval::bounded(interval.lo, (i - 1) as u64)?));
                }
                if t + i >= scan_bound {
                    break;
                }
                i += 1;
            }
            Ok(Some(original))
        }
        Formula::Until(l, r, interval) => {
            if interval.hi.is_infinite() {
                return Err(WeakenError::UnboundedDirectWeaken { node: "Until" });
            }
            let lo = interval.lo as usize;
            let hi = interval.hi.finite().unwrap();
            let mut i = lo;
            loop {
                let offset = step(trace, t, i)?;
                if marking.get(r, offset)? {
                    let widened = hi.max(i as u64);
                    return Ok(Some(Interval::bounded(interval.lo, widened)?));
                }
                if !marking.get(l, offset)? {
                    break;
                }
                if i >= hi as usize {
                    break;
                }
                i += 1;
            }
            Ok(None)
        }
        Formula::Release(l, r, interval) => {
            let lo = interval.lo as usize;
            let scan_bound = match interval.hi {
                Hi::Finite(h) => t + h as usize,
                Hi::Infinite => trace.right_idx(step(trace, t, lo)?),
            };
            let mut i = lo;
            loop {
                let offset = step(trace, t, i)?;
                if !marking.get(r, offset)? {
                    if i == lo {
                        return Ok(None);
                    }
                    return Ok(Some(Interval::bounded(interval.lo, (i - 1) as u64)?));
                }
                if marking.get(l, offset)? {
                    return Ok(Some(original));
                }
                if t + i >= scan_bound {
                    break;
                }
                i += 1;
            }
            Ok(Some(original))
        }
        other => Err(WeakenError::UnsupportedWeakenTarget {
            node: other.node_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::trace::Trace;
    use std::collections::BTreeSet;

    fn state(props: &[&str]) -> BTreeSet<Rc<str>> {
        props.iter().map(|p| Rc::from(*p)).collect()
    }

    // Scenario: F[0,1] p fails because p only becomes true at step 2;
    // widening the window to [0,2] should make it hold.
    #[test]
    fn weaken_eventually_widens_until_witness_found() {
        let trace = Trace::lasso(vec![state(&[]), state(&[]), state(&["p"])], 2).unwrap();
        let formula = parse("F[0,1] p").unwrap();
        let outcome = weaken(&formula, &[], &trace, 0).unwrap();
        assert_eq!(outcome.node, "Eventually");
        assert_eq!(outcome.weakened_interval, Some(Interval::bounded(0, 2).unwrap()));
    }

    // Scenario: G[0,2] p fails because p is false at step 2; narrowing to
    // [0,1] should make it hold.
    #[test]
    fn weaken_always_narrows_until_violation_excluded() {
        let trace = Trace::lasso(vec![state(&["p"]), state(&["p"]), state(&[])], 2).unwrap();
        let formula = parse("G[0,2] p").unwrap();
        let outcome = weaken(&formula, &[], &trace, 0).unwrap();
        assert_eq!(outcome.node, "Always");
        assert_eq!(outcome.weakened_interval, Some(Interval::bounded(0, 1).unwrap()));
    }

    // Nested F (F[0,0] p): widening the inner Eventually.
    #[test]
    fn weaken_nested_eventually_under_eventually() {
        let trace = Trace::lasso(
            vec![state(&[]), state(&[]), state(&[]), state(&["p"])],
            3,
        )
        .unwrap();
        let formula = parse("F[0,0] (F[0,1] p)").unwrap();
        let outcome = weaken(&formula, &[0], &trace, 0).unwrap();
        assert_eq!(outcome.node, "Eventually");
        assert!(outcome.weakened_interval.is_some());
    }

    // Weaken under negation: !F[0,0] p is the target context `!(hole)`; the
    // hole's subformula actually searched is the PNNF dual, Always.
    #[test]
    fn weaken_under_negation_dualizes_target() {
        let trace = Trace::lasso(vec![state(&["p"]), state(&[])], 1).unwrap();
        let formula = parse("! F[0,0] p").unwrap();
        let outcome = weaken(&formula, &[0], &trace, 0).unwrap();
        assert_eq!(outcome.node, "Always");
    }

    #[test]
    fn weaken_until_right_operand_path() {
        let trace = Trace::lasso(vec![state(&["a"]), state(&["a"]), state(&["b"])], 2).unwrap();
        let formula = parse("a U[0,0] b").unwrap();
        let outcome = weaken(&formula, &[], &trace, 0).unwrap();
        assert_eq!(outcome.node, "Until");
        assert!(outcome.weakened_interval.is_some());
    }

    #[test]
    fn no_weakening_exists_when_proposition_never_holds() {
        let trace = Trace::finite(vec![state(&[]), state(&[])]);
        let formula = parse("F[0,1] p").unwrap();
        let outcome = weaken(&formula, &[], &trace, 0).unwrap();
        assert_eq!(outcome.weakened_interval, None);
        assert_eq!(
            outcome.to_string(),
            "No suitable weakening of the interval exists"
        );
    }

    #[test]
    fn unsupported_target_errors() {
        let trace = Trace::finite(vec![state(&["p"])]);
        let formula = parse("p").unwrap();
        assert!(weaken(&formula, &[], &trace, 0).is_err());
    }

    #[test]
    fn weaken_and_context_fails_fast_when_sibling_false() {
        // a & F[0,0] p, with `a` false at t=0: the conjunction can never be
        // rescued by widening the right side alone.
        let trace = Trace::finite(vec![state(&[]), state(&["p"])]);
        let formula = parse("a & F[0,0] p").unwrap();
        let outcome = weaken(&formula, &[1], &trace, 0).unwrap();
        assert_eq!(outcome.weakened_interval, None);
    }

    #[test]
    fn weaken_or_context_short_circuits_when_sibling_true() {
        // a | F[0,0] p, with `a` true at t=0: no weakening is needed at all.
        let trace = Trace::finite(vec![state(&["a"])]);
        let formula = parse("a | F[0,0] p").unwrap();
        let outcome = weaken(&formula, &[1], &trace, 0).unwrap();
        assert_eq!(outcome.weakened_interval, Some(Interval::bounded(0, 0).unwrap()));
    }
}
