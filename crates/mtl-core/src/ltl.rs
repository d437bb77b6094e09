//! Lowering of bounded MTL formulas to plain LTL (unit-step temporal
//! operators only), for handing off to an external checker that only
//! understands `Next`/`Until`.
//!
//! `Eventually`/`Always` over a bounded interval `[a, b]` unroll into `b - a`
//! nested `Or`/`Next` (resp. `And`/`Next`) steps then `a` leading `Next`s; an
//! unbounded interval keeps the corresponding LTL operator directly.
//! `Until[a, b]` unrolls into a disjunction of "hold `left` for `i` steps then
//! `right`" terms for `i` in `0..=b-a`, again prefixed by `a` `Next`s; an
//! unbounded `Until` lowers to a single `Next^a (left U right)`. `Release` is
//! never primitive here — it lowers via the same duality Marking already
//! uses, `l R r == !(!l U !r)`.

use crate::formula::Formula;
use crate::interval::Hi;
use std::fmt;
use std::rc::Rc;

/// An LTL formula: MTL with only unit-step temporal operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ltl {
    True,
    False,
    Prop(Rc<str>),
    Not(Rc<Ltl>),
    Next(Rc<Ltl>),
    And(Rc<Ltl>, Rc<Ltl>),
    Or(Rc<Ltl>, Rc<Ltl>),
    Implies(Rc<Ltl>, Rc<Ltl>),
    Eventually(Rc<Ltl>),
    Always(Rc<Ltl>),
    Until(Rc<Ltl>, Rc<Ltl>),
}

impl Ltl {
    fn not(f: Rc<Ltl>) -> Rc<Ltl> {
        Rc::new(Ltl::Not(f))
    }
    fn next(f: Rc<Ltl>) -> Rc<Ltl> {
        Rc::new(Ltl::Next(f))
    }
    fn and(l: Rc<Ltl>, r: Rc<Ltl>) -> Rc<Ltl> {
        Rc::new(Ltl::And(l, r))
    }
    fn or(l: Rc<Ltl>, r: Rc<Ltl>) -> Rc<Ltl> {
        Rc::new(Ltl::Or(l, r))
    }
}

impl fmt::Display for Ltl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ltl::True => write!(f, "TRUE"),
            Ltl::False => write!(f, "FALSE"),
            Ltl::Prop(name) => write!(f, "{name}"),
            Ltl::Not(g) => write!(f, "!({g})"),
            Ltl::Next(g) => write!(f, "X ({g})"),
            Ltl::And(l, r) => write!(f, "({l} & {r})"),
            Ltl::Or(l, r) => write!(f, "({l} | {r})"),
            Ltl::Implies(l, r) => write!(f, "({l} -> {r})"),
            Ltl::Eventually(g) => write!(f, "F ({g})"),
            Ltl::Always(g) => write!(f, "G ({g})"),
            Ltl::Until(l, r) => write!(f, "({l} U {r})"),
        }
    }
}

fn apply_next_k(mut f: Rc<Ltl>, k: u64) -> Rc<Ltl> {
    for _ in 0..k {
        f = Ltl::next(f);
    }
    f
}

fn disjunction(mut terms: Vec<Rc<Ltl>>) -> Rc<Ltl> {
    let mut out = terms.pop().expect("at least one term");
    while let Some(t) = terms.pop() {
        out = Ltl::or(t, out);
    }
    out
}

/// Lower an MTL formula to LTL, unrolling every bounded temporal operator
/// into a finite chain of `Next`/`And`/`Or`. Total: every MTL node has an LTL
/// counterpart (an unbounded `Eventually`/`Always`/`Until` simply keeps its
/// LTL namesake; `Release` is rewritten through the `Until` duality first).
pub fn to_ltl(formula: &Formula) -> Rc<Ltl> {
    match formula {
        Formula::True => Rc::new(Ltl::True),
        Formula::False => Rc::new(Ltl::False),
        Formula::Prop(name) => Rc::new(Ltl::Prop(name.clone())),
        Formula::Not(inner) => Ltl::not(to_ltl(inner)),
        Formula::Next(inner) => Ltl::next(to_ltl(inner)),
        Formula::And(l, r) => Rc::new(Ltl::And(to_ltl(l), to_ltl(r))),
        Formula::Or(l, r) => Rc::new(Ltl::Or(to_ltl(l), to_ltl(r))),
        Formula::Implies(l, r) => Rc::new(Ltl::Implies(to_ltl(l), to_ltl(r))),
        Formula::Eventually(inner, interval) => {
            let subf = to_ltl(inner);
            let unrolled = match interval.hi {
                Hi::Infinite => Rc::new(Ltl::Eventually(subf)),
                Hi::Finite(hi) => {
                    let span = hi - interval.lo;
                    let mut out = subf.clone();
                    for _ in 0..span {
                        out = Ltl::or(subf.clone(), Ltl::next(out));
                    }
                    out
                }
            };
            apply_next_k(unrolled, interval.lo)
        }
        Formula::Always(inner, interval) => {
            let subf = to_ltl(inner);
            let unrolled = match interval.hi {
                Hi::Infinite => Rc::new(Ltl::Always(subf)),
                Hi::Finite(hi) => {
                    let span = hi - interval.lo;
                    let mut out = subf.clone();
                    for _ in 0..span {
                        out = Ltl::and(subf.clone(), Ltl::next(out));
                    }
                    out
                }
            };
            apply_next_k(unrolled, interval.lo)
        }
        Formula::Until(l, r, interval) => {
            let left = to_ltl(l);
            let right = to_ltl(r);
            match interval.hi {
                Hi::Infinite => apply_next_k(Rc::new(Ltl::Until(left, right)), interval.lo),
                Hi::Finite(hi) => {
                    let span = hi - interval.lo;
                    let terms = (0..=span)
                        .map(|i| {
                            let mut out = right.clone();
                            for _ in 0..i {
                                out = Ltl::and(left.clone(), Ltl::next(out));
                            }
                            out
                        })
                        .collect();
                    apply_next_k(disjunction(terms), interval.lo)
                }
            }
        }
        Formula::Release(l, r, interval) => {
            let rewrite = Formula::not(Formula::until(
                Formula::not(l.clone()),
                Formula::not(r.clone()),
                *interval,
            ));
            to_ltl(&rewrite)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use crate::marking::Marking;
    use crate::trace::Trace;
    use std::collections::BTreeSet;

    fn state(props: &[&str]) -> BTreeSet<Rc<str>> {
        props.iter().map(|p| Rc::from(*p)).collect()
    }

    /// Evaluate a lowered `Ltl` formula directly, re-using `Marking`'s boolean
    /// machinery by encoding `Ltl` back as an equivalent `Formula` with unit
    /// intervals (so unrolled `Next`/`Until` chains can be spot-checked
    /// against `Marking`'s evaluation of the original bounded MTL formula).
    fn ltl_holds(f: &Ltl, trace: &Trace, t: usize) -> bool {
        match f {
            Ltl::True => true,
            Ltl::False => false,
            Ltl::Prop(name) => trace.holds(t, name),
            Ltl::Not(g) => !ltl_holds(g, trace, t),
            Ltl::Next(g) => ltl_holds(g, trace, trace.idx(t + 1)),
            Ltl::And(l, r) => ltl_holds(l, trace, t) && ltl_holds(r, trace, t),
            Ltl::Or(l, r) => ltl_holds(l, trace, t) || ltl_holds(r, trace, t),
            Ltl::Implies(l, r) => !ltl_holds(l, trace, t) || ltl_holds(r, trace, t),
            Ltl::Eventually(g) => {
                let bound = trace.right_idx(t);
                (t..=bound).any(|i| ltl_holds(g, trace, trace.idx(i)))
            }
            Ltl::Always(g) => {
                let bound = trace.right_idx(t);
                (t..=bound).all(|i| ltl_holds(g, trace, trace.idx(i)))
            }
            Ltl::Until(l, r) => {
                let bound = trace.right_idx(t);
                (t..=bound).any(|i| {
                    ltl_holds(r, trace, trace.idx(i)) && (t..i).all(|k| ltl_holds(l, trace, trace.idx(k)))
                })
            }
        }
    }

    #[test]
    fn bounded_eventually_lowering_agrees_with_marking() {
        let trace = Trace::lasso(vec![state(&[]), state(&[]), state(&["p"])], 2).unwrap();
        let formula = Formula::eventually(Formula::prop("p"), Interval::bounded(0, 2).unwrap());
        let lowered = to_ltl(&formula);
        let marking = Marking::new(&trace);
        for t in 0..trace.len() {
            assert_eq!(
                marking.get(&formula, t).unwrap(),
                ltl_holds(&lowered, &trace, t),
                "position {t} disagreed"
            );
        }
    }

    #[test]
    fn bounded_until_lowering_agrees_with_marking() {
        let trace = Trace::lasso(
            vec![state(&["a"]), state(&["a"]), state(&["b"]), state(&[])],
            1,
        )
        .unwrap();
        let formula = Formula::until(
            Formula::prop("a"),
            Formula::prop("b"),
            Interval::bounded(0, 3).unwrap(),
        );
        let lowered = to_ltl(&formula);
        let marking = Marking::new(&trace);
        for t in 0..trace.len() {
            assert_eq!(
                marking.get(&formula, t).unwrap(),
                ltl_holds(&lowered, &trace, t),
                "position {t} disagreed"
            );
        }
    }

    #[test]
    fn release_lowers_through_until_duality() {
        let trace = Trace::lasso(vec![state(&["b"]), state(&["a", "b"]), state(&["b"])], 2).unwrap();
        let formula = Formula::release(
            Formula::prop("a"),
            Formula::prop("b"),
            Interval::bounded(0, 1).unwrap(),
        );
        let lowered = to_ltl(&formula);
        let marking = Marking::new(&trace);
        for t in 0..trace.len() {
            assert_eq!(
                marking.get(&formula, t).unwrap(),
                ltl_holds(&lowered, &trace, t),
                "position {t} disagreed"
            );
        }
    }
}
