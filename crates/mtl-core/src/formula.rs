//! MTL abstract syntax
//!
//! Formulas are immutable trees compared and hashed structurally, so that they
//! can key the [`crate::marking::Marking`] memo table. `Rc` gives cheap sharing of
//! common subtrees (the same proposition recurring under several operators is the
//! normal case for real-world temporal logic formulas).

use crate::interval::Interval;
use std::fmt;
use std::rc::Rc;

/// An MTL formula node. Cloning is O(1) (`Rc` internally for compound formulas).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    Prop(Rc<str>),
    Not(Rc<Formula>),
    Next(Rc<Formula>),
    And(Rc<Formula>, Rc<Formula>),
    Or(Rc<Formula>, Rc<Formula>),
    Implies(Rc<Formula>, Rc<Formula>),
    Eventually(Rc<Formula>, Interval),
    Always(Rc<Formula>, Interval),
    Until(Rc<Formula>, Rc<Formula>, Interval),
    Release(Rc<Formula>, Rc<Formula>, Interval),
}

impl Formula {
    pub fn prop(name: impl Into<Rc<str>>) -> Rc<Formula> {
        Rc::new(Formula::Prop(name.into()))
    }

    pub fn not(f: Rc<Formula>) -> Rc<Formula> {
        Rc::new(Formula::Not(f))
    }

    pub fn next(f: Rc<Formula>) -> Rc<Formula> {
        Rc::new(Formula::Next(f))
    }

    pub fn and(l: Rc<Formula>, r: Rc<Formula>) -> Rc<Formula> {
        Rc::new(Formula::And(l, r))
    }

    pub fn or(l: Rc<Formula>, r: Rc<Formula>) -> Rc<Formula> {
        Rc::new(Formula::Or(l, r))
    }

    pub fn implies(l: Rc<Formula>, r: Rc<Formula>) -> Rc<Formula> {
        Rc::new(Formula::Implies(l, r))
    }

    pub fn eventually(f: Rc<Formula>, i: Interval) -> Rc<Formula> {
        Rc::new(Formula::Eventually(f, i))
    }

    pub fn always(f: Rc<Formula>, i: Interval) -> Rc<Formula> {
        Rc::new(Formula::Always(f, i))
    }

    pub fn until(l: Rc<Formula>, r: Rc<Formula>, i: Interval) -> Rc<Formula> {
        Rc::new(Formula::Until(l, r, i))
    }

    pub fn release(l: Rc<Formula>, r: Rc<Formula>, i: Interval) -> Rc<Formula> {
        Rc::new(Formula::Release(l, r, i))
    }

    /// Name used in diagnostics (`WeakenError::UnsupportedWeakenTarget`, etc).
    pub fn node_name(&self) -> &'static str {
        match self {
            Formula::True => "True",
            Formula::False => "False",
            Formula::Prop(_) => "Prop",
            Formula::Not(_) => "Not",
            Formula::Next(_) => "Next",
            Formula::And(..) => "And",
            Formula::Or(..) => "Or",
            Formula::Implies(..) => "Implies",
            Formula::Eventually(..) => "Eventually",
            Formula::Always(..) => "Always",
            Formula::Until(..) => "Until",
            Formula::Release(..) => "Release",
        }
    }

    /// The operator's interval, for the four temporal node kinds.
    pub fn interval(&self) -> Option<Interval> {
        match self {
            Formula::Eventually(_, i) | Formula::Always(_, i) => Some(*i),
            Formula::Until(_, _, i) | Formula::Release(_, _, i) => Some(*i),
            _ => None,
        }
    }

    /// Rebuild this formula with a new interval, for the four temporal node kinds.
    pub fn with_interval(&self, new_interval: Interval) -> Rc<Formula> {
        match self {
            Formula::Eventually(f, _) => Formula::eventually(f.clone(), new_interval),
            Formula::Always(f, _) => Formula::always(f.clone(), new_interval),
            Formula::Until(l, r, _) => Formula::until(l.clone(), r.clone(), new_interval),
            Formula::Release(l, r, _) => Formula::release(l.clone(), r.clone(), new_interval),
            other => Rc::new(other.clone()),
        }
    }
}

pub(crate) fn fmt_interval(i: &Interval) -> String {
    if i.lo == 0 && i.is_unbounded() {
        String::new()
    } else {
        format!("{i}")
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "TRUE"),
            Formula::False => write!(f, "FALSE"),
            Formula::Prop(name) => write!(f, "{name}"),
            Formula::Not(g) => write!(f, "!({g})"),
            Formula::Next(g) => write!(f, "X ({g})"),
            Formula::And(l, r) => write!(f, "({l} & {r})"),
            Formula::Or(l, r) => write!(f, "({l} | {r})"),
            Formula::Implies(l, r) => write!(f, "({l} -> {r})"),
            Formula::Eventually(g, i) => write!(f, "F{} ({g})", fmt_interval(i)),
            Formula::Always(g, i) => write!(f, "G{} ({g})", fmt_interval(i)),
            Formula::Until(l, r, i) => write!(f, "({l} U{} {r})", fmt_interval(i)),
            Formula::Release(l, r, i) => write!(f, "({l} R{} {r})", fmt_interval(i)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_ignores_identity() {
        let a = Formula::and(Formula::prop("p"), Formula::prop("q"));
        let b = Formula::and(Formula::prop("p"), Formula::prop("q"));
        assert_eq!(a, b);
    }

    #[test]
    fn display_matches_surface_syntax() {
        let f = Formula::eventually(
            Formula::prop("a"),
            Interval::bounded(0, 2).unwrap(),
        );
        assert_eq!(f.to_string(), "F[0,2] (a)");
    }

    #[test]
    fn with_interval_rebuilds_only_temporal_nodes() {
        let f = Formula::always(Formula::prop("a"), Interval::default_unbounded());
        let g = f.with_interval(Interval::bounded(1, 3).unwrap());
        assert_eq!(g.interval(), Some(Interval::bounded(1, 3).unwrap()));
    }
}
