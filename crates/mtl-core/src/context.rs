//! One-hole MTL contexts: the zipper used to locate and rewrite a target
//! subformula inside a larger formula.

use crate::error::{WeakenError, WeakenResult};
use crate::formula::{fmt_interval, Formula};
use crate::interval::Interval;
use std::fmt;
use std::rc::Rc;

/// A formula with exactly one hole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ctx {
    Hole,
    Not(Box<Ctx>),
    AndLeft(Box<Ctx>, Rc<Formula>),
    AndRight(Rc<Formula>, Box<Ctx>),
    OrLeft(Box<Ctx>, Rc<Formula>),
    OrRight(Rc<Formula>, Box<Ctx>),
    ImpliesLeft(Box<Ctx>, Rc<Formula>),
    ImpliesRight(Rc<Formula>, Box<Ctx>),
    Next(Box<Ctx>),
    Eventually(Box<Ctx>, Interval),
    Always(Box<Ctx>, Interval),
    UntilLeft(Box<Ctx>, Rc<Formula>, Interval),
    UntilRight(Rc<Formula>, Box<Ctx>, Interval),
    ReleaseLeft(Box<Ctx>, Rc<Formula>, Interval),
    ReleaseRight(Rc<Formula>, Box<Ctx>, Interval),
}

/// `+` if the hole lies under an even number of negations, `-` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Polarity::Positive)
    }
}

/// Rebuild the full formula by filling `c`'s hole with `f`. Total.
pub fn substitute(c: &Ctx, f: Rc<Formula>) -> Rc<Formula> {
    match c {
        Ctx::Hole => f,
        Ctx::Not(inner) => Formula::not(substitute(inner, f)),
        Ctx::AndLeft(inner, right) => Formula::and(substitute(inner, f), right.clone()),
        Ctx::AndRight(left, inner) => Formula::and(left.clone(), substitute(inner, f)),
        Ctx::OrLeft(inner, right) => Formula::or(substitute(inner, f), right.clone()),
        Ctx::OrRight(left, inner) => Formula::or(left.clone(), substitute(inner, f)),
        Ctx::ImpliesLeft(inner, right) => Formula::implies(substitute(inner, f), right.clone()),
        Ctx::ImpliesRight(left, inner) => Formula::implies(left.clone(), substitute(inner, f)),
        Ctx::Next(inner) => Formula::next(substitute(inner, f)),
        Ctx::Eventually(inner, i) => Formula::eventually(substitute(inner, f), *i),
        Ctx::Always(inner, i) => Formula::always(substitute(inner, f), *i),
        Ctx::UntilLeft(inner, right, i) => {
            Formula::until(substitute(inner, f), right.clone(), *i)
        }
        Ctx::UntilRight(left, inner, i) => Formula::until(left.clone(), substitute(inner, f), *i),
        Ctx::ReleaseLeft(inner, right, i) => {
            Formula::release(substitute(inner, f), right.clone(), *i)
        }
        Ctx::ReleaseRight(left, inner, i) => {
            Formula::release(left.clone(), substitute(inner, f), *i)
        }
    }
}

/// Recover the child-index sequence (`0` = left/only operand, `1` = right)
/// that navigates from the formula's root down to `c`'s hole.
pub fn path(c: &Ctx) -> Vec<usize> {
    match c {
        Ctx::Hole => vec![],
        Ctx::Not(inner) | Ctx::Next(inner) => {
            let mut p = vec![0];
            p.extend(path(inner));
            p
        }
        Ctx::Eventually(inner, _) | Ctx::Always(inner, _) => {
            let mut p = vec![0];
            p.extend(path(inner));
            p
        }
        Ctx::AndLeft(inner, _)
        | Ctx::OrLeft(inner, _)
        | Ctx::ImpliesLeft(inner, _)
        | Ctx::UntilLeft(inner, _, _)
        | Ctx::ReleaseLeft(inner, _, _) => {
            let mut p = vec![0];
            p.extend(path(inner));
            p
        }
        Ctx::AndRight(_, inner)
        | Ctx::OrRight(_, inner)
        | Ctx::ImpliesRight(_, inner)
        | Ctx::UntilRight(_, inner, _)
        | Ctx::ReleaseRight(_, inner, _) => {
            let mut p = vec![1];
            p.extend(path(inner));
            p
        }
    }
}

fn split_aux(f: &Rc<Formula>, indices: &[usize], idx: usize) -> WeakenResult<(Ctx, Rc<Formula>)> {
    if idx == indices.len() {
        return Ok((Ctx::Hole, f.clone()));
    }
    let bad = || WeakenError::InvalidPath {
        path: indices.to_vec(),
        at: idx,
    };
    match f.as_ref() {
        Formula::Not(inner) => {
            if indices[idx] != 0 {
                return Err(bad());
            }
            let (ctx, sub) = split_aux(inner, indices, idx + 1)?;
            Ok((Ctx::Not(Box::new(ctx)), sub))
        }
        Formula::Next(inner) => {
            if indices[idx] != 0 {
                return Err(bad());
            }
            let (ctx, sub) = split_aux(inner, indices, idx + 1)?;
            Ok((Ctx::Next(Box::new(ctx)), sub))
        }
        Formula::Eventually(inner, i) => {
            if indices[idx] != 0 {
                return Err(bad());
            }
            let (ctx, sub) = split_aux(inner, indices, idx + 1)?;
            Ok((Ctx::Eventually(Box::new(ctx), *i), sub))
        }
        Formula::Always(inner, i) => {
            if indices[idx] != 0 {
                return Err(bad());
            }
            let (ctx, sub) = split_aux(inner, indices, idx + 1)?;
            Ok((Ctx::Always(Box::new(ctx), *i), sub))
        }
        Formula::And(l, r) => match indices[idx] {
            0 => {
                let (ctx, sub) = split_aux(l, indices, idx + 1)?;
                Ok((Ctx::AndLeft(Box::new(ctx), r.clone()), sub))
            }
            1 => {
                let (ctx, sub) = split_aux(r, indices, idx + 1)?;
                Ok((Ctx::AndRight(l.clone(), Box::new(ctx)), sub))
            }
            _ => Err(bad()),
        },
        Formula::Or(l, r) => match indices[idx] {
            0 => {
                let (ctx, sub) = split_aux(l, indices, idx + 1)?;
                Ok((Ctx::OrLeft(Box::new(ctx), r.clone()), sub))
            }
            1 => {
                let (ctx, sub) = split_aux(r, indices, idx + 1)?;
                Ok((Ctx::OrRight(l.clone(), Box::new(ctx)), sub))
            }
            _ => Err(bad()),
        },
        Formula::Implies(l, r) => match indices[idx] {
            0 => {
                let (ctx, sub) = split_aux(l, indices, idx + 1)?;
                Ok((Ctx::ImpliesLeft(Box::new(ctx), r.clone()), sub))
            }
            1 => {
                let (ctx, sub) = split_aux(r, indices, idx + 1)?;
                Ok((Ctx::ImpliesRight(l.clone(), Box::new(ctx)), sub))
            }
            _ => Err(bad()),
        },
        Formula::Until(l, r, i) => match indices[idx] {
            0 => {
                let (ctx, sub) = split_aux(l, indices, idx + 1)?;
                Ok((Ctx::UntilLeft(Box::new(ctx), r.clone(), *i), sub))
            }
            1 => {
                let (ctx, sub) = split_aux(r, indices, idx + 1)?;
                Ok((Ctx::UntilRight(l.clone(), Box::new(ctx), *i), sub))
            }
            _ => Err(bad()),
        },
        Formula::Release(l, r, i) => match indices[idx] {
            0 => {
                let (ctx, sub) = split_aux(l, indices, idx + 1)?;
                Ok((Ctx::ReleaseLeft(Box::new(ctx), r.clone(), *i), sub))
            }
            1 => {
                let (ctx, sub) = split_aux(r, indices, idx + 1)?;
                Ok((Ctx::ReleaseRight(l.clone(), Box::new(ctx), *i), sub))
            }
            _ => Err(bad()),
        },
        Formula::True | Formula::False | Formula::Prop(_) => Err(bad()),
    }
}

/// Split `formula` at `path` into `(context, subformula)` such that
/// `substitute(context, subformula) == formula`.
pub fn split(formula: &Rc<Formula>, path: &[usize]) -> WeakenResult<(Ctx, Rc<Formula>)> {
    split_aux(formula, path, 0)
}

/// Negate a formula by one level, wrapping it in `Not`. Used when
/// materialising a negated sibling operand during PNNF rewriting; the result
/// need not be in full NNF itself since [`crate::marking::Marking`] evaluates
/// `Not` nodes directly.
fn not_of(f: Rc<Formula>) -> Rc<Formula> {
    Formula::not(f)
}

/// Dualize a temporal node: `Eventually<->Always`, `Until<->Release`, operands
/// negated. The interval is carried over unchanged.
fn dual(f: &Rc<Formula>) -> Rc<Formula> {
    match f.as_ref() {
        Formula::Eventually(operand, i) => Formula::always(not_of(operand.clone()), *i),
        Formula::Always(operand, i) => Formula::eventually(not_of(operand.clone()), *i),
        Formula::Until(l, r, i) => Formula::release(not_of(l.clone()), not_of(r.clone()), *i),
        Formula::Release(l, r, i) => Formula::until(not_of(l.clone()), not_of(r.clone()), *i),
        other => Rc::new(other.clone()),
    }
}

/// Push negation through `c` until its hole has positive polarity, threading
/// `negate` as the running parity (true = there is a pending Not that must be
/// pushed further towards the hole). Returns the rewritten context together
/// with the parity that remains once the hole is reached.
fn pnnf_rec(c: &Ctx, negate: bool) -> (Ctx, bool) {
    match c {
        Ctx::Hole => (Ctx::Hole, negate),
        Ctx::Not(inner) => {
            let (ctx, final_negate) = pnnf_rec(inner, !negate);
            (ctx, final_negate)
        }
        Ctx::AndLeft(inner, sibling) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::OrLeft(Box::new(child), not_of(sibling.clone()))
            } else {
                Ctx::AndLeft(Box::new(child), sibling.clone())
            };
            (ctx, final_negate)
        }
        Ctx::AndRight(sibling, inner) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::OrRight(not_of(sibling.clone()), Box::new(child))
            } else {
                Ctx::AndRight(sibling.clone(), Box::new(child))
            };
            (ctx, final_negate)
        }
        Ctx::OrLeft(inner, sibling) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::AndLeft(Box::new(child), not_of(sibling.clone()))
            } else {
                Ctx::OrLeft(Box::new(child), sibling.clone())
            };
            (ctx, final_negate)
        }
        Ctx::OrRight(sibling, inner) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::AndRight(not_of(sibling.clone()), Box::new(child))
            } else {
                Ctx::OrRight(sibling.clone(), Box::new(child))
            };
            (ctx, final_negate)
        }
        // Implies always desugars into Or/And here, regardless of the
        // incoming `negate`: the left operand carries an inherent negation
        // (l -> r == !l | r), so its child parity always flips; the right
        // operand does not, so its child parity is preserved.
        Ctx::ImpliesLeft(inner, sibling) => {
            let (child, final_negate) = pnnf_rec(inner, !negate);
            let ctx = if negate {
                Ctx::AndLeft(Box::new(child), not_of(sibling.clone()))
            } else {
                Ctx::OrLeft(Box::new(child), sibling.clone())
            };
            (ctx, final_negate)
        }
        Ctx::ImpliesRight(sibling, inner) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::AndRight(sibling.clone(), Box::new(child))
            } else {
                Ctx::OrRight(not_of(sibling.clone()), Box::new(child))
            };
            (ctx, final_negate)
        }
        Ctx::Next(inner) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            (Ctx::Next(Box::new(child)), final_negate)
        }
        Ctx::Eventually(inner, i) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::Always(Box::new(child), *i)
            } else {
                Ctx::Eventually(Box::new(child), *i)
            };
            (ctx, final_negate)
        }
        Ctx::Always(inner, i) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::Eventually(Box::new(child), *i)
            } else {
                Ctx::Always(Box::new(child), *i)
            };
            (ctx, final_negate)
        }
        Ctx::UntilLeft(inner, sibling, i) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::ReleaseLeft(Box::new(child), not_of(sibling.clone()), *i)
            } else {
                Ctx::UntilLeft(Box::new(child), sibling.clone(), *i)
            };
            (ctx, final_negate)
        }
        Ctx::UntilRight(sibling, inner, i) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::ReleaseRight(not_of(sibling.clone()), Box::new(child), *i)
            } else {
                Ctx::UntilRight(sibling.clone(), Box::new(child), *i)
            };
            (ctx, final_negate)
        }
        Ctx::ReleaseLeft(inner, sibling, i) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::UntilLeft(Box::new(child), not_of(sibling.clone()), *i)
            } else {
                Ctx::ReleaseLeft(Box::new(child), sibling.clone(), *i)
            };
            (ctx, final_negate)
        }
        Ctx::ReleaseRight(sibling, inner, i) => {
            let (child, final_negate) = pnnf_rec(inner, negate);
            let ctx = if negate {
                Ctx::UntilRight(not_of(sibling.clone()), Box::new(child), *i)
            } else {
                Ctx::ReleaseRight(sibling.clone(), Box::new(child), *i)
            };
            (ctx, final_negate)
        }
    }
}

/// Transform `(c, g)` into an equivalent pair `(c', g')` where `c'` has
/// positive polarity at its hole, negating `g` via [`dual`] if needed.
pub fn partial_nnf(c: &Ctx, g: &Rc<Formula>) -> (Ctx, Rc<Formula>) {
    let (ctx, negate) = pnnf_rec(c, false);
    let subformula = if negate { dual(g) } else { g.clone() };
    (ctx, subformula)
}

/// The polarity of `c`, independent of any rewriting (used for assertions and
/// by callers that only need to know the sign, not the rewritten context).
pub fn polarity(c: &Ctx) -> Polarity {
    let (_, negate) = pnnf_rec(c, false);
    if negate {
        Polarity::Negative
    } else {
        Polarity::Positive
    }
}

impl fmt::Display for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ctx::Hole => write!(f, "[-]"),
            Ctx::Not(c) => write!(f, "!({c})"),
            Ctx::AndLeft(c, right) => write!(f, "({c} & {right})"),
            Ctx::AndRight(left, c) => write!(f, "({left} & {c})"),
            Ctx::OrLeft(c, right) => write!(f, "({c} | {right})"),
            Ctx::OrRight(left, c) => write!(f, "({left} | {c})"),
            Ctx::ImpliesLeft(c, right) => write!(f, "({c} -> {right})"),
            Ctx::ImpliesRight(left, c) => write!(f, "({left} -> {c})"),
            Ctx::Next(c) => write!(f, "X ({c})"),
            Ctx::Eventually(c, i) => write!(f, "F{} ({c})", fmt_interval(i)),
            Ctx::Always(c, i) => write!(f, "G{} ({c})", fmt_interval(i)),
            Ctx::UntilLeft(c, right, i) => {
                write!(f, "({c} U{} {right})", fmt_interval(i))
            }
            Ctx::UntilRight(left, c, i) => {
                write!(f, "({left} U{} {c})", fmt_interval(i))
            }
            Ctx::ReleaseLeft(c, right, i) => {
                write!(f, "({c} R{} {right})", fmt_interval(i))
            }
            Ctx::ReleaseRight(left, c, i) => {
                write!(f, "({left} R{} {c})", fmt_interval(i))
            }
        }
    }
}
