//! Bottom-up, memoised marking of an MTL formula over a [`Trace`].
//!
//! Each subformula is evaluated once into a boolean vector indexed by raw
//! trace offset, cached by structural identity of the formula node, with
//! `Trace::idx` doing the cyclic wraparound. `Release` is evaluated through
//! the `Until` duality (`l R r == !(!l U !r)`) rather than a hand-rolled
//! fixpoint, since `Not`/`Until` are both already primitive operators here.

use crate::error::{WeakenError, WeakenResult};
use crate::formula::Formula;
use crate::interval::{Hi, Interval};
use crate::trace::Trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates formulas over a fixed trace, caching each subformula's boolean
/// vector the first time it is requested.
pub struct Marking<'t> {
    trace: &'t Trace,
    cache: RefCell<HashMap<Rc<Formula>, Rc<Vec<bool>>>>,
}

impl<'t> Marking<'t> {
    pub fn new(trace: &'t Trace) -> Self {
        Self {
            trace,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn trace(&self) -> &'t Trace {
        self.trace
    }

    /// Whether `f` holds at time `i`.
    pub fn get(&self, f: &Rc<Formula>, i: usize) -> WeakenResult<bool> {
        let offset = self
            .trace
            .idx_checked(i)
            .ok_or(WeakenError::NoLoopDetected)?;
        let vec = self.vector(f)?;
        Ok(vec[offset])
    }

    fn vector(&self, f: &Rc<Formula>) -> WeakenResult<Rc<Vec<bool>>> {
        if let Some(cached) = self.cache.borrow().get(f) {
            return Ok(cached.clone());
        }
        let computed = Rc::new(self.compute(f)?);
        self.cache.borrow_mut().insert(f.clone(), computed.clone());
        Ok(computed)
    }

    fn compute(&self, f: &Rc<Formula>) -> WeakenResult<Vec<bool>> {
        let len = self.trace.len();
        match f.as_ref() {
            Formula::True => Ok(vec![true; len]),
            Formula::False => Ok(vec![false; len]),
            Formula::Prop(name) => Ok((0..len).map(|t| self.trace.holds(t, name)).collect()),
            Formula::Not(inner) => {
                let child = self.vector(inner)?;
                Ok(child.iter().map(|b| !b).collect())
            }
            Formula::And(l, r) => {
                let lv = self.vector(l)?;
                let rv = self.vector(r)?;
                Ok((0..len).map(|t| lv[t] && rv[t]).collect())
            }
            Formula::Or(l, r) => {
                let lv = self.vector(l)?;
                let rv = self.vector(r)?;
                Ok((0..len).map(|t| lv[t] || rv[t]).collect())
            }
            Formula::Implies(l, r) => {
                let lv = self.vector(l)?;
                let rv = self.vector(r)?;
                Ok((0..len).map(|t| !lv[t] || rv[t]).collect())
            }
            Formula::Next(inner) => {
                let child = self.vector(inner)?;
                let mut out = Vec::with_capacity(len);
                for t in 0..len {
                    let offset = self
                        .trace
                        .idx_checked(t + 1)
                        .ok_or(WeakenError::NoLoopDetected)?;
                    out.push(child[offset]);
                }
                Ok(out)
            }
            Formula::Eventually(inner, interval) => {
                let child = self.vector(inner)?;
                self.eventually_vector(&child, *interval)
            }
            Formula::Always(inner, interval) => {
                let child = self.vector(inner)?;
                let ev = self.eventually_vector(
                    &child.iter().map(|b| !b).collect::<Vec<_>>(),
                    *interval,
                )?;
                Ok(ev.iter().map(|b| !b).collect())
            }
            Formula::Until(l, r, interval) => {
                let lv = self.vector(l)?;
                let rv = self.vector(r)?;
                self.until_vector(&lv, &rv, *interval)
            }
            Formula::Release(l, r, interval) => {
                // l R r == !(!l U !r)
                let not_l: Vec<bool> = self.vector(l)?.iter().map(|b| !b).collect();
                let not_r: Vec<bool> = self.vector(r)?.iter().map(|b| !b).collect();
                let until = self.until_vector(&not_l, &not_r, *interval)?;
                Ok(until.iter().map(|b| !b).collect())
            }
        }
    }

    /// Upper bound (inclusive, absolute) of the window scanned from `t` for
    /// interval `[lo, hi]`: `t + hi` when bounded, otherwise `right_idx(t+lo)`
    /// — the last point before the trace's cyclic suffix repeats, measured
    /// from the start of the range rather than from `t` itself.
    pub(crate) fn window_end(&self, t: usize, interval: Interval) -> WeakenResult<usize> {
        match interval.hi {
            Hi::Finite(hi) => Ok(t + hi as usize),
            Hi::Infinite => {
                if !self.trace.is_lasso() {
                    return Err(WeakenError::NoLoopDetected);
                }
                let lo = interval.lo as usize;
                let offset = self
                    .trace
                    .idx_checked(t + lo)
                    .ok_or(WeakenError::NoLoopDetected)?;
                Ok(self.trace.right_idx(offset))
            }
        }
    }

    fn eventually_vector(&self, child: &[bool], interval: Interval) -> WeakenResult<Vec<bool>> {
        let len = self.trace.len();
        let lo = interval.lo as usize;
        let mut out = Vec::with_capacity(len);
        for t in 0..len {
            let end = self.window_end(t, interval)?;
            let mut holds = false;
            if t + lo <= end {
                let mut s = lo;
                loop {
                    let offset = self
                        .trace
                        .idx_checked(t + s)
                        .ok_or(WeakenError::NoLoopDetected)?;
                    if child[offset] {
                        holds = true;
                        break;
                    }
                    if t + s >= end {
                        break;
                    }
                    s += 1;
                }
            }
            out.push(holds);
        }
        Ok(out)
    }

    fn until_vector(&self, lv: &[bool], rv: &[bool], interval: Interval) -> WeakenResult<Vec<bool>> {
        let len = self.trace.len();
        let lo = interval.lo as usize;
        let mut out = Vec::with_capacity(len);
        for t in 0..len {
            let end = self.window_end(t, interval)?;
            let mut holds = false;
            if t + lo <= end {
                let mut s = lo;
                loop {
                    let offset = self
                        .trace
                        .idx_checked(t + s)
                        .ok_or(WeakenError::NoLoopDetected)?;
                    if rv[offset] {
                        holds = true;
                        break;
                    }
                    if !lv[offset] {
                        break;
                    }
                    if t + s >= end {
                        break;
                    }
                    s += 1;
                }
            }
            out.push(holds);
        }
        Ok(out)
    }
}
