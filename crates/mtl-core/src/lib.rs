//! Trace-guided interval weakening for Metric Temporal Logic.
//!
//! Given an MTL formula, a path to one of its temporal subformulas, a lasso
//! trace, and a time point at which the formula should hold, [`weaken::weaken`]
//! finds the minimal change to that subformula's interval upper bound that
//! makes the formula true, if one exists.
//!
//! Pipeline: [`parser::parse`] the surface syntax into a [`formula::Formula`],
//! [`context::split`] it at a path into a one-hole [`context::Ctx`] and a
//! target subformula, normalise the context to positive polarity with
//! [`context::partial_nnf`], then [`weaken::weaken`] searches candidate
//! intervals by evaluating [`marking::Marking`] over the [`trace::Trace`].

pub mod context;
pub mod error;
pub mod formula;
pub mod interval;
pub mod ltl;
pub mod marking;
pub mod parser;
pub mod path;
pub mod pretty;
pub mod trace;
pub mod weaken;

pub use context::{partial_nnf, split, substitute, Ctx, Polarity};
pub use error::{WeakenError, WeakenResult};
pub use formula::Formula;
pub use interval::{Hi, Interval};
pub use ltl::{to_ltl, Ltl};
pub use marking::Marking;
pub use parser::parse;
pub use trace::{State, Trace};
pub use weaken::{weaken, WeakenOutcome};
