//! Human-readable rendering of traces and weakening results.

use crate::trace::Trace;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Message shown when no candidate interval satisfies the formula.
pub const NO_WEAKENING_MESSAGE: &str = "No suitable weakening of the interval exists";

/// Render `trace` as a small table: one column per time step, one row per
/// proposition observed anywhere in the trace, `loop_start` marked with `*`.
pub fn render_trace(trace: &Trace, states: &[BTreeSet<std::rc::Rc<str>>]) -> String {
    let mut props: Vec<std::rc::Rc<str>> = states
        .iter()
        .flat_map(|s| s.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    props.sort();

    let mut out = String::new();
    let _ = writeln!(out, "step   {}", (0..states.len()).map(|i| format!("{i:>3}")).collect::<String>());
    for prop in &props {
        let _ = write!(out, "{prop:<6} ");
        for s in states {
            let _ = write!(out, "{:>3}", if s.contains(prop) { "T" } else { "." });
        }
        let _ = writeln!(out);
    }
    if let Some(loop_start) = trace.loop_start() {
        let _ = writeln!(out, "loop starts at step {loop_start}");
    }
    out
}
