//! Property-based invariants: `split`/`substitute` are mutual inverses, and
//! `partial_nnf` never changes a formula's marking over a trace.

use mtl_core::context::{partial_nnf, path, split, substitute};
use mtl_core::formula::Formula;
use mtl_core::interval::Interval;
use mtl_core::marking::Marking;
use mtl_core::trace::Trace;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::rc::Rc;

const PROPS: &[&str] = &["a", "b", "c"];

fn arb_interval() -> impl Strategy<Value = Interval> {
    (0u64..4, 0u64..8).prop_filter_map("lo <= hi", |(lo, extra)| {
        Interval::bounded(lo, lo + extra).ok()
    })
}

fn arb_prop() -> impl Strategy<Value = Rc<Formula>> {
    proptest::sample::select(PROPS).prop_map(Formula::prop)
}

fn arb_formula() -> impl Strategy<Value = Rc<Formula>> {
    let leaf = arb_prop();
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::or(l, r)),
            (inner.clone(), arb_interval()).prop_map(|(f, i)| Formula::eventually(f, i)),
            (inner.clone(), arb_interval()).prop_map(|(f, i)| Formula::always(f, i)),
            (inner.clone(), inner.clone(), arb_interval())
                .prop_map(|(l, r, i)| Formula::until(l, r, i)),
        ]
    })
}

/// All valid child-index paths through `f`, including the root (`[]`).
fn all_paths(f: &Rc<Formula>) -> Vec<Vec<usize>> {
    let mut out = vec![vec![]];
    match f.as_ref() {
        Formula::Not(inner) | Formula::Next(inner) => {
            for mut p in all_paths(inner) {
                p.insert(0, 0);
                out.push(p);
            }
        }
        Formula::Eventually(inner, _) | Formula::Always(inner, _) => {
            for mut p in all_paths(inner) {
                p.insert(0, 0);
                out.push(p);
            }
        }
        Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) => {
            for mut p in all_paths(l) {
                p.insert(0, 0);
                out.push(p);
            }
            for mut p in all_paths(r) {
                p.insert(0, 1);
                out.push(p);
            }
        }
        Formula::Until(l, r, _) | Formula::Release(l, r, _) => {
            for mut p in all_paths(l) {
                p.insert(0, 0);
                out.push(p);
            }
            for mut p in all_paths(r) {
                p.insert(0, 1);
                out.push(p);
            }
        }
        Formula::True | Formula::False | Formula::Prop(_) => {}
    }
    out
}

fn sample_trace() -> Trace {
    let s = |names: &[&str]| -> BTreeSet<Rc<str>> { names.iter().map(|n| Rc::from(*n)).collect() };
    Trace::lasso(
        vec![
            s(&["a"]),
            s(&["b"]),
            s(&["a", "c"]),
            s(&[]),
            s(&["b", "c"]),
        ],
        2,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn split_substitute_is_identity(formula in arb_formula()) {
        for p in all_paths(&formula) {
            let (ctx, sub) = split(&formula, &p).expect("path was generated from this formula");
            prop_assert_eq!(substitute(&ctx, sub), formula.clone());
            prop_assert_eq!(path(&ctx), p);
        }
    }

    #[test]
    fn partial_nnf_preserves_marking(formula in arb_formula()) {
        let trace = sample_trace();
        let marking = Marking::new(&trace);
        for p in all_paths(&formula) {
            let (ctx, sub) = split(&formula, &p).unwrap();
            if sub.interval().is_none() {
                continue; // partial_nnf only defined for temporal targets
            }
            let (ctx2, sub2) = partial_nnf(&ctx, &sub);
            let rewritten = substitute(&ctx2, sub2);
            for t in 0..trace.len() {
                let original = marking.get(&formula, t);
                let after = marking.get(&rewritten, t);
                if let (Ok(o), Ok(a)) = (original, after) {
                    prop_assert_eq!(o, a, "position {} diverged after partial_nnf at path {:?}", t, p);
                }
            }
        }
    }
}
