//! Textual MTL surface syntax, precedence: `->` loosest, then `|`, then `&`,
//! then `U`/`R`, then unary (`!`, `X`, `F[..]`, `G[..]`) tightest.
//!
//! An inline `pest` grammar (no separate `.pest` file) drives a recursive
//! descent builder over the parse tree, one rule per precedence level, with
//! optional `[lo, hi]`/`[lo, ..]` interval suffixes on `F`, `G`, `U` and `R`.

use crate::error::{WeakenError, WeakenResult};
use crate::formula::Formula;
use crate::interval::Interval;
use pest::iterators::Pair;
use pest::Parser;
use std::rc::Rc;

#[derive(pest_derive::Parser)]
#[grammar_inline = r#"
WHITESPACE = _{ " " | "\t" | "\r" | "\n" }

program = { SOI ~ implies_expr ~ EOI }

implies_expr = { or_expr ~ ("->" ~ or_expr)* }
or_expr = { and_expr ~ ("|" ~ and_expr)* }
and_expr = { binary_temporal_expr ~ ("&" ~ binary_temporal_expr)* }
binary_temporal_expr = { unary_expr ~ (binary_op ~ interval? ~ unary_expr)* }
binary_op = @{ ("U" | "R") ~ !(ASCII_ALPHANUMERIC | "_") }

unary_expr = {
      not_expr
    | next_expr
    | eventually_expr
    | always_expr
    | atom
}
not_expr = { "!" ~ unary_expr }
next_expr = { next_op ~ unary_expr }
eventually_expr = { eventually_op ~ interval? ~ unary_expr }
always_expr = { always_op ~ interval? ~ unary_expr }

next_op = @{ "X" ~ !(ASCII_ALPHANUMERIC | "_") }
eventually_op = @{ "F" ~ !(ASCII_ALPHANUMERIC | "_") }
always_op = @{ "G" ~ !(ASCII_ALPHANUMERIC | "_") }

atom = {
      "(" ~ implies_expr ~ ")"
    | true_lit
    | false_lit
    | prop
}
true_lit = @{ "TRUE" ~ !(ASCII_ALPHANUMERIC | "_") }
false_lit = @{ "FALSE" ~ !(ASCII_ALPHANUMERIC | "_") }
prop = @{ ASCII_ALPHA ~ (ASCII_ALPHANUMERIC | "_")* }

interval = { "[" ~ number ~ "," ~ bound ~ "]" }
bound = { infinity | number }
infinity = @{ "inf" | "∞" }
number = @{ ASCII_DIGIT+ }
"#]
struct MtlParser;

fn parse_number(pair: Pair<Rule>) -> WeakenResult<u64> {
    pair.as_str()
        .parse::<u64>()
        .map_err(|_| WeakenError::parse_error(1, 1, format!("bad integer: {}", pair.as_str())))
}

fn build_interval(pair: Pair<Rule>) -> WeakenResult<Interval> {
    let mut inner = pair.into_inner();
    let lo_pair = inner.next().expect("interval has a lower bound");
    let lo = parse_number(lo_pair)?;
    let bound_pair = inner.next().expect("interval has an upper bound");
    let bound_inner = bound_pair.into_inner().next().expect("bound has a value");
    match bound_inner.as_rule() {
        Rule::infinity => Ok(Interval::unbounded(lo)),
        Rule::number => {
            let hi = parse_number(bound_inner)?;
            Interval::bounded(lo, hi)
        }
        other => unreachable!("unexpected bound rule {other:?}"),
    }
}

fn build_implies(pair: Pair<Rule>) -> WeakenResult<Rc<Formula>> {
    let mut ors = pair.into_inner();
    let mut acc = build_or(ors.next().expect("implies_expr has at least one operand"))?;
    for next in ors {
        let rhs = build_or(next)?;
        acc = Formula::implies(acc, rhs);
    }
    Ok(acc)
}

fn build_or(pair: Pair<Rule>) -> WeakenResult<Rc<Formula>> {
    let mut ands = pair.into_inner();
    let mut acc = build_and(ands.next().expect("or_expr has at least one operand"))?;
    for next in ands {
        let rhs = build_and(next)?;
        acc = Formula::or(acc, rhs);
    }
    Ok(acc)
}

fn build_and(pair: Pair<Rule>) -> WeakenResult<Rc<Formula>> {
    let mut temporals = pair.into_inner();
    let mut acc = build_binary_temporal(
        temporals
            .next()
            .expect("and_expr has at least one operand"),
    )?;
    for next in temporals {
        let rhs = build_binary_temporal(next)?;
        acc = Formula::and(acc, rhs);
    }
    Ok(acc)
}

fn build_binary_temporal(pair: Pair<Rule>) -> WeakenResult<Rc<Formula>> {
    let mut parts = pair.into_inner();
    let mut acc = build_unary(parts.next().expect("binary_temporal_expr has an operand"))?;
    let mut rest: Vec<Pair<Rule>> = parts.collect();
    let mut i = 0;
    while i < rest.len() {
        let op = rest[i].as_str().to_string();
        i += 1;
        let (interval, next_i) = if i < rest.len() && rest[i].as_rule() == Rule::interval {
            let interval = build_interval(rest[i].clone())?;
            (interval, i + 1)
        } else {
            (Interval::default_unbounded(), i)
        };
        i = next_i;
        let rhs = build_unary(rest[i].clone())?;
        i += 1;
        acc = match op.as_str() {
            "U" => Formula::until(acc, rhs, interval),
            "R" => Formula::release(acc, rhs, interval),
            other => {
                return Err(WeakenError::parse_error(
                    1,
                    1,
                    format!("unknown binary temporal operator: {other}"),
                ))
            }
        };
    }
    Ok(acc)
}

fn build_unary(pair: Pair<Rule>) -> WeakenResult<Rc<Formula>> {
    let inner = pair.into_inner().next().expect("unary_expr has a body");
    match inner.as_rule() {
        Rule::not_expr => {
            let operand = inner.into_inner().next().expect("not_expr has an operand");
            Ok(Formula::not(build_unary(operand)?))
        }
        Rule::next_expr => {
            let mut parts = inner.into_inner();
            let _op = parts.next();
            let operand = parts.next().expect("next_expr has an operand");
            Ok(Formula::next(build_unary(operand)?))
        }
        Rule::eventually_expr => {
            let mut parts = inner.into_inner();
            let _op = parts.next();
            let mut next = parts.next().expect("eventually_expr has a body");
            let interval = if next.as_rule() == Rule::interval {
                let i = build_interval(next.clone())?;
                next = parts.next().expect("eventually_expr has an operand");
                i
            } else {
                Interval::default_unbounded()
            };
            Ok(Formula::eventually(build_unary(next)?, interval))
        }
        Rule::always_expr => {
            let mut parts = inner.into_inner();
            let _op = parts.next();
            let mut next = parts.next().expect("always_expr has a body");
            let interval = if next.as_rule() == Rule::interval {
                let i = build_interval(next.clone())?;
                next = parts.next().expect("always_expr has an operand");
                i
            } else {
                Interval::default_unbounded()
            };
            Ok(Formula::always(build_unary(next)?, interval))
        }
        Rule::atom => build_atom(inner),
        other => unreachable!("unexpected unary rule {other:?}"),
    }
}

fn build_atom(pair: Pair<Rule>) -> WeakenResult<Rc<Formula>> {
    let inner = pair.into_inner().next().expect("atom has a body");
    match inner.as_rule() {
        Rule::implies_expr => build_implies(inner),
        Rule::true_lit => Ok(Rc::new(Formula::True)),
        Rule::false_lit => Ok(Rc::new(Formula::False)),
        Rule::prop => Ok(Formula::prop(inner.as_str())),
        other => unreachable!("unexpected atom rule {other:?}"),
    }
}

/// Parse a full MTL formula from its surface syntax.
pub fn parse(input: &str) -> WeakenResult<Rc<Formula>> {
    let mut pairs = MtlParser::parse(Rule::program, input).map_err(|e| {
        let (line, column) = match &e.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (*l, *c),
            pest::error::LineColLocation::Span((l, c), _) => (*l, *c),
        };
        WeakenError::parse_error(line, column, e.to_string())
    })?;
    let program = pairs.next().expect("program rule always present");
    let implies_expr = program
        .into_inner()
        .next()
        .expect("program wraps implies_expr");
    build_implies(implies_expr)
}
