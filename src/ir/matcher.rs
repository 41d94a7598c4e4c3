//! Structural expression matching.
//!
//! A pattern is an ordinary expression in which variables named `*` act as
//! wildcards. A wildcard matches any subexpression of exactly its type and
//! captures it. Matching never mutates either tree.

use super::{Expr, Type};

/// Name that marks a wildcard variable in a pattern.
pub const WILDCARD: &str = "*";

/// Build a wildcard of type `ty`.
pub fn wildcard(ty: Type) -> Expr {
    Expr::var(ty, WILDCARD)
}

/// Match `expr` against `pattern`, returning the captured subexpressions
/// in pre-order, or `None` if the shapes differ.
pub fn expr_match(pattern: &Expr, expr: &Expr) -> Option<Vec<Expr>> {
    let mut captures = Vec::new();
    if match_into(pattern, expr, &mut captures) {
        Some(captures)
    } else {
        None
    }
}

fn match_all(patterns: &[Expr], exprs: &[Expr], captures: &mut Vec<Expr>) -> bool {
    patterns.len() == exprs.len()
        && patterns
            .iter()
            .zip(exprs)
            .all(|(p, e)| match_into(p, e, captures))
}

fn match_into(pattern: &Expr, expr: &Expr, captures: &mut Vec<Expr>) -> bool {
    if let Expr::Variable { ty, name } = pattern {
        if name == WILDCARD {
            if expr.ty() != *ty {
                return false;
            }
            captures.push(expr.clone());
            return true;
        }
    }

    match (pattern, expr) {
        (Expr::IntImm(p), Expr::IntImm(e)) => p == e,
        (Expr::FloatImm(p), Expr::FloatImm(e)) => p == e,
        (Expr::StringImm(p), Expr::StringImm(e)) => p == e,
        (
            Expr::Variable { ty: pt, name: pn },
            Expr::Variable { ty: et, name: en },
        ) => pt == et && pn == en,
        (Expr::Cast { ty: pt, value: pv }, Expr::Cast { ty: et, value: ev }) => {
            pt == et && match_into(pv, ev, captures)
        }
        (
            Expr::Binary {
                op: po,
                a: pa,
                b: pb,
            },
            Expr::Binary {
                op: eo,
                a: ea,
                b: eb,
            },
        ) => po == eo && match_into(pa, ea, captures) && match_into(pb, eb, captures),
        (Expr::Not(p), Expr::Not(e)) => match_into(p, e, captures),
        (
            Expr::Select {
                cond: pc,
                true_value: pt,
                false_value: pf,
            },
            Expr::Select {
                cond: ec,
                true_value: et,
                false_value: ef,
            },
        ) => {
            match_into(pc, ec, captures)
                && match_into(pt, et, captures)
                && match_into(pf, ef, captures)
        }
        (
            Expr::Broadcast {
                value: pv,
                width: pw,
            },
            Expr::Broadcast {
                value: ev,
                width: ew,
            },
        ) => pw == ew && match_into(pv, ev, captures),
        (
            Expr::Ramp {
                base: pb,
                stride: ps,
                width: pw,
            },
            Expr::Ramp {
                base: eb,
                stride: es,
                width: ew,
            },
        ) => pw == ew && match_into(pb, eb, captures) && match_into(ps, es, captures),
        (
            Expr::Call {
                ty: pt,
                name: pn,
                args: pa,
                call_type: pc,
            },
            Expr::Call {
                ty: et,
                name: en,
                args: ea,
                call_type: ec,
            },
        ) => pt == et && pn == en && pc == ec && match_all(pa, ea, captures),
        (
            Expr::Load {
                ty: pt,
                name: pn,
                index: pi,
            },
            Expr::Load {
                ty: et,
                name: en,
                index: ei,
            },
        ) => pt == et && pn == en && match_all(pi, ei, captures),
        _ => false,
    }
}
