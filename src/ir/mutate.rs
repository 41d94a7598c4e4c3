//! Tree rewriting.
//!
//! A `Mutator` rebuilds a tree bottom-up. Implementors override
//! `mutate_expr`/`mutate_stmt` for the node kinds they care about and fall
//! back to `walk_expr`/`walk_stmt` for everything else, which rebuild the
//! node from mutated children.

use super::{Expr, Stmt};
use crate::error::CodegenError;

pub trait Mutator {
    fn mutate_expr(&mut self, expr: &Expr) -> Result<Expr, CodegenError> {
        walk_expr(self, expr)
    }

    fn mutate_stmt(&mut self, stmt: &Stmt) -> Result<Stmt, CodegenError> {
        walk_stmt(self, stmt)
    }
}

fn boxed<M: Mutator + ?Sized>(m: &mut M, e: &Expr) -> Result<Box<Expr>, CodegenError> {
    Ok(Box::new(m.mutate_expr(e)?))
}

fn all<M: Mutator + ?Sized>(m: &mut M, exprs: &[Expr]) -> Result<Vec<Expr>, CodegenError> {
    exprs.iter().map(|e| m.mutate_expr(e)).collect()
}

/// Rebuild `expr` from mutated children.
pub fn walk_expr<M: Mutator + ?Sized>(m: &mut M, expr: &Expr) -> Result<Expr, CodegenError> {
    Ok(match expr {
        Expr::IntImm(_) | Expr::FloatImm(_) | Expr::StringImm(_) | Expr::Variable { .. } => {
            expr.clone()
        }
        Expr::Cast { ty, value } => Expr::Cast {
            ty: *ty,
            value: boxed(m, value)?,
        },
        Expr::Binary { op, a, b } => Expr::Binary {
            op: *op,
            a: boxed(m, a)?,
            b: boxed(m, b)?,
        },
        Expr::Not(a) => Expr::Not(boxed(m, a)?),
        Expr::Select {
            cond,
            true_value,
            false_value,
        } => Expr::Select {
            cond: boxed(m, cond)?,
            true_value: boxed(m, true_value)?,
            false_value: boxed(m, false_value)?,
        },
        Expr::Broadcast { value, width } => Expr::Broadcast {
            value: boxed(m, value)?,
            width: *width,
        },
        Expr::Ramp {
            base,
            stride,
            width,
        } => Expr::Ramp {
            base: boxed(m, base)?,
            stride: boxed(m, stride)?,
            width: *width,
        },
        Expr::Call {
            ty,
            name,
            args,
            call_type,
        } => Expr::Call {
            ty: *ty,
            name: name.clone(),
            args: all(m, args)?,
            call_type: *call_type,
        },
        Expr::Load { ty, name, index } => Expr::Load {
            ty: *ty,
            name: name.clone(),
            index: all(m, index)?,
        },
    })
}

/// Rebuild `stmt` from mutated children.
pub fn walk_stmt<M: Mutator + ?Sized>(m: &mut M, stmt: &Stmt) -> Result<Stmt, CodegenError> {
    Ok(match stmt {
        Stmt::LetStmt { name, value, body } => Stmt::LetStmt {
            name: name.clone(),
            value: m.mutate_expr(value)?,
            body: Box::new(m.mutate_stmt(body)?),
        },
        Stmt::AssertStmt { condition, message } => Stmt::AssertStmt {
            condition: m.mutate_expr(condition)?,
            message: m.mutate_expr(message)?,
        },
        Stmt::For {
            name,
            min,
            extent,
            for_type,
            axis,
            body,
        } => Stmt::For {
            name: name.clone(),
            min: m.mutate_expr(min)?,
            extent: m.mutate_expr(extent)?,
            for_type: *for_type,
            axis: *axis,
            body: Box::new(m.mutate_stmt(body)?),
        },
        Stmt::Store { name, value, index } => Stmt::Store {
            name: name.clone(),
            value: m.mutate_expr(value)?,
            index: all(m, index)?,
        },
        Stmt::IfThenElse {
            condition,
            then_case,
            else_case,
        } => Stmt::IfThenElse {
            condition: m.mutate_expr(condition)?,
            then_case: Box::new(m.mutate_stmt(then_case)?),
            else_case: match else_case {
                Some(s) => Some(Box::new(m.mutate_stmt(s)?)),
                None => None,
            },
        },
        Stmt::Evaluate(e) => Stmt::Evaluate(m.mutate_expr(e)?),
        Stmt::Block(stmts) => Stmt::Block(
            stmts
                .iter()
                .map(|s| m.mutate_stmt(s))
                .collect::<Result<_, _>>()?,
        ),
    })
}
