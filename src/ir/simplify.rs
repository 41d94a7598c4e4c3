//! Simplifier seam.
//!
//! The real simplifier lives upstream; the backend only needs something
//! that normalizes the tree after texture-load injection. `ConstantFolder`
//! covers the shapes injection introduces: identity casts, folded
//! immediates and multiplicative/additive identities.

use super::mutate::{walk_expr, walk_stmt, Mutator};
use super::{BinOp, Expr, Stmt, Type};
use crate::error::CodegenError;

/// Normalizes a statement tree. Must preserve semantics.
pub trait Simplify {
    fn simplify(&self, stmt: Stmt) -> Result<Stmt, CodegenError>;
}

/// Leaves the tree untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSimplify;

impl Simplify for NoSimplify {
    fn simplify(&self, stmt: Stmt) -> Result<Stmt, CodegenError> {
        Ok(stmt)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantFolder;

impl Simplify for ConstantFolder {
    fn simplify(&self, stmt: Stmt) -> Result<Stmt, CodegenError> {
        Folder.mutate_stmt(&stmt)
    }
}

struct Folder;

impl Mutator for Folder {
    fn mutate_expr(&mut self, expr: &Expr) -> Result<Expr, CodegenError> {
        Ok(fold(walk_expr(self, expr)?))
    }

    fn mutate_stmt(&mut self, stmt: &Stmt) -> Result<Stmt, CodegenError> {
        walk_stmt(self, stmt)
    }
}

fn fold(expr: Expr) -> Expr {
    match expr {
        Expr::Cast { ty, value } => fold_cast(ty, *value),
        Expr::Binary { op, a, b } => fold_binary(op, *a, *b),
        other => other,
    }
}

fn fold_cast(ty: Type, value: Expr) -> Expr {
    if value.ty() == ty {
        return value;
    }
    match value {
        Expr::IntImm(v) if ty == Type::float(32) => Expr::FloatImm(v as f32),
        Expr::FloatImm(v) if ty == Type::int(32) && v.is_finite() => Expr::IntImm(v as i32),
        value => Expr::cast(ty, value),
    }
}

fn fold_binary(op: BinOp, a: Expr, b: Expr) -> Expr {
    match (&a, &b) {
        (Expr::IntImm(x), Expr::IntImm(y)) => {
            if let Some(v) = fold_ints(op, *x, *y) {
                return Expr::IntImm(v);
            }
        }
        (Expr::FloatImm(x), Expr::FloatImm(y)) => {
            if let Some(v) = fold_floats(op, *x, *y) {
                return Expr::FloatImm(v);
            }
        }
        _ => {}
    }

    let int32 = Type::int(32);
    let float32 = Type::float(32);
    match (op, &a, &b) {
        (BinOp::Add, Expr::IntImm(0), _) if b.ty() == int32 => b,
        (BinOp::Add | BinOp::Sub, _, Expr::IntImm(0)) if a.ty() == int32 => a,
        (BinOp::Mul, Expr::IntImm(1), _) if b.ty() == int32 => b,
        (BinOp::Mul | BinOp::Div, _, Expr::IntImm(1)) if a.ty() == int32 => a,
        (BinOp::Mul, Expr::FloatImm(v), _) if *v == 1.0 && b.ty() == float32 => b,
        (BinOp::Mul | BinOp::Div, _, Expr::FloatImm(v)) if *v == 1.0 && a.ty() == float32 => a,
        _ => Expr::binary(op, a, b),
    }
}

fn fold_ints(op: BinOp, x: i32, y: i32) -> Option<i32> {
    Some(match op {
        BinOp::Add => x.wrapping_add(y),
        BinOp::Sub => x.wrapping_sub(y),
        BinOp::Mul => x.wrapping_mul(y),
        // GLSL `/` truncates; `mod()` takes the sign of the divisor.
        BinOp::Div => x.checked_div(y)?,
        BinOp::Mod => {
            let r = x.checked_rem(y)?;
            if r != 0 && (r < 0) != (y < 0) {
                r + y
            } else {
                r
            }
        }
        BinOp::Min => x.min(y),
        BinOp::Max => x.max(y),
        _ => return None,
    })
}

fn fold_floats(op: BinOp, x: f32, y: f32) -> Option<f32> {
    Some(match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => x / y,
        BinOp::Min => x.min(y),
        BinOp::Max => x.max(y),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplify_expr(e: Expr) -> Expr {
        match ConstantFolder.simplify(Stmt::Evaluate(e)).unwrap() {
            Stmt::Evaluate(e) => e,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_folds_immediates() {
        assert_eq!(
            simplify_expr(Expr::add(Expr::int(2), Expr::mul(Expr::int(3), Expr::int(4)))),
            Expr::int(14)
        );
        assert_eq!(
            simplify_expr(Expr::mul(Expr::float(0.5), Expr::float(4.0))),
            Expr::float(2.0)
        );
        // Division by zero is left for the target to decide.
        let div0 = Expr::div(Expr::int(1), Expr::int(0));
        assert_eq!(simplify_expr(div0.clone()), div0);
    }

    #[test]
    fn test_integer_division_matches_glsl() {
        let div = |a, b| simplify_expr(Expr::div(Expr::int(a), Expr::int(b)));
        let rem = |a, b| simplify_expr(Expr::binary(BinOp::Mod, Expr::int(a), Expr::int(b)));
        assert_eq!(div(-7, 2), Expr::int(-3));
        assert_eq!(div(7, -2), Expr::int(-3));
        assert_eq!(rem(-7, 2), Expr::int(1));
        assert_eq!(rem(7, -2), Expr::int(-1));
        assert_eq!(rem(6, -3), Expr::int(0));
    }

    #[test]
    fn test_overflowing_division_is_left_alone() {
        for op in [BinOp::Div, BinOp::Mod] {
            let e = Expr::binary(op, Expr::int(i32::MIN), Expr::int(-1));
            assert_eq!(simplify_expr(e.clone()), e);
            let zero = Expr::binary(op, Expr::int(5), Expr::int(0));
            assert_eq!(simplify_expr(zero.clone()), zero);
        }
    }

    #[test]
    fn test_removes_identity_cast() {
        let x = Expr::var(Type::float(32), "x");
        assert_eq!(simplify_expr(Expr::cast(Type::float(32), x.clone())), x);
        assert_eq!(
            simplify_expr(Expr::cast(Type::float(32), Expr::int(3))),
            Expr::float(3.0)
        );
    }

    #[test]
    fn test_identities_respect_types() {
        let i = Expr::var(Type::int(32), "i");
        assert_eq!(simplify_expr(Expr::add(i.clone(), Expr::int(0))), i);
        assert_eq!(simplify_expr(Expr::mul(Expr::int(1), i.clone())), i);

        // A uint8 operand would change type if the immediate vanished.
        let u = Expr::var(Type::uint(8), "u");
        let e = Expr::add(u, Expr::int(0));
        assert_eq!(simplify_expr(e.clone()), e);
    }

    #[test]
    fn test_denormalization_multiply_is_kept() {
        let tex = Expr::var(Type::float(32), "t");
        let e = Expr::mul(tex, Expr::float(255.0));
        assert_eq!(simplify_expr(e.clone()), e);
    }

    #[test]
    fn test_no_simplify_is_identity() {
        let s = Stmt::Evaluate(Expr::add(Expr::int(1), Expr::int(2)));
        assert_eq!(NoSimplify.simplify(s.clone()).unwrap(), s);
    }
}
