//! Rewrites buffer loads into texture samples.
//!
//! - `float(Load(uintN))` becomes `sample * max`; the cast is dropped since
//!   the product already is the float value of the element.
//! - any other `Load(T)` becomes `T(sample * max)`.
//!
//! The replacement is mutated again, so loads nested in index expressions
//! are rewritten too. After this pass no `Load` remains.

use tracing::trace;

use super::texture::{denormalize, normalize, texture_load};
use crate::error::CodegenError;
use crate::ir::mutate::{walk_expr, Mutator};
use crate::ir::{Expr, Stmt};

/// Replace every buffer load in `stmt` with a texture sample.
pub fn inject_texture_loads(stmt: &Stmt) -> Result<Stmt, CodegenError> {
    InjectTextureLoads.mutate_stmt(stmt)
}

struct InjectTextureLoads;

impl Mutator for InjectTextureLoads {
    fn mutate_expr(&mut self, expr: &Expr) -> Result<Expr, CodegenError> {
        match expr {
            Expr::Cast { ty, value } if ty.is_float() => match value.as_ref() {
                Expr::Load {
                    ty: load_ty,
                    name,
                    index,
                } if load_ty.is_uint() => {
                    trace!(buffer = %name, "float load from texture");
                    let sample = texture_load(name, *load_ty, index)?;
                    let replacement = denormalize(sample, *load_ty)?;
                    self.mutate_expr(&replacement)
                }
                _ => walk_expr(self, expr),
            },
            Expr::Load { ty, name, index } => {
                trace!(buffer = %name, ty = %ty, "load from texture");
                let sample = texture_load(name, *ty, index)?;
                let replacement = normalize(sample, *ty)?;
                self.mutate_expr(&replacement)
            }
            _ => walk_expr(self, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glsl::texture::TEXTURE_LOAD;
    use crate::ir::{CallType, Type};

    fn idx() -> Vec<Expr> {
        vec![
            Expr::var(Type::int(32), "x"),
            Expr::var(Type::int(32), "y"),
            Expr::int(0),
        ]
    }

    fn eval(e: Expr) -> Stmt {
        Stmt::Evaluate(e)
    }

    fn sample(name: &str) -> Expr {
        let mut args = vec![Expr::string(name)];
        args.extend(idx());
        Expr::call(Type::float(32), TEXTURE_LOAD, args, CallType::Intrinsic)
    }

    #[test]
    fn test_float_cast_of_uint_load() {
        for (ty, max) in [(Type::uint(8), 255.0), (Type::uint(16), 65535.0)] {
            let s = eval(Expr::cast(Type::float(32), Expr::load(ty, "in", idx())));
            let out = inject_texture_loads(&s).unwrap();
            assert_eq!(out, eval(Expr::mul(sample("in"), Expr::float(max))));
        }
    }

    #[test]
    fn test_bare_load_is_cast_back() {
        let s = Stmt::store("out", Expr::load(Type::uint(8), "in", idx()), idx());
        let out = inject_texture_loads(&s).unwrap();
        let expected = Stmt::store(
            "out",
            Expr::cast(Type::uint(8), Expr::mul(sample("in"), Expr::float(255.0))),
            idx(),
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_nested_load_in_index() {
        let inner = Expr::load(Type::uint(8), "lut", idx());
        let outer = Expr::load(
            Type::uint(8),
            "in",
            vec![Expr::cast(Type::int(32), inner), Expr::int(0), Expr::int(1)],
        );
        let out = inject_texture_loads(&eval(Expr::cast(Type::float(32), outer))).unwrap();
        let text = out.to_string();
        assert!(!text.contains("in["));
        assert!(!text.contains("lut["));
        assert!(text.contains("glsl_texture_load(\"lut\""));
        assert!(text.contains("glsl_texture_load(\"in\""));
    }

    #[test]
    fn test_load_arity_is_internal_error() {
        let s = eval(Expr::load(Type::uint(8), "in", vec![Expr::int(0)]));
        let err = inject_texture_loads(&s).unwrap_err();
        assert!(err.is_internal());

        let mut four = idx();
        four.push(Expr::int(0));
        let s = eval(Expr::load(Type::uint(8), "in", four));
        let err = inject_texture_loads(&s).unwrap_err();
        assert!(err.is_internal());
        assert!(err.message().contains("has 4"));
    }

    #[test]
    fn test_unsupported_element_type() {
        let s = eval(Expr::load(Type::float(32), "in", idx()));
        assert!(inject_texture_loads(&s).unwrap_err().is_internal());
    }
}
