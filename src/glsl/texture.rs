//! Texture-element conventions shared by the injection pass and the emitter.
//!
//! Buffers are bound as 8- or 16-bit unsigned normalized textures, so a
//! sample returns `value / max_value(T)` and a fragment write stores
//! `value / max_value(T)` back.

use crate::error::CodegenError;
use crate::ir::matcher::{expr_match, wildcard};
use crate::ir::{CallType, Expr, Type};

/// Name of the intrinsic the injection pass substitutes for buffer loads.
pub const TEXTURE_LOAD: &str = "glsl_texture_load";

/// Largest value representable by a texture element of type `ty`.
pub fn max_value(ty: Type) -> Result<f32, CodegenError> {
    let elem = ty.element_of();
    if elem == Type::uint(8) {
        Ok(255.0)
    } else if elem == Type::uint(16) {
        Ok(65535.0)
    } else {
        Err(CodegenError::internal(format!(
            "Cannot determine max_value of type '{}'",
            ty
        )))
    }
}

/// Swizzle selecting the channel(s) addressed by a color index.
pub fn vector_suffix(channel: &Expr) -> Result<&'static str, CodegenError> {
    let full_sweep = Expr::ramp(wildcard(Type::int(32)), Expr::int(1), 4);
    if expr_match(&full_sweep, channel).is_some() {
        return Ok("");
    }
    match channel {
        Expr::IntImm(i) => match i {
            0 => Ok(".r"),
            1 => Ok(".g"),
            2 => Ok(".b"),
            3 => Ok(".a"),
            _ => Err(CodegenError::internal(format!(
                "Color channel must be between 0 and 3, got {}",
                i
            ))),
        },
        _ => Err(CodegenError::internal(format!(
            "Color index '{}' not supported",
            channel
        ))),
    }
}

/// `x * max_value(ty)`: a normalized sample scaled back to the integer range.
pub fn denormalize(x: Expr, ty: Type) -> Result<Expr, CodegenError> {
    Ok(Expr::mul(x, Expr::float(max_value(ty)?)))
}

/// `ty(x * max_value(ty))`: the shape the store side recognizes.
pub fn normalize(x: Expr, ty: Type) -> Result<Expr, CodegenError> {
    Ok(Expr::cast(ty, denormalize(x, ty)?))
}

/// If `value` is `T(x * max_value(T))` (either operand order), return `x`.
pub fn match_normalized(value: &Expr) -> Result<Option<Expr>, CodegenError> {
    let ty = value.ty();
    let maxval = Expr::float(max_value(ty)?);
    let x = wildcard(Type::float(32).with_width(ty.width));

    let patterns = [
        Expr::cast(ty, Expr::mul(x.clone(), maxval.clone())),
        Expr::cast(ty, Expr::mul(maxval, x)),
    ];
    Ok(patterns
        .iter()
        .find_map(|p| expr_match(p, value))
        .and_then(|mut captures| captures.pop()))
}

/// Intrinsic call sampling `buffer` at the three load coordinates.
pub fn texture_load(buffer: &str, ty: Type, index: &[Expr]) -> Result<Expr, CodegenError> {
    if index.len() != 3 {
        return Err(CodegenError::internal(format!(
            "Load from texture requires three indices, '{}' has {}",
            buffer,
            index.len()
        )));
    }
    let mut args = Vec::with_capacity(4);
    args.push(Expr::string(buffer));
    args.extend(index.iter().cloned());
    Ok(Expr::call(
        Type::float(32).with_width(ty.width),
        TEXTURE_LOAD,
        args,
        CallType::Intrinsic,
    ))
}
