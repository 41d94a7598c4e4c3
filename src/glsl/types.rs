//! Type and identifier spelling for GLSL 1.20.

use crate::error::CodegenError;
use crate::ir::{Type, TypeCode};

/// Spell `ty` as a GLSL type.
///
/// GLSL 1.20 has no unsigned integers, so unsigned scalars of any width are
/// widened to `int`. Unsigned vectors have no such escape hatch.
pub fn print_type(ty: Type) -> Result<String, CodegenError> {
    if ty.is_scalar() {
        return match ty.code {
            TypeCode::Float if ty.bits == 32 => Ok("float".into()),
            TypeCode::Float => Err(CodegenError::user(format!(
                "Can't represent a float with {} bits in GLSL",
                ty.bits
            ))),
            _ if ty.bits == 1 => Ok("bool".into()),
            TypeCode::Int if ty.bits == 32 => Ok("int".into()),
            TypeCode::Int => Err(CodegenError::user(format!(
                "Can't represent an integer with {} bits in GLSL",
                ty.bits
            ))),
            TypeCode::UInt => Ok("int".into()),
            _ => Err(unrepresentable(ty)),
        };
    }

    if ty.width > 4 {
        return Err(CodegenError::user(format!(
            "Vector types wider than 4 aren't supported in GLSL (got '{}')",
            ty
        )));
    }

    let prefix = match ty.code {
        TypeCode::Bool => "b",
        TypeCode::Int => {
            print_type(ty.element_of())?;
            "i"
        }
        TypeCode::Float => {
            print_type(ty.element_of())?;
            ""
        }
        TypeCode::UInt | TypeCode::Handle => return Err(unrepresentable(ty)),
    };
    Ok(format!("{}vec{}", prefix, ty.width))
}

fn unrepresentable(ty: Type) -> CodegenError {
    CodegenError::user(format!(
        "Can't represent type '{}' ({} bits) in GLSL",
        ty, ty.bits
    ))
}

/// Turn an IR identifier into a valid GLSL identifier.
pub fn print_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }
    for c in name.chars() {
        match c {
            '.' => out.push('_'),
            '$' => out.push_str("__"),
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            _ => out.push_str("___"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types() {
        assert_eq!(print_type(Type::float(32)).unwrap(), "float");
        assert_eq!(print_type(Type::int(32)).unwrap(), "int");
        assert_eq!(print_type(Type::bool()).unwrap(), "bool");
        assert_eq!(print_type(Type::uint(8)).unwrap(), "int");
        assert_eq!(print_type(Type::uint(16)).unwrap(), "int");
        assert_eq!(print_type(Type::uint(32)).unwrap(), "int");
    }

    #[test]
    fn test_vector_types() {
        assert_eq!(print_type(Type::float(32).with_width(4)).unwrap(), "vec4");
        assert_eq!(print_type(Type::int(32).with_width(3)).unwrap(), "ivec3");
        assert_eq!(print_type(Type::bool().with_width(2)).unwrap(), "bvec2");
    }

    #[test]
    fn test_unrepresentable_types() {
        let err = print_type(Type::float(64)).unwrap_err();
        assert!(!err.is_internal());
        assert!(err.message().contains("float with 64 bits"));

        let err = print_type(Type::int(16)).unwrap_err();
        assert!(err.message().contains("integer with 16 bits"));

        let err = print_type(Type::int(32).with_width(5)).unwrap_err();
        assert!(err.message().contains("wider than 4"));

        let err = print_type(Type::uint(8).with_width(4)).unwrap_err();
        assert!(err.message().contains("uint8x4"));

        let err = print_type(Type::float(16).with_width(2)).unwrap_err();
        assert!(err.message().contains("float with 16 bits"));

        let err = print_type(Type::handle()).unwrap_err();
        assert!(err.message().contains("handle"));
    }

    #[test]
    fn test_print_name() {
        assert_eq!(print_name("input"), "input");
        assert_eq!(print_name("f.s0.x"), "f_s0_x");
        assert_eq!(print_name("t$1"), "t__1");
        assert_eq!(print_name("a-b"), "a___b");
        assert_eq!(print_name("0x"), "_0x");
    }
}
