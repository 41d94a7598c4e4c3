//! GLSL 1.20 fragment-shader emission.
//!
//! Every non-trivial expression is materialised into a temporary through
//! `print_assignment`, so each line of output computes exactly one value.
//! Identical right-hand sides within a scope share one temporary.

use std::collections::HashMap;

use tracing::debug;

use super::inject::inject_texture_loads;
use super::texture::{match_normalized, max_value, vector_suffix, TEXTURE_LOAD};
use super::types::{print_name, print_type};
use crate::error::CodegenError;
use crate::ir::simplify::Simplify;
use crate::ir::{Argument, BinOp, CallType, Expr, ForType, LoopAxis, Stmt, Type, TypeCode};

/// Significant digits used for float immediates.
const FLOAT_PRECISION: i32 = 8;

/// Format `value` like C's `%#.8g`: eight significant digits, trailing
/// zeros kept, decimal point always present.
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    let v = value as f64;
    if v == 0.0 {
        let sign = if value.is_sign_negative() { "-" } else { "" };
        return format!("{}0.{}", sign, "0".repeat((FLOAT_PRECISION - 1) as usize));
    }

    let sci = format!("{:.*e}", (FLOAT_PRECISION - 1) as usize, v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= FLOAT_PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (FLOAT_PRECISION - 1 - exp) as usize;
        let mut out = format!("{:.*}", decimals, v);
        if decimals == 0 {
            out.push('.');
        }
        out
    }
}

/// Shared built-in varying holding the fragment's pixel position.
const PIXCOORD: &str = "pixcoord";

fn fragment_coord(axis: LoopAxis) -> String {
    match axis {
        LoopAxis::BlockX => format!("int({}.x)", PIXCOORD),
        LoopAxis::BlockY => format!("int({}.y)", PIXCOORD),
    }
}

/// Emits kernels into one accumulating GLSL module.
pub struct ShaderEmitter {
    stream: String,
    indent: usize,
    indent_width: usize,
    /// Rendered right-hand side → temporary holding it.
    cache: HashMap<String, String>,
    next_id: usize,
}

impl ShaderEmitter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            stream: String::new(),
            indent: 0,
            indent_width,
            cache: HashMap::new(),
            next_id: 0,
        }
    }

    /// Text emitted since the last `clear`.
    pub fn source(&self) -> &str {
        &self.stream
    }

    /// Forget all emitted text and naming state.
    pub fn clear(&mut self) {
        self.stream.clear();
        self.indent = 0;
        self.cache.clear();
        self.next_id = 0;
    }

    /// Lower one kernel and append it to the module.
    ///
    /// On error the module is left exactly as it was before the call.
    pub fn compile(
        &mut self,
        stmt: &Stmt,
        name: &str,
        args: &[Argument],
        simplifier: &dyn Simplify,
    ) -> Result<(), CodegenError> {
        let mark = self.stream.len();
        let next_id = self.next_id;
        let result = self.compile_kernel(stmt, name, args, simplifier);
        if result.is_err() {
            self.stream.truncate(mark);
            self.next_id = next_id;
            self.indent = 0;
            self.cache.clear();
        }
        result.map_err(|e| e.in_kernel(name))
    }

    fn compile_kernel(
        &mut self,
        stmt: &Stmt,
        name: &str,
        args: &[Argument],
        simplifier: &dyn Simplify,
    ) -> Result<(), CodegenError> {
        let stmt = simplifier.simplify(inject_texture_loads(stmt)?)?;
        debug!(kernel = name, "lowered kernel body:\n{}", stmt);

        // The runtime learns argument roles and types only from these
        // comment lines; keep the tokens stable.
        let header = kernel_header(name, args)?;

        let mut decls = String::new();
        for arg in args {
            if arg.is_buffer && arg.read {
                decls.push_str(&format!("uniform sampler2D {};\n", print_name(&arg.name)));
            } else if !arg.is_buffer {
                decls.push_str(&format!(
                    "uniform {} {};\n",
                    print_type(arg.ty)?,
                    print_name(&arg.name)
                ));
            }
        }

        self.stream.push_str("#version 120\n");
        self.stream.push_str(&header);
        self.stream.push_str(&decls);
        self.stream.push_str(&format!("varying vec2 {};\n", PIXCOORD));

        self.stream.push_str("void main() {\n");
        self.cache.clear();
        self.indent += self.indent_width;
        self.print_stmt(&stmt)?;
        self.indent -= self.indent_width;
        self.stream.push_str("}\n");
        Ok(())
    }

    // ─── Output helpers ───────────────────────────────────────────

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.stream.push(' ');
        }
        self.stream.push_str(text);
        self.stream.push('\n');
    }

    fn open_scope(&mut self) {
        self.cache.clear();
        self.line("{");
        self.indent += self.indent_width;
    }

    fn close_scope(&mut self, comment: &str) {
        self.cache.clear();
        self.indent -= self.indent_width;
        self.line(&format!("}} // {}", comment));
    }

    fn unique_name(&mut self) -> String {
        let id = format!("_{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Bind `rhs` to a temporary of type `ty`, reusing an existing one.
    fn print_assignment(&mut self, ty: Type, rhs: String) -> Result<String, CodegenError> {
        if let Some(id) = self.cache.get(&rhs) {
            return Ok(id.clone());
        }
        let ty = print_type(ty)?;
        let id = self.unique_name();
        self.line(&format!("{} {} = {};", ty, id, rhs));
        self.cache.insert(rhs, id.clone());
        Ok(id)
    }

    // ─── Statements ───────────────────────────────────────────────

    fn print_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::LetStmt { name, value, body } => {
                let id = self.print_expr(value)?;
                let ty = print_type(value.ty())?;
                self.line(&format!("{} {} = {};", ty, print_name(name), id));
                self.print_stmt(body)
            }
            Stmt::AssertStmt { condition, .. } => Err(CodegenError::internal(format!(
                "Assertions should not be present in GLSL: assert({})",
                condition
            ))),
            Stmt::For {
                name,
                min,
                extent,
                for_type,
                axis,
                body,
            } => self.print_for(name, min, extent, *for_type, *axis, body),
            Stmt::Store { name, value, index } => self.print_store(name, value, index),
            Stmt::IfThenElse {
                condition,
                then_case,
                else_case,
            } => {
                let cond = self.print_expr(condition)?;
                self.line(&format!("if ({})", cond));
                self.open_scope();
                self.print_stmt(then_case)?;
                self.close_scope(&format!("if {}", cond));
                if let Some(else_case) = else_case {
                    self.line("else");
                    self.open_scope();
                    self.print_stmt(else_case)?;
                    self.close_scope(&format!("if {} else", cond));
                }
                Ok(())
            }
            Stmt::Evaluate(e) => self.print_expr(e).map(|_| ()),
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.print_stmt(s)?;
                }
                Ok(())
            }
        }
    }

    fn print_for(
        &mut self,
        name: &str,
        min: &Expr,
        extent: &Expr,
        for_type: ForType,
        axis: Option<LoopAxis>,
        body: &Stmt,
    ) -> Result<(), CodegenError> {
        if let Some(axis) = axis {
            debug!("Dropping loop {} ({}, {})", name, min, extent);
            let index = fragment_coord(axis);
            self.line(&format!(
                "{} {} = {};",
                print_type(Type::int(32))?,
                print_name(name),
                index
            ));
            return self.print_stmt(body);
        }

        if for_type == ForType::Parallel {
            return Err(CodegenError::user(format!(
                "Parallel loops aren't allowed inside GLSL (loop '{}')",
                name
            )));
        }

        let min = self.print_expr(min)?;
        let extent = self.print_expr(extent)?;
        let var = print_name(name);
        self.line(&format!(
            "for (int {v} = {min}; {v} < {min} + {extent}; {v}++)",
            v = var,
            min = min,
            extent = extent
        ));
        self.open_scope();
        self.print_stmt(body)?;
        self.close_scope(&format!("for {}", var));
        Ok(())
    }

    fn print_store(
        &mut self,
        name: &str,
        value: &Expr,
        index: &[Expr],
    ) -> Result<(), CodegenError> {
        if index.len() != 3 {
            return Err(CodegenError::internal(format!(
                "Store to texture requires three indices, store to '{}' has {}",
                name,
                index.len()
            )));
        }

        let ty = value.ty();
        if !ty.is_uint() {
            return Err(CodegenError::internal(format!(
                "Invalid Store node encountered: {}[...] = {}",
                name, value
            )));
        }

        let stored = match match_normalized(value)? {
            Some(x) => x,
            // The fragment output is normalized; scale the integer down.
            None => Expr::div(
                Expr::cast(Type::float(32).with_width(ty.width), value.clone()),
                Expr::float(max_value(ty)?),
            ),
        };

        let id = self.print_expr(&stored)?;
        let suffix = vector_suffix(&index[2])?;
        self.line(&format!("gl_FragColor{} = {};", suffix, id));
        Ok(())
    }

    // ─── Expressions ──────────────────────────────────────────────

    fn print_expr(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        match expr {
            Expr::IntImm(v) => Ok(v.to_string()),
            Expr::FloatImm(v) => Ok(format_float(*v)),
            Expr::StringImm(s) => Err(CodegenError::internal(format!(
                "String immediate {:?} can't be represented in GLSL",
                s
            ))),
            Expr::Variable { name, .. } => Ok(print_name(name)),
            Expr::Cast { ty, value } => {
                let value = self.print_expr(value)?;
                let rhs = format!("{}({})", print_type(*ty)?, value);
                self.print_assignment(*ty, rhs)
            }
            Expr::Binary { op, a, b } => match op {
                BinOp::Min => self.print_float_builtin("min", expr.ty(), a, b),
                BinOp::Max => self.print_float_builtin("max", expr.ty(), a, b),
                BinOp::Mod => self.print_float_builtin("mod", expr.ty(), a, b),
                _ => {
                    let a = self.print_expr(a)?;
                    let b = self.print_expr(b)?;
                    let sym = op.symbol().unwrap_or("?");
                    self.print_assignment(expr.ty(), format!("{} {} {}", a, sym, b))
                }
            },
            Expr::Not(a) => {
                let a = self.print_expr(a)?;
                self.print_assignment(expr.ty(), format!("!{}", a))
            }
            Expr::Select {
                cond,
                true_value,
                false_value,
            } => {
                let c = self.print_expr(cond)?;
                let t = self.print_expr(true_value)?;
                let f = self.print_expr(false_value)?;
                self.print_assignment(expr.ty(), format!("{} ? {} : {}", c, t, f))
            }
            Expr::Broadcast { value, .. } => {
                let v = self.print_expr(value)?;
                self.print_assignment(expr.ty(), format!("vec4({})", v))
            }
            Expr::Ramp {
                base,
                stride,
                width,
            } => {
                let ty = expr.ty();
                let base = self.print_expr(base)?;
                let stride = self.print_expr(stride)?;
                let lanes: Vec<String> = (0..*width)
                    .map(|i| match i {
                        0 => base.clone(),
                        1 => format!("{} + {}", base, stride),
                        _ => format!("{} + {} * {}", base, i, stride),
                    })
                    .collect();
                let rhs = format!("{}({})", print_type(ty)?, lanes.join(", "));
                self.print_assignment(ty, rhs)
            }
            Expr::Call {
                ty,
                name,
                args,
                call_type,
            } => {
                if *call_type == CallType::Intrinsic && name == TEXTURE_LOAD {
                    return self.print_texture_load(*ty, args);
                }
                let args = args
                    .iter()
                    .map(|a| self.print_expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.print_assignment(*ty, format!("{}({})", name, args.join(", ")))
            }
            Expr::Load { name, .. } => Err(CodegenError::internal(format!(
                "Load nodes should have been removed by now: {}",
                name
            ))),
        }
    }

    /// GLSL 1.20 only defines `min`, `max` and `mod` on floats, so integer
    /// operands take a round trip through float.
    fn print_float_builtin(
        &mut self,
        builtin: &str,
        ty: Type,
        a: &Expr,
        b: &Expr,
    ) -> Result<String, CodegenError> {
        let to_float = |e: &Expr| {
            let t = e.ty();
            if t.is_float() {
                e.clone()
            } else {
                Expr::cast(Type::new(TypeCode::Float, t.bits, t.width), e.clone())
            }
        };
        let out = Expr::call(
            Type::float(32).with_width(ty.width),
            builtin,
            vec![to_float(a), to_float(b)],
            CallType::Extern,
        );
        if ty.is_float() {
            self.print_expr(&out)
        } else {
            self.print_expr(&Expr::cast(ty, out))
        }
    }

    fn print_texture_load(&mut self, ty: Type, args: &[Expr]) -> Result<String, CodegenError> {
        let (buffer, x, y, channel) = match args {
            [buffer, x, y, channel] => (buffer, x, y, channel),
            _ => {
                return Err(CodegenError::internal(format!(
                    "{} takes 4 arguments, got {}",
                    TEXTURE_LOAD,
                    args.len()
                )))
            }
        };
        let buffer = buffer.as_string().ok_or_else(|| {
            CodegenError::internal(format!(
                "{} expects a buffer name, got '{}'",
                TEXTURE_LOAD, buffer
            ))
        })?;
        let x = self.print_expr(x)?;
        let y = self.print_expr(y)?;
        let suffix = vector_suffix(channel)?;
        let rhs = format!(
            "texture2D({}, vec2({}, {})){}",
            print_name(buffer),
            x,
            y,
            suffix
        );
        self.print_assignment(ty, rhs)
    }
}

/// `/// KERNEL`, `/// IN_BUFFER`, `/// OUT_BUFFER` and `/// VAR` lines.
fn kernel_header(name: &str, args: &[Argument]) -> Result<String, CodegenError> {
    let mut header = format!("/// KERNEL {}\n", print_name(name));
    for arg in args {
        if arg.is_buffer {
            if arg.read == arg.write {
                return Err(CodegenError::user(format!(
                    "Buffers may only be read OR written inside a kernel loop (buffer '{}')",
                    arg.name
                )));
            }
            let elem = arg.ty.element_of();
            let elem = if elem == Type::uint(8) {
                "uint8"
            } else if elem == Type::uint(16) {
                "uint16"
            } else {
                return Err(CodegenError::user(format!(
                    "Only uint8 and uint16 buffers are supported by OpenGL backend (buffer '{}' is {})",
                    arg.name, arg.ty
                )));
            };
            let role = if arg.read { "IN_BUFFER" } else { "OUT_BUFFER" };
            header.push_str(&format!("/// {} {} {}\n", role, elem, print_name(&arg.name)));
        } else {
            header.push_str(&format!(
                "/// VAR {} {}\n",
                print_type(arg.ty)?,
                print_name(&arg.name)
            ));
        }
    }
    Ok(header)
}
