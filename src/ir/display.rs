//! Human-readable IR printing for logs and error messages.

use std::fmt;

use super::{BinOp, Expr, ForType, LoopAxis, Stmt, Type, TypeCode};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            TypeCode::Bool => write!(f, "bool")?,
            TypeCode::Int => write!(f, "int{}", self.bits)?,
            TypeCode::UInt => write!(f, "uint{}", self.bits)?,
            TypeCode::Float => write!(f, "float{}", self.bits)?,
            TypeCode::Handle => write!(f, "handle")?,
        }
        if self.width > 1 {
            write!(f, "x{}", self.width)?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, e) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", e)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntImm(v) => write!(f, "{}", v),
            Expr::FloatImm(v) => write!(f, "{:?}f", v),
            Expr::StringImm(s) => write!(f, "{:?}", s),
            Expr::Variable { name, .. } => write!(f, "{}", name),
            Expr::Cast { ty, value } => write!(f, "{}({})", ty, value),
            Expr::Binary { op, a, b } => match (op, op.symbol()) {
                (_, Some(sym)) => write!(f, "({} {} {})", a, sym, b),
                (BinOp::Min, None) => write!(f, "min({}, {})", a, b),
                (_, None) => write!(f, "max({}, {})", a, b),
            },
            Expr::Not(a) => write!(f, "!{}", a),
            Expr::Select {
                cond,
                true_value,
                false_value,
            } => write!(f, "select({}, {}, {})", cond, true_value, false_value),
            Expr::Broadcast { value, width } => write!(f, "x{}({})", width, value),
            Expr::Ramp { base, stride, width } => {
                write!(f, "ramp({}, {}, {})", base, stride, width)
            }
            Expr::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::Load { name, index, .. } => {
                write!(f, "{}[", name)?;
                write_list(f, index)?;
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for ForType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForType::Serial => "for",
            ForType::Parallel => "parallel",
            ForType::Vectorized => "vectorized",
            ForType::Unrolled => "unrolled",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for LoopAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopAxis::BlockX => write!(f, "block.x"),
            LoopAxis::BlockY => write!(f, "block.y"),
        }
    }
}

impl Stmt {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);
        match self {
            Stmt::LetStmt { name, value, body } => {
                writeln!(f, "{}let {} = {}", pad, name, value)?;
                body.fmt_indented(f, indent)
            }
            Stmt::AssertStmt { condition, message } => {
                writeln!(f, "{}assert({}, {})", pad, condition, message)
            }
            Stmt::For {
                name,
                min,
                extent,
                for_type,
                axis,
                body,
            } => {
                write!(f, "{}{} ({}, {}, {})", pad, for_type, name, min, extent)?;
                if let Some(axis) = axis {
                    write!(f, " @{}", axis)?;
                }
                writeln!(f, " {{")?;
                body.fmt_indented(f, indent + 2)?;
                writeln!(f, "{}}}", pad)
            }
            Stmt::Store { name, value, index } => {
                write!(f, "{}{}[", pad, name)?;
                write_list(f, index)?;
                writeln!(f, "] = {}", value)
            }
            Stmt::IfThenElse {
                condition,
                then_case,
                else_case,
            } => {
                writeln!(f, "{}if ({}) {{", pad, condition)?;
                then_case.fmt_indented(f, indent + 2)?;
                if let Some(else_case) = else_case {
                    writeln!(f, "{}}} else {{", pad)?;
                    else_case.fmt_indented(f, indent + 2)?;
                }
                writeln!(f, "{}}}", pad)
            }
            Stmt::Evaluate(e) => writeln!(f, "{}{}", pad, e),
            Stmt::Block(stmts) => {
                for s in stmts {
                    s.fmt_indented(f, indent)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
