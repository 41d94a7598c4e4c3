//! Kernel IR consumed by the GLSL backend.
//!
//! The IR is a tree of expressions and statements as produced by the
//! front end and optimizer. Nodes own their children exclusively and are
//! never mutated in place: passes build new trees through `Mutator`.
//!
//! ```text
//! front end → Stmt ─→ inject_texture_loads → Simplify → ShaderEmitter → GLSL
//! ```

pub mod display;
pub mod matcher;
pub mod mutate;
pub mod simplify;

use serde::{Deserialize, Serialize};

// ─── Types ────────────────────────────────────────────────────────

/// Base kind of a scalar or vector type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCode {
    Bool,
    Int,
    #[serde(rename = "uint")]
    UInt,
    Float,
    /// Opaque pointer-sized value. Only used to type string immediates.
    Handle,
}

/// A scalar (`width == 1`) or vector type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub code: TypeCode,
    pub bits: u8,
    #[serde(default = "scalar_width")]
    pub width: u16,
}

fn scalar_width() -> u16 {
    1
}

impl Type {
    pub const fn new(code: TypeCode, bits: u8, width: u16) -> Self {
        Self { code, bits, width }
    }

    pub const fn int(bits: u8) -> Self {
        Self::new(TypeCode::Int, bits, 1)
    }

    pub const fn uint(bits: u8) -> Self {
        Self::new(TypeCode::UInt, bits, 1)
    }

    pub const fn float(bits: u8) -> Self {
        Self::new(TypeCode::Float, bits, 1)
    }

    pub const fn bool() -> Self {
        Self::new(TypeCode::Bool, 1, 1)
    }

    pub const fn handle() -> Self {
        Self::new(TypeCode::Handle, 64, 1)
    }

    /// Same element type with `width` lanes.
    pub const fn with_width(self, width: u16) -> Self {
        Self::new(self.code, self.bits, width)
    }

    /// The scalar type of one lane.
    pub const fn element_of(self) -> Self {
        self.with_width(1)
    }

    pub fn is_scalar(&self) -> bool {
        self.width == 1
    }

    pub fn is_vector(&self) -> bool {
        self.width > 1
    }

    pub fn is_bool(&self) -> bool {
        self.code == TypeCode::Bool
    }

    pub fn is_int(&self) -> bool {
        self.code == TypeCode::Int
    }

    pub fn is_uint(&self) -> bool {
        self.code == TypeCode::UInt
    }

    pub fn is_float(&self) -> bool {
        self.code == TypeCode::Float
    }
}

// ─── Expressions ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// True for operators whose result is boolean.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            BinOp::Eq
                | BinOp::Ne
                | BinOp::Lt
                | BinOp::Le
                | BinOp::Gt
                | BinOp::Ge
                | BinOp::And
                | BinOp::Or
        )
    }

    /// Infix spelling shared by the IR printer and the GLSL emitter.
    /// `Min`/`Max` have no infix form.
    pub fn symbol(self) -> Option<&'static str> {
        Some(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Min | BinOp::Max => return None,
        })
    }
}

/// Whether a call names something the backend understands or an
/// externally defined function that is passed through verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Intrinsic,
    Extern,
}

/// An IR expression. Children are owned; the tree is acyclic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    IntImm(i32),
    FloatImm(f32),
    StringImm(String),
    Variable {
        ty: Type,
        name: String,
    },
    Cast {
        ty: Type,
        value: Box<Expr>,
    },
    Binary {
        op: BinOp,
        a: Box<Expr>,
        b: Box<Expr>,
    },
    Not(Box<Expr>),
    Select {
        cond: Box<Expr>,
        true_value: Box<Expr>,
        false_value: Box<Expr>,
    },
    Broadcast {
        value: Box<Expr>,
        width: u16,
    },
    /// `base, base + stride, ..., base + (width - 1) * stride`
    Ramp {
        base: Box<Expr>,
        stride: Box<Expr>,
        width: u16,
    },
    Call {
        ty: Type,
        name: String,
        args: Vec<Expr>,
        call_type: CallType,
    },
    /// Multi-dimensional read of buffer `name`.
    Load {
        ty: Type,
        name: String,
        index: Vec<Expr>,
    },
}

impl Expr {
    pub fn int(value: i32) -> Self {
        Expr::IntImm(value)
    }

    pub fn float(value: f32) -> Self {
        Expr::FloatImm(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::StringImm(value.into())
    }

    pub fn var(ty: Type, name: impl Into<String>) -> Self {
        Expr::Variable {
            ty,
            name: name.into(),
        }
    }

    pub fn cast(ty: Type, value: Expr) -> Self {
        Expr::Cast {
            ty,
            value: Box::new(value),
        }
    }

    pub fn binary(op: BinOp, a: Expr, b: Expr) -> Self {
        Expr::Binary {
            op,
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    pub fn add(a: Expr, b: Expr) -> Self {
        Self::binary(BinOp::Add, a, b)
    }

    pub fn sub(a: Expr, b: Expr) -> Self {
        Self::binary(BinOp::Sub, a, b)
    }

    pub fn mul(a: Expr, b: Expr) -> Self {
        Self::binary(BinOp::Mul, a, b)
    }

    pub fn div(a: Expr, b: Expr) -> Self {
        Self::binary(BinOp::Div, a, b)
    }

    pub fn min(a: Expr, b: Expr) -> Self {
        Self::binary(BinOp::Min, a, b)
    }

    pub fn max(a: Expr, b: Expr) -> Self {
        Self::binary(BinOp::Max, a, b)
    }

    pub fn not(a: Expr) -> Self {
        Expr::Not(Box::new(a))
    }

    pub fn select(cond: Expr, true_value: Expr, false_value: Expr) -> Self {
        Expr::Select {
            cond: Box::new(cond),
            true_value: Box::new(true_value),
            false_value: Box::new(false_value),
        }
    }

    pub fn broadcast(value: Expr, width: u16) -> Self {
        Expr::Broadcast {
            value: Box::new(value),
            width,
        }
    }

    pub fn ramp(base: Expr, stride: Expr, width: u16) -> Self {
        Expr::Ramp {
            base: Box::new(base),
            stride: Box::new(stride),
            width,
        }
    }

    pub fn call(ty: Type, name: impl Into<String>, args: Vec<Expr>, call_type: CallType) -> Self {
        Expr::Call {
            ty,
            name: name.into(),
            args,
            call_type,
        }
    }

    pub fn load(ty: Type, name: impl Into<String>, index: Vec<Expr>) -> Self {
        Expr::Load {
            ty,
            name: name.into(),
            index,
        }
    }

    /// The type this expression evaluates to.
    pub fn ty(&self) -> Type {
        match self {
            Expr::IntImm(_) => Type::int(32),
            Expr::FloatImm(_) => Type::float(32),
            Expr::StringImm(_) => Type::handle(),
            Expr::Variable { ty, .. }
            | Expr::Cast { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::Load { ty, .. } => *ty,
            Expr::Binary { op, a, .. } => {
                let t = a.ty();
                if op.is_predicate() {
                    Type::bool().with_width(t.width)
                } else {
                    t
                }
            }
            Expr::Not(a) => Type::bool().with_width(a.ty().width),
            Expr::Select { true_value, .. } => true_value.ty(),
            Expr::Broadcast { value, width } => value.ty().with_width(*width),
            Expr::Ramp { base, width, .. } => base.ty().with_width(*width),
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Expr::IntImm(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Expr::StringImm(s) => Some(s),
            _ => None,
        }
    }
}

// ─── Statements ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForType {
    Serial,
    Parallel,
    Vectorized,
    Unrolled,
}

/// Role of a loop that the scheduler mapped onto the GPU block grid.
/// Such loops are not emitted: the fragment coordinate supplies the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopAxis {
    BlockX,
    BlockY,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    LetStmt {
        name: String,
        value: Expr,
        body: Box<Stmt>,
    },
    AssertStmt {
        condition: Expr,
        message: Expr,
    },
    For {
        name: String,
        min: Expr,
        extent: Expr,
        for_type: ForType,
        #[serde(default)]
        axis: Option<LoopAxis>,
        body: Box<Stmt>,
    },
    /// Multi-dimensional write to buffer `name`.
    Store {
        name: String,
        value: Expr,
        index: Vec<Expr>,
    },
    IfThenElse {
        condition: Expr,
        then_case: Box<Stmt>,
        #[serde(default)]
        else_case: Option<Box<Stmt>>,
    },
    Evaluate(Expr),
    Block(Vec<Stmt>),
}

impl Stmt {
    pub fn let_stmt(name: impl Into<String>, value: Expr, body: Stmt) -> Self {
        Stmt::LetStmt {
            name: name.into(),
            value,
            body: Box::new(body),
        }
    }

    pub fn assert(condition: Expr, message: impl Into<String>) -> Self {
        Stmt::AssertStmt {
            condition,
            message: Expr::string(message),
        }
    }

    pub fn for_loop(
        name: impl Into<String>,
        min: Expr,
        extent: Expr,
        for_type: ForType,
        body: Stmt,
    ) -> Self {
        Stmt::For {
            name: name.into(),
            min,
            extent,
            for_type,
            axis: None,
            body: Box::new(body),
        }
    }

    /// A loop the scheduler bound to one axis of the block grid.
    pub fn block_loop(
        name: impl Into<String>,
        axis: LoopAxis,
        min: Expr,
        extent: Expr,
        body: Stmt,
    ) -> Self {
        Stmt::For {
            name: name.into(),
            min,
            extent,
            for_type: ForType::Parallel,
            axis: Some(axis),
            body: Box::new(body),
        }
    }

    pub fn store(name: impl Into<String>, value: Expr, index: Vec<Expr>) -> Self {
        Stmt::Store {
            name: name.into(),
            value,
            index,
        }
    }

    pub fn if_then_else(condition: Expr, then_case: Stmt, else_case: Option<Stmt>) -> Self {
        Stmt::IfThenElse {
            condition,
            then_case: Box::new(then_case),
            else_case: else_case.map(Box::new),
        }
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(stmts)
    }
}

// ─── Arguments ────────────────────────────────────────────────────

/// One kernel parameter. Buffers are bound as textures; everything else
/// becomes a uniform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    /// Element type for buffers, value type for scalars.
    pub ty: Type,
    #[serde(default)]
    pub is_buffer: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
}

impl Argument {
    pub fn buffer(name: impl Into<String>, ty: Type, read: bool, write: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            is_buffer: true,
            read,
            write,
        }
    }

    pub fn input(name: impl Into<String>, ty: Type) -> Self {
        Self::buffer(name, ty, true, false)
    }

    pub fn output(name: impl Into<String>, ty: Type) -> Self {
        Self::buffer(name, ty, false, true)
    }

    pub fn scalar(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_buffer: false,
            read: true,
            write: false,
        }
    }
}
