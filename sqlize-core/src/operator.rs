//! SQL operators and their binding precedence

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::{Error, Result};

/// Binding strength of an expression node; higher binds tighter.
pub type Precedence = u8;

pub(crate) mod prec {
    use super::Precedence;

    pub const RAW: Precedence = 0;
    pub const OR: Precedence = 1;
    pub const AND: Precedence = 2;
    pub const NOT: Precedence = 3;
    pub const COMPARISON: Precedence = 4;
    /// `||` ranks differently against arithmetic across databases, so the
    /// renderer never mixes the two without parentheses.
    pub const CONCAT: Precedence = 5;
    pub const ADDITIVE: Precedence = 6;
    pub const MULTIPLICATIVE: Precedence = 7;
    pub const NEGATE: Precedence = 8;
    pub const ATOM: Precedence = 9;
}

/// Infix operator between two expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    ILike,
    NotILike,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

impl BinaryOp {
    /// SQL spelling of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::ILike => "ILIKE",
            BinaryOp::NotILike => "NOT ILIKE",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "||",
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            BinaryOp::Concat => prec::CONCAT,
            BinaryOp::Add | BinaryOp::Sub => prec::ADDITIVE,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => prec::MULTIPLICATIVE,
            _ => prec::COMPARISON,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.precedence() == prec::COMPARISON
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse the usual spellings of an operator; unknown operators are a build error
/// rather than a panic.
impl FromStr for BinaryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => BinaryOp::Eq,
            "<>" | "!=" => BinaryOp::NotEq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Lte,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Gte,
            "LIKE" => BinaryOp::Like,
            "NOT LIKE" => BinaryOp::NotLike,
            "ILIKE" => BinaryOp::ILike,
            "NOT ILIKE" => BinaryOp::NotILike,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "||" => BinaryOp::Concat,
            _ => return Err(Error::build(format!("unknown operator '{}'", s))),
        };
        Ok(op)
    }
}

/// Prefix or postfix operator on a single expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

impl UnaryOp {
    pub fn precedence(&self) -> Precedence {
        match self {
            UnaryOp::Not => prec::NOT,
            UnaryOp::Negate => prec::NEGATE,
            UnaryOp::IsNull | UnaryOp::IsNotNull => prec::COMPARISON,
        }
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::BinaryOp;

    pub const EQ: BinaryOp = BinaryOp::Eq;
    pub const NEQ: BinaryOp = BinaryOp::NotEq;
    pub const LT: BinaryOp = BinaryOp::Lt;
    pub const LTE: BinaryOp = BinaryOp::Lte;
    pub const GT: BinaryOp = BinaryOp::Gt;
    pub const GTE: BinaryOp = BinaryOp::Gte;
    pub const LIKE: BinaryOp = BinaryOp::Like;
    pub const NOT_LIKE: BinaryOp = BinaryOp::NotLike;
    pub const ILIKE: BinaryOp = BinaryOp::ILike;
    pub const NOT_ILIKE: BinaryOp = BinaryOp::NotILike;
}
