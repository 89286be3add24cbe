#![forbid(unsafe_code)]

//! Dynamically typed bound values.
//!
//! Template controllers bind a value of arbitrary runtime type and coerce it
//! to a boolean via truthiness. [`BoundValue`] is the tagged union covering
//! the truthiness-producing variants: boolean, number, string, object,
//! opaque symbol, null, and undefined (absent).
//!
//! # Invariants
//!
//! 1. The exact falsy set is: `Bool(false)`, `Num(0.0)`, `Num(NaN)`,
//!    `Str("")`, `Null`, `Undefined`. Everything else is truthy — including
//!    `Str("false")` and `Str("0")`.
//! 2. Equality follows the source ecosystem's identity semantics: `Num(NaN)`
//!    is not equal to itself, and `Obj` compares by pointer identity, never
//!    structurally.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A dynamically typed value bound to a template controller.
#[derive(Clone, Debug)]
pub enum BoundValue {
    /// A boolean.
    Bool(bool),
    /// A number; integers and floats share this variant.
    Num(f64),
    /// A string.
    Str(Rc<str>),
    /// An opaque object reference. Truthy; equal only to itself.
    Obj(Rc<dyn Any>),
    /// A symbol-like opaque identity. Truthy; equal only to the same id.
    Sym(u64),
    /// An explicit null.
    Null,
    /// An absent value.
    Undefined,
}

impl BoundValue {
    /// Coerce to a boolean using the ecosystem truthiness contract.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Num(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Obj(_) | Self::Sym(_) => true,
            Self::Null | Self::Undefined => false,
        }
    }

    /// Wrap an object reference.
    #[must_use]
    pub fn obj(value: Rc<dyn Any>) -> Self {
        Self::Obj(value)
    }
}

impl PartialEq for BoundValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // IEEE semantics: NaN != NaN, so a NaN write always "changes".
            (Self::Num(a), Self::Num(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Obj(a), Self::Obj(b)) => Rc::ptr_eq(a, b),
            (Self::Sym(a), Self::Sym(b)) => a == b,
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Num(n) => {
                // Integral numbers render without a trailing fraction.
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Str(s) => write!(f, "{s}"),
            Self::Obj(_) => write!(f, "[object]"),
            Self::Sym(id) => write!(f, "Symbol({id})"),
            Self::Null => write!(f, "null"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

impl From<bool> for BoundValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for BoundValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<i64> for BoundValue {
    fn from(value: i64) -> Self {
        Self::Num(value as f64)
    }
}

impl From<&str> for BoundValue {
    fn from(value: &str) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<String> for BoundValue {
    fn from(value: String) -> Self {
        Self::Str(Rc::from(value.as_str()))
    }
}
