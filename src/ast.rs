//! Code fragment AST
//!
//! Language-agnostic statements and expressions produced by conversion
//! synthesis. Renderers turn these into source text; [`crate::astmodel::conversion::eval`]
//! executes them directly against runtime values.

use crate::astmodel::{PrimitiveKind, Type};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Local variable or parameter
    Ident(String),

    /// `receiver.field`
    Field { receiver: Box<Expr>, field: String },

    /// `target[index]`, for both sequences and maps
    Index { target: Box<Expr>, index: Box<Expr> },

    /// Construct the "present" form of an optional from a plain value
    AddrOf { inner: Box<Expr> },

    /// Read the value held by a present optional
    Deref { inner: Box<Expr> },

    /// Zero value of a primitive kind (`""`, `0`, `false`)
    Zero(PrimitiveKind),

    /// Number of elements in a sequence
    Len { inner: Box<Expr> },

    /// New sequence of `len` zero elements
    MakeList { element: Type, len: Box<Expr> },

    /// New empty map
    MakeMap { key: Type, value: Type },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn field(receiver: Expr, field: impl Into<String>) -> Self {
        Expr::Field {
            receiver: Box::new(receiver),
            field: field.into(),
        }
    }

    pub fn index(target: Expr, index: Expr) -> Self {
        Expr::Index {
            target: Box::new(target),
            index: Box::new(index),
        }
    }

    pub fn addr_of(inner: Expr) -> Self {
        Expr::AddrOf {
            inner: Box::new(inner),
        }
    }

    pub fn deref(inner: Expr) -> Self {
        Expr::Deref {
            inner: Box::new(inner),
        }
    }

    pub fn len(inner: Expr) -> Self {
        Expr::Len {
            inner: Box::new(inner),
        }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `target = value`
    Assign { target: Expr, value: Expr },

    /// Declare a new local: `name := value`
    Define { name: String, value: Expr },

    /// Branch on whether an optional holds a value
    IfPresent {
        subject: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },

    /// `for index, item := range over { body }`
    ForEachIndexed {
        index: String,
        item: String,
        over: Expr,
        body: Vec<Stmt>,
    },

    /// `for key, item := range over { body }`; entry order is unspecified
    ForEachEntry {
        key: String,
        item: String,
        over: Expr,
        body: Vec<Stmt>,
    },
}

impl Stmt {
    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign { target, value }
    }

    pub fn define(name: impl Into<String>, value: Expr) -> Self {
        Stmt::Define {
            name: name.into(),
            value,
        }
    }
}

/// Local names already claimed within one generated function.
///
/// Hands out `item`, `item1`, `item2`, ... so nested loops never shadow
/// each other.
#[derive(Debug, Clone, Default)]
pub struct KnownLocals {
    names: HashSet<String>,
}

impl KnownLocals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-claim names such as receiver and parameter identifiers
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Claim `base` or the first free numbered variant of it
    pub fn create_local(&mut self, base: &str) -> String {
        if self.names.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.names.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
