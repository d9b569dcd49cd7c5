//! Interpreter for generated conversion statements
//!
//! Runs [`Stmt`] trees against [`Value`]s so the behaviour of a conversion
//! can be observed without emitting and compiling code.

use super::TypeConversion;
use crate::ast::{Expr, KnownLocals, Stmt};
use crate::astmodel::Type;
use crate::error::{Error, Result};
use crate::genruntime::Value;
use std::collections::{BTreeMap, HashMap};

/// Local variables of one running function
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    locals: HashMap<String, Value>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Remove a local, handing back its final value
    pub fn take(&mut self, name: &str) -> Result<Value> {
        self.locals
            .remove(name)
            .ok_or_else(|| Error::Eval(format!("undefined local {}", name)))
    }

    pub fn execute(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.execute_one(stmt)?;
        }
        Ok(())
    }

    fn execute_one(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => {
                let value = self.evaluate(value)?;
                *self.place_mut(target)? = value;
            }
            Stmt::Define { name, value } => {
                let value = self.evaluate(value)?;
                self.set(name.clone(), value);
            }
            Stmt::IfPresent {
                subject,
                then,
                otherwise,
            } => {
                if self.evaluate(subject)?.is_null() {
                    self.execute(otherwise)?;
                } else {
                    self.execute(then)?;
                }
            }
            Stmt::ForEachIndexed {
                index,
                item,
                over,
                body,
            } => {
                let items = match self.evaluate(over)? {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    other => return Err(Error::Eval(format!("cannot range over {}", other))),
                };
                for (i, value) in items.into_iter().enumerate() {
                    self.set(index.clone(), Value::Int(i as i64));
                    self.set(item.clone(), value);
                    self.execute(body)?;
                }
            }
            Stmt::ForEachEntry {
                key,
                item,
                over,
                body,
            } => {
                let entries = match self.evaluate(over)? {
                    Value::Map(entries) => entries,
                    Value::Null => BTreeMap::new(),
                    other => return Err(Error::Eval(format!("cannot range over {}", other))),
                };
                for (k, value) in entries {
                    self.set(key.clone(), Value::String(k));
                    self.set(item.clone(), value);
                    self.execute(body)?;
                }
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Ident(name) => self
                .get(name)
                .cloned()
                .ok_or_else(|| Error::Eval(format!("undefined local {}", name))),
            Expr::Field { receiver, field } => match self.evaluate(receiver)? {
                Value::Map(mut fields) => Ok(fields.remove(field).unwrap_or(Value::Null)),
                other => Err(Error::Eval(format!("no field {} on {}", field, other))),
            },
            Expr::Index { target, index } => {
                let key = self.evaluate(index)?;
                match self.evaluate(target)? {
                    Value::Array(mut items) => {
                        let i = position(&key)?;
                        if i >= items.len() {
                            return Err(out_of_range(i, items.len()));
                        }
                        Ok(items.swap_remove(i))
                    }
                    Value::Map(mut entries) => {
                        Ok(entries.remove(&key.as_key()).unwrap_or(Value::Null))
                    }
                    other => Err(Error::Eval(format!("cannot index {}", other))),
                }
            }
            // a present optional is represented by the value it holds
            Expr::AddrOf { inner } => self.evaluate(inner),
            Expr::Deref { inner } => match self.evaluate(inner)? {
                Value::Null => Err(Error::Eval("dereference of an absent value".into())),
                value => Ok(value),
            },
            Expr::Zero(kind) => Ok(Value::zero(*kind)),
            Expr::Len { inner } => match self.evaluate(inner)? {
                Value::Array(items) => Ok(Value::Int(items.len() as i64)),
                Value::Map(entries) => Ok(Value::Int(entries.len() as i64)),
                Value::Null => Ok(Value::Int(0)),
                other => Err(Error::Eval(format!("no length for {}", other))),
            },
            Expr::MakeList { element, len } => {
                let len = position(&self.evaluate(len)?)?;
                Ok(Value::Array(vec![Value::zero_of(element); len]))
            }
            Expr::MakeMap { .. } => Ok(Value::Map(BTreeMap::new())),
        }
    }

    fn place_mut(&mut self, target: &Expr) -> Result<&mut Value> {
        match target {
            Expr::Ident(name) => self
                .locals
                .get_mut(name)
                .ok_or_else(|| Error::Eval(format!("undefined local {}", name))),
            Expr::Field { receiver, field } => {
                let slot = self.place_mut(receiver)?;
                if slot.is_null() {
                    *slot = Value::Map(BTreeMap::new());
                }
                match slot {
                    Value::Map(fields) => Ok(fields.entry(field.clone()).or_insert(Value::Null)),
                    other => Err(Error::Eval(format!("no field {} on {}", field, other))),
                }
            }
            Expr::Index { target, index } => {
                let key = self.evaluate(index)?;
                match self.place_mut(target)? {
                    Value::Array(items) => {
                        let i = position(&key)?;
                        let len = items.len();
                        items.get_mut(i).ok_or_else(|| out_of_range(i, len))
                    }
                    Value::Map(entries) => Ok(entries.entry(key.as_key()).or_insert(Value::Null)),
                    other => Err(Error::Eval(format!("cannot index {}", other))),
                }
            }
            other => Err(Error::Eval(format!("{:?} is not assignable", other))),
        }
    }
}

fn position(value: &Value) -> Result<usize> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i as usize),
        Value::UInt(u) => Ok(*u as usize),
        other => Err(Error::Eval(format!("{} is not a valid index", other))),
    }
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::Eval(format!("index {} out of range for length {}", index, len))
}

/// Run a conversion on one value, starting from the zero value of the
/// destination type
pub fn apply_conversion(
    conversion: &TypeConversion,
    source: Value,
    destination: &Type,
) -> Result<Value> {
    let mut locals = KnownLocals::with_reserved(["source", "destination"]);
    let stmts = conversion(
        &Expr::ident("source"),
        &Expr::ident("destination"),
        &mut locals,
    );

    let mut evaluator = Evaluator::new()
        .with_local("source", source)
        .with_local("destination", Value::zero_of(destination));
    evaluator.execute(&stmts)?;
    evaluator.take("destination")
}
