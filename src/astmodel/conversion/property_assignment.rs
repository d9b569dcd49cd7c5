//! Property-by-property conversion between two versions of an object

use super::eval::Evaluator;
use super::{ConversionFactories, StorageConversionEndpoint};
use crate::ast::{Expr, KnownLocals, Stmt};
use crate::astmodel::{ObjectType, Type, TypeDefinition, TypeName, TypeVisitor, Types};
use crate::error::{aggregate, Error, Result};
use crate::genruntime::Value;
use crate::util::to_snake_case;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use tracing::debug;

/// Receiver identifier in generated functions
pub const RECEIVER: &str = "self";

/// Which way values flow relative to the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionDirection {
    /// Receiver is read, the parameter is written
    To,
    /// Parameter is read, the receiver is written
    From,
}

impl ConversionDirection {
    pub fn parameter(&self) -> &'static str {
        match self {
            ConversionDirection::To => "destination",
            ConversionDirection::From => "source",
        }
    }

    fn function_prefix(&self) -> &'static str {
        match self {
            ConversionDirection::To => "assign_properties_to",
            ConversionDirection::From => "assign_properties_from",
        }
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDirection::To => write!(f, "to"),
            ConversionDirection::From => write!(f, "from"),
        }
    }
}

/// Statements copying one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAssignment {
    pub property: String,
    pub statements: Vec<Stmt>,
}

/// Copies every shared property between a type and another version of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAssignmentFunction {
    name: String,
    direction: ConversionDirection,
    other: TypeName,
    assignments: Vec<PropertyAssignment>,
}

impl PropertyAssignmentFunction {
    /// Synthesize the function for `receiver`, converting to or from `other`.
    ///
    /// Properties are matched by name. A property present on only one side
    /// is skipped. Every matched pair must have a conversion; the errors of
    /// all pairs that don't are returned together.
    pub fn new(
        receiver: &TypeDefinition,
        other: &TypeDefinition,
        direction: ConversionDirection,
        types: &Types,
        factories: &ConversionFactories,
    ) -> Result<Self> {
        let receiver_object = object_of(receiver, types)?;
        let other_object = object_of(other, types)?;
        let (source, destination, source_ident, destination_ident) = match direction {
            ConversionDirection::To => (
                receiver_object,
                other_object,
                RECEIVER,
                direction.parameter(),
            ),
            ConversionDirection::From => (
                other_object,
                receiver_object,
                direction.parameter(),
                RECEIVER,
            ),
        };

        for prop in source.properties() {
            if destination.property(&prop.name).is_none() {
                debug!(
                    property = %prop.name,
                    from = %receiver.name,
                    other = %other.name,
                    "property has no counterpart, not converted"
                );
            }
        }

        let mut locals = KnownLocals::with_reserved([RECEIVER, direction.parameter()]);
        let mut assignments = Vec::new();
        let mut errs = Vec::new();
        for dst_prop in destination.properties() {
            let Some(src_prop) = source.property(&dst_prop.name) else {
                debug!(
                    property = %dst_prop.name,
                    from = %receiver.name,
                    other = %other.name,
                    "property has no counterpart, not converted"
                );
                continue;
            };

            let result = conversion_type(&src_prop.property_type, types)
                .and_then(|src_ty| {
                    let dst_ty = conversion_type(&dst_prop.property_type, types)?;
                    factories.create_type_conversion(
                        &StorageConversionEndpoint::new(&src_prop.name, src_ty),
                        &StorageConversionEndpoint::new(&dst_prop.name, dst_ty),
                    )
                });

            match result {
                Ok(conversion) => {
                    let statements = conversion(
                        &Expr::field(Expr::ident(source_ident), &src_prop.name),
                        &Expr::field(Expr::ident(destination_ident), &dst_prop.name),
                        &mut locals,
                    );
                    assignments.push(PropertyAssignment {
                        property: dst_prop.name.clone(),
                        statements,
                    });
                }
                Err(e) => errs.push(e),
            }
        }
        aggregate(errs)?;

        Ok(Self {
            name: format!("{}_{}", direction.function_prefix(), to_snake_case(other.name.name())),
            direction,
            other: other.name.clone(),
            assignments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> ConversionDirection {
        self.direction
    }

    /// The type converted to or from
    pub fn other(&self) -> &TypeName {
        &self.other
    }

    /// Name of the function's parameter
    pub fn parameter(&self) -> &'static str {
        self.direction.parameter()
    }

    pub fn assignments(&self) -> &[PropertyAssignment] {
        &self.assignments
    }

    /// All statements of the function body, in property order
    pub fn body(&self) -> impl Iterator<Item = &Stmt> {
        self.assignments.iter().flat_map(|a| a.statements.iter())
    }

    /// Run the function, returning the value it wrote to: the parameter for
    /// `To`, the receiver for `From`.
    pub fn apply(&self, receiver: Value, parameter: Value) -> Result<Value> {
        let mut evaluator = Evaluator::new()
            .with_local(RECEIVER, receiver)
            .with_local(self.parameter(), parameter);
        let body: Vec<Stmt> = self.body().cloned().collect();
        evaluator.execute(&body)?;
        match self.direction {
            ConversionDirection::To => evaluator.take(self.parameter()),
            ConversionDirection::From => evaluator.take(RECEIVER),
        }
    }
}

fn object_of<'a>(definition: &'a TypeDefinition, types: &'a Types) -> Result<&'a ObjectType> {
    types.resolve(&definition.ty)?.as_object().ok_or_else(|| {
        Error::Other(format!(
            "{} is not an object and has no properties to convert",
            definition.name
        ))
    })
}

struct AliasExpansion<'a> {
    types: &'a Types,
    expanding: RefCell<Vec<TypeName>>,
}

/// Replace local aliases of primitive and container types with the types
/// they stand for. Names of objects, external names and recursive aliases
/// are left as names.
fn conversion_type(ty: &Type, types: &Types) -> Result<Type> {
    let visitor = TypeVisitor::<'_, AliasExpansion<'_>>::new().on_name(|visitor, name, ctx| {
        if !name.package.is_local() || ctx.expanding.borrow().contains(name) {
            return Ok(Type::Name(name.clone()));
        }
        let named = Type::Name(name.clone());
        let resolved = ctx.types.resolve(&named)?.clone();
        if resolved.as_object().is_some() {
            return Ok(named);
        }

        ctx.expanding.borrow_mut().push(name.clone());
        let expanded = visitor.visit(&resolved, ctx);
        ctx.expanding.borrow_mut().pop();
        expanded
    });

    visitor.visit(
        ty,
        &AliasExpansion {
            types,
            expanding: RefCell::new(Vec::new()),
        },
    )
}
