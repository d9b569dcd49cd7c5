//! Priority-ordered conversion factories
//!
//! Each factory looks at a (source, destination) pair and either builds a
//! [`TypeConversion`] or declines. [`ConversionFactories`] tries them in
//! order and commits to the first that accepts, so earlier factories claim
//! the simple cases before the container factories see them.

use super::StorageConversionEndpoint;
use crate::ast::{Expr, KnownLocals, Stmt};
use crate::astmodel::Type;
use crate::error::{Error, Result};
use std::fmt;
use tracing::trace;

/// Generates the statements for one conversion.
///
/// `reader` reads the source value and `writer` is the place the converted
/// value is stored; either may be an arbitrary field or index expression.
pub type TypeConversion = Box<dyn Fn(&Expr, &Expr, &mut KnownLocals) -> Vec<Stmt>>;

/// Builds a conversion for a pair of endpoints, or returns `None` when the
/// pair is not its concern. Container factories resolve their element
/// conversions through the list they were invoked from.
pub type ConversionFactory = fn(
    &StorageConversionEndpoint,
    &StorageConversionEndpoint,
    &ConversionFactories,
) -> Option<TypeConversion>;

/// An ordered list of conversion factories
#[derive(Clone, Default)]
pub struct ConversionFactories {
    factories: Vec<(&'static str, ConversionFactory)>,
}

impl ConversionFactories {
    /// An empty list; nothing converts until factories are added
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard list, in priority order
    pub fn standard() -> Self {
        Self::new()
            .with_factory("primitive_from_primitive", assign_primitive_from_primitive)
            .with_factory(
                "optional_primitive_from_primitive",
                assign_optional_primitive_from_primitive,
            )
            .with_factory(
                "primitive_from_optional_primitive",
                assign_primitive_from_optional_primitive,
            )
            .with_factory(
                "optional_primitive_from_optional_primitive",
                assign_optional_primitive_from_optional_primitive,
            )
            .with_factory("array_from_array", assign_array_from_array)
            .with_factory("map_from_map", assign_map_from_map)
    }

    /// Append a factory with the lowest priority so far
    pub fn with_factory(mut self, name: &'static str, factory: ConversionFactory) -> Self {
        self.factories.push((name, factory));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// First conversion any factory offers for the pair
    pub fn create_type_conversion(
        &self,
        source: &StorageConversionEndpoint,
        destination: &StorageConversionEndpoint,
    ) -> Result<TypeConversion> {
        for (name, factory) in &self.factories {
            if let Some(conversion) = factory(source, destination, self) {
                trace!(factory = *name, %source, %destination, "conversion factory matched");
                return Ok(conversion);
            }
        }

        Err(Error::Synthesis {
            destination: destination.to_string(),
            origin: source.to_string(),
        })
    }
}

impl fmt::Debug for ConversionFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Types copied by plain assignment: primitives, and external names such as
/// `genruntime/ResourceReference` that only ever convert to themselves
fn is_copyable(source: &Type, destination: &Type) -> bool {
    match (source, destination) {
        (Type::Primitive(src), Type::Primitive(dst)) => src == dst,
        (Type::Name(src), Type::Name(dst)) => !src.package.is_local() && src == dst,
        _ => false,
    }
}

/// `<writer> = <reader>` when both sides are the same non-optional primitive
/// or the same external name
fn assign_primitive_from_primitive(
    source: &StorageConversionEndpoint,
    destination: &StorageConversionEndpoint,
    _: &ConversionFactories,
) -> Option<TypeConversion> {
    if !is_copyable(source.ty(), destination.ty()) {
        return None;
    }

    Some(Box::new(|reader: &Expr, writer: &Expr, _: &mut KnownLocals| {
        vec![Stmt::assign(writer.clone(), reader.clone())]
    }))
}

/// `<writer> = &<reader>` when only the destination is optional
fn assign_optional_primitive_from_primitive(
    source: &StorageConversionEndpoint,
    destination: &StorageConversionEndpoint,
    _: &ConversionFactories,
) -> Option<TypeConversion> {
    let Type::Primitive(src) = source.ty() else {
        return None;
    };
    if !destination.ty().is_optional() || destination.ty().as_primitive() != Some(*src) {
        return None;
    }

    Some(Box::new(|reader: &Expr, writer: &Expr, _: &mut KnownLocals| {
        vec![Stmt::assign(writer.clone(), Expr::addr_of(reader.clone()))]
    }))
}

/// Unwraps the source when only it is optional.
///
/// An empty source writes the zero value of the primitive kind, so absence
/// does not survive the conversion.
fn assign_primitive_from_optional_primitive(
    source: &StorageConversionEndpoint,
    destination: &StorageConversionEndpoint,
    _: &ConversionFactories,
) -> Option<TypeConversion> {
    if !source.ty().is_optional() {
        return None;
    }
    let src = source.ty().as_primitive()?;
    let Type::Primitive(dst) = destination.ty() else {
        return None;
    };
    if src != *dst {
        return None;
    }

    Some(Box::new(move |reader: &Expr, writer: &Expr, _: &mut KnownLocals| {
        vec![Stmt::IfPresent {
            subject: reader.clone(),
            then: vec![Stmt::assign(writer.clone(), Expr::deref(reader.clone()))],
            otherwise: vec![Stmt::assign(writer.clone(), Expr::Zero(src))],
        }]
    }))
}

/// `<writer> = <reader>` when both sides are optional; presence carries over
fn assign_optional_primitive_from_optional_primitive(
    source: &StorageConversionEndpoint,
    destination: &StorageConversionEndpoint,
    _: &ConversionFactories,
) -> Option<TypeConversion> {
    let src = source.ty().as_optional()?;
    let dst = destination.ty().as_optional()?;
    if !is_copyable(src, dst) {
        return None;
    }

    Some(Box::new(|reader: &Expr, writer: &Expr, _: &mut KnownLocals| {
        vec![Stmt::assign(writer.clone(), reader.clone())]
    }))
}

/// Builds a new sequence element by element:
///
/// ```text
/// <list> := make([]<element>, len(<reader>))
/// for <index>, <item> := range <reader> {
///     <list>[<index>] = <item>   // or the element conversion
/// }
/// <writer> = <list>
/// ```
fn assign_array_from_array(
    source: &StorageConversionEndpoint,
    destination: &StorageConversionEndpoint,
    factories: &ConversionFactories,
) -> Option<TypeConversion> {
    let src_element = source.ty().as_array()?;
    let dst_element = destination.ty().as_array()?;

    let element_conversion = factories
        .create_type_conversion(
            &source.with_type(src_element.clone()),
            &destination.with_type(dst_element.clone()),
        )
        .ok()?;

    let source = source.clone();
    let dst_element = dst_element.clone();
    Some(Box::new(move |reader: &Expr, writer: &Expr, locals: &mut KnownLocals| {
        let item = source.create_singular_local(locals);
        let index = locals.create_local(&format!("{}_index", item));
        let list = source.create_plural_local("list", locals);

        let declaration = Stmt::define(
            list.clone(),
            Expr::MakeList {
                element: dst_element.clone(),
                len: Box::new(Expr::len(reader.clone())),
            },
        );

        let body = element_conversion(
            &Expr::ident(item.clone()),
            &Expr::index(Expr::ident(list.clone()), Expr::ident(index.clone())),
            locals,
        );

        vec![
            declaration,
            Stmt::ForEachIndexed {
                index,
                item,
                over: reader.clone(),
                body,
            },
            Stmt::assign(writer.clone(), Expr::ident(list)),
        ]
    }))
}

/// Builds a new map entry by entry, keeping keys:
///
/// ```text
/// <map> := make(map[<key>]<value>)
/// for <key>, <item> := range <reader> {
///     <map>[<key>] = <item>   // or the value conversion
/// }
/// <writer> = <map>
/// ```
///
/// Key types must match exactly.
fn assign_map_from_map(
    source: &StorageConversionEndpoint,
    destination: &StorageConversionEndpoint,
    factories: &ConversionFactories,
) -> Option<TypeConversion> {
    let (src_key, src_value) = source.ty().as_map()?;
    let (dst_key, dst_value) = destination.ty().as_map()?;
    if src_key != dst_key {
        return None;
    }

    let value_conversion = factories
        .create_type_conversion(
            &source.with_type(src_value.clone()),
            &destination.with_type(dst_value.clone()),
        )
        .ok()?;

    let source = source.clone();
    let dst_key = dst_key.clone();
    let dst_value = dst_value.clone();
    Some(Box::new(move |reader: &Expr, writer: &Expr, locals: &mut KnownLocals| {
        let item = source.create_singular_local(locals);
        let key = locals.create_local(&format!("{}_key", item));
        let map = source.create_plural_local("map", locals);

        let declaration = Stmt::define(
            map.clone(),
            Expr::MakeMap {
                key: dst_key.clone(),
                value: dst_value.clone(),
            },
        );

        let body = value_conversion(
            &Expr::ident(item.clone()),
            &Expr::index(Expr::ident(map.clone()), Expr::ident(key.clone())),
            locals,
        );

        vec![
            declaration,
            Stmt::ForEachEntry {
                key,
                item,
                over: reader.clone(),
                body,
            },
            Stmt::assign(writer.clone(), Expr::ident(map)),
        ]
    }))
}
