//! Rust code generation using genco

use crate::ast::{Expr, KnownLocals, Stmt};
use crate::astmodel::conversion::{ConversionDirection, PropertyAssignmentFunction, RECEIVER};
use crate::astmodel::{
    Function, PackageReference, PrimitiveKind, Type, TypeDefinition, TypeName, Types,
    ValidationFunction, ValidationKind, ValidationRule, ValidatorImplementation,
};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::format::format_rust;
use crate::util::to_snake_case;
use genco::prelude::*;
use std::collections::HashSet;

use super::module_name;

/// Render the generated methods of one package as a formatted Rust module
pub fn render_package(
    types: &Types,
    package: &PackageReference,
    config: &RenderConfig,
) -> Result<String> {
    let definitions: Vec<&TypeDefinition> = types
        .iter()
        .filter(|def| &def.name.package == package)
        .filter(|def| !def.functions.is_empty() || def.validator.is_some())
        .collect();

    let hash = types.hash()?;
    let tokens = RustRenderer { config, package }.render(&hash, &definitions);
    let code = tokens
        .to_file_string()
        .map_err(|e| Error::Render(e.to_string()))?;
    Ok(format_rust(&code)?)
}

struct RustRenderer<'a> {
    config: &'a RenderConfig,
    package: &'a PackageReference,
}

impl RustRenderer<'_> {
    fn render(&self, hash: &str, definitions: &[&TypeDefinition]) -> rust::Tokens {
        let needs_runtime = definitions.iter().any(|def| def.validator.is_some());

        quote! {
            $(if self.config.provenance {
                #![doc = $(quoted(format!(" Code generated by crdgen {}. DO NOT EDIT.", crate::VERSION)))]
                #![doc = $(quoted(format!(" Package: {}", self.package)))]
                #![doc = $(quoted(format!(" Model hash: {}", hash)))]
            })

            $(if needs_runtime {
                use crdgen::genruntime;
            })

            $(for def in definitions join ($['\n']) => $(self.render_definition(def)))
        }
    }

    fn render_definition(&self, def: &TypeDefinition) -> rust::Tokens {
        let name = def.name.name();
        let mut methods: Vec<rust::Tokens> = def
            .functions
            .iter()
            .map(|function| match function {
                Function::PropertyAssignment(f) => self.render_property_assignment(f),
                Function::Validation(f) => self.render_validation(f),
            })
            .collect();
        if let Some(validator) = &def.validator {
            methods.extend(
                ValidationKind::ALL
                    .iter()
                    .map(|kind| self.render_rule_list(validator, *kind)),
            );
        }

        let validator = def
            .validator
            .as_ref()
            .map(|validator| self.render_validator(name, validator));

        quote! {
            impl $name {
                $(for method in methods join ($['\n']) => $method)
            }

            $validator
        }
    }

    fn doc(&self, text: &str) -> rust::Tokens {
        let mut tokens = rust::Tokens::new();
        if self.config.comments {
            quote_in! { tokens =>
                #[doc = $(quoted(format!(" {}", text)))]
            }
        }
        tokens
    }

    fn render_property_assignment(&self, f: &PropertyAssignmentFunction) -> rust::Tokens {
        let other = self.type_path(f.other());
        let parameter = f.parameter();
        let (doc, receiver, parameter_type) = match f.direction() {
            ConversionDirection::To => (
                format!("Populates the provided {} from the fields of this one", f.other().name()),
                quote!(&self),
                quote!(&mut $(&other)),
            ),
            ConversionDirection::From => (
                format!("Populates this {} from the fields of the provided one", f.other().name()),
                quote!(&mut self),
                quote!(&$(&other)),
            ),
        };

        let statements: Vec<Stmt> = f.body().cloned().collect();
        let body = BodyWriter::new(&statements, [RECEIVER, parameter]).write(&statements);

        quote! {
            $(self.doc(&doc))
            pub fn $(f.name())($receiver, $parameter: $parameter_type) {
                $(for line in body join ($['\r']) => $line)
            }
        }
    }

    fn render_validation(&self, f: &ValidationFunction) -> rust::Tokens {
        match f.rule() {
            ValidationRule::ResourceReferences { field } => {
                let scope = match field {
                    Some(field) => format!("&self.{}", field_name(field)),
                    None => "self".to_string(),
                };
                quote! {
                    $(self.doc("Validates every resource reference"))
                    pub fn $(f.name())(&self) -> genruntime::ValidationResult {
                        let refs = genruntime::find_resource_references($scope);
                        genruntime::validate_resource_references(&refs)
                    }
                }
            }
        }
    }

    fn render_rule_list(&self, validator: &ValidatorImplementation, kind: ValidationKind) -> rust::Tokens {
        let element = match kind {
            ValidationKind::Update => "genruntime::UpdateValidation<Self>",
            ValidationKind::Create | ValidationKind::Delete => "genruntime::Validation<Self>",
        };
        let rules: Vec<String> = validator
            .validations(kind)
            .iter()
            .map(|rule| {
                if kind == ValidationKind::Update && !rule.takes_old() {
                    format!(
                        "(|this: &Self, _old: &Self| this.{}()) as {}",
                        rule.name(),
                        element
                    )
                } else {
                    format!("Self::{} as {}", rule.name(), element)
                }
            })
            .collect();

        quote! {
            $(self.doc(&format!("Generated {} validations", kind)))
            fn $(kind.rules_method())(&self) -> Vec<$element> {
                vec![$(for rule in &rules join (, ) => $rule)]
            }
        }
    }

    fn render_validator(&self, name: &str, validator: &ValidatorImplementation) -> rust::Tokens {
        quote! {
            #[doc = $(quoted(format!(" {}", validator.webhook_annotation())))]
            impl genruntime::Validator for $name {
                $(self.doc("Validates the creation of the resource"))
                fn validate_create(&self, overrides: &genruntime::OverrideRegistry) -> genruntime::ValidationResult {
                    genruntime::dispatch_create(self, self.create_validations(), overrides)
                }

                $(self.doc("Validates an update of the resource"))
                fn validate_update(&self, old: &Self, overrides: &genruntime::OverrideRegistry) -> genruntime::ValidationResult {
                    genruntime::dispatch_update(self, old, self.update_validations(), overrides)
                }

                $(self.doc("Validates the deletion of the resource"))
                fn validate_delete(&self, overrides: &genruntime::OverrideRegistry) -> genruntime::ValidationResult {
                    genruntime::dispatch_delete(self, self.delete_validations(), overrides)
                }
            }
        }
    }

    /// Path to a type as seen from the package being rendered
    fn type_path(&self, name: &TypeName) -> String {
        if &name.package == self.package {
            return name.name().to_string();
        }
        match (name.package.as_local(), self.package.as_local()) {
            (Some((group, version)), Some((current, _))) if group == current => {
                format!("super::{}::{}", module_name(version), name.name())
            }
            (Some((group, version)), _) => format!(
                "crate::{}::{}::{}",
                module_name(group),
                module_name(version),
                name.name()
            ),
            (None, _) => format!("{}::{}", module_name(&name.package.to_string()), name.name()),
        }
    }
}

/// Rust text for a function body
struct BodyWriter {
    locals: KnownLocals,
    /// Optional subjects currently known to hold a value, with their binding
    present: Vec<(Expr, String)>,
    maps: HashSet<String>,
    defined: HashSet<String>,
}

impl BodyWriter {
    fn new<'a>(statements: &[Stmt], reserved: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<String> = reserved.into_iter().map(String::from).collect();
        collect_names(statements, &mut names);
        Self {
            locals: KnownLocals::with_reserved(names),
            present: Vec::new(),
            maps: HashSet::new(),
            defined: HashSet::new(),
        }
    }

    fn write(&mut self, statements: &[Stmt]) -> Vec<String> {
        statements.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn block(&mut self, statements: &[Stmt]) -> String {
        format!("{{ {} }}", self.write(statements).join(" "))
    }

    fn stmt(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Assign {
                target: Expr::Index { target, index },
                value,
            } if matches!(target.as_ref(), Expr::Ident(map) if self.maps.contains(map)) => {
                format!(
                    "{}.insert({}, {});",
                    self.place(target),
                    self.value(index),
                    self.value(value)
                )
            }
            Stmt::Assign { target, value } => {
                format!("{} = {};", self.place(target), self.value(value))
            }
            Stmt::Define { name, value } => {
                let annotation = match value {
                    Expr::MakeList { element, .. } => format!(": Vec<{}>", rust_type(element)),
                    Expr::MakeMap { key, value } => format!(
                        ": std::collections::BTreeMap<{}, {}>",
                        rust_type(key),
                        rust_type(value)
                    ),
                    _ => String::new(),
                };
                if matches!(value, Expr::MakeMap { .. }) {
                    self.maps.insert(name.clone());
                }
                let rendered = format!("let mut {}{} = {};", name, annotation, self.value(value));
                self.defined.insert(name.clone());
                rendered
            }
            Stmt::IfPresent {
                subject,
                then,
                otherwise,
            } => {
                let binding = self.locals.create_local(&binding_base(subject));
                let header = format!("if let Some({}) = &{}", binding, self.place(subject));
                self.present.push((subject.clone(), binding));
                let then = self.block(then);
                self.present.pop();
                let otherwise = self.block(otherwise);
                format!("{} {} else {}", header, then, otherwise)
            }
            Stmt::ForEachIndexed {
                index,
                item,
                over,
                body,
            } => {
                let over = self.place(over);
                let body = self.block(body);
                format!("for ({}, {}) in {}.iter().enumerate() {}", index, item, over, body)
            }
            Stmt::ForEachEntry {
                key,
                item,
                over,
                body,
            } => {
                let over = self.place(over);
                let body = self.block(body);
                format!("for ({}, {}) in {}.iter() {}", key, item, over, body)
            }
        }
    }

    fn place(&self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(name) => name.clone(),
            Expr::Field { receiver, field } => {
                format!("{}.{}", self.place(receiver), field_name(field))
            }
            Expr::Index { target, index } => {
                format!("{}[{}]", self.place(target), self.place(index))
            }
            other => format!("({})", self.value(other)),
        }
    }

    fn value(&self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(name) if self.defined.contains(name) => name.clone(),
            Expr::Ident(_) | Expr::Field { .. } | Expr::Index { .. } => {
                format!("{}.clone()", self.place(expr))
            }
            Expr::AddrOf { inner } => format!("Some({})", self.value(inner)),
            Expr::Deref { inner } => match self.present.iter().rev().find(|(e, _)| e == inner.as_ref()) {
                Some((_, binding)) => format!("{}.clone()", binding),
                None => format!("{}.clone().unwrap_or_default()", self.place(inner)),
            },
            Expr::Zero(kind) => zero_literal(*kind).to_string(),
            Expr::Len { inner } => format!("{}.len()", self.place(inner)),
            Expr::MakeList { len, .. } => {
                format!("vec![Default::default(); {}]", self.value(len))
            }
            Expr::MakeMap { .. } => "std::collections::BTreeMap::new()".to_string(),
        }
    }
}

/// Every local a body declares, so fresh bindings can avoid them
fn collect_names(statements: &[Stmt], names: &mut Vec<String>) {
    for stmt in statements {
        match stmt {
            Stmt::Define { name, .. } => names.push(name.clone()),
            Stmt::IfPresent { then, otherwise, .. } => {
                collect_names(then, names);
                collect_names(otherwise, names);
            }
            Stmt::ForEachIndexed {
                index, item, body, ..
            } => {
                names.push(index.clone());
                names.push(item.clone());
                collect_names(body, names);
            }
            Stmt::ForEachEntry { key, item, body, .. } => {
                names.push(key.clone());
                names.push(item.clone());
                collect_names(body, names);
            }
            Stmt::Assign { .. } => {}
        }
    }
}

fn binding_base(subject: &Expr) -> String {
    match subject {
        Expr::Field { field, .. } => to_snake_case(field),
        Expr::Ident(name) => name.clone(),
        _ => "value".to_string(),
    }
}

fn zero_literal(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "String::new()",
        PrimitiveKind::Int | PrimitiveKind::UInt32 | PrimitiveKind::UInt64 => "0",
        PrimitiveKind::Float => "0.0",
        PrimitiveKind::Bool => "false",
    }
}

fn rust_type(ty: &Type) -> String {
    match ty {
        Type::Primitive(kind) => match kind {
            PrimitiveKind::String => "String",
            PrimitiveKind::Int => "i64",
            PrimitiveKind::Float => "f64",
            PrimitiveKind::UInt32 => "u32",
            PrimitiveKind::UInt64 => "u64",
            PrimitiveKind::Bool => "bool",
        }
        .to_string(),
        Type::Optional(element) => format!("Option<{}>", rust_type(element)),
        Type::Array(element) => format!("Vec<{}>", rust_type(element)),
        Type::Map { key, value } => format!(
            "std::collections::BTreeMap<{}, {}>",
            rust_type(key),
            rust_type(value)
        ),
        Type::Name(name) => match &name.package {
            PackageReference::External { path } => {
                format!("crdgen::{}::{}", path.replace('/', "::"), name.name())
            }
            PackageReference::Local { .. } => name.name().to_string(),
        },
        Type::Object(_) => "_".to_string(),
    }
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "type", "unsafe", "use", "where", "while", "yield",
];

fn field_name(property: &str) -> String {
    let name = to_snake_case(property);
    if KEYWORDS.contains(&name.as_str()) {
        format!("r#{}", name)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astmodel::conversion::{ConversionFactories, StorageConversionEndpoint};

    fn body(source: Type, destination: Type) -> String {
        let conversion = ConversionFactories::standard()
            .create_type_conversion(
                &StorageConversionEndpoint::new("Tags", source),
                &StorageConversionEndpoint::new("Tags", destination),
            )
            .unwrap();
        let mut locals = KnownLocals::with_reserved(["self", "destination"]);
        let statements = conversion(
            &Expr::field(Expr::ident("self"), "Tags"),
            &Expr::field(Expr::ident("destination"), "Tags"),
            &mut locals,
        );
        BodyWriter::new(&statements, ["self", "destination"])
            .write(&statements)
            .join("\n")
    }

    #[test]
    fn test_optional_to_required() {
        assert_eq!(
            body(Type::optional(Type::string()), Type::string()),
            "if let Some(tags) = &self.tags { destination.tags = tags.clone(); } \
             else { destination.tags = String::new(); }"
        );
    }

    #[test]
    fn test_array_body() {
        assert_eq!(
            body(Type::array(Type::int()), Type::array(Type::int())),
            "let mut tag_list: Vec<i64> = vec![Default::default(); self.tags.len()];\n\
             for (tag_index, tag) in self.tags.iter().enumerate() { tag_list[tag_index] = tag.clone(); }\n\
             destination.tags = tag_list;"
        );
    }

    #[test]
    fn test_map_body_uses_insert() {
        let rendered = body(
            Type::map(Type::string(), Type::optional(Type::bool())),
            Type::map(Type::string(), Type::bool()),
        );
        assert!(rendered.contains("for (tag_key, tag) in self.tags.iter()"));
        assert!(rendered.contains("if let Some(tag1) = &tag"));
        assert!(rendered.contains("tag_map.insert(tag_key.clone(), tag1.clone());"));
        assert!(rendered.contains("tag_map.insert(tag_key.clone(), false);"));
    }

    #[test]
    fn test_keyword_fields_are_escaped() {
        assert_eq!(field_name("type"), "r#type");
        assert_eq!(field_name("routeTable"), "route_table");
    }
}
