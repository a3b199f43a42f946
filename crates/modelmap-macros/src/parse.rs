//! Parsing logic for the Record derive macro.
//!
//! Extracts struct-level and field-level `#[record(...)]` attributes and
//! classifies each field's shape from its type syntax. The parsed
//! definition is handed to code generation in `lib.rs`.

use syn::{Data, DeriveInput, Error, Fields, GenericArgument, Ident, PathArguments, Result, Type};

/// Parsed record definition from a struct with `#[derive(Record)]`.
pub struct RecordDef {
    /// The struct name.
    pub name: Ident,
    /// Custom table name from `#[record(table = "...")]`.
    pub table_name: Option<String>,
    /// Parsed field definitions, declaration order.
    pub fields: Vec<FieldDef>,
}

/// Parsed definition of one struct field.
pub struct FieldDef {
    /// The field name.
    pub name: Ident,
    /// Annotation string handed to the schema resolver.
    pub tag: String,
    /// Classified field shape.
    pub kind: KindSpec,
    /// Whether the declared type was `Option`-wrapped.
    pub optional: bool,
    /// Excluded from querying.
    pub ignored: bool,
}

/// Field shape classified from type syntax and attribute overrides.
pub enum KindSpec {
    /// Plain column-backed value.
    Scalar,
    /// `SystemTime`-valued field.
    Time,
    /// Driver-value scanner type (attribute override).
    Scanner,
    /// Embedded record, flattened into the owner.
    Embedded(Type),
    /// Nested record; has_one / belongs_to inferred.
    Nested(Type),
    /// Collection of records; has_many / many_to_many inferred.
    Collection(Type),
}

#[derive(Default)]
struct FieldAttrs {
    primary_key: bool,
    auto_increment: bool,
    default: bool,
    ignore: bool,
    embedded: bool,
    scanner: bool,
    column: Option<String>,
    embedded_prefix: Option<String>,
    many2many: Option<String>,
    foreign_key: Option<String>,
    association_foreign_key: Option<String>,
    polymorphic: Option<String>,
    polymorphic_value: Option<String>,
}

/// Parse the derive input into a `RecordDef`.
pub fn parse_record(input: &DeriveInput) -> Result<RecordDef> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            input,
            "#[derive(Record)] only supports structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            input,
            "#[derive(Record)] requires named fields",
        ));
    };

    let mut table_name = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                table_name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown record attribute"))
            }
        })?;
    }

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let name = field
            .ident
            .clone()
            .expect("named fields always have an ident");

        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("primary_key") {
                    attrs.primary_key = true;
                } else if path.is_ident("auto_increment") {
                    attrs.auto_increment = true;
                } else if path.is_ident("default") {
                    attrs.default = true;
                } else if path.is_ident("ignore") {
                    attrs.ignore = true;
                } else if path.is_ident("embedded") {
                    attrs.embedded = true;
                } else if path.is_ident("scanner") {
                    attrs.scanner = true;
                } else if path.is_ident("column") {
                    attrs.column = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if path.is_ident("embedded_prefix") {
                    attrs.embedded_prefix = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if path.is_ident("many2many") {
                    attrs.many2many = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if path.is_ident("foreign_key") {
                    attrs.foreign_key = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if path.is_ident("association_foreign_key") {
                    attrs.association_foreign_key =
                        Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if path.is_ident("polymorphic") {
                    attrs.polymorphic = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if path.is_ident("polymorphic_value") {
                    attrs.polymorphic_value = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else {
                    return Err(meta.error("unknown record attribute"));
                }
                Ok(())
            })?;
        }

        let (kind, optional) = if attrs.ignore {
            // Ignored fields never resolve a target schema, so their
            // declared type carries no Record obligation.
            (KindSpec::Scalar, false)
        } else {
            classify(&field.ty, &attrs)?
        };

        fields.push(FieldDef {
            name,
            tag: build_tag(&attrs),
            kind,
            optional,
            ignored: attrs.ignore,
        });
    }

    Ok(RecordDef {
        name: input.ident.clone(),
        table_name,
        fields,
    })
}

/// Assemble the annotation string the schema resolver will parse.
fn build_tag(attrs: &FieldAttrs) -> String {
    let mut parts: Vec<String> = Vec::new();
    if attrs.ignore {
        parts.push("-".to_string());
    }
    if attrs.primary_key {
        parts.push("primary_key".to_string());
    }
    if attrs.auto_increment {
        parts.push("auto_increment".to_string());
    }
    if attrs.default {
        parts.push("default".to_string());
    }
    if let Some(v) = &attrs.column {
        parts.push(format!("column:{v}"));
    }
    if attrs.embedded {
        parts.push("embedded".to_string());
    }
    if let Some(v) = &attrs.embedded_prefix {
        parts.push(format!("embedded_prefix:{v}"));
    }
    if let Some(v) = &attrs.many2many {
        parts.push(format!("many2many:{v}"));
    }
    if let Some(v) = &attrs.foreign_key {
        parts.push(format!("foreign_key:{v}"));
    }
    if let Some(v) = &attrs.association_foreign_key {
        parts.push(format!("association_foreign_key:{v}"));
    }
    if let Some(v) = &attrs.polymorphic {
        parts.push(format!("polymorphic:{v}"));
    }
    if let Some(v) = &attrs.polymorphic_value {
        parts.push(format!("polymorphic_value:{v}"));
    }
    parts.join(";")
}

/// Classify a field's shape from its type syntax, honoring attribute
/// overrides. Returns the kind plus whether the type was Option-wrapped.
fn classify(ty: &Type, attrs: &FieldAttrs) -> Result<(KindSpec, bool)> {
    let (inner, optional) = unwrap_option(ty);

    if attrs.embedded {
        return Ok((KindSpec::Embedded(inner.clone()), optional));
    }
    if attrs.scanner {
        return Ok((KindSpec::Scanner, optional));
    }
    if let Some(elem) = vec_elem(inner) {
        if let Some(ident) = path_ident(&elem) {
            return match ident.as_str() {
                "u8" | "String" | "i32" | "i64" => Ok((KindSpec::Scalar, optional)),
                name if is_scalar_name(name) => Err(Error::new_spanned(
                    ty,
                    format!("Vec<{name}> is not a supported column type"),
                )),
                _ => Ok((KindSpec::Collection(elem), optional)),
            };
        }
        return Ok((KindSpec::Collection(elem), optional));
    }
    if let Some(ident) = path_ident(inner) {
        if is_scalar_name(&ident) {
            return Ok((KindSpec::Scalar, optional));
        }
        if ident == "SystemTime" {
            return Ok((KindSpec::Time, optional));
        }
    }
    Ok((KindSpec::Nested(inner.clone()), optional))
}

fn is_scalar_name(name: &str) -> bool {
    matches!(
        name,
        "bool"
            | "i8"
            | "i16"
            | "i32"
            | "i64"
            | "u8"
            | "u16"
            | "u32"
            | "f32"
            | "f64"
            | "char"
            | "String"
    )
}

/// Last path segment identifier of a type, if it is a path type.
fn path_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

/// Unwrap one `Option<...>` layer, reporting whether it was present.
fn unwrap_option(ty: &Type) -> (&Type, bool) {
    if let Type::Path(p) = ty {
        if let Some(segment) = p.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return (inner, true);
                    }
                }
            }
        }
    }
    (ty, false)
}

/// Element type of a `Vec<...>`, if the type is one.
fn vec_elem(ty: &Type) -> Option<Type> {
    if let Type::Path(p) = ty {
        if let Some(segment) = p.path.segments.last() {
            if segment.ident == "Vec" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner.clone());
                    }
                }
            }
        }
    }
    None
}
