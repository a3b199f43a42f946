//! Procedural macros for modelmap.
//!
//! `modelmap-macros` is the **compile-time codegen layer**. It turns Rust
//! structs into statically described records: `#[derive(Record)]` emits
//! the field declarations, annotation strings, and value snapshots that
//! the schema resolver consumes, replacing runtime reflection entirely.

use proc_macro::TokenStream;

mod parse;

use parse::{FieldDef, KindSpec, RecordDef, parse_record};

/// Derive macro for the `Record` trait.
///
/// Generates the static field declarations, the optional custom table
/// name, and the value-snapshot implementation.
///
/// # Attributes
///
/// Struct level:
/// - `#[record(table = "name")]` - Custom table name (otherwise derived
///   from the snake-cased, pluralized struct name)
///
/// Field level:
/// - `#[record(primary_key)]` - Mark field as primary key
/// - `#[record(auto_increment)]` - Column value is database-assigned
/// - `#[record(default)]` - Column has a database default
/// - `#[record(ignore)]` - Exclude the field from querying
/// - `#[record(column = "name")]` - Override column name
/// - `#[record(embedded)]` - Flatten a nested record's fields in place
/// - `#[record(embedded_prefix = "p_")]` - Column prefix for embedded
///   sub-fields
/// - `#[record(scanner)]` - Treat the field's `ScanValue` type as a
///   single scalar column
/// - `#[record(many2many = "join_table")]` - Many-to-many through the
///   named join table
/// - `#[record(foreign_key = "a,b")]` - Foreign-key column override
/// - `#[record(association_foreign_key = "x,y")]` - Association-side
///   override
/// - `#[record(polymorphic = "Owner")]` - Polymorphic ownership label
/// - `#[record(polymorphic_value = "value")]` - Stored polymorphic value
///
/// # Example
///
/// ```ignore
/// use modelmap::Record;
///
/// #[derive(Record)]
/// struct User {
///     #[record(primary_key)]
///     id: i64,
///     name: String,
///     emails: Vec<Email>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let record = match parse_record(&input) {
        Ok(r) => r,
        Err(e) => return e.to_compile_error().into(),
    };

    generate_record_impl(&record).into()
}

/// Generate the Record trait implementation from the parsed definition.
fn generate_record_impl(record: &RecordDef) -> proc_macro2::TokenStream {
    let name = &record.name;
    let model_name = name.to_string();

    let decls = record.fields.iter().map(field_decl_tokens);
    let value_stmts = record.fields.iter().map(record_value_tokens);

    let table_name_fn = record.table_name.as_ref().map(|table| {
        quote::quote! {
            fn table_name() -> Option<&'static str> {
                Some(#table)
            }
        }
    });

    quote::quote! {
        impl modelmap_core::Record for #name {
            const MODEL_NAME: &'static str = #model_name;

            fn declared_fields() -> &'static [modelmap_core::FieldDecl] {
                static FIELDS: &[modelmap_core::FieldDecl] = &[
                    #(#decls),*
                ];
                FIELDS
            }

            #table_name_fn

            fn record_values(&self) -> Vec<(modelmap_core::FieldPath, modelmap_core::Value)> {
                let mut values: Vec<(modelmap_core::FieldPath, modelmap_core::Value)> = Vec::new();
                #(#value_stmts)*
                values
            }
        }
    }
}

/// Emit one `FieldDecl` literal.
fn field_decl_tokens(field: &FieldDef) -> proc_macro2::TokenStream {
    let name = field.name.to_string();
    let tag = &field.tag;
    let kind = match &field.kind {
        KindSpec::Scalar => quote::quote! { modelmap_core::FieldKind::Scalar },
        KindSpec::Time => quote::quote! { modelmap_core::FieldKind::Time },
        KindSpec::Scanner => {
            quote::quote! { modelmap_core::FieldKind::Scanner { nested_tags: &[] } }
        }
        KindSpec::Embedded(ty) => quote::quote! {
            modelmap_core::FieldKind::Embedded { target: modelmap_core::resolve::<#ty> }
        },
        KindSpec::Nested(ty) => quote::quote! {
            modelmap_core::FieldKind::Nested { target: modelmap_core::resolve::<#ty> }
        },
        KindSpec::Collection(ty) => quote::quote! {
            modelmap_core::FieldKind::Collection { target: modelmap_core::resolve::<#ty> }
        },
    };

    quote::quote! {
        modelmap_core::FieldDecl {
            name: #name,
            tag: #tag,
            kind: #kind,
        }
    }
}

/// Emit the snapshot statement for one field.
///
/// Relationship fields contribute nothing; embedded fields flatten their
/// sub-record's values under a prefixed path.
fn record_value_tokens(field: &FieldDef) -> proc_macro2::TokenStream {
    if field.ignored {
        return proc_macro2::TokenStream::new();
    }

    let ident = &field.name;
    let name = field.name.to_string();

    match &field.kind {
        KindSpec::Scalar | KindSpec::Time => quote::quote! {
            values.push((
                vec![#name],
                modelmap_core::Value::from(self.#ident.clone()),
            ));
        },
        KindSpec::Scanner => {
            if field.optional {
                quote::quote! {
                    values.push((
                        vec![#name],
                        match &self.#ident {
                            Some(v) => modelmap_core::ScanValue::to_value(v),
                            None => modelmap_core::Value::Null,
                        },
                    ));
                }
            } else {
                quote::quote! {
                    values.push((
                        vec![#name],
                        modelmap_core::ScanValue::to_value(&self.#ident),
                    ));
                }
            }
        }
        KindSpec::Embedded(_) => {
            if field.optional {
                quote::quote! {
                    if let Some(embedded) = &self.#ident {
                        values.extend(
                            modelmap_core::Record::record_values(embedded)
                                .into_iter()
                                .map(|(mut path, value)| {
                                    path.insert(0, #name);
                                    (path, value)
                                }),
                        );
                    }
                }
            } else {
                quote::quote! {
                    values.extend(
                        modelmap_core::Record::record_values(&self.#ident)
                            .into_iter()
                            .map(|(mut path, value)| {
                                path.insert(0, #name);
                                (path, value)
                            }),
                    );
                }
            }
        }
        KindSpec::Nested(_) | KindSpec::Collection(_) => proc_macro2::TokenStream::new(),
    }
}
