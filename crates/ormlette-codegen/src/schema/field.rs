use super::{AutoStrategy, Column, ErrorSet, Relation};

use syn::ext::IdentExt;

#[derive(Debug)]
pub(crate) struct Field {
    /// Field identifier, as written in the struct
    pub(crate) ident: syn::Ident,

    /// Logical field name, `r#` prefix removed
    pub(crate) name: String,

    /// Field attributes
    pub(crate) attrs: FieldAttr,

    /// Field type
    pub(crate) ty: FieldTy,
}

#[derive(Debug, Default)]
pub(crate) struct FieldAttr {
    /// `#[key]`
    pub(crate) key: bool,

    /// How the key is generated on insert
    pub(crate) auto: Option<AutoStrategy>,

    /// `#[index]` with an optional index name
    pub(crate) index: Option<Option<syn::LitStr>>,

    /// `#[unique]` with an optional index name
    pub(crate) unique: Option<Option<syn::LitStr>>,

    /// Optional database column name, type and size
    pub(crate) column: Option<Column>,

    /// `#[deleted_at]`
    pub(crate) deleted_at: bool,

    /// Raw settings appended with `#[tag("...")]`
    pub(crate) tags: Vec<syn::LitStr>,
}

#[derive(Debug)]
pub(crate) enum FieldTy {
    Primitive(syn::Type),
    Relation(RelationTy),
}

#[derive(Debug)]
pub(crate) struct RelationTy {
    /// Relation arguments
    pub(crate) relation: Relation,

    /// The associated record type
    pub(crate) target: syn::Type,

    /// `Vec<T>` rather than `T` or `Option<T>`
    pub(crate) many: bool,
}

impl Field {
    /// Returns `None` for fields marked `#[skip]`.
    pub(super) fn from_ast(field: &syn::Field) -> syn::Result<Option<Self>> {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "record fields must be named"));
        };

        let mut errs = ErrorSet::new();
        let mut attrs = FieldAttr::default();
        let mut relation = None;

        for attr in &field.attrs {
            let path = attr.path();

            if path.is_ident("skip") {
                return Ok(None);
            } else if path.is_ident("key") {
                if attrs.key {
                    errs.spanned(attr, "duplicate #[key] attribute");
                } else {
                    attrs.key = true;
                }
            } else if path.is_ident("auto") {
                if attrs.auto.is_some() {
                    errs.spanned(attr, "duplicate #[auto] attribute");
                } else {
                    match AutoStrategy::from_ast(attr) {
                        Ok(auto) => attrs.auto = Some(auto),
                        Err(err) => errs.push(err),
                    }
                }
            } else if path.is_ident("index") {
                if attrs.index.is_some() {
                    errs.spanned(attr, "duplicate #[index] attribute");
                } else {
                    match index_name(attr) {
                        Ok(name) => attrs.index = Some(name),
                        Err(err) => errs.push(err),
                    }
                }
            } else if path.is_ident("unique") {
                if attrs.unique.is_some() {
                    errs.push(syn::Error::new_spanned(
                        attr,
                        "duplicate #[unique] attribute",
                    ));
                } else {
                    match index_name(attr) {
                        Ok(name) => attrs.unique = Some(name),
                        Err(err) => errs.push(err),
                    }
                }
            } else if path.is_ident("column") {
                if attrs.column.is_some() {
                    errs.push(syn::Error::new_spanned(
                        attr,
                        "duplicate #[column] attribute",
                    ));
                } else {
                    match Column::from_ast(attr) {
                        Ok(column) => attrs.column = Some(column),
                        Err(err) => errs.push(err),
                    }
                }
            } else if path.is_ident("deleted_at") {
                if attrs.deleted_at {
                    errs.push(syn::Error::new_spanned(
                        attr,
                        "duplicate #[deleted_at] attribute",
                    ));
                } else {
                    attrs.deleted_at = true;
                }
            } else if path.is_ident("tag") {
                match attr.parse_args::<syn::LitStr>() {
                    Ok(tag) => attrs.tags.push(tag),
                    Err(err) => errs.push(err),
                }
            } else if path.is_ident("relation") {
                if relation.is_some() {
                    errs.push(syn::Error::new_spanned(
                        attr,
                        "duplicate #[relation] attribute",
                    ));
                } else {
                    match Relation::from_ast(attr) {
                        Ok(parsed) => relation = Some(parsed),
                        Err(err) => errs.push(err),
                    }
                }
            }
        }

        let ty = match relation {
            Some(relation) => {
                if attrs.key || attrs.auto.is_some() || attrs.column.is_some() {
                    errs.push(syn::Error::new_spanned(
                        field,
                        "relation fields cannot be keys or columns",
                    ));
                }

                let (target, many) = relation_target(&field.ty);
                if relation.many_to_many.is_some() && !many {
                    errs.push(syn::Error::new_spanned(
                        &field.ty,
                        "a many-to-many relation must be a `Vec<T>` field",
                    ));
                }

                FieldTy::Relation(RelationTy {
                    relation,
                    target,
                    many,
                })
            }
            None => FieldTy::Primitive(field.ty.clone()),
        };

        errs.finish()?;

        Ok(Some(Field {
            ident: ident.clone(),
            name: ident.unraw().to_string(),
            attrs,
            ty,
        }))
    }

    /// The field's settings in `KEY:VALUE;FLAG` form.
    pub(crate) fn tag(&self) -> String {
        let attrs = &self.attrs;
        let mut settings = vec![];

        if let Some(column) = &attrs.column {
            if let Some(name) = &column.name {
                settings.push(format!("COLUMN:{}", name.value()));
            }
            if let Some(ty) = &column.ty {
                settings.push(format!("TYPE:{}", ty.value()));
            }
            if let Some(size) = &column.size {
                settings.push(format!("SIZE:{}", size.base10_digits()));
            }
        }

        if attrs.key {
            settings.push("PRIMARY_KEY".to_string());
        }

        if let Some(auto) = attrs.auto {
            settings.push(auto.tag().to_string());
        }

        match &attrs.index {
            Some(Some(name)) => settings.push(format!("INDEX:{}", name.value())),
            Some(None) => settings.push("INDEX".to_string()),
            None => {}
        }

        match &attrs.unique {
            Some(Some(name)) => settings.push(format!("UNIQUE_INDEX:{}", name.value())),
            Some(None) => settings.push("UNIQUE_INDEX".to_string()),
            None => {}
        }

        if attrs.deleted_at {
            settings.push("DELETED_AT".to_string());
        }

        if let FieldTy::Relation(rel) = &self.ty {
            let relation = &rel.relation;
            if let Some(foreign_key) = &relation.foreign_key {
                settings.push(format!("FOREIGNKEY:{}", foreign_key.value()));
            }
            if let Some(key) = &relation.association_foreign_key {
                settings.push(format!("ASSOCIATIONFOREIGNKEY:{}", key.value()));
            }
            if let Some(join_table) = &relation.many_to_many {
                settings.push(format!("MANY2MANY:{}", join_table.value()));
            }
        }

        settings.extend(attrs.tags.iter().map(syn::LitStr::value));
        settings.join(";")
    }
}

/// `#[index]` or `#[index("name")]`.
fn index_name(attr: &syn::Attribute) -> syn::Result<Option<syn::LitStr>> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(None),
        syn::Meta::List(_) => attr.parse_args().map(Some),
        syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected `#[index]` or `#[index(\"name\")]`",
        )),
    }
}

/// Splits `Vec<T>` / `Option<T>` / `T` into the record type and whether the
/// field holds many records.
fn relation_target(ty: &syn::Type) -> (syn::Type, bool) {
    if let syn::Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    if segment.ident == "Vec" {
                        return (inner.clone(), true);
                    }
                    if segment.ident == "Option" {
                        return (inner.clone(), false);
                    }
                }
            }
        }
    }

    (ty.clone(), false)
}
