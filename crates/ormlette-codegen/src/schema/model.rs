use super::{ErrorSet, Field, ModelAttr};

#[derive(Debug)]
pub(crate) struct Model {
    /// Type identifier
    pub(crate) ident: syn::Ident,

    /// Model fields, `#[skip]` fields left out
    pub(crate) fields: Vec<Field>,

    /// Model attributes
    pub(crate) attrs: ModelAttr,
}

impl Model {
    pub(crate) fn from_ast(ast: &syn::ItemStruct) -> syn::Result<Self> {
        let syn::Fields::Named(node) = &ast.fields else {
            return Err(syn::Error::new_spanned(
                &ast.fields,
                "record fields must be named",
            ));
        };

        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "record types cannot be generic",
            ));
        }

        let mut attrs = ModelAttr::default();
        attrs.populate_from_ast(&ast.attrs)?;

        let mut errs = ErrorSet::new();
        let mut fields = vec![];

        for node in &node.named {
            match Field::from_ast(node) {
                Ok(Some(field)) => fields.push(field),
                Ok(None) => {}
                Err(err) => errs.push(err),
            }
        }

        if fields.iter().filter(|field| field.attrs.key).count() > 1 {
            errs.push(syn::Error::new_spanned(
                &ast.ident,
                "a record has at most one #[key] field",
            ));
        }

        errs.finish()?;

        Ok(Model {
            ident: ast.ident.clone(),
            fields,
            attrs,
        })
    }
}
