use super::ErrorSet;

#[derive(Debug, Default)]
pub(crate) struct ModelAttr {
    /// Optional database table name to map the record to
    pub(crate) table: Option<syn::LitStr>,

    /// The record implements `Hooks`
    pub(crate) hooks: bool,
}

impl ModelAttr {
    pub(super) fn populate_from_ast(&mut self, attrs: &[syn::Attribute]) -> syn::Result<()> {
        let mut errs = ErrorSet::new();

        for attr in attrs {
            if attr.path().is_ident("table") {
                if self.table.is_some() {
                    errs.spanned(attr, "duplicate `table` attribute");
                    continue;
                }

                match table_name(attr) {
                    Some(lit) => self.table = Some(lit),
                    None => errs.push(syn::Error::new_spanned(
                        attr,
                        "expected `table = \"table_name\"`",
                    )),
                }
            } else if attr.path().is_ident("hooks") {
                if self.hooks {
                    errs.spanned(attr, "duplicate `hooks` attribute");
                } else if !matches!(attr.meta, syn::Meta::Path(_)) {
                    errs.spanned(attr, "expected `#[hooks]`");
                } else {
                    self.hooks = true;
                }
            }
        }

        errs.finish()
    }
}

fn table_name(attr: &syn::Attribute) -> Option<syn::LitStr> {
    let syn::Meta::NameValue(meta) = &attr.meta else {
        return None;
    };
    let syn::Expr::Lit(lit) = &meta.value else {
        return None;
    };
    let syn::Lit::Str(lit) = &lit.lit else {
        return None;
    };
    Some(lit.clone())
}
