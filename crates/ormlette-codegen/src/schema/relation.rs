mod kw {
    syn::custom_keyword!(foreign_key);
    syn::custom_keyword!(association_foreign_key);
    syn::custom_keyword!(many_to_many);
}

/// Arguments of `#[relation(...)]`.
#[derive(Debug, Default)]
pub(crate) struct Relation {
    pub(crate) foreign_key: Option<syn::LitStr>,
    pub(crate) association_foreign_key: Option<syn::LitStr>,

    /// Link table of a many-to-many relation.
    pub(crate) many_to_many: Option<syn::LitStr>,
}

impl Relation {
    pub(super) fn from_ast(attr: &syn::Attribute) -> syn::Result<Relation> {
        match &attr.meta {
            syn::Meta::Path(_) => Ok(Relation::default()),
            syn::Meta::List(_) => attr.parse_args(),
            syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
                attr,
                "expected `#[relation]` or `#[relation(...)]`",
            )),
        }
    }
}

impl syn::parse::Parse for Relation {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut result = Relation::default();

        while !input.is_empty() {
            let lookahead = input.lookahead1();

            let slot = if lookahead.peek(kw::foreign_key) {
                let _kw: kw::foreign_key = input.parse()?;
                &mut result.foreign_key
            } else if lookahead.peek(kw::association_foreign_key) {
                let _kw: kw::association_foreign_key = input.parse()?;
                &mut result.association_foreign_key
            } else if lookahead.peek(kw::many_to_many) {
                let _kw: kw::many_to_many = input.parse()?;
                &mut result.many_to_many
            } else {
                return Err(lookahead.error());
            };

            if slot.is_some() {
                return Err(syn::Error::new(input.span(), "duplicate relation argument"));
            }
            let _eq_token: syn::Token![=] = input.parse()?;
            *slot = Some(input.parse()?);

            if input.is_empty() {
                break;
            }
            let _comma_token: syn::Token![,] = input.parse()?;
        }

        Ok(result)
    }
}
