mod kw {
    syn::custom_keyword!(size);
}

#[derive(Debug, Default)]
pub(crate) struct Column {
    pub(crate) name: Option<syn::LitStr>,
    pub(crate) ty: Option<syn::LitStr>,
    pub(crate) size: Option<syn::LitInt>,
}

impl Column {
    pub(super) fn from_ast(attr: &syn::Attribute) -> syn::Result<Column> {
        attr.parse_args()
    }
}

impl syn::parse::Parse for Column {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut result = Self::default();

        // Allowed syntax, in any order:
        //
        // #[column("name")]
        // #[column(type = "varchar(64)")]
        // #[column(size = 64)]
        // #[column("name", type = "text")]
        loop {
            let lookahead = input.lookahead1();

            if lookahead.peek(syn::LitStr) {
                if result.name.is_some() {
                    return Err(syn::Error::new(input.span(), "duplicate column name"));
                }
                result.name = Some(input.parse()?);
            } else if lookahead.peek(syn::Token![type]) {
                if result.ty.is_some() {
                    return Err(syn::Error::new(input.span(), "duplicate column type"));
                }
                let _type_token: syn::Token![type] = input.parse()?;
                let _eq_token: syn::Token![=] = input.parse()?;
                result.ty = Some(input.parse()?);
            } else if lookahead.peek(kw::size) {
                if result.size.is_some() {
                    return Err(syn::Error::new(input.span(), "duplicate column size"));
                }
                let _size_token: kw::size = input.parse()?;
                let _eq_token: syn::Token![=] = input.parse()?;
                result.size = Some(input.parse()?);
            } else {
                return Err(lookahead.error());
            }

            if input.is_empty() {
                break;
            }
            let _comma_token: syn::Token![,] = input.parse()?;
        }

        Ok(result)
    }
}
