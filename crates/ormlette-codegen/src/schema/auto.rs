/// How `#[auto]` fills in a key on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AutoStrategy {
    /// The database assigns the next integer.
    Increment,

    /// A random UUID is generated when the field is blank.
    Uuid,
}

mod kw {
    syn::custom_keyword!(increment);
    syn::custom_keyword!(uuid);
}

impl AutoStrategy {
    pub(super) fn from_ast(attr: &syn::Attribute) -> syn::Result<AutoStrategy> {
        match &attr.meta {
            syn::Meta::Path(_) => Ok(AutoStrategy::Increment),
            syn::Meta::List(_) => attr.parse_args(),
            syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
                attr,
                "expected `#[auto]`, `#[auto(increment)]` or `#[auto(uuid)]`",
            )),
        }
    }

    pub(crate) fn tag(self) -> &'static str {
        match self {
            AutoStrategy::Increment => "AUTO_INCREMENT",
            AutoStrategy::Uuid => "AUTO_UUID",
        }
    }
}

impl syn::parse::Parse for AutoStrategy {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(kw::increment) {
            let _kw: kw::increment = input.parse()?;
            Ok(AutoStrategy::Increment)
        } else if lookahead.peek(kw::uuid) {
            let _kw: kw::uuid = input.parse()?;
            Ok(AutoStrategy::Uuid)
        } else {
            Err(lookahead.error())
        }
    }
}
