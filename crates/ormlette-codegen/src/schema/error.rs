/// Attribute errors of one struct, reported together as a single
/// compile error.
#[derive(Debug, Default)]
pub(crate) struct ErrorSet(Vec<syn::Error>);

impl ErrorSet {
    pub(crate) fn new() -> ErrorSet {
        ErrorSet::default()
    }

    pub(crate) fn push(&mut self, err: syn::Error) {
        self.0.push(err);
    }

    pub(crate) fn spanned(&mut self, tokens: impl quote::ToTokens, message: impl std::fmt::Display) {
        self.push(syn::Error::new_spanned(tokens, message));
    }

    /// `Ok` when nothing was pushed, otherwise every error combined.
    pub(crate) fn finish(self) -> syn::Result<()> {
        let mut errors = self.0.into_iter();
        let Some(mut first) = errors.next() else {
            return Ok(());
        };
        for err in errors {
            first.combine(err);
        }
        Err(first)
    }
}
