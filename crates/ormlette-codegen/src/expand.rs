mod record;
mod reflect;
mod target;

use crate::schema::Model;

use proc_macro2::TokenStream;
use quote::quote;

struct Expand<'a> {
    /// The model being expanded
    model: &'a Model,

    /// Path prefix for ormlette types
    ormlette: TokenStream,
}

impl Expand<'_> {
    fn expand(&self) -> TokenStream {
        let record_impl = self.expand_record_impl();
        let reflect_impl = self.expand_reflect_impl();
        let target_impl = self.expand_target_impl();

        wrap_in_const(quote! {
            #record_impl
            #reflect_impl
            #target_impl
        })
    }
}

pub(super) fn model(model: &Model) -> TokenStream {
    Expand {
        model,
        ormlette: quote!(_ormlette::codegen_support),
    }
    .expand()
}

fn wrap_in_const(code: TokenStream) -> TokenStream {
    quote! {
        const _: () = {
            use ormlette as _ormlette;
            #code
        };
    }
}
