extern crate proc_macro;

use proc_macro::TokenStream;

#[proc_macro_derive(
    Record,
    attributes(key, auto, column, index, unique, relation, deleted_at, tag, skip, table, hooks)
)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    match ormlette_codegen::generate(input.into()) {
        Ok(output) => output.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
