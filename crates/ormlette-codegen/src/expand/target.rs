use super::Expand;

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    /// A plain record is a target holding exactly one record: itself.
    pub(super) fn expand_target_impl(&self) -> TokenStream {
        let ormlette = &self.ormlette;
        let model_ident = &self.model.ident;

        quote! {
            impl #ormlette::Target for #model_ident {
                fn model_type(&self) -> #ormlette::ModelType {
                    #ormlette::ModelType::of::<#model_ident>()
                }

                fn is_many(&self) -> bool {
                    false
                }

                fn len(&self) -> usize {
                    1
                }

                fn get(&self, index: usize) -> Option<&dyn #ormlette::Reflect> {
                    if index == 0 {
                        Some(self)
                    } else {
                        None
                    }
                }

                fn get_mut(&mut self, index: usize) -> Option<&mut dyn #ormlette::Reflect> {
                    if index == 0 {
                        Some(self)
                    } else {
                        None
                    }
                }

                fn clear(&mut self) {}

                fn push_default(&mut self) -> &mut dyn #ormlette::Reflect {
                    self
                }

                fn push_record(&mut self, record: Box<dyn #ormlette::Reflect>) -> #ormlette::Result<()> {
                    *self = #ormlette::downcast::<#model_ident>(record)?;
                    Ok(())
                }

                fn clone_target(&self) -> Box<dyn #ormlette::Target> {
                    Box::new(::core::clone::Clone::clone(self))
                }
            }
        }
    }
}
