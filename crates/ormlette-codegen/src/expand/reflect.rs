use super::Expand;
use crate::schema::FieldTy;

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    pub(super) fn expand_reflect_impl(&self) -> TokenStream {
        let ormlette = &self.ormlette;
        let model_ident = &self.model.ident;
        let model_name = model_ident.to_string();

        let mut get_arms = vec![];
        let mut set_arms = vec![];
        let mut association_arms = vec![];
        let mut association_mut_arms = vec![];

        for field in &self.model.fields {
            let ident = &field.ident;
            let name = &field.name;

            match &field.ty {
                FieldTy::Primitive(ty) => {
                    get_arms.push(quote! {
                        #name => Some(<#ty as #ormlette::Primitive>::to_value(&self.#ident)),
                    });
                    set_arms.push(quote! {
                        #name => {
                            self.#ident = <#ty as #ormlette::Primitive>::load(value)?;
                            Ok(())
                        }
                    });
                }
                FieldTy::Relation(_) => {
                    association_arms.push(quote! {
                        #name => Some(&self.#ident as &dyn #ormlette::Target),
                    });
                    association_mut_arms.push(quote! {
                        #name => Some(&mut self.#ident as &mut dyn #ormlette::Target),
                    });
                }
            }
        }

        let hooks = if self.model.attrs.hooks {
            quote! {
                fn hooks(&mut self) -> Option<&mut dyn #ormlette::Hooks> {
                    Some(self)
                }
            }
        } else {
            quote!()
        };

        quote! {
            impl #ormlette::Reflect for #model_ident {
                fn record_type(&self) -> #ormlette::ModelType {
                    #ormlette::ModelType::of::<#model_ident>()
                }

                fn field(&self, name: &str) -> Option<#ormlette::Value> {
                    match name {
                        #( #get_arms )*
                        _ => None,
                    }
                }

                fn set_field(&mut self, name: &str, value: #ormlette::Value) -> #ormlette::Result<()> {
                    match name {
                        #( #set_arms )*
                        _ => Err(#ormlette::Error::from_args(format_args!(
                            "`{}` has no field `{}`",
                            #model_name,
                            name
                        ))),
                    }
                }

                fn association(&self, name: &str) -> Option<&dyn #ormlette::Target> {
                    match name {
                        #( #association_arms )*
                        _ => None,
                    }
                }

                fn association_mut(&mut self, name: &str) -> Option<&mut dyn #ormlette::Target> {
                    match name {
                        #( #association_mut_arms )*
                        _ => None,
                    }
                }

                #hooks

                fn clone_record(&self) -> Box<dyn #ormlette::Reflect> {
                    Box::new(::core::clone::Clone::clone(self))
                }

                fn as_target(&self) -> &dyn #ormlette::Target {
                    self
                }

                fn as_target_mut(&mut self) -> &mut dyn #ormlette::Target {
                    self
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn into_any(self: Box<Self>) -> Box<dyn ::core::any::Any> {
                    self
                }
            }
        }
    }
}
