use super::Expand;
use crate::schema::FieldTy;

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    pub(super) fn expand_record_impl(&self) -> TokenStream {
        let ormlette = &self.ormlette;
        let model_ident = &self.model.ident;
        let name = model_ident.to_string();
        let fields = self.expand_field_defs();

        let table_name = match &self.model.attrs.table {
            Some(table) => quote!(Some(#table)),
            None => quote!(None),
        };

        quote! {
            impl #ormlette::Record for #model_ident {
                fn model_def() -> #ormlette::ModelDef {
                    #ormlette::ModelDef {
                        name: #name,
                        table_name: #table_name,
                        fields: vec![ #( #fields ),* ],
                    }
                }
            }
        }
    }

    fn expand_field_defs(&self) -> Vec<TokenStream> {
        let ormlette = &self.ormlette;

        self.model
            .fields
            .iter()
            .map(|field| {
                let name = &field.name;
                let tag = field.tag();

                let ty = match &field.ty {
                    FieldTy::Primitive(ty) => quote! {
                        #ormlette::FieldTy::Primitive {
                            ty: <#ty as #ormlette::Primitive>::ty(),
                            nullable: <#ty as #ormlette::Primitive>::NULLABLE,
                        }
                    },
                    FieldTy::Relation(rel) => {
                        let target = &rel.target;
                        let many = rel.many;
                        quote! {
                            #ormlette::FieldTy::Relation {
                                many: #many,
                                target: #ormlette::ModelType::of::<#target>(),
                            }
                        }
                    }
                };

                quote! {
                    #ormlette::FieldDef {
                        name: #name,
                        ty: #ty,
                        tag: #tag,
                    }
                }
            })
            .collect()
    }
}
