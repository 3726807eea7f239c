use crate::prelude::*;
use proc_macro_crate::{FoundCrate, crate_name};

macro_rules! extract {
    ($val:expr, $pat:pat, $error_message: expr) => {
        let $pat = $val else {
            return Err(Error::new_spanned($val, $error_message));
        };
    };
}

pub(crate) use extract;

pub fn extract_named_fields(span: Span, data: Data) -> Result<FieldsNamed> {
    let Data::Struct(data_struct) = data else {
        return Err(Error::new(span, "expected struct"));
    };

    extract!(
        data_struct.fields,
        Fields::Named(named_fields),
        "expected named fields"
    );

    Ok(named_fields)
}

pub fn extract_serde_rename(field: &Field) -> Option<String> {
    #[derive(FromAttributes)]
    #[darling(attributes(serde))]
    struct SerdeAttribute {
        rename: String,
    }

    let serde_attribute = SerdeAttribute::from_attributes(&field.attrs).ok();

    serde_attribute.map(|attribute| attribute.rename)
}

/// The BSON key a field serializes under: its `#[serde(rename)]` when
/// present, the field name otherwise.
pub fn bson_name_lit(ident: &Ident, rename: Option<&str>) -> LitStr {
    let name = rename.map_or_else(|| Cow::Owned(ident.to_string()), Cow::Borrowed);

    LitStr::new(&name, Span::call_site())
}

pub fn build_fields_enum<'a>(
    field_idents: impl Iterator<Item = &'a Ident>,
    field_lits: impl Iterator<Item = &'a LitStr>,
) -> TokenStream {
    let field_idents_upper_camel_case = field_idents
        .map(|ident| Ident::new(&ident.to_string().to_upper_camel_case(), Span::call_site()))
        .collect_vec();

    let field_lits = field_lits.collect_vec();

    quote! {
        #[derive(::std::clone::Clone, ::std::marker::Copy, ::std::fmt::Debug)]
        pub enum Fields {
            #( #field_idents_upper_camel_case ),*
        }

        impl ::std::fmt::Display for Fields {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(
                    f,
                    "{}",
                    match self {
                        #(
                            Self::#field_idents_upper_camel_case => #field_lits
                        ),*
                    }
                )
            }
        }

        impl ::std::convert::From<Fields> for ::std::string::String {
            fn from(value: Fields) -> Self {
                ::std::string::ToString::to_string(&value)
            }
        }
    }
}

pub fn krate() -> TokenStream {
    match crate_name("remora").unwrap() {
        FoundCrate::Itself => quote! { crate },
        FoundCrate::Name(name) => {
            let ident = Ident::new(&name, Span::call_site());
            quote! { ::#ident }
        }
    }
}

pub fn mongodb() -> TokenStream {
    let krate = krate();
    quote! { #krate::mongodb }
}
