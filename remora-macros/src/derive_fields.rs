use crate::{
    prelude::*,
    utils::{bson_name_lit, build_fields_enum, extract_named_fields, extract_serde_rename},
};

/// `#[derive(Fields)]` for structs that are not models: generates just the
/// snake_case helper module with the `Fields` enum, BSON names included.
pub fn derive_fields(item: TokenStream) -> Result<TokenStream> {
    let input = parse2::<DeriveInput>(item)?;

    let fields_named = extract_named_fields(input.span(), input.data)?;

    let (field_idents, field_lits): (Vec<_>, Vec<_>) = fields_named
        .named
        .into_iter()
        .map(|field| {
            let rename = extract_serde_rename(&field);
            let ident = field.ident.unwrap();
            let lit = bson_name_lit(&ident, rename.as_deref());

            (ident, lit)
        })
        .unzip();

    let vis = &input.vis;
    let mod_ident = Ident::new(&input.ident.to_string().to_snake_case(), Span::call_site());

    let fields_enum = build_fields_enum(field_idents.iter(), field_lits.iter());

    Ok(quote! {
        #vis mod #mod_ident {
            #fields_enum
        }
    })
}
