#[warn(clippy::pedantic)]
#[allow(clippy::too_many_lines)]
mod construct;
mod derive_fields;
mod derive_model;
mod prelude;
mod utils;

fn expand<F: FnOnce(proc_macro2::TokenStream) -> syn::Result<proc_macro2::TokenStream>>(
    fun: F,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    fun(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Model, attributes(model))]
pub fn model(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(derive_model::derive_model, input)
}

#[proc_macro_derive(Fields)]
pub fn fields(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(derive_fields::derive_fields, input)
}

#[proc_macro]
pub fn construct_criteria(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(construct::construct_criteria, input)
}

#[proc_macro]
pub fn construct_update(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(construct::construct_update, input)
}
