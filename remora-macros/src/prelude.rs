pub(crate) use crate::utils::{extract, krate};
pub use darling::{FromAttributes, util::PathList};
pub use heck::{ToSnakeCase, ToUpperCamelCase};
pub use itertools::Itertools;
pub use proc_macro2::{Span, TokenStream};
pub use quote::quote;
pub use std::{borrow::Cow, collections::HashMap};
pub use syn::{
    Data, DeriveInput, Error, Expr, Field, Fields, FieldsNamed, Ident, LitStr, Result, Token, Type,
    Visibility,
    parse::Parse,
    parse_quote, parse2,
    punctuated::Punctuated,
    spanned::Spanned,
};
