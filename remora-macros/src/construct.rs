use crate::prelude::*;

/// Comparison calls the criteria macro recognizes, one per `Cmp` variant.
const CMP_OPERATORS: [&str; 8] = ["Eq", "Ne", "Gt", "Gte", "Lt", "Lte", "In", "Nin"];

/// The common invocation shape of `criteria!` and `update!`: the helper
/// module the shims prepend, then `field: value` initializers.
struct Input {
    module: Ident,
    fields: Punctuated<FieldInit, Token![,]>,
}

impl Parse for Input {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let module = input.parse()?;
        input.parse::<Token![,]>()?;
        let fields = Punctuated::parse_terminated(input)?;

        Ok(Self { module, fields })
    }
}

struct FieldInit {
    ident: Ident,
    value: Expr,
}

impl Parse for FieldInit {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let value = input.parse()?;

        Ok(Self { ident, value })
    }
}

impl FieldInit {
    /// Splits a value such as `Gt(&100)` into the comparison operator and
    /// its operand. Anything else is an implicit `Eq` of the whole value.
    fn as_comparison(&self) -> (Ident, &Expr) {
        if let Expr::Call(call) = &self.value {
            if let Expr::Path(path) = call.func.as_ref() {
                if let Some(operator) = path.path.get_ident() {
                    if CMP_OPERATORS.iter().any(|name| operator == name) && call.args.len() == 1 {
                        return (operator.clone(), &call.args[0]);
                    }
                }
            }
        }

        (Ident::new("Eq", self.value.span()), &self.value)
    }
}

pub fn construct_criteria(input: TokenStream) -> Result<TokenStream> {
    let input = parse2::<Input>(input)?;
    let krate = krate();
    let module = &input.module;

    let fields = input.fields.iter().map(|field| {
        let ident = &field.ident;
        let (operator, operand) = field.as_comparison();

        quote! {
            #ident: #krate::Field::Set(#krate::Cmp::#operator(#operand))
        }
    });

    Ok(quote! {
        #module::TypedCriteria {
            #( #fields, )*
            ..::std::default::Default::default()
        }
    })
}

pub fn construct_update(input: TokenStream) -> Result<TokenStream> {
    let input = parse2::<Input>(input)?;
    let krate = krate();
    let module = &input.module;

    let fields = input.fields.iter().map(|field| {
        let ident = &field.ident;
        let value = &field.value;

        quote! {
            #ident: #krate::Field::Set(#value)
        }
    });

    Ok(quote! {
        #module::TypedUpdate {
            #( #fields, )*
            ..::std::default::Default::default()
        }
    })
}
