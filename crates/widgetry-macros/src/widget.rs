use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Ident, ImplItem, ItemImpl, LitStr, parse_quote};

/// Hook methods that map to a capability bit.
const HOOKS: [(&str, &str); 4] = [
    ("run", "RUN"),
    ("form", "FORM"),
    ("save", "SAVE"),
    ("fields", "FIELDS"),
];

/// Implementation of `#[register_widget("slug")]`.
///
/// Injects `capabilities()` into the `impl Widget for T` block (unless it is
/// written by hand) and appends a `#[::widgetry_core::linkme::distributed_slice]`
/// static that adds a descriptor for `T` to the widget registry.
pub fn register_widget(slug: LitStr, mut item: ItemImpl) -> syn::Result<TokenStream> {
    let slug_value = slug.value();
    validate_slug(&slug, &slug_value)?;

    if item.trait_.is_none() {
        return Err(syn::Error::new_spanned(
            &item.self_ty,
            "#[register_widget] must be placed on an `impl Widget for Type` block",
        ));
    }

    let defined: Vec<String> = item
        .items
        .iter()
        .filter_map(|it| match it {
            ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();

    if !defined.iter().any(|name| name == "capabilities") {
        let caps: Vec<Ident> = HOOKS
            .iter()
            .filter(|(hook, _)| defined.iter().any(|name| name == hook))
            .map(|(_, cap)| Ident::new(cap, Span::call_site()))
            .collect();

        item.items.push(parse_quote! {
            fn capabilities(&self) -> ::widgetry_core::Capabilities {
                ::widgetry_core::Capabilities::NONE
                    #( .union(::widgetry_core::Capabilities::#caps) )*
            }
        });
    }

    let suffix = sanitize(&slug_value);
    let static_name = Ident::new(
        &format!("_WIDGET_REGISTER_{}", suffix.to_uppercase()),
        Span::call_site(),
    );
    let create_name = Ident::new(&format!("__widgetry_create_{suffix}"), Span::call_site());
    let self_ty = &item.self_ty;

    Ok(quote! {
        #item

        #[doc(hidden)]
        fn #create_name() -> ::std::boxed::Box<dyn ::widgetry_core::Widget> {
            ::std::boxed::Box::new(<#self_ty as ::std::default::Default>::default())
        }

        #[::widgetry_core::linkme::distributed_slice(::widgetry_core::WIDGET_REGISTRY)]
        #[linkme(crate = ::widgetry_core::linkme)]
        static #static_name: ::widgetry_core::WidgetDescriptor =
            ::widgetry_core::WidgetDescriptor::new(#slug, #create_name);
    })
}

/// Slugs are directory names: ASCII letters, digits, `_` and `-`.
fn validate_slug(lit: &LitStr, slug: &str) -> syn::Result<()> {
    if slug.is_empty() {
        return Err(syn::Error::new(lit.span(), "widget slug must not be empty"));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(syn::Error::new(
            lit.span(),
            format!("invalid character `{bad}` in widget slug, expected [A-Za-z0-9_-]"),
        ));
    }
    Ok(())
}

fn sanitize(slug: &str) -> String {
    slug.chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}
