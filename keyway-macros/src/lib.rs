//! Proc-macro crate for declaring keywords.
//!
//! Provides the `#[keyword]` and `#[keyword_library]` attribute macros.
//! Generated code refers to `::keyway_types`, so the calling crate must
//! depend on it.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
    Attribute, FnArg, ImplItem, ItemFn, ItemImpl, Pat, ReturnType, Signature, Type, Visibility,
};

/// Declare a keyword from a free function.
///
/// Generates a `<Name>Keyword` unit struct implementing
/// `keyway_types::Keyword`. Parameters are decoded positionally:
/// trailing `Option<T>` parameters are optional, and a final `Vec<T>`
/// marked `#[rest]` collects the remaining arguments.
///
/// # Example
///
/// ```ignore
/// /// Logs a message.
/// #[keyword(name = "Log")]
/// fn log(message: String, level: Option<String>) {
///     tracing::info!(level = level.as_deref().unwrap_or("INFO"), "{message}");
/// }
///
/// registry.register([Candidate::from_keyword(LogKeyword)]);
/// ```
#[proc_macro_attribute]
pub fn keyword(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(attr as KeywordArgs);
    let func = syn::parse_macro_input!(item as ItemFn);

    match expand_keyword(args, func) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Turn an inherent impl block into a keyword source.
///
/// Every method marked `#[keyword]` becomes a candidate; public methods are
/// callable, others are reported as not callable. Methods take `&self`; the
/// host is shared through the `Arc` handed to `KeywordSource::candidates`.
///
/// Attribute arguments: `name = "..."` sets the library marker, `declared`
/// makes any invalid candidate abort registration.
///
/// # Example
///
/// ```ignore
/// struct Counter(AtomicU64);
///
/// #[keyword_library(name = "demo.counter", declared)]
/// impl Counter {
///     #[keyword(name = "Increment")]
///     pub fn increment(&self, by: Option<u64>) -> u64 {
///         self.0.fetch_add(by.unwrap_or(1), Ordering::SeqCst) + by.unwrap_or(1)
///     }
/// }
///
/// registry.register_source(Arc::new(Counter(AtomicU64::new(0))));
/// ```
#[proc_macro_attribute]
pub fn keyword_library(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(attr as LibraryArgs);
    let item = syn::parse_macro_input!(item as ItemImpl);

    match expand_keyword_library(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// Parse `name = "...", doc = "...", library = "..."`, all optional.
#[derive(Default)]
struct KeywordArgs {
    name: Option<String>,
    doc: Option<String>,
    library: Option<String>,
}

impl syn::parse::Parse for KeywordArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut args = KeywordArgs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "name" => args.name = Some(value.value()),
                "doc" => args.doc = Some(value.value()),
                "library" => args.library = Some(value.value()),
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {other}"),
                    ));
                }
            }

            if !input.is_empty() {
                let _: syn::Token![,] = input.parse()?;
            }
        }

        Ok(args)
    }
}

// Parse `name = "...", declared`.
#[derive(Default)]
struct LibraryArgs {
    name: Option<String>,
    declared: bool,
}

impl syn::parse::Parse for LibraryArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut args = LibraryArgs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "declared" => args.declared = true,
                "name" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    args.name = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {other}"),
                    ));
                }
            }

            if !input.is_empty() {
                let _: syn::Token![,] = input.parse()?;
            }
        }

        Ok(args)
    }
}

enum ParamKind {
    Required,
    Optional,
    Rest,
}

struct Param {
    ident: syn::Ident,
    ty: Type,
    kind: ParamKind,
}

impl Param {
    fn argument_name(&self) -> String {
        let raw = self.ident.to_string();
        let name = match raw.trim_start_matches('_') {
            "" => raw.as_str(),
            trimmed => trimmed,
        };
        match self.kind {
            ParamKind::Required => name.to_string(),
            ParamKind::Optional => format!("{name}="),
            ParamKind::Rest => format!("*{name}"),
        }
    }
}

/// Parsed parameter list plus what it implies for the keyword's shape.
struct Shape {
    params: Vec<Param>,
    arity: proc_macro2::TokenStream,
}

impl Shape {
    fn argument_names(&self) -> Vec<String> {
        self.params.iter().map(Param::argument_name).collect()
    }

    // `let` statements decoding `__args` into the parameters.
    fn decoders(&self) -> Vec<proc_macro2::TokenStream> {
        self.params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let ident = &param.ident;
                let ty = &param.ty;
                let name = param.argument_name();
                let name = name.trim_start_matches('*').trim_end_matches('=');
                let take = match param.kind {
                    ParamKind::Required => quote!(take_arg),
                    ParamKind::Optional => quote!(take_optional),
                    ParamKind::Rest => quote!(take_rest),
                };
                quote! {
                    let #ident: #ty = ::keyway_types::#take(&mut __args, #index, #name)?;
                }
            })
            .collect()
    }

    fn idents(&self) -> Vec<&syn::Ident> {
        self.params.iter().map(|p| &p.ident).collect()
    }
}

fn is_rest_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("rest")
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

// Collect parameters, strip `#[rest]` markers from the signature, and work
// out the arity.
fn analyze_signature(sig: &mut Signature, method: bool) -> syn::Result<Shape> {
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic keyword functions are not supported",
        ));
    }

    let mut params: Vec<Param> = Vec::new();
    let mut saw_receiver = false;

    for input in sig.inputs.iter_mut() {
        let pat_type = match input {
            FnArg::Receiver(receiver) => {
                if !method {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "self parameter not supported",
                    ));
                }
                if receiver.reference.is_none() || receiver.mutability.is_some() {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "keyword methods must take &self",
                    ));
                }
                saw_receiver = true;
                continue;
            }
            FnArg::Typed(pat_type) => pat_type,
        };

        let rest = pat_type.attrs.iter().any(is_rest_attr);
        pat_type.attrs.retain(|attr| !is_rest_attr(attr));

        let ident = match pat_type.pat.as_ref() {
            Pat::Ident(ident) => ident.ident.clone(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &pat_type.pat,
                    "expected identifier pattern",
                ));
            }
        };
        let ty = pat_type.ty.as_ref().clone();
        if matches!(ty, Type::Reference(_)) {
            return Err(syn::Error::new_spanned(
                &pat_type.ty,
                "keyword parameters must be owned types",
            ));
        }

        let kind = if rest {
            if !last_segment_is(&ty, "Vec") {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "#[rest] parameter must be a Vec<T>",
                ));
            }
            ParamKind::Rest
        } else if last_segment_is(&ty, "Option") {
            ParamKind::Optional
        } else {
            ParamKind::Required
        };

        if let Some(previous) = params.last() {
            let misplaced = match (&previous.kind, &kind) {
                (ParamKind::Rest, _) => Some("#[rest] parameter must be the last one"),
                (ParamKind::Optional, ParamKind::Required) => {
                    Some("required parameters must come before optional ones")
                }
                (ParamKind::Optional, ParamKind::Rest) => {
                    Some("optional parameters cannot be combined with #[rest]")
                }
                _ => None,
            };
            if let Some(message) = misplaced {
                return Err(syn::Error::new_spanned(&pat_type.pat, message));
            }
        }

        params.push(Param { ident, ty, kind });
    }

    if method && !saw_receiver {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            "keyword methods must take &self",
        ));
    }

    let required = params
        .iter()
        .filter(|p| matches!(p.kind, ParamKind::Required))
        .count();
    let optional = params
        .iter()
        .filter(|p| matches!(p.kind, ParamKind::Optional))
        .count();
    let rest = params.iter().any(|p| matches!(p.kind, ParamKind::Rest));

    let arity = if rest {
        quote!(::keyway_types::Arity::Variadic { min: #required })
    } else if optional > 0 {
        let max = required + optional;
        quote!(::keyway_types::Arity::Range { min: #required, max: #max })
    } else {
        quote!(::keyway_types::Arity::Fixed(#required))
    };

    Ok(Shape { params, arity })
}

// Turn the call's return value into `Result<Value, KeywordError>`.
fn convert_return(output: &ReturnType, call: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    match output {
        ReturnType::Default => quote! {
            #call;
            ::std::result::Result::Ok::<_, ::keyway_types::KeywordError>(::keyway_types::Value::Null)
        },
        ReturnType::Type(_, ty) if last_segment_is(ty, "Result") => quote! {
            match #call {
                ::std::result::Result::Ok(value) => ::keyway_types::encode_return(value),
                ::std::result::Result::Err(err) => ::std::result::Result::Err(
                    ::keyway_types::KeywordError::from_error(err),
                ),
            }
        },
        ReturnType::Type(..) => quote! {
            ::keyway_types::encode_return(#call)
        },
    }
}

// Join `///` lines into one documentation string.
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    let joined = lines.join("\n").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

fn expand_keyword(args: KeywordArgs, mut func: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let shape = analyze_signature(&mut func.sig, false)?;

    let func_name = &func.sig.ident;
    let vis = &func.vis;
    let keyword_struct = format_ident!("{}Keyword", to_pascal_case(&func_name.to_string()));

    let keyword_name = args.name.unwrap_or_else(|| func_name.to_string());
    let arity = &shape.arity;
    let argument_names = shape.argument_names();
    let documentation = args
        .doc
        .or_else(|| doc_comment(&func.attrs))
        .map(|doc| quote!(.with_documentation(#doc)));
    let library = args.library.map(|lib| quote!(.with_library(#lib)));

    let decoders = shape.decoders();
    let idents = shape.idents();
    let awaited = func.sig.asyncness.map(|_| quote!(.await));
    let invoke = convert_return(&func.sig.output, quote!(#func_name(#(#idents),*) #awaited));

    Ok(quote! {
        #func

        /// Auto-generated keyword struct.
        #vis struct #keyword_struct;

        impl ::keyway_types::Keyword for #keyword_struct {
            const NAME: &'static str = #keyword_name;
            type Args = ::keyway_types::Positional;
            type Output = ::keyway_types::Value;
            type Error = ::keyway_types::KeywordError;

            fn spec(&self) -> ::keyway_types::KeywordSpec {
                ::keyway_types::KeywordSpec::new(Self::NAME, #arity)
                    .with_arguments(::std::vec::Vec::<&'static str>::from([#(#argument_names),*]))
                    #documentation
                    #library
            }

            async fn run(
                &self,
                ::keyway_types::Positional(__args): ::keyway_types::Positional,
            ) -> ::std::result::Result<::keyway_types::Value, ::keyway_types::KeywordError> {
                ::keyway_types::ensure_arity(&#arity, __args.len())?;
                #[allow(unused_mut, unused_variables)]
                let mut __args = __args.into_iter();
                #(#decoders)*
                #invoke
            }
        }
    })
}

fn expand_keyword_library(
    args: LibraryArgs,
    mut item: ItemImpl,
) -> syn::Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[keyword_library] goes on an inherent impl block",
        ));
    }

    let mut candidates = Vec::new();

    for impl_item in item.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let Some(position) = method.attrs.iter().position(|a| a.path().is_ident("keyword"))
        else {
            continue;
        };
        let marker = method.attrs.remove(position);
        let keyword_args = match &marker.meta {
            syn::Meta::Path(_) => KeywordArgs::default(),
            _ => marker.parse_args::<KeywordArgs>()?,
        };
        if keyword_args.library.is_some() {
            return Err(syn::Error::new_spanned(
                &marker,
                "set the library on #[keyword_library], not on its methods",
            ));
        }

        let shape = analyze_signature(&mut method.sig, true)?;
        let method_name = &method.sig.ident;
        let identifier = method_name.to_string();
        let arity = &shape.arity;
        let argument_names = shape.argument_names();
        let named = keyword_args.name.map(|name| quote!(.named(#name)));
        let documentation = keyword_args
            .doc
            .or_else(|| doc_comment(&method.attrs))
            .map(|doc| quote!(.documented(#doc)));
        let visibility = match method.vis {
            Visibility::Public(_) => None,
            _ => Some(quote!(.with_visibility(::keyway_types::Visibility::Private))),
        };

        let decoders = shape.decoders();
        let idents = shape.idents();
        let awaited = method.sig.asyncness.map(|_| quote!(.await));
        let invoke = convert_return(
            &method.sig.output,
            quote!(__host.#method_name(#(#idents),*) #awaited),
        );

        candidates.push(quote! {
            {
                let __host = ::std::sync::Arc::clone(&self);
                ::keyway_types::Candidate::from_fn(
                    #arity,
                    move |__args: ::std::vec::Vec<::keyway_types::Value>| {
                        let __host = ::std::sync::Arc::clone(&__host);
                        async move {
                            ::keyway_types::ensure_arity(&#arity, __args.len())?;
                            #[allow(unused_mut, unused_variables)]
                            let mut __args = __args.into_iter();
                            #(#decoders)*
                            #invoke
                        }
                    },
                )
                .identified(#identifier)
                .with_arguments(::std::vec::Vec::<&'static str>::from([#(#argument_names),*]))
                #named
                #documentation
                #visibility
            }
        });
    }

    if candidates.is_empty() {
        return Err(syn::Error::new(
            Span::call_site(),
            "#[keyword_library] needs at least one #[keyword] method",
        ));
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let kind = args.declared.then(|| {
        quote! {
            fn kind(&self) -> ::keyway_types::SourceKind {
                ::keyway_types::SourceKind::Declared
            }
        }
    });
    let library_name = args.name.map(|name| {
        quote! {
            fn library_name(&self) -> ::std::option::Option<&str> {
                ::std::option::Option::Some(#name)
            }
        }
    });

    Ok(quote! {
        #item

        impl #impl_generics ::keyway_types::KeywordSource for #self_ty #where_clause {
            fn candidates(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<::keyway_types::Candidate> {
                ::std::vec![#(#candidates),*]
            }

            #kind
            #library_name
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_of(tokens: proc_macro2::TokenStream) -> syn::Result<Shape> {
        let mut func: ItemFn = syn::parse2(tokens).unwrap();
        analyze_signature(&mut func.sig, false)
    }

    #[test]
    fn pascal_case() {
        assert_eq!(to_pascal_case("set_system_property"), "SetSystemProperty");
        assert_eq!(to_pascal_case("log"), "Log");
    }

    #[test]
    fn argument_names_follow_parameter_kinds() {
        let shape = shape_of(quote! {
            fn f(name: String, _value: Option<String>) {}
        })
        .unwrap();
        assert_eq!(shape.argument_names(), vec!["name", "value="]);

        let shape = shape_of(quote! {
            fn f(first: i64, #[rest] others: Vec<i64>) {}
        })
        .unwrap();
        assert_eq!(shape.argument_names(), vec!["first", "*others"]);
    }

    #[test]
    fn misplaced_parameters_are_rejected() {
        assert!(shape_of(quote! { fn f(a: Option<u8>, b: u8) {} }).is_err());
        assert!(shape_of(quote! { fn f(#[rest] a: Vec<u8>, b: u8) {} }).is_err());
        assert!(shape_of(quote! { fn f(a: Option<u8>, #[rest] b: Vec<u8>) {} }).is_err());
        assert!(shape_of(quote! { fn f(#[rest] a: u8) {} }).is_err());
        assert!(shape_of(quote! { fn f(a: &str) {} }).is_err());
    }

    #[test]
    fn result_detection_covers_aliases() {
        let plain: Type = syn::parse_quote!(Result<u8, MyError>);
        let alias: Type = syn::parse_quote!(io::Result<u8>);
        let other: Type = syn::parse_quote!(Vec<u8>);
        assert!(last_segment_is(&plain, "Result"));
        assert!(last_segment_is(&alias, "Result"));
        assert!(!last_segment_is(&other, "Result"));
    }

    #[test]
    fn doc_lines_are_joined() {
        let func: ItemFn = syn::parse_quote! {
            /// Sets a property.
            ///
            /// Returns nothing.
            fn f() {}
        };
        assert_eq!(
            doc_comment(&func.attrs).as_deref(),
            Some("Sets a property.\n\nReturns nothing.")
        );
    }
}
