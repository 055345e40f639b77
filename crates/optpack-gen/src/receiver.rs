//! Receiver type normalization.
//!
//! Every method is attributed to a declared type by reducing the `Self` type of its
//! impl block to a bare identifier. A receiver the normalizer cannot reduce is a
//! programmer error and panics: the generator cannot reason about it.

use quote::ToTokens;

pub trait ReceiverNormalizer {
    /// Bare declared-type name of `receiver`.
    ///
    /// # Panics
    ///
    /// Panics on receiver shapes the normalizer does not support.
    fn normalize(&self, receiver: &syn::Type) -> String;
}

/// Handles the sugar Rust impl blocks carry:
///
/// - one level of reference or raw pointer: `impl X for &Point`, `impl X for *const Point`
/// - parentheses: `impl X for (Point)`
/// - module qualification: `impl geo::Point` resolves to `Point`
/// - generic arguments, single or multiple: `impl<T> Wrapper<T>`, `impl<K, V> Pair<K, V>`
#[derive(Debug, Clone, Copy, Default)]
pub struct RustReceiverNormalizer;

impl ReceiverNormalizer for RustReceiverNormalizer {
    fn normalize(&self, receiver: &syn::Type) -> String {
        let ty = match ungroup(receiver) {
            syn::Type::Reference(r) => ungroup(&r.elem),
            syn::Type::Ptr(p) => ungroup(&p.elem),
            other => other,
        };
        match ty {
            syn::Type::Path(tp) if tp.qself.is_none() => match tp.path.segments.last() {
                Some(seg) => match &seg.arguments {
                    syn::PathArguments::None | syn::PathArguments::AngleBracketed(_) => {
                        seg.ident.to_string()
                    }
                    syn::PathArguments::Parenthesized(_) => unsupported(receiver),
                },
                None => unsupported(receiver),
            },
            _ => unsupported(receiver),
        }
    }
}

/// Accepts only a single bare identifier, for sources without receiver sugar.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareReceiverNormalizer;

impl ReceiverNormalizer for BareReceiverNormalizer {
    fn normalize(&self, receiver: &syn::Type) -> String {
        match receiver {
            syn::Type::Path(tp) if tp.qself.is_none() => match tp.path.get_ident() {
                Some(ident) => ident.to_string(),
                None => unsupported(receiver),
            },
            _ => unsupported(receiver),
        }
    }
}

fn ungroup(mut ty: &syn::Type) -> &syn::Type {
    loop {
        match ty {
            syn::Type::Paren(p) => ty = &p.elem,
            syn::Type::Group(g) => ty = &g.elem,
            _ => return ty,
        }
    }
}

fn unsupported(receiver: &syn::Type) -> ! {
    panic!(
        "unsupported receiver type: {}",
        receiver.to_token_stream()
    )
}
