//! Context builders that turn the OpenAPI model into template-ready data.
pub mod contracts;
pub mod csharp;

use std::collections::BTreeSet;

use crate::openapi::OpenApiOperation;
use crate::utils::unique_name;

pub use contracts::{ContractContext, ContractContextBuilder};
pub use csharp::{CSharpEndpointContext, CSharpEndpointContextBuilder, TypeMapper};

/// Trait for converting an OpenApiOperation into a language-specific context.
pub trait EndpointContextBuilder {
    type Context;

    /// Build the context, or `None` when the operation cannot be expressed
    fn build(&self, op: &OpenApiOperation) -> crate::Result<Option<Self::Context>>;

    /// Generated name, also used to order contexts in the output
    fn sort_key(context: &Self::Context) -> &str;

    /// Replace the generated name
    fn rename(context: &mut Self::Context, name: String);
}

pub struct EndpointContext;

impl EndpointContext {
    /// Transform a list of OpenAPI operations into endpoint contexts
    /// The returned contexts are sorted by name for consistent output.
    /// Names are unique: later operations that map to a taken name get a
    /// numeric suffix, in document order.
    pub fn transform_endpoints<B: EndpointContextBuilder>(
        builder: &B,
        operations: &[OpenApiOperation],
    ) -> crate::Result<Vec<B::Context>> {
        let mut contexts = Vec::new();
        for op in operations {
            if let Some(context) = builder.build(op)? {
                contexts.push(context);
            }
        }

        let mut taken = BTreeSet::new();
        let mut duplicates = Vec::new();
        for (index, context) in contexts.iter().enumerate() {
            if !taken.insert(B::sort_key(context).to_string()) {
                duplicates.push(index);
            }
        }
        for index in duplicates {
            let name = unique_name(B::sort_key(&contexts[index]), &mut taken);
            log::debug!("Renaming duplicate endpoint to {name}");
            B::rename(&mut contexts[index], name);
        }

        contexts.sort_by(|a, b| B::sort_key(a).cmp(B::sort_key(b)));
        Ok(contexts)
    }
}
