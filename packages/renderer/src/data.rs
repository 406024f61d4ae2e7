//! External data consumed while rendering
//!
//! Form blocks reference a form definition stored elsewhere. The renderer
//! reads it through [`DataResolver`]; a failure only replaces that one block
//! with a placeholder.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalDataError {
    #[error("Form not found: {0}")]
    NotFound(String),

    #[error("Failed to load form {id}: {message}")]
    Failed { id: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_input_type")]
    pub input_type: String,
    #[serde(default)]
    pub required: bool,
    /// Choices for `select` inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

fn default_input_type() -> String {
    "text".to_string()
}

pub trait DataResolver {
    fn form(&self, form_id: &str) -> Result<FormDefinition, ExternalDataError>;
}

/// Resolver for renders without any external data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalData;

impl DataResolver for NoExternalData {
    fn form(&self, form_id: &str) -> Result<FormDefinition, ExternalDataError> {
        Err(ExternalDataError::NotFound(form_id.to_string()))
    }
}

impl DataResolver for HashMap<String, FormDefinition> {
    fn form(&self, form_id: &str) -> Result<FormDefinition, ExternalDataError> {
        self.get(form_id)
            .cloned()
            .ok_or_else(|| ExternalDataError::NotFound(form_id.to_string()))
    }
}

#[cfg(feature = "async")]
pub use prefetch::{collect_form_ids, prefetch, prefetch_with_timeout, AsyncDataResolver, PrefetchedData};

#[cfg(feature = "async")]
mod prefetch {
    use super::*;
    use blockwork_model::{walk_block, BlockKind, BlockNode, Visitor};
    use futures_util::future::{join_all, BoxFuture};
    use std::collections::BTreeSet;
    use std::time::Duration;
    use tracing::{debug, instrument, warn};

    pub trait AsyncDataResolver {
        fn fetch_form<'a>(&'a self, form_id: &'a str) -> BoxFuture<'a, Result<FormDefinition, ExternalDataError>>;
    }

    /// Results of a prefetch, usable as a synchronous resolver
    #[derive(Debug, Clone, Default)]
    pub struct PrefetchedData {
        forms: HashMap<String, Result<FormDefinition, ExternalDataError>>,
    }

    impl PrefetchedData {
        pub fn len(&self) -> usize {
            self.forms.len()
        }

        pub fn is_empty(&self) -> bool {
            self.forms.is_empty()
        }
    }

    impl DataResolver for PrefetchedData {
        fn form(&self, form_id: &str) -> Result<FormDefinition, ExternalDataError> {
            self.forms
                .get(form_id)
                .cloned()
                .unwrap_or_else(|| Err(ExternalDataError::NotFound(form_id.to_string())))
        }
    }

    /// Distinct form ids linked anywhere in the tree
    pub fn collect_form_ids(root: &BlockNode) -> BTreeSet<String> {
        struct FormIds(BTreeSet<String>);

        impl Visitor for FormIds {
            fn visit_block(&mut self, block: &BlockNode) {
                if block.kind() == BlockKind::Form {
                    if let Some(id) = block.prop_str("formId").filter(|id| !id.is_empty()) {
                        self.0.insert(id.to_string());
                    }
                }
                walk_block(self, block);
            }
        }

        let mut ids = FormIds(BTreeSet::new());
        ids.visit_block(root);
        ids.0
    }

    /// Fetch every linked form concurrently
    pub async fn prefetch(root: &BlockNode, resolver: &dyn AsyncDataResolver) -> PrefetchedData {
        fetch_all(root, resolver, None).await
    }

    /// Like [`prefetch`], but a fetch slower than `timeout` counts as failed
    pub async fn prefetch_with_timeout(
        root: &BlockNode,
        resolver: &dyn AsyncDataResolver,
        timeout: Duration,
    ) -> PrefetchedData {
        fetch_all(root, resolver, Some(timeout)).await
    }

    #[instrument(skip(root, resolver), fields(root_id = %root.id))]
    async fn fetch_all(
        root: &BlockNode,
        resolver: &dyn AsyncDataResolver,
        timeout: Option<Duration>,
    ) -> PrefetchedData {
        let ids = collect_form_ids(root);
        debug!(forms = ids.len(), "Prefetching forms");

        let fetches = ids.iter().map(|id| async move {
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, resolver.fetch_form(id)).await {
                    Ok(result) => result,
                    Err(_) => Err(ExternalDataError::Failed {
                        id: id.clone(),
                        message: format!("timed out after {:?}", limit),
                    }),
                },
                None => resolver.fetch_form(id).await,
            };
            if let Err(e) = &result {
                warn!(form_id = %id, error = %e, "Form prefetch failed");
            }
            (id.clone(), result)
        });

        PrefetchedData {
            forms: join_all(fetches).await.into_iter().collect(),
        }
    }
}
