#![cfg(feature = "async")]

use blockwork_expression::Args;
use blockwork_model::{BlockNode, Document};
use blockwork_renderer::*;
use blockwork_schema::SchemaRegistry;
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct SlowForms {
    calls: AtomicUsize,
}

impl AsyncDataResolver for SlowForms {
    fn fetch_form<'a>(&'a self, form_id: &'a str) -> BoxFuture<'a, Result<FormDefinition, ExternalDataError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match form_id {
                "broken" => Err(ExternalDataError::Failed {
                    id: form_id.to_string(),
                    message: "500".into(),
                }),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(FormDefinition {
                        id: form_id.to_string(),
                        title: String::new(),
                        fields: vec![],
                    })
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(FormDefinition {
                        id: form_id.to_string(),
                        title: format!("Form {}", form_id),
                        fields: vec![],
                    })
                }
            }
        })
    }
}

fn doc() -> Document {
    let form = |id: &str, form_id: &str| BlockNode::new("Form", id).with_prop("formId", form_id);
    Document::from(
        BlockNode::new("PageLayout", "root")
            .with_child("children", form("a", "signup"))
            .with_child(
                "children",
                BlockNode::new("Container", "c")
                    .with_child("children", form("b", "broken"))
                    .with_child("children", form("d", "signup")),
            )
            .with_child("children", form("e", "")),
    )
}

#[test]
fn test_collects_distinct_linked_forms() {
    let ids: Vec<_> = collect_form_ids(&doc().root).into_iter().collect();
    assert_eq!(ids, vec!["broken", "signup"]);
}

#[tokio::test]
async fn test_prefetched_forms_render_without_waiting() {
    let resolver = SlowForms {
        calls: AtomicUsize::new(0),
    };
    let doc = doc();
    let data = prefetch(&doc.root, &resolver).await;
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(data.len(), 2);

    let registry = SchemaRegistry::builtin();
    let page = Renderer::new(&registry)
        .with_data(&data)
        .render_document(&doc, &Args::new())
        .into_page()
        .unwrap();

    assert_eq!(page.find_block("a").and_then(|n| n.tag()), Some("form"));
    assert_eq!(page.find_block("d").and_then(|n| n.tag()), Some("form"));
    assert!(matches!(
        page.find_block("b"),
        Some(VNode::Placeholder { message, .. }) if message == "Form broken failed to load"
    ));
    assert!(matches!(
        page.find_block("e"),
        Some(VNode::Placeholder { message, .. }) if message == "No form selected"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_times_out_alone() {
    let resolver = SlowForms {
        calls: AtomicUsize::new(0),
    };
    let root = BlockNode::new("PageLayout", "root")
        .with_child("children", BlockNode::new("Form", "s").with_prop("formId", "slow"))
        .with_child("children", BlockNode::new("Form", "f").with_prop("formId", "fast"));

    let data = prefetch_with_timeout(&root, &resolver, Duration::from_millis(100)).await;

    assert!(data.form("fast").is_ok());
    assert!(matches!(data.form("slow"), Err(ExternalDataError::Failed { .. })));
    assert!(matches!(data.form("other"), Err(ExternalDataError::NotFound(_))));
}
