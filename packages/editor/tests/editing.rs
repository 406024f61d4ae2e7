use blockwork_editor::{Action, BlockInteraction, DispatchOutcome, EditSession};
use blockwork_expression::Args;
use blockwork_model::{get_node, BlockNode, Document, IdGenerator, CHILDREN_SLOT};
use blockwork_renderer::{RenderOutcome, VNode};
use blockwork_schema::{InsertRejection, SchemaRegistry};
use serde_json::json;
use std::sync::Arc;

fn two_containers() -> Document {
    Document::new(Arc::new(
        BlockNode::new("PageLayout", "root")
            .with_child(
                CHILDREN_SLOT,
                BlockNode::new("Container", "a")
                    .with_child(CHILDREN_SLOT, BlockNode::new("Text", "x").with_prop("content", "X"))
                    .with_child(CHILDREN_SLOT, BlockNode::new("Text", "y").with_prop("content", "Y")),
            )
            .with_child(CHILDREN_SLOT, BlockNode::new("Container", "b").with_slot(CHILDREN_SLOT)),
    ))
}

fn child_ids(doc: &Document, parent: &str) -> Vec<String> {
    doc.get(parent)
        .unwrap()
        .children()
        .iter()
        .map(|child| child.id.clone())
        .collect()
}

#[test]
fn test_accordion_item_outside_accordion_is_rejected() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());
    let before = session.value().root.clone();

    let outcome = session.insert_block("a", CHILDREN_SLOT, 0, "AccordionItem");

    assert!(matches!(
        outcome,
        DispatchOutcome::Rejected(InsertRejection::ParentDisallowed { .. })
    ));
    assert!(Arc::ptr_eq(&session.value().root, &before));
    assert!(!session.can_undo());
    assert_eq!(
        session.rejection_message().as_deref(),
        Some("AccordionItem can only be placed inside Accordion")
    );
}

#[test]
fn test_accordion_item_inside_accordion_is_accepted() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers()).with_ids(IdGenerator::sequential("n"));

    assert!(session.insert_block("b", CHILDREN_SLOT, 0, "Accordion").is_applied());
    assert!(session.insert_block("n-1", CHILDREN_SLOT, 0, "AccordionItem").is_applied());
    assert_eq!(session.last_rejection(), None);
    assert_eq!(session.state().selected(), Some("n-2"));
}

#[test]
fn test_drag_between_containers_is_one_step() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());
    let original_x = session.value().get("x").unwrap().clone();

    assert!(session.begin_drag("x"));
    assert_eq!(session.state().interaction("x"), BlockInteraction::Dragging);

    let outcome = session.drop_into("b", CHILDREN_SLOT, 0);

    assert_eq!(outcome, DispatchOutcome::Applied);
    assert_eq!(child_ids(session.value(), "a"), ["y"]);
    assert_eq!(child_ids(session.value(), "b"), ["x"]);
    assert!(Arc::ptr_eq(session.value().get("x").unwrap(), &original_x));
    assert_eq!(session.state().dragging(), None);
    assert_eq!(session.history().undo_levels(), 1);

    session.undo();
    assert_eq!(child_ids(session.value(), "a"), ["x", "y"]);
    assert!(child_ids(session.value(), "b").is_empty());
}

#[test]
fn test_dropping_container_into_itself_changes_nothing() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());
    let before = session.value().root.clone();

    session.begin_drag("a");
    assert_eq!(session.drop_into("a", CHILDREN_SLOT, 0), DispatchOutcome::Unchanged);
    assert!(Arc::ptr_eq(&session.value().root, &before));
    assert!(!session.state().is_dragging());
}

#[test]
fn test_remove_clears_selection() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());

    assert!(session.select("a"));
    session.dispatch(Action::RemoveBlock { block_id: "a".into() });
    assert_eq!(session.state().selected(), None);
    assert!(session.value().get("x").is_none());

    session.undo();
    assert!(session.value().get("x").is_some());
    assert!(session.can_redo());
}

#[test]
fn test_actions_from_json() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());

    let actions: Vec<Action> = serde_json::from_value(json!([
        { "type": "move-child", "parentId": "a", "slot": "children", "from": 0, "to": 1 },
        { "type": "set-block-data", "blockId": "x", "props": { "content": "Moved" } }
    ]))
    .unwrap();

    session.dispatch_all("reorder", actions).unwrap();

    assert_eq!(child_ids(session.value(), "a"), ["y", "x"]);
    assert_eq!(session.value().get("x").unwrap().prop_str("content"), Some("Moved"));
    assert_eq!(session.history().undo_description(), Some("reorder"));
}

#[test]
fn test_failed_compound_edit_applies_nothing() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());
    let before = session.value().root.clone();

    let result = session.dispatch_all(
        "broken",
        [
            Action::RemoveBlock { block_id: "y".into() },
            Action::RemoveBlock { block_id: "missing".into() },
        ],
    );

    assert!(result.is_err());
    assert!(Arc::ptr_eq(&session.value().root, &before));
}

#[test]
fn test_batched_dispatches_undo_together() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());

    session.begin_batch();
    session.dispatch(Action::RemoveBlock { block_id: "x".into() });
    session.dispatch(Action::RemoveBlock { block_id: "y".into() });
    session.end_batch();

    assert!(child_ids(session.value(), "a").is_empty());
    session.undo();
    assert_eq!(child_ids(session.value(), "a"), ["x", "y"]);
}

#[test]
fn test_editor_render_carries_affordances() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());
    session.select("x");

    let RenderOutcome::Page(page) = session.render(&Args::default()) else {
        panic!("expected a page");
    };

    let x = page.find_block("x").unwrap();
    assert_eq!(x.attr("data-interaction"), Some("selected"));
    assert_eq!(x.attr("draggable"), Some("true"));

    let b = page.find_block("b").unwrap();
    let drop_zone = b
        .children()
        .iter()
        .find(|child| child.attr("data-slot") == Some(CHILDREN_SLOT))
        .unwrap();
    assert!(matches!(
        &drop_zone.children()[0],
        VNode::Placeholder { message, .. } if message == "Drop blocks here"
    ));
}

#[test]
fn test_host_value_replaces_tree() {
    let registry = SchemaRegistry::builtin();
    let mut session = EditSession::new(&registry, two_containers());
    session.select("x");

    let replacement = Document::from_json(
        r#"{ "id": "root", "type": "PageLayout", "slots": { "children": [] } }"#,
    )
    .unwrap();
    session.set_value(replacement);

    assert_eq!(session.value().block_count(), 1);
    assert_eq!(session.state().selected(), None);
    assert!(get_node(&session.value().root, "x").is_none());
}

#[test]
fn test_scoping_children_stay_editable() {
    let registry = SchemaRegistry::builtin();
    let doc = Document::new(Arc::new(
        BlockNode::new("PageLayout", "root")
            .with_child(
                CHILDREN_SLOT,
                BlockNode::new("ForeachContainer", "loop")
                    .with_prop("value", "items")
                    .with_child(CHILDREN_SLOT, BlockNode::new("InlineText", "tmpl").with_prop("content", "tmpl")),
            )
            .with_child(
                CHILDREN_SLOT,
                BlockNode::new("ConditionalContainer", "cond")
                    .with_prop("condition", "flag")
                    .with_child(CHILDREN_SLOT, BlockNode::new("Text", "hidden").with_prop("content", "hidden")),
            ),
    ));
    let mut session = EditSession::new(&registry, doc);
    assert!(session.select("tmpl"));

    let RenderOutcome::Page(page) = session.render(&Args::new()) else {
        panic!("expected a page");
    };

    let template = page.find_block("tmpl").unwrap();
    assert_eq!(template.attr("data-interaction"), Some("selected"));
    assert_eq!(template.attr("draggable"), Some("true"));
    assert_eq!(page.find_block("hidden").unwrap().attr("data-block-id"), Some("hidden"));
    assert_eq!(page.texts(), vec!["tmpl", "hidden"]);
}
