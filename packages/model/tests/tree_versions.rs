use blockwork_model::*;
use std::sync::Arc;

fn page() -> Document {
    let mut ids = IdGenerator::sequential("n");
    let mut root = BlockNode::new("PageLayout", ids.new_id());
    for _ in 0..3 {
        let mut section = BlockNode::new("Container", ids.new_id());
        for _ in 0..3 {
            section = section.with_child("children", BlockNode::new("Text", ids.new_id()));
        }
        root = root.with_child("children", section);
    }
    Document::from(root)
}

#[test]
fn test_replace_keeps_other_subtrees_identical() {
    let doc = page();
    let target = doc.root.children()[1].children()[2].id.clone();

    let replacement = BlockNode::new("Text", "whatever").with_prop("content", "changed");
    let next = replace_node(&doc.root, &target, replacement);

    let replaced = get_node(&next, &target).unwrap();
    assert_eq!(replaced.prop_str("content"), Some("changed"));
    assert_eq!(replaced.id, target);

    for id in collect_ids(&doc.root) {
        let on_path = id == doc.root.id || id == doc.root.children()[1].id || id == target;
        let same = Arc::ptr_eq(get_node(&doc.root, &id).unwrap(), get_node(&next, &id).unwrap());
        assert_eq!(same, !on_path, "sharing mismatch for {}", id);
    }
}

#[test]
fn test_edits_never_touch_previous_versions() {
    let v1 = page();
    let first = v1.root.children()[0].id.clone();
    let v2 = remove_node(&v1.root, &first);
    let v3 = duplicate_node(&v2, &v2.children()[0].id.clone(), &mut IdGenerator::random());

    assert_eq!(v1.block_count(), 13);
    assert_eq!(v2.subtree_size(), 9);
    assert_eq!(v3.subtree_size(), 13);
    check_unique_ids(&v3).unwrap();
}

#[test]
fn test_saved_document_loads_back_equal() {
    let doc = page();
    let json = doc.to_json_pretty().unwrap();
    let loaded = Document::from_json(&json).unwrap();
    assert_eq!(loaded, doc);
}
