use blockwork_model::{BlockKind, Document, IdGenerator};
use blockwork_schema::{InsertRejection, SchemaRegistry, CONTENT_SLOT};

#[test]
fn test_every_default_value_validates() {
    let registry = SchemaRegistry::builtin();
    for entry in registry.entries() {
        let default = registry.default_value(entry.type_name()).unwrap();
        assert!(
            registry.validate(entry.type_name(), &default).is_ok(),
            "default of {} does not validate: {:?}",
            entry.type_name(),
            registry.validate(entry.type_name(), &default)
        );
    }
}

#[test]
fn test_accordion_item_only_inside_accordion() {
    let registry = SchemaRegistry::builtin();

    for parent in ["PageLayout", "Container", "Column", "ForeachContainer"] {
        let result = registry.can_insert(parent, "children", "AccordionItem");
        assert!(
            matches!(result, Err(InsertRejection::ParentDisallowed { .. })),
            "{} accepted an AccordionItem",
            parent
        );
    }
    assert!(registry.can_insert("Accordion", "children", "AccordionItem").is_ok());
    assert_eq!(
        registry.insertable_types("Accordion", "children"),
        vec![BlockKind::AccordionItem]
    );
    assert!(registry.can_insert("AccordionItem", CONTENT_SLOT, "Text").is_ok());
}

#[test]
fn test_columns_accept_only_columns() {
    let registry = SchemaRegistry::builtin();
    assert_eq!(registry.insertable_types("Columns", "children"), vec![BlockKind::Column]);
    assert!(!registry
        .insertable_types("Container", "children")
        .contains(&BlockKind::Column));
}

#[test]
fn test_tree_validation_reports_each_block() {
    let registry = SchemaRegistry::builtin();
    let doc = Document::from_json(
        r#"{
            "id": "root",
            "type": "PageLayout",
            "slots": { "children": [
                { "id": "h", "type": "Heading", "data": { "props": { "level": 7 } } },
                { "id": "x", "type": "Marquee" },
                { "id": "i", "type": "AccordionItem" },
                { "id": "ok", "type": "Text", "data": { "props": { "content": "fine" } } }
            ] }
        }"#,
    )
    .unwrap();

    let issues = registry.validate_tree(&doc.root);
    let ids: Vec<_> = issues.iter().map(|i| i.block_id.as_str()).collect();
    assert_eq!(ids, vec!["root", "h", "x"]);

    assert_eq!(issues[0].errors.0[0].path, "slots.children[2]");
    assert_eq!(issues[1].errors.0[0].path, "props.level");
    assert_eq!(issues[2].errors.0[0].key, "builder.validation.unknown-type");
}

#[test]
fn test_created_blocks_validate() {
    let registry = SchemaRegistry::builtin();
    let mut ids = IdGenerator::random();
    for kind in BlockKind::BUILTIN {
        let block = registry.create_block(kind.as_str(), &mut ids).unwrap();
        assert!(registry.validate_block(&block).is_ok(), "{}", kind);
    }
}
