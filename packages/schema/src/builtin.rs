//! The built-in block set

use crate::capability::{AllowPredicate, Capability, SlotSpec};
use crate::field::{FieldSchema, ObjectSchema};
use crate::registry::SchemaEntry;
use blockwork_model::{BlockKind, Props, CHILDREN_SLOT};
use blockwork_style::{StyleDefaults, StyleMap};

/// Slot of an accordion item holding its body
pub const CONTENT_SLOT: &str = "content";

/// Loop variable name when a foreach block does not set one
pub const DEFAULT_ITEM_NAME: &str = "_item";

pub(crate) fn builtin_entries() -> Vec<SchemaEntry> {
    BlockKind::BUILTIN.iter().cloned().map(entry).collect()
}

fn defaults<const N: usize>(pairs: [(&str, &str); N]) -> StyleDefaults {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn prop<'a>(props: &'a Props, name: &str, fallback: &'a str) -> &'a str {
    props.get(name).and_then(|v| v.as_str()).unwrap_or(fallback)
}

/// Empty containers need some height to remain a drop target
fn droppable(mut styles: StyleDefaults, is_editor: bool) -> StyleDefaults {
    if is_editor {
        styles.insert("minHeight".into(), "48px".into());
    }
    styles
}

fn page_styles(props: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([
        ("maxWidth", prop(props, "maxWidth", "1200px")),
        ("margin", "0 auto"),
        ("minHeight", "100vh"),
    ])
}

fn container_styles(_: &Props, _: &StyleMap, is_editor: bool) -> StyleDefaults {
    droppable(
        defaults([("display", "flex"), ("flexDirection", "column"), ("gap", "16px")]),
        is_editor,
    )
}

fn columns_styles(props: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([
        ("display", "flex"),
        ("flexWrap", "wrap"),
        ("gap", prop(props, "gap", "16px")),
    ])
}

fn column_styles(props: &Props, _: &StyleMap, is_editor: bool) -> StyleDefaults {
    let width = prop(props, "width", "");
    let flex = if width.is_empty() {
        "1 1 0".to_string()
    } else {
        format!("0 0 {}", width)
    };
    droppable(defaults([("flex", flex.as_str()), ("minWidth", "0")]), is_editor)
}

/// Font size keyed by heading level
pub fn heading_font_size(level: i64) -> &'static str {
    match level {
        1 => "2.5rem",
        2 => "2rem",
        3 => "1.75rem",
        4 => "1.5rem",
        5 => "1.25rem",
        _ => "1rem",
    }
}

fn heading_styles(props: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    let level = props.get("level").and_then(|v| v.as_i64()).unwrap_or(2);
    defaults([
        ("fontSize", heading_font_size(level)),
        ("fontWeight", "700"),
        ("lineHeight", "1.2"),
        ("margin", "0"),
    ])
}

fn text_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("lineHeight", "1.5"), ("margin", "0")])
}

fn inline_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("display", "inline")])
}

fn image_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("maxWidth", "100%"), ("height", "auto")])
}

fn button_styles(props: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    let (background, color, border) = match prop(props, "variant", "primary") {
        "secondary" => ("#e5e7eb", "#111827", "none"),
        "outline" => ("transparent", "#2563eb", "1px solid #2563eb"),
        _ => ("#2563eb", "#ffffff", "none"),
    };
    defaults([
        ("display", "inline-block"),
        ("padding", "8px 16px"),
        ("borderRadius", "6px"),
        ("backgroundColor", background),
        ("color", color),
        ("border", border),
        ("cursor", "pointer"),
        ("textDecoration", "none"),
    ])
}

fn link_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("display", "inline"), ("color", "#2563eb")])
}

fn spacer_styles(props: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("height", prop(props, "height", "24px"))])
}

fn accordion_item_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("borderBottom", "1px solid #e5e7eb")])
}

/// Transparent for readers; editors need a real box to select and drop into
fn scoping_styles(_: &Props, _: &StyleMap, is_editor: bool) -> StyleDefaults {
    if is_editor {
        droppable(
            defaults([("display", "block"), ("outline", "1px dashed #cbd5e1")]),
            true,
        )
    } else {
        defaults([("display", "contents")])
    }
}

fn form_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    defaults([("display", "flex"), ("flexDirection", "column"), ("gap", "12px")])
}

fn entry(kind: BlockKind) -> SchemaEntry {
    let entry = SchemaEntry::new(kind.clone());
    match kind {
        BlockKind::PageLayout => entry
            .schema(
                ObjectSchema::new()
                    .field("title", FieldSchema::string().with_default(""))
                    .field("maxWidth", FieldSchema::string().with_default("1200px")),
            )
            .capability(Capability::Layout)
            .parents(Vec::<BlockKind>::new())
            .slot(SlotSpec::any(CHILDREN_SLOT))
            .default_styles(page_styles),

        BlockKind::Container => entry
            .schema(ObjectSchema::new().field(
                "tag",
                FieldSchema::one_of(&["div", "section", "header", "footer", "main", "aside", "article"])
                    .with_default("div"),
            ))
            .capability(Capability::Layout)
            .slot(SlotSpec::any(CHILDREN_SLOT))
            .default_styles(container_styles),

        BlockKind::Columns => entry
            .schema(ObjectSchema::new().field("gap", FieldSchema::string().with_default("16px")))
            .capability(Capability::Layout)
            .slot(SlotSpec::new(CHILDREN_SLOT, AllowPredicate::kinds([BlockKind::Column])))
            .default_styles(columns_styles),

        BlockKind::Column => entry
            .schema(ObjectSchema::new().field("width", FieldSchema::string().with_default("")))
            .capability(Capability::Layout)
            .parents([BlockKind::Columns])
            .slot(SlotSpec::any(CHILDREN_SLOT))
            .default_styles(column_styles),

        BlockKind::Heading => entry
            .schema(
                ObjectSchema::new()
                    .field("level", FieldSchema::integer(1, 6).required().with_default(2))
                    .field("content", FieldSchema::string().with_default("Heading")),
            )
            .default_styles(heading_styles),

        BlockKind::Text => entry
            .schema(ObjectSchema::new().field("content", FieldSchema::string().with_default("")))
            .default_styles(text_styles),

        BlockKind::InlineText => entry
            .schema(ObjectSchema::new().field("content", FieldSchema::string().with_default("")))
            .capability(Capability::Inline)
            .default_styles(inline_styles),

        BlockKind::Image => entry
            .schema(
                ObjectSchema::new()
                    .field("src", FieldSchema::url().with_default(""))
                    .field("alt", FieldSchema::string().with_default("")),
            )
            .capability(Capability::Media)
            .default_styles(image_styles),

        BlockKind::Button => entry
            .schema(
                ObjectSchema::new()
                    .field("label", FieldSchema::string().with_default("Button"))
                    .field("href", FieldSchema::url().with_default(""))
                    .field(
                        "variant",
                        FieldSchema::one_of(&["primary", "secondary", "outline"]).with_default("primary"),
                    ),
            )
            .capability(Capability::Inline)
            .default_styles(button_styles),

        BlockKind::Link => entry
            .schema(
                ObjectSchema::new()
                    .field("href", FieldSchema::url().with_default("#"))
                    .field("label", FieldSchema::string().with_default("Link"))
                    .field("newTab", FieldSchema::boolean().with_default(false)),
            )
            .capability(Capability::Inline)
            .default_styles(link_styles),

        BlockKind::Spacer => entry
            .schema(ObjectSchema::new().field("height", FieldSchema::string().with_default("24px")))
            .default_styles(spacer_styles),

        BlockKind::Accordion => entry
            .schema(ObjectSchema::new().field("allowMultiple", FieldSchema::boolean().with_default(false)))
            .capability(Capability::Layout)
            .slot(SlotSpec::new(
                CHILDREN_SLOT,
                AllowPredicate::Capability(Capability::AccordionItem),
            )),

        BlockKind::AccordionItem => entry
            .schema(
                ObjectSchema::new()
                    .field("title", FieldSchema::string().with_default("Item"))
                    .field("open", FieldSchema::boolean().with_default(false)),
            )
            .capability(Capability::AccordionItem)
            .parents([BlockKind::Accordion])
            .slot(SlotSpec::any(CONTENT_SLOT))
            .default_styles(accordion_item_styles),

        BlockKind::ForeachContainer => entry
            .schema(
                ObjectSchema::new()
                    .field("value", FieldSchema::expression().with_default(""))
                    .field(
                        "itemName",
                        FieldSchema::string()
                            .min_len(1)
                            .required()
                            .with_default(DEFAULT_ITEM_NAME),
                    ),
            )
            .capability(Capability::Scoping)
            .capability(Capability::Layout)
            .slot(SlotSpec::any(CHILDREN_SLOT))
            .default_styles(scoping_styles),

        BlockKind::ConditionalContainer => entry
            .schema(ObjectSchema::new().field("condition", FieldSchema::expression().with_default("")))
            .capability(Capability::Scoping)
            .slot(SlotSpec::any(CHILDREN_SLOT))
            .default_styles(scoping_styles),

        BlockKind::Redirect => entry
            .schema(
                ObjectSchema::new()
                    .field("url", FieldSchema::url().with_default(""))
                    .field("permanent", FieldSchema::boolean().with_default(false)),
            )
            .capability(Capability::Escape),

        BlockKind::CustomHtml => entry
            .schema(ObjectSchema::new().field("html", FieldSchema::string().with_default("")))
            .capability(Capability::Escape),

        BlockKind::Form => entry
            .schema(
                ObjectSchema::new()
                    .field("formId", FieldSchema::string().with_default(""))
                    .field("submitLabel", FieldSchema::string().with_default("Submit")),
            )
            .capability(Capability::Form)
            .default_styles(form_styles),

        BlockKind::Unknown(_) => entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;
    use blockwork_model::{BlockNode, IdGenerator};

    #[test]
    fn test_every_builtin_registered() {
        let registry = SchemaRegistry::builtin();
        for kind in BlockKind::BUILTIN {
            assert!(registry.contains(kind.as_str()), "{} missing", kind);
        }
    }

    #[test]
    fn test_heading_font_size_follows_level() {
        let registry = SchemaRegistry::builtin();
        let mut ids = IdGenerator::sequential("h");
        let heading = registry.create_block("Heading", &mut ids).unwrap();
        assert_eq!(registry.default_styles(&heading, false)["fontSize"], "2rem");

        let h1 = heading.with_prop("level", 1);
        assert_eq!(registry.default_styles(&h1, false)["fontSize"], "2.5rem");
    }

    #[test]
    fn test_editor_keeps_empty_containers_droppable() {
        let registry = SchemaRegistry::builtin();
        let container = BlockNode::new("Container", "c");
        assert!(!registry.default_styles(&container, false).contains_key("minHeight"));
        assert_eq!(registry.default_styles(&container, true)["minHeight"], "48px");
    }

    #[test]
    fn test_scoping_blocks_get_a_box_in_editor() {
        let registry = SchemaRegistry::builtin();
        for kind in ["ForeachContainer", "ConditionalContainer"] {
            let block = BlockNode::new(kind, "s");
            assert_eq!(registry.default_styles(&block, false)["display"], "contents");

            let editor = registry.default_styles(&block, true);
            assert_eq!(editor["display"], "block");
            assert_eq!(editor["minHeight"], "48px");
        }
    }

    #[test]
    fn test_root_cannot_be_nested() {
        let registry = SchemaRegistry::builtin();
        assert!(registry.can_insert("Container", CHILDREN_SLOT, "PageLayout").is_err());
        assert!(!registry
            .insertable_types("PageLayout", CHILDREN_SLOT)
            .contains(&BlockKind::PageLayout));
    }
}
