//! Built-in render functions

use crate::data::ExternalDataError;
use crate::dispatch::{BlockInput, RenderScope};
use crate::options::{RawHtmlPolicy, RenderMode};
use crate::vdom::VNode;
use blockwork_expression::{binding_expression, evaluate, try_evaluate, ValueExt};
use blockwork_model::CHILDREN_SLOT;
use blockwork_schema::i18n::{params, Params};
use blockwork_schema::{is_allowed_url, CONTENT_SLOT, DEFAULT_ITEM_NAME};
use serde_json::{json, Value};
use tracing::{debug, warn};

const CONTAINER_TAGS: [&str; 7] = ["div", "section", "header", "footer", "main", "aside", "article"];

fn with_slot(node: VNode, slot: &str, input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> VNode {
    node.with_children(scope.render_slot(input.block, slot, input.args))
}

/// Interpolated link target, dropped when its scheme is not allowed
fn safe_href(input: &BlockInput<'_>, name: &str) -> Option<String> {
    let href = input.text(name);
    if href.is_empty() {
        return None;
    }
    if !is_allowed_url(&href) {
        warn!(block_id = %input.id(), href = %href, "Dropping disallowed link");
        return None;
    }
    Some(href)
}

pub fn page_layout(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    vec![with_slot(input.element("main"), CHILDREN_SLOT, input, scope)]
}

pub fn container(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let tag = input
        .raw_str("tag")
        .filter(|tag| CONTAINER_TAGS.contains(tag))
        .unwrap_or("div");
    vec![with_slot(input.element(tag), CHILDREN_SLOT, input, scope)]
}

pub fn columns(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    vec![with_slot(input.element("div"), CHILDREN_SLOT, input, scope)]
}

pub fn column(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    vec![with_slot(input.element("div"), CHILDREN_SLOT, input, scope)]
}

pub fn heading(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    let level = input
        .props
        .get("level")
        .and_then(Value::as_i64)
        .unwrap_or(2)
        .clamp(1, 6);
    vec![input
        .element(&format!("h{}", level))
        .with_child(VNode::text(input.text("content")))]
}

pub fn text(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    vec![input.element("p").with_child(VNode::text(input.text("content")))]
}

pub fn inline_text(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    vec![input.element("span").with_child(VNode::text(input.text("content")))]
}

pub fn image(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    let mut node = input.element("img").with_attr("alt", input.text("alt"));
    if let Some(src) = safe_href(input, "src") {
        node = node.with_attr("src", src);
    }
    vec![node]
}

pub fn button(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    let variant = input.raw_str("variant").unwrap_or("primary");
    let node = match safe_href(input, "href") {
        Some(href) => input.element("a").with_attr("href", href).with_attr("role", "button"),
        None => input.element("button").with_attr("type", "button"),
    };
    vec![node
        .with_attr("data-variant", variant)
        .with_child(VNode::text(input.text("label")))]
}

pub fn link(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    let mut node = input.element("a");
    if let Some(href) = safe_href(input, "href") {
        node = node.with_attr("href", href);
    }
    if input.flag("newTab") {
        node = node
            .with_attr("target", "_blank")
            .with_attr("rel", "noopener noreferrer");
    }
    vec![node.with_child(VNode::text(input.text("label")))]
}

pub fn spacer(input: &BlockInput<'_>, _: &mut RenderScope<'_>) -> Vec<VNode> {
    vec![input.element("div").with_attr("aria-hidden", "true")]
}

pub fn accordion(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let mut node = input.element("div").with_attr("role", "group");
    if input.flag("allowMultiple") {
        node = node.with_attr("data-allow-multiple", "true");
    }
    vec![with_slot(node, CHILDREN_SLOT, input, scope)]
}

pub fn accordion_item(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let mut node = input.element("details");
    if input.flag("open") {
        node = node.with_attr("open", "open");
    }
    let summary = VNode::element("summary").with_child(VNode::text(input.text("title")));
    let body = with_slot(VNode::element("div"), CONTENT_SLOT, input, scope);
    vec![node.with_child(summary).with_child(body)]
}

/// Key repeated elements by iteration so siblings stay distinct
fn keyed(node: VNode, index: usize) -> VNode {
    let key = match &node {
        VNode::Element { key: Some(key), .. } => format!("{}:{}", key, index),
        _ => return node,
    };
    node.with_key(key)
}

pub fn foreach_container(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let source = binding_expression(input.raw_str("value").unwrap_or(""));
    let item_name = input
        .raw_str("itemName")
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_ITEM_NAME);

    let items = if source.trim().is_empty() {
        Vec::new()
    } else {
        match evaluate(source, input.args) {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                warn!(block_id = %input.id(), value = %other, "Foreach source is not a list");
                Vec::new()
            }
        }
    };
    debug!(block_id = %input.id(), items = items.len(), "Rendering foreach");

    // Editors see the template once, previewing the first item when there is one
    if input.mode.is_editor() {
        let first = items.into_iter().next().unwrap_or(Value::Null);
        let args = input.args.extend(item_name, first).extend("_index", json!(0));
        return vec![input
            .element("div")
            .with_children(scope.render_slot(input.block, CHILDREN_SLOT, &args))];
    }

    let mut children = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let args = input.args.extend(item_name, item).extend("_index", json!(index));
        let rendered = scope.render_slot(input.block, CHILDREN_SLOT, &args);
        children.extend(rendered.into_iter().map(|node| keyed(node, index)));
    }
    vec![input.element("div").with_children(children)]
}

pub fn conditional_container(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let source = binding_expression(input.raw_str("condition").unwrap_or(""));
    let visible = if source.trim().is_empty() {
        false
    } else {
        match try_evaluate(source, input.args) {
            Ok(value) => value.is_truthy(),
            Err(e) => {
                warn!(block_id = %input.id(), error = %e, "Condition failed, treating as false");
                false
            }
        }
    };

    let node = input.element("div");
    if visible || input.mode.is_editor() {
        vec![with_slot(node, CHILDREN_SLOT, input, scope)]
    } else {
        vec![node]
    }
}

pub fn redirect(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let url = input.text("url");
    let permanent = input.flag("permanent");

    match input.mode {
        RenderMode::Editor if url.is_empty() => {
            vec![scope.placeholder(input.block, "placeholder.redirect-unset", &Params::new())]
        }
        RenderMode::Editor => {
            vec![scope.placeholder(input.block, "placeholder.redirect", &params([("url", json!(url))]))]
        }
        RenderMode::Reader if url.is_empty() || !is_allowed_url(&url) => {
            warn!(block_id = %input.id(), url = %url, "Ignoring redirect without a usable target");
            Vec::new()
        }
        RenderMode::Reader => {
            scope.redirect(url, permanent);
            Vec::new()
        }
    }
}

pub fn custom_html(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let html = input.raw_str("html").unwrap_or("");
    match scope.options().raw_html {
        RawHtmlPolicy::Trust => vec![input.element("div").with_child(VNode::raw(html))],
        RawHtmlPolicy::Escape => vec![input.element("div").with_child(VNode::text(html))],
        RawHtmlPolicy::Drop if input.mode == RenderMode::Editor => {
            vec![scope.placeholder(input.block, "placeholder.raw-html", &Params::new())]
        }
        RawHtmlPolicy::Drop => Vec::new(),
    }
}

pub fn form(input: &BlockInput<'_>, scope: &mut RenderScope<'_>) -> Vec<VNode> {
    let form_id = input.raw_str("formId").unwrap_or("");
    if form_id.is_empty() {
        return vec![scope.placeholder(input.block, "placeholder.form-unlinked", &Params::new())];
    }

    let definition = match scope.data().form(form_id) {
        Ok(definition) => definition,
        Err(e) => {
            warn!(block_id = %input.id(), form_id = %form_id, error = %e, "Form unavailable");
            let key = match e {
                ExternalDataError::NotFound(_) => "placeholder.form-not-found",
                ExternalDataError::Failed { .. } => "placeholder.form-failed",
            };
            return vec![scope.placeholder(input.block, key, &params([("formId", json!(form_id))]))];
        }
    };

    let mut node = input
        .element("form")
        .with_attr("data-form-id", definition.id.as_str())
        .with_attr("method", "post");
    if !definition.title.is_empty() {
        node = node.with_child(VNode::element("h3").with_child(VNode::text(definition.title.as_str())));
    }

    for field in &definition.fields {
        let input_node = match field.input_type.as_str() {
            "textarea" => VNode::element("textarea"),
            "select" => field.options.iter().fold(VNode::element("select"), |select, option| {
                select.with_child(
                    VNode::element("option")
                        .with_attr("value", option.as_str())
                        .with_child(VNode::text(option.as_str())),
                )
            }),
            other => VNode::element("input").with_attr("type", other),
        };
        let mut input_node = input_node.with_attr("name", field.name.as_str());
        if field.required {
            input_node = input_node.with_attr("required", "required");
        }
        let label = if field.label.is_empty() { &field.name } else { &field.label };
        node = node.with_child(
            VNode::element("label")
                .with_child(VNode::text(label.as_str()))
                .with_child(input_node),
        );
    }

    let submit = input.text("submitLabel");
    let submit = if submit.is_empty() { "Submit".to_string() } else { submit };
    vec![node.with_child(
        VNode::element("button")
            .with_attr("type", "submit")
            .with_child(VNode::text(submit)),
    )]
}
