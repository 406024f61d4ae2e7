//! CSS rule emission for published pages.
//!
//! Inline styles can only carry the base resolution; breakpoint and state
//! variants become separate rules keyed by the block's selector.

use crate::declaration::{Breakpoint, StyleMap, StyleState};
use crate::resolve::{css_property_name, resolve, ResolveOptions, StyleDefaults};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRule {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// Rules for one block, base rule first.
///
/// Every breakpoint and state combination used by the style map gets a rule
/// holding only the properties the cascade would otherwise get wrong, so the
/// stylesheet agrees with [`resolve`] in every context: the last matching
/// declaration wins even when an earlier one is qualified.
pub fn css_rules(selector: &str, style: &StyleMap, type_defaults: &StyleDefaults) -> Vec<CssRule> {
    let mut breakpoints = BTreeSet::from([None]);
    let mut states = BTreeSet::from([None]);
    for (_, declarations) in style.iter() {
        for declaration in declarations {
            breakpoints.insert(declaration.breakpoint);
            states.insert(declaration.state);
        }
    }

    let mut emitted: Vec<ContextRule> = Vec::new();
    for &breakpoint in &breakpoints {
        for &state in &states {
            let options = ResolveOptions {
                breakpoint,
                state,
                is_editor: false,
            };
            let properties: BTreeMap<String, String> = resolve(style, type_defaults, &options)
                .into_map()
                .into_iter()
                .filter(|(property, value)| {
                    cascaded(&emitted, breakpoint, state, property) != Some(value.as_str())
                })
                .collect();

            let is_base = breakpoint.is_none() && state.is_none();
            if is_base || !properties.is_empty() {
                emitted.push(ContextRule {
                    breakpoint,
                    state,
                    properties,
                });
            }
        }
    }

    emitted
        .into_iter()
        .map(|rule| CssRule {
            selector: match rule.state {
                Some(state) => format!("{}{}", selector, state.pseudo_class()),
                None => selector.to_string(),
            },
            media: rule
                .breakpoint
                .map(|bp| format!("(min-width: {}px)", bp.min_width())),
            properties: rule.properties,
        })
        .collect()
}

struct ContextRule {
    breakpoint: Option<Breakpoint>,
    state: Option<StyleState>,
    properties: BTreeMap<String, String>,
}

impl ContextRule {
    fn applies_at(&self, breakpoint: Option<Breakpoint>, state: Option<StyleState>) -> bool {
        let breakpoint_ok = match self.breakpoint {
            None => true,
            Some(bp) => breakpoint.is_some_and(|active| bp <= active),
        };
        breakpoint_ok && (self.state.is_none() || self.state == state)
    }
}

/// Value the browser would pick from `rules` at a context: pseudo-class
/// selectors outrank the bare selector, then the later rule wins
fn cascaded<'a>(
    rules: &'a [ContextRule],
    breakpoint: Option<Breakpoint>,
    state: Option<StyleState>,
    property: &str,
) -> Option<&'a str> {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.applies_at(breakpoint, state))
        .filter_map(|(order, rule)| {
            let value = rule.properties.get(property)?;
            Some(((rule.state.is_some(), order), value.as_str()))
        })
        .max_by_key(|(rank, _)| *rank)
        .map(|(_, value)| value)
}

/// Serialize rules to a stylesheet string
pub fn to_css_text(rules: &[CssRule]) -> String {
    let mut out = String::new();

    for rule in rules.iter().filter(|r| !r.properties.is_empty()) {
        let body = rule
            .properties
            .iter()
            .map(|(k, v)| format!("{}: {};", css_property_name(k), sanitize_value(v)))
            .collect::<Vec<_>>()
            .join(" ");

        match &rule.media {
            Some(media) => out.push_str(&format!("@media {} {{ {} {{ {} }} }}\n", media, rule.selector, body)),
            None => out.push_str(&format!("{} {{ {} }}\n", rule.selector, body)),
        }
    }

    out
}

/// Characters that would end the declaration or the rule
fn sanitize_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect()
}
