use crate::declaration::{Breakpoint, StyleDeclaration, StyleMap, StyleState};
use std::collections::BTreeMap;

/// Property → value map computed by a block type from its props
pub type StyleDefaults = BTreeMap<String, String>;

/// Which declarations apply during a resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Active viewport breakpoint; `None` is the narrowest (mobile) layout
    pub breakpoint: Option<Breakpoint>,
    pub state: Option<StyleState>,
    pub is_editor: bool,
}

impl ResolveOptions {
    pub fn reader() -> Self {
        Self::default()
    }

    pub fn editor() -> Self {
        Self {
            is_editor: true,
            ..Self::default()
        }
    }

    pub fn at(mut self, breakpoint: Option<Breakpoint>) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn matches(&self, declaration: &StyleDeclaration) -> bool {
        let breakpoint_ok = match declaration.breakpoint {
            None => true,
            Some(bp) => self.breakpoint.map(|active| bp <= active).unwrap_or(false),
        };
        let state_ok = match declaration.state {
            None => true,
            Some(state) => self.state == Some(state),
        };
        breakpoint_ok && state_ok
    }
}

/// Final presentational attributes of one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    properties: BTreeMap<String, String>,
}

impl ResolvedStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.properties
    }

    /// `property: value; ...` with camelCase names converted to kebab-case
    pub fn to_inline_css(&self) -> String {
        self.properties
            .iter()
            .map(|(k, v)| format!("{}: {}", css_property_name(k), v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Defaults every block gets before its type's own defaults
pub fn framework_defaults() -> StyleDefaults {
    BTreeMap::from([("display".to_string(), "block".to_string())])
}

/// Outline drawn around every block while editing
pub fn editor_defaults() -> StyleDefaults {
    BTreeMap::from([
        ("outline".to_string(), "1px dashed rgba(0, 0, 0, 0.15)".to_string()),
        ("outlineOffset".to_string(), "-1px".to_string()),
    ])
}

/// Resolve a block's declared styles on top of its type defaults.
///
/// Layering, lowest first: framework defaults, editor outline (editor only),
/// type defaults, then for each declared property the last declaration
/// matching `options`.
pub fn resolve(style: &StyleMap, type_defaults: &StyleDefaults, options: &ResolveOptions) -> ResolvedStyle {
    let mut properties = framework_defaults();

    if options.is_editor {
        properties.extend(editor_defaults());
    }

    properties.extend(type_defaults.iter().map(|(k, v)| (k.clone(), v.clone())));

    for (property, declarations) in style.iter() {
        if let Some(winner) = declarations.iter().rev().find(|d| options.matches(d)) {
            properties.insert(property.to_string(), winner.value.clone());
        }
    }

    ResolvedStyle { properties }
}

/// `fontSize` → `font-size`; names already in kebab-case pass through
pub fn css_property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading_defaults() -> StyleDefaults {
        BTreeMap::from([("fontSize".to_string(), "2rem".to_string())])
    }

    #[test]
    fn test_falls_back_to_type_then_framework_defaults() {
        let resolved = resolve(&StyleMap::new(), &heading_defaults(), &ResolveOptions::reader());
        assert_eq!(resolved.get("fontSize"), Some("2rem"));
        assert_eq!(resolved.get("display"), Some("block"));
        assert_eq!(resolved.get("color"), None);
    }

    #[test]
    fn test_last_matching_declaration_wins() {
        let mut style = StyleMap::new();
        style.push("color", StyleDeclaration::new("red"));
        style.push("color", StyleDeclaration::new("blue"));
        style.push("color", StyleDeclaration::new("green").at(Breakpoint::Lg));

        let mobile = resolve(&style, &StyleDefaults::new(), &ResolveOptions::reader());
        assert_eq!(mobile.get("color"), Some("blue"));

        let desktop = resolve(
            &style,
            &StyleDefaults::new(),
            &ResolveOptions::reader().at(Some(Breakpoint::Xl)),
        );
        assert_eq!(desktop.get("color"), Some("green"));

        let tablet = resolve(
            &style,
            &StyleDefaults::new(),
            &ResolveOptions::reader().at(Some(Breakpoint::Md)),
        );
        assert_eq!(tablet.get("color"), Some("blue"));
    }

    #[test]
    fn test_state_declarations_need_active_state() {
        let mut style = StyleMap::new().with("color", "black");
        style.push("color", StyleDeclaration::new("red").on(StyleState::Hover));

        let idle = resolve(&style, &StyleDefaults::new(), &ResolveOptions::reader());
        assert_eq!(idle.get("color"), Some("black"));

        let hovered = ResolveOptions {
            state: Some(StyleState::Hover),
            ..ResolveOptions::reader()
        };
        assert_eq!(resolve(&style, &StyleDefaults::new(), &hovered).get("color"), Some("red"));
    }

    #[test]
    fn test_editor_adds_outline_but_declared_wins() {
        let style = StyleMap::new().with("outline", "none");
        let plain = resolve(&StyleMap::new(), &StyleDefaults::new(), &ResolveOptions::editor());
        assert!(plain.get("outline").is_some());

        let declared = resolve(&style, &StyleDefaults::new(), &ResolveOptions::editor());
        assert_eq!(declared.get("outline"), Some("none"));

        let reader = resolve(&StyleMap::new(), &StyleDefaults::new(), &ResolveOptions::reader());
        assert_eq!(reader.get("outline"), None);
    }

    #[test]
    fn test_inline_css() {
        let style = StyleMap::new().with("fontSize", "12px");
        let resolved = resolve(&style, &StyleDefaults::new(), &ResolveOptions::reader());
        assert_eq!(resolved.to_inline_css(), "display: block; font-size: 12px");
    }
}
