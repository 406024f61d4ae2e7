use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Block types known to the engine.
///
/// Stored documents carry the type as a string; anything not listed here is
/// kept as [`BlockKind::Unknown`] so it can be reported and skipped instead
/// of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    PageLayout,
    Container,
    Columns,
    Column,
    Heading,
    Text,
    InlineText,
    Image,
    Button,
    Link,
    Spacer,
    Accordion,
    AccordionItem,
    ForeachContainer,
    ConditionalContainer,
    Redirect,
    CustomHtml,
    Form,
    Unknown(String),
}

impl BlockKind {
    /// Every built-in kind
    pub const BUILTIN: [BlockKind; 18] = [
        BlockKind::PageLayout,
        BlockKind::Container,
        BlockKind::Columns,
        BlockKind::Column,
        BlockKind::Heading,
        BlockKind::Text,
        BlockKind::InlineText,
        BlockKind::Image,
        BlockKind::Button,
        BlockKind::Link,
        BlockKind::Spacer,
        BlockKind::Accordion,
        BlockKind::AccordionItem,
        BlockKind::ForeachContainer,
        BlockKind::ConditionalContainer,
        BlockKind::Redirect,
        BlockKind::CustomHtml,
        BlockKind::Form,
    ];

    pub fn parse(name: &str) -> Self {
        match name {
            "PageLayout" => BlockKind::PageLayout,
            "Container" => BlockKind::Container,
            "Columns" => BlockKind::Columns,
            "Column" => BlockKind::Column,
            "Heading" => BlockKind::Heading,
            "Text" => BlockKind::Text,
            "InlineText" => BlockKind::InlineText,
            "Image" => BlockKind::Image,
            "Button" => BlockKind::Button,
            "Link" => BlockKind::Link,
            "Spacer" => BlockKind::Spacer,
            "Accordion" => BlockKind::Accordion,
            "AccordionItem" => BlockKind::AccordionItem,
            "ForeachContainer" => BlockKind::ForeachContainer,
            "ConditionalContainer" => BlockKind::ConditionalContainer,
            "Redirect" => BlockKind::Redirect,
            "CustomHTML" => BlockKind::CustomHtml,
            "Form" => BlockKind::Form,
            other => BlockKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::PageLayout => "PageLayout",
            BlockKind::Container => "Container",
            BlockKind::Columns => "Columns",
            BlockKind::Column => "Column",
            BlockKind::Heading => "Heading",
            BlockKind::Text => "Text",
            BlockKind::InlineText => "InlineText",
            BlockKind::Image => "Image",
            BlockKind::Button => "Button",
            BlockKind::Link => "Link",
            BlockKind::Spacer => "Spacer",
            BlockKind::Accordion => "Accordion",
            BlockKind::AccordionItem => "AccordionItem",
            BlockKind::ForeachContainer => "ForeachContainer",
            BlockKind::ConditionalContainer => "ConditionalContainer",
            BlockKind::Redirect => "Redirect",
            BlockKind::CustomHtml => "CustomHTML",
            BlockKind::Form => "Form",
            BlockKind::Unknown(name) => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, BlockKind::Unknown(_))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for BlockKind {
    fn from(name: &str) -> Self {
        BlockKind::parse(name)
    }
}

impl Serialize for BlockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(BlockKind::parse(&name))
    }
}
