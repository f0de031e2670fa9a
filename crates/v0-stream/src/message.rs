//! Projection of a content snapshot into typed message elements.
//!
//! A snapshot is a list of `[kind, payload]` nodes. Kind `0` holds a list
//! of items, each either a text string or a markup-style element
//! `[tag, props, ...children]`. Element keys are derived only from position,
//! so re-projecting a growing snapshot keeps the keys of unchanged items.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use v0_stream_value::Doc;

use crate::content_part::ContentPart;

pub const DEFAULT_MESSAGE_ID: &str = "message";
pub const CONTAINER_KIND: f64 = 0.0;
pub const CONTENT_PART_TAG: &str = "AssistantMessageContentPart";
pub const CODE_BLOCK_TAG: &str = "Codeblock";
pub const TEXT_TAG: &str = "text";
/// `data` of every container element.
pub const CONTAINER_DATA: &str = "elements";

// ── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageElement {
    Text {
        key: String,
        data: String,
    },
    Html {
        key: String,
        data: HtmlData,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        children: Option<Vec<MessageElement>>,
    },
    Component {
        key: String,
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        children: Option<Vec<MessageElement>>,
    },
    ContentPart {
        key: String,
        data: ContentPartData,
    },
    CodeBlock {
        key: String,
        data: CodeBlockData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlData {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Doc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPartData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<Doc>,
    /// Set on the last content part of its container.
    pub is_last_content_part: bool,
}

impl ContentPartData {
    pub fn typed_part(&self) -> Option<ContentPart> {
        self.part.as_ref().and_then(ContentPart::from_doc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlockData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub elements: Vec<MessageElement>,
}

impl MessageElement {
    pub fn key(&self) -> &str {
        match self {
            MessageElement::Text { key, .. }
            | MessageElement::Html { key, .. }
            | MessageElement::Component { key, .. }
            | MessageElement::ContentPart { key, .. }
            | MessageElement::CodeBlock { key, .. } => key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MessageElement::Text { .. } => "text",
            MessageElement::Html { .. } => "html",
            MessageElement::Component { .. } => "component",
            MessageElement::ContentPart { .. } => "content-part",
            MessageElement::CodeBlock { .. } => "code-block",
        }
    }

    pub fn children(&self) -> &[MessageElement] {
        match self {
            MessageElement::Html { children: Some(children), .. }
            | MessageElement::Component { children: Some(children), .. } => children.as_slice(),
            _ => &[],
        }
    }
}

impl ParsedMessage {
    /// Every element, depth-first.
    pub fn walk(&self) -> Walker<'_> {
        Walker { stack: self.elements.iter().rev().collect() }
    }
}

// ── Walker ─────────────────────────────────────────────────────────────────

/// Pre-order iterator over an element tree.
pub struct Walker<'a> {
    stack: Vec<&'a MessageElement>,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a MessageElement) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = &'a MessageElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children().iter().rev());
        Some(element)
    }
}

// ── Projection ─────────────────────────────────────────────────────────────

/// Projects `content` into elements keyed under `message_id`.
pub fn parse_message(content: &Doc, message_id: &str) -> ParsedMessage {
    let Some(nodes) = content.as_array() else {
        warn!(kind = content.kind_name(), "message content is not an array");
        return ParsedMessage::default();
    };
    let elements = nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| process_node(node, &format!("{message_id}-{index}")))
        .collect();
    ParsedMessage { elements }
}

fn process_node(node: &Doc, key: &str) -> Option<MessageElement> {
    let Some([kind, payload, ..]) = node.as_array() else {
        debug!(key, "skipping malformed top-level node");
        return None;
    };
    if kind.as_f64() != Some(CONTAINER_KIND) {
        return None;
    }
    process_container(payload, key)
}

fn process_container(items: &Doc, key: &str) -> Option<MessageElement> {
    let items = items.as_array()?;
    let last_content_part = items.iter().rposition(is_content_part);
    let children: Vec<_> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            process_element(item, format!("{key}-{index}"), Some(index) == last_content_part)
        })
        .collect();
    Some(MessageElement::Component {
        key: key.to_string(),
        data: CONTAINER_DATA.to_string(),
        children: non_empty(children),
    })
}

fn is_content_part(item: &Doc) -> bool {
    item.get_index(0).and_then(Doc::as_str) == Some(CONTENT_PART_TAG)
}

fn process_element(value: &Doc, key: String, is_last: bool) -> Option<MessageElement> {
    if let Some(text) = value.as_str() {
        return Some(MessageElement::Text { key, data: text.to_string() });
    }
    let parts = value.as_array()?;
    let (tag, rest) = parts.split_first()?;
    let tag_name = tag_name(tag)?;
    let props = rest.first();
    let children = rest.get(1..).unwrap_or_default();

    let element = match tag_name.as_str() {
        CONTENT_PART_TAG => MessageElement::ContentPart {
            key,
            data: ContentPartData {
                part: props.and_then(|props| props.get_key("part")).cloned(),
                is_last_content_part: is_last,
            },
        },
        CODE_BLOCK_TAG => MessageElement::CodeBlock {
            key,
            data: CodeBlockData {
                language: props
                    .and_then(|props| props.get_key("lang"))
                    .and_then(Doc::as_str)
                    .map(str::to_string),
                code: first_text(children),
            },
        },
        TEXT_TAG => MessageElement::Text { key, data: first_text(children) },
        _ => {
            let projected: Vec<_> = children
                .iter()
                .enumerate()
                .filter_map(|(index, child)| process_element(child, format!("{key}-child-{index}"), is_last))
                .collect();
            MessageElement::Html {
                key,
                data: HtmlData { tag_name, props: props.cloned() },
                children: non_empty(projected),
            }
        }
    };
    Some(element)
}

/// Strings and non-zero numbers name a tag; anything else drops the element.
fn tag_name(tag: &Doc) -> Option<String> {
    match tag {
        Doc::String(_) | Doc::Number(_) if !tag.is_truthy() => None,
        Doc::String(name) => Some(name.to_string()),
        Doc::Number(n) => Some(n.to_string()),
        other => {
            debug!(kind = other.kind_name(), "skipping element with unsupported tag");
            None
        }
    }
}

fn first_text(children: &[Doc]) -> String {
    children.first().and_then(Doc::as_str).unwrap_or_default().to_string()
}

fn non_empty(elements: Vec<MessageElement>) -> Option<Vec<MessageElement>> {
    (!elements.is_empty()).then_some(elements)
}
