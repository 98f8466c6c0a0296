//! Markdown parsing into a document tree.
//!
//! The renderer operates on a small AST rather than on the raw event stream:
//! every node has a kind, ordered attributes, and either children or literal
//! text. [`parse`] folds the pulldown-cmark events into that tree and applies
//! two construction rules of our own:
//!
//! - **Sections**: each heading opens a [`Node::Section`] that carries an id —
//!   the heading's explicit `{#id}` attribute when present, otherwise a slug
//!   of the heading text, deduplicated document-wide (`faq`, `faq-1`, …).
//!   A heading closes every open section of equal or lower level first, so
//!   sections nest the way the headings outline does. Heading anchors link to
//!   these ids.
//! - **Image attributes**: a text run immediately following an image that
//!   starts with an attribute block (`{.video .loop}`, `{#id key=val}`) is
//!   consumed and attached to the image node. This is how content marks an
//!   image as a video embed.
//!
//! Parsing never fails: anything the builder does not understand degrades to
//! plain text or is dropped, it does not error.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// A parsed document: the sequence of top-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

/// Ordered `name="value"` pairs attached to a node.
///
/// Order is preserved so rendering is deterministic. Lookups are linear —
/// nodes carry a handful of attributes at most.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the space-separated `class` attribute contains `cls` as a token.
    pub fn has_class(&self, cls: &str) -> bool {
        self.get("class")
            .map(|classes| classes.split(' ').any(|c| c == cls))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// One node of the document tree.
///
/// Container variants carry children; leaf variants carry literal text.
/// `RawHtml` is emitted verbatim by the renderer — it is the one kind whose
/// text is treated as already safe.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Section {
        attributes: Attributes,
        children: Vec<Node>,
    },
    Heading {
        level: u8,
        attributes: Attributes,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    BlockQuote {
        children: Vec<Node>,
    },
    List {
        start: Option<u64>,
        children: Vec<Node>,
    },
    Item {
        children: Vec<Node>,
    },
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Strikethrough {
        children: Vec<Node>,
    },
    Link {
        destination: String,
        attributes: Attributes,
        children: Vec<Node>,
    },
    Image {
        destination: String,
        attributes: Attributes,
        children: Vec<Node>,
    },
    Code(String),
    Text(String),
    SoftBreak,
    HardBreak,
    Rule,
    RawHtml(String),
}

/// Parse markdown source into a [`Document`].
pub fn parse(source: &str) -> Document {
    let options = Options::ENABLE_HEADING_ATTRIBUTES | Options::ENABLE_STRIKETHROUGH;
    let mut builder = Builder::new();
    for event in Parser::new_ext(source, options) {
        builder.event(event);
    }
    builder.finish()
}

/// An open container on the builder stack.
struct Frame {
    pending: Pending,
    children: Vec<Node>,
}

enum Pending {
    Section {
        level: u8,
        explicit_id: Option<String>,
        attributes: Attributes,
    },
    Heading {
        level: u8,
        attributes: Attributes,
    },
    Paragraph,
    BlockQuote,
    List {
        start: Option<u64>,
    },
    Item,
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        destination: String,
    },
    Image {
        destination: String,
    },
}

struct Builder {
    root: Vec<Node>,
    frames: Vec<Frame>,
    /// Seen section slugs → occurrence count, for `faq-1` style dedup.
    slugs: HashMap<String, usize>,
    /// Set when the previous event closed an image, so a following text run
    /// can be checked for an attribute block.
    after_image: bool,
}

impl Builder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            frames: Vec::new(),
            slugs: HashMap::new(),
            after_image: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        let was_after_image = self.after_image;
        self.after_image = false;

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text, was_after_image),
            Event::Code(code) => self.push_node(Node::Code(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_node(Node::RawHtml(html.into_string()));
            }
            Event::SoftBreak => self.push_node(Node::SoftBreak),
            Event::HardBreak => self.push_node(Node::HardBreak),
            Event::Rule => self.push_node(Node::Rule),
            // Footnotes, math, and task lists are not part of the format.
            Event::FootnoteReference(_)
            | Event::TaskListMarker(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let pending = match tag {
            Tag::Paragraph => Pending::Paragraph,
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let level = heading_level_to_num(level);
                self.close_sections(level);

                // The explicit id belongs to the section the heading opens;
                // classes and free-form attributes stay on the heading itself.
                let mut attributes = Attributes::new();
                if !classes.is_empty() {
                    let joined = classes
                        .iter()
                        .map(|c| c.as_ref())
                        .collect::<Vec<_>>()
                        .join(" ");
                    attributes.push("class", joined);
                }
                for (name, value) in attrs {
                    attributes.push(
                        name.into_string(),
                        value.map(|v| v.into_string()).unwrap_or_default(),
                    );
                }

                self.frames.push(Frame {
                    pending: Pending::Section {
                        level,
                        explicit_id: id.map(|i| i.into_string()),
                        attributes: Attributes::new(),
                    },
                    children: Vec::new(),
                });
                Pending::Heading { level, attributes }
            }
            Tag::BlockQuote(_) => Pending::BlockQuote,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => info
                        .split_whitespace()
                        .next()
                        .map(|lang| lang.to_string()),
                    _ => None,
                };
                Pending::CodeBlock {
                    language,
                    text: String::new(),
                }
            }
            Tag::List(start) => Pending::List { start },
            Tag::Item => Pending::Item,
            Tag::Emphasis => Pending::Emphasis,
            Tag::Strong => Pending::Strong,
            Tag::Strikethrough => Pending::Strikethrough,
            Tag::Link { dest_url, .. } => Pending::Link {
                destination: dest_url.into_string(),
            },
            Tag::Image { dest_url, .. } => Pending::Image {
                destination: dest_url.into_string(),
            },
            // HTML blocks contribute their content as raw events; the
            // remaining tags are behind options we do not enable.
            _ => return,
        };
        self.frames.push(Frame {
            pending,
            children: Vec::new(),
        });
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => {}
            _ => return,
        }

        // Sections have no End event of their own; any still open on top of
        // the stack were opened inside the ending container and close with
        // it. (For a heading end the top frame is the heading, so this is a
        // no-op there.)
        self.close_sections(0);

        let Some(frame) = self.frames.pop() else {
            return;
        };
        let node = match frame.pending {
            // Sections are only closed via close_sections/finish; an End
            // event never lands here because headings close first.
            Pending::Section { attributes, .. } => Node::Section {
                attributes,
                children: frame.children,
            },
            Pending::Heading { level, attributes } => {
                self.assign_section_id(&frame.children);
                Node::Heading {
                    level,
                    attributes,
                    children: frame.children,
                }
            }
            Pending::Paragraph => Node::Paragraph {
                children: frame.children,
            },
            Pending::BlockQuote => Node::BlockQuote {
                children: frame.children,
            },
            Pending::List { start } => Node::List {
                start,
                children: frame.children,
            },
            Pending::Item => Node::Item {
                children: frame.children,
            },
            Pending::CodeBlock { language, text } => Node::CodeBlock { language, text },
            Pending::Emphasis => Node::Emphasis {
                children: frame.children,
            },
            Pending::Strong => Node::Strong {
                children: frame.children,
            },
            Pending::Strikethrough => Node::Strikethrough {
                children: frame.children,
            },
            Pending::Link { destination } => Node::Link {
                destination,
                attributes: Attributes::new(),
                children: frame.children,
            },
            Pending::Image { destination } => {
                self.after_image = true;
                Node::Image {
                    destination,
                    attributes: Attributes::new(),
                    children: frame.children,
                }
            }
        };
        self.push_node(node);
    }

    fn text(&mut self, text: &str, was_after_image: bool) {
        // Code block contents accumulate into the block's literal text.
        if let Some(Frame {
            pending: Pending::CodeBlock { text: buffer, .. },
            ..
        }) = self.frames.last_mut()
        {
            buffer.push_str(text);
            return;
        }

        if was_after_image && text.starts_with('{') {
            if let Some((attributes, consumed)) = parse_attribute_block(text) {
                if let Some(Node::Image {
                    attributes: image_attributes,
                    ..
                }) = self.current_children().last_mut()
                {
                    *image_attributes = attributes;
                    let rest = &text[consumed..];
                    if !rest.is_empty() {
                        self.push_node(Node::Text(rest.to_string()));
                    }
                    return;
                }
            }
        }

        self.push_node(Node::Text(text.to_string()));
    }

    /// Finish the heading whose children are `heading_children` by giving its
    /// enclosing section an id: the explicit `{#id}` if one was written, else
    /// a deduplicated slug of the heading text. Empty slugs leave the section
    /// without an id and the heading renders unanchored.
    fn assign_section_id(&mut self, heading_children: &[Node]) {
        let explicit = match self.frames.last_mut() {
            Some(Frame {
                pending: Pending::Section { explicit_id, .. },
                ..
            }) => explicit_id.take(),
            _ => return,
        };

        let base = explicit.unwrap_or_else(|| {
            let text: String = heading_children.iter().map(plain_text).collect();
            slugify(&text)
        });
        if base.is_empty() {
            return;
        }
        let count = self.slugs.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;

        if let Some(Frame {
            pending: Pending::Section { attributes, .. },
            ..
        }) = self.frames.last_mut()
        {
            attributes.push("id", id);
        }
    }

    /// Close every open section of level >= `level`, folding each into its
    /// parent. Called before a new heading opens its own section.
    fn close_sections(&mut self, level: u8) {
        while let Some(Frame {
            pending: Pending::Section {
                level: open_level, ..
            },
            ..
        }) = self.frames.last()
        {
            if *open_level < level {
                break;
            }
            let Some(frame) = self.frames.pop() else {
                break;
            };
            if let Pending::Section { attributes, .. } = frame.pending {
                self.push_node(Node::Section {
                    attributes,
                    children: frame.children,
                });
            }
        }
    }

    fn finish(mut self) -> Document {
        self.close_sections(0);
        Document {
            children: self.root,
        }
    }

    fn current_children(&mut self) -> &mut Vec<Node> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn push_node(&mut self, node: Node) {
        self.current_children().push(node);
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Literal text of a node subtree, used only for slug derivation. The
/// renderer has its own title-extraction walk with break handling; slugs
/// do not care about breaks.
fn plain_text(node: &Node) -> String {
    match node {
        Node::Text(text) | Node::Code(text) => text.clone(),
        Node::SoftBreak | Node::HardBreak => " ".to_string(),
        Node::Emphasis { children }
        | Node::Strong { children }
        | Node::Strikethrough { children }
        | Node::Link { children, .. } => children.iter().map(plain_text).collect(),
        _ => String::new(),
    }
}

/// Parse a leading `{...}` attribute block: `.name` adds a class token,
/// `#name` sets the id, `key=value` (optionally double-quoted) sets a pair.
/// Returns the attributes and the number of bytes consumed, or `None` when
/// the text is not a well-formed block.
fn parse_attribute_block(text: &str) -> Option<(Attributes, usize)> {
    let inner_end = text.find('}')?;
    let inner = &text[1..inner_end];

    let mut attributes = Attributes::new();
    let mut classes: Vec<&str> = Vec::new();
    let mut id = None;
    for token in inner.split_whitespace() {
        if let Some(class) = token.strip_prefix('.') {
            if !class.is_empty() {
                classes.push(class);
            }
        } else if let Some(name) = token.strip_prefix('#') {
            if !name.is_empty() {
                id = Some(name);
            }
        } else if let Some((key, value)) = token.split_once('=') {
            attributes.push(key, value.trim_matches('"'));
        } else {
            // Bare words make this something other than an attribute block.
            return None;
        }
    }

    let mut result = Attributes::new();
    if let Some(id) = id {
        result.push("id", id);
    }
    if !classes.is_empty() {
        result.push("class", classes.join(" "));
    }
    for (name, value) in attributes.iter() {
        result.push(name, value);
    }
    Some((result, inner_end + 1))
}

/// Lowercased alphanumeric runs joined by single dashes.
fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}
