//! Document rendering: AST → HTML fragment.
//!
//! This is the heart of the build. [`render`] walks a [`Document`] and emits
//! an HTML fragment, with two node kinds rendered specially:
//!
//! - **Headings** get a date stamp (level 1, when the context carries a
//!   publication date) and an anchor link to their enclosing section's id
//!   (level 2+, when the section has one). The level-1 heading also yields
//!   the document title, extracted as plain text.
//! - **Images** with a `video` class token become inline `<video>` embeds —
//!   looping and muted when `loop` is also present, otherwise with visible
//!   controls. An embed without a destination fails the whole document.
//!
//! Every other node kind renders structurally: one element per kind,
//! attributes serialized in order, children recursive, text escaped exactly
//! once at emission. The assembled fragment is returned as [`maud::Markup`],
//! the crate-wide "already escaped" string type; the extracted title rides
//! along in [`Rendered`] rather than being written into the context.
//!
//! Rendering is deterministic and pure: same document and context in, same
//! bytes out.

use crate::markup::{Attributes, Document, Node};
use crate::templates;
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use maud::{Markup, PreEscaped};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("video embed is missing a destination")]
    MissingDestination,
}

/// Per-document render input. `date` drives the stamp next to the title;
/// `summary` is threaded through to page metadata by the caller.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub date: Option<NaiveDate>,
    pub summary: Option<String>,
}

/// Result of one render: the HTML fragment and the title derived from the
/// document's level-1 heading, if it has one.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: Markup,
    pub title: Option<String>,
}

/// Render a document to an HTML fragment.
pub fn render(document: &Document, context: &RenderContext) -> Result<Rendered, RenderError> {
    let mut renderer = HtmlRenderer {
        out: String::with_capacity(4096),
        sections: Vec::new(),
        title: None,
        context,
    };
    for node in &document.children {
        renderer.node(node)?;
    }
    Ok(Rendered {
        html: PreEscaped(renderer.out),
        title: renderer.title,
    })
}

/// Plain-text contents of a subtree, in document order: literal text of
/// text-bearing leaves, one newline per soft or hard break, recursion into
/// children. Attribute values and destinations contribute nothing.
pub fn extract_text(node: &Node) -> String {
    let mut buffer = String::new();
    collect_text(node, &mut buffer);
    buffer
}

fn collect_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(text) | Node::Code(text) => buffer.push_str(text),
        Node::CodeBlock { text, .. } => buffer.push_str(text),
        Node::SoftBreak | Node::HardBreak => buffer.push('\n'),
        Node::Section { children, .. }
        | Node::Heading { children, .. }
        | Node::Paragraph { children }
        | Node::BlockQuote { children }
        | Node::List { children, .. }
        | Node::Item { children }
        | Node::Emphasis { children }
        | Node::Strong { children }
        | Node::Strikethrough { children }
        | Node::Link { children, .. }
        | Node::Image { children, .. } => {
            for child in children {
                collect_text(child, buffer);
            }
        }
        Node::Rule | Node::RawHtml(_) => {}
    }
}

struct HtmlRenderer<'a> {
    out: String,
    /// Open sectioning containers, innermost last. Headings at level 2+
    /// read the top entry's id for their anchor.
    sections: Vec<&'a Attributes>,
    title: Option<String>,
    context: &'a RenderContext,
}

impl<'a> HtmlRenderer<'a> {
    fn node(&mut self, node: &'a Node) -> Result<(), RenderError> {
        match node {
            Node::Section {
                attributes,
                children,
            } => {
                self.out.push_str("<section");
                self.out.push_str(&render_attributes(attributes));
                self.out.push_str(">\n");
                self.sections.push(attributes);
                self.children(children)?;
                self.sections.pop();
                self.out.push_str("</section>\n");
            }
            Node::Heading {
                level,
                attributes,
                children,
            } => self.heading(node, *level, attributes, children)?,
            Node::Paragraph { children } => {
                self.out.push_str("<p>");
                self.children(children)?;
                self.out.push_str("</p>\n");
            }
            Node::BlockQuote { children } => {
                self.out.push_str("<blockquote>\n");
                self.children(children)?;
                self.out.push_str("</blockquote>\n");
            }
            Node::List {
                start: None,
                children,
            } => {
                self.out.push_str("<ul>\n");
                self.children(children)?;
                self.out.push_str("</ul>\n");
            }
            Node::List {
                start: Some(start),
                children,
            } => {
                if *start == 1 {
                    self.out.push_str("<ol>\n");
                } else {
                    self.out.push_str(&format!("<ol start=\"{start}\">\n"));
                }
                self.children(children)?;
                self.out.push_str("</ol>\n");
            }
            Node::Item { children } => {
                self.out.push_str("<li>");
                self.children(children)?;
                self.out.push_str("</li>\n");
            }
            Node::CodeBlock { language, text } => {
                match language {
                    Some(language) => self.out.push_str(&format!(
                        "<pre><code class=\"language-{}\">",
                        encode_double_quoted_attribute(language)
                    )),
                    None => self.out.push_str("<pre><code>"),
                }
                self.out.push_str(&encode_text(text));
                self.out.push_str("</code></pre>\n");
            }
            Node::Emphasis { children } => {
                self.out.push_str("<em>");
                self.children(children)?;
                self.out.push_str("</em>");
            }
            Node::Strong { children } => {
                self.out.push_str("<strong>");
                self.children(children)?;
                self.out.push_str("</strong>");
            }
            Node::Strikethrough { children } => {
                self.out.push_str("<s>");
                self.children(children)?;
                self.out.push_str("</s>");
            }
            Node::Link {
                destination,
                attributes,
                children,
            } => {
                self.out.push_str(&format!(
                    "<a href=\"{}\"{}>",
                    encode_double_quoted_attribute(destination),
                    render_attributes(attributes)
                ));
                self.children(children)?;
                self.out.push_str("</a>");
            }
            Node::Image {
                destination,
                attributes,
                children,
            } => self.image(destination, attributes, children)?,
            Node::Code(code) => {
                self.out.push_str("<code>");
                self.out.push_str(&encode_text(code));
                self.out.push_str("</code>");
            }
            Node::Text(text) => self.out.push_str(&encode_text(text)),
            Node::SoftBreak => self.out.push('\n'),
            Node::HardBreak => self.out.push_str("<br>\n"),
            Node::Rule => self.out.push_str("<hr>\n"),
            Node::RawHtml(html) => self.out.push_str(html),
        }
        Ok(())
    }

    fn children(&mut self, children: &'a [Node]) -> Result<(), RenderError> {
        for child in children {
            self.node(child)?;
        }
        Ok(())
    }

    /// Render children into a detached fragment, leaving `self.out` intact.
    fn children_fragment(&mut self, children: &'a [Node]) -> Result<String, RenderError> {
        let saved = std::mem::take(&mut self.out);
        let result = self.children(children);
        let fragment = std::mem::replace(&mut self.out, saved);
        result.map(|()| fragment)
    }

    fn heading(
        &mut self,
        node: &'a Node,
        level: u8,
        attributes: &Attributes,
        children: &'a [Node],
    ) -> Result<(), RenderError> {
        let date = match (level, self.context.date) {
            (1, Some(date)) => templates::time(date, Some("meta")).into_string(),
            _ => String::new(),
        };
        let rendered_children = self.children_fragment(children)?;
        if level == 1 {
            // Last level-1 heading wins; documents are expected to have one.
            self.title = Some(extract_text(node));
        }

        let section_id = if level > 1 {
            self.sections.last().and_then(|section| section.get("id"))
        } else {
            None
        };
        let attrs = render_attributes(attributes);

        match section_id {
            Some(id) => self.out.push_str(&format!(
                "\n<h{level}{attrs}><a href=\"#{}\">{rendered_children} {date}</a></h{level}>\n",
                encode_double_quoted_attribute(id)
            )),
            None => self.out.push_str(&format!(
                "\n<div class=\"title\"><h{level}{attrs}>{rendered_children} </h{level}>{date}</div>\n"
            )),
        }
        Ok(())
    }

    fn image(
        &mut self,
        destination: &str,
        attributes: &Attributes,
        children: &'a [Node],
    ) -> Result<(), RenderError> {
        if attributes.has_class("video") {
            if destination.is_empty() {
                return Err(RenderError::MissingDestination);
            }
            let src = encode_double_quoted_attribute(destination);
            if attributes.has_class("loop") {
                self.out.push_str(&format!(
                    "<video src=\"{src}\" autoplay muted=true loop=true></video>"
                ));
            } else {
                self.out
                    .push_str(&format!("<video src=\"{src}\" controls muted=true></video>"));
            }
            return Ok(());
        }

        // Structural default: alt text is the plain text of the children.
        let alt: String = children.iter().map(extract_text).collect();
        self.out.push_str(&format!(
            "<img{} alt=\"{}\" src=\"{}\">",
            render_attributes(attributes),
            encode_double_quoted_attribute(&alt),
            encode_double_quoted_attribute(destination)
        ));
        Ok(())
    }
}

/// Serialize attributes as ` key="value"` pairs, in order, values escaped.
fn render_attributes(attributes: &Attributes) -> String {
    let mut out = String::new();
    for (name, value) in attributes.iter() {
        out.push_str(&format!(
            " {name}=\"{}\"",
            encode_double_quoted_attribute(value)
        ));
    }
    out
}
