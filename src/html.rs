//! HTML projection of a [`BlockView`].

use crate::view::{BlockView, Content, PreviewCard};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const CONTAINER: &str = "link-tool";
pub const CONTAINER_ERROR: &str = "link-tool--error";
pub const LINK_CONTENT: &str = "link-tool__content";
pub const LINK_CONTENT_RENDERED: &str = "link-tool__content--rendered";
pub const LINK_IMAGE: &str = "link-tool__image";
pub const LINK_TITLE: &str = "link-tool__title";
pub const LINK_DESCRIPTION: &str = "link-tool__description";
pub const LINK_TEXT: &str = "link-tool__anchor";
pub const CANCEL_BUTTON: &str = "link-tool__cancel-button";
pub const PRELOADER: &str = "link-tool__preloader";
pub const PRELOADER_URL: &str = "link-tool__preloader-url";
pub const PRELOADER_ACTIVE: &str = "link-tool__preloader--active";

const EXTERNAL_REL: &str = "nofollow noindex noreferrer";

enum Node {
    Element(Element),
    Text(String),
}

struct Element {
    tag: &'static str,
    classes: Vec<String>,
    attributes: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

/// Creates an element with the given classes; empty class names are skipped.
fn make(tag: &'static str, classes: &[&str]) -> Element {
    Element {
        tag,
        classes: classes
            .iter()
            .filter(|class| !class.is_empty())
            .map(|class| class.to_string())
            .collect(),
        attributes: Vec::new(),
        children: Vec::new(),
    }
}

impl Element {
    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&encode_double_quoted_attribute(&self.classes.join(" ")));
            out.push('"');
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(out),
                Node::Text(text) => out.push_str(&encode_text(text)),
            }
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

fn external_link(classes: &[&str], href: &str) -> Element {
    make("a", classes)
        .attr("href", href)
        .attr("target", "_blank")
        .attr("rel", EXTERNAL_REL)
}

/// Quoted CSS `url()` value. The image URL comes from the endpoint, so it
/// must not be able to close the string or the function.
fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 7);
    out.push_str("url(\"");
    for c in url.chars() {
        match c {
            '\\' | '"' | ')' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            '\r' | '\x0c' => {}
            c => out.push(c),
        }
    }
    out.push_str("\")");
    out
}

fn preview_card(card: &PreviewCard) -> Element {
    let mut holder = external_link(&[LINK_CONTENT, LINK_CONTENT_RENDERED], &card.href);

    if let Some(image_url) = &card.image_url {
        holder = holder.child(
            make("div", &[LINK_IMAGE])
                .attr("style", format!("background-image: {}", css_url(image_url))),
        );
    }
    if let Some(title) = &card.title {
        holder = holder.child(make("div", &[LINK_TITLE]).text(title));
    }
    if let Some(description) = &card.description {
        holder = holder.child(make("p", &[LINK_DESCRIPTION]).text(description));
    }
    holder = holder.child(make("span", &[LINK_TEXT]).text(&card.label));
    if card.cancellable {
        holder = holder.child(make("div", &[CANCEL_BUTTON]));
    }
    holder
}

/// Renders the block wrapper, content and preloader.
pub fn render_html(view: &BlockView, base_class: &str) -> String {
    let container_classes: &[&str] = if view.errored {
        &[CONTAINER, CONTAINER_ERROR]
    } else {
        &[CONTAINER]
    };
    let mut container = make("div", container_classes);

    match &view.content {
        Content::Empty => {}
        Content::BareLink(anchor) => {
            container = container.child(external_link(&[], &anchor.href).text(&anchor.text));
        }
        Content::Preview(card) => {
            container = container.child(preview_card(card));
        }
    }

    let preloader_classes: &[&str] = if view.loader.active {
        &[PRELOADER, PRELOADER_ACTIVE]
    } else {
        &[PRELOADER]
    };
    container = container.child(
        make("div", preloader_classes).child(make("div", &[PRELOADER_URL]).text(&view.loader.url)),
    );

    let mut out = String::new();
    make("div", &[base_class]).child(container).write(&mut out);
    out
}
