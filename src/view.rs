//! What a block looks like, independent of any UI toolkit.
//!
//! A [`BlockView`] is a plain value computed from block state; presentation
//! layers such as [`crate::html`] turn it into concrete markup.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockView {
    pub content: Content,
    pub loader: Loader,
    /// Set after a failed fetch until the next paste.
    pub errored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Empty,
    BareLink(Anchor),
    Preview(PreviewCard),
}

/// A plain link whose visible text equals its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewCard {
    pub href: String,
    pub image_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Hostname of `href`, or `href` itself when it does not parse.
    pub label: String,
    pub cancellable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Loader {
    pub active: bool,
    pub url: String,
}

impl BlockView {
    pub fn preview(&self) -> Option<&PreviewCard> {
        match &self.content {
            Content::Preview(card) => Some(card),
            _ => None,
        }
    }

    pub fn bare_link(&self) -> Option<&Anchor> {
        match &self.content {
            Content::BareLink(anchor) => Some(anchor),
            _ => None,
        }
    }
}
