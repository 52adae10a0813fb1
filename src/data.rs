use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata resolved for a link. Every facet is optional; a missing facet is
/// simply not rendered.
///
/// Keys the backend sends beyond the known facets are kept in `extra` so the
/// saved block round-trips exactly what was received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MetaImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LinkMeta {
    /// True when the record has no keys at all, known or unknown.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.extra.is_empty()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|image| image.url.as_deref())
    }
}

/// The persisted block state: `{link, meta}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub meta: LinkMeta,
}

/// A partial update, also the shape of saved data handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialBlockData {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub meta: Option<LinkMeta>,
}

impl PartialBlockData {
    pub fn link(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            meta: None,
        }
    }

    pub fn meta(meta: LinkMeta) -> Self {
        Self {
            link: None,
            meta: Some(meta),
        }
    }
}

impl BlockData {
    pub fn from_saved(saved: PartialBlockData) -> Self {
        let mut data = Self::default();
        data.merge(saved);
        data
    }

    /// Applies a partial update. Fields absent from `update` keep their value;
    /// an empty `link` counts as absent.
    pub fn merge(&mut self, update: PartialBlockData) {
        if let Some(link) = update.link.filter(|link| !link.is_empty()) {
            self.link = link;
        }
        if let Some(meta) = update.meta {
            self.meta = meta;
        }
    }

    pub fn has_link(&self) -> bool {
        !self.link.trim().is_empty()
    }
}
