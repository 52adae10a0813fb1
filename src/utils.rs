use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use url::Url;

const ELLIPSIS: &str = "...";

/// Shortens `s` to `max_width` terminal columns, ellipsis included, cutting
/// only on character boundaries. Widths below the ellipsis yield the bare
/// ellipsis.
pub fn clip_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let kept: String = s
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(1);
            used <= budget
        })
        .collect();

    format!("{kept}{ELLIPSIS}")
}

/// The label shown under a preview: the link's hostname, or the raw link
/// when it has none.
pub fn link_label(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| link.to_string())
}
