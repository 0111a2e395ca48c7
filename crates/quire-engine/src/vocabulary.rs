//! Reserved attribute names and style values shared by the parser and the
//! renderer.

use crate::models::Severity;

/// Carries a node's [`BlockId`](crate::models::BlockId).
pub const BLOCK_ID_ATTR: &str = "data-block-id";

/// `data-meta-<key>="string"`
pub const META_PREFIX: &str = "data-meta-";

/// `data-metajson-<key>="<json>"` for non-string metadata values.
pub const META_JSON_PREFIX: &str = "data-metajson-";

/// Explicit callout marker, `data-callout="warning"`.
pub const CALLOUT_ATTR: &str = "data-callout";

/// Marks a layout table, `data-layout="true"`.
pub const LAYOUT_ATTR: &str = "data-layout";

/// Class of the label element inside a rendered callout.
pub const CALLOUT_LABEL_CLASS: &str = "callout-label";

/// Class and attribute of a comment mark.
pub const COMMENT_CLASS: &str = "comment";
pub const COMMENT_ATTR: &str = "data-comment";

/// Background color a callout of `severity` is rendered with.
pub fn callout_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "#fff3cd",
        Severity::Safety => "#f8d7da",
        Severity::Info => "#d1ecf1",
    }
}

pub fn callout_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "\u{26a0} Warning",
        Severity::Safety => "\u{26d1} Safety",
        Severity::Info => "\u{2139} Info",
    }
}

/// Whether `key` can be written as part of an attribute name.
pub fn is_metadata_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
