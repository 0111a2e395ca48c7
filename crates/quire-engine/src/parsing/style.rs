//! Best-effort reading of inline `style` attributes.
//!
//! Markup pasted from other editors often expresses formatting through
//! presentation (`font-weight: bold`, a background color) instead of
//! semantic tags. These helpers recognise the common cases. They are only
//! consulted when [`ParseOptions::sniff_styles`](super::ParseOptions) is set.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Mark, Severity};

/// Lowercased `(property, value)` pairs of a style attribute.
pub fn declarations(style: &str) -> Vec<(String, String)> {
    static DECLARATION: OnceLock<Regex> = OnceLock::new();
    let declaration = DECLARATION.get_or_init(|| {
        Regex::new(r"(?i)([a-z-]+)\s*:\s*([^;]+)").expect("Invalid style declaration regex")
    });

    declaration
        .captures_iter(style)
        .map(|caps| {
            (
                caps[1].to_ascii_lowercase(),
                caps[2].trim().to_ascii_lowercase(),
            )
        })
        .collect()
}

fn value<'a>(decls: &'a [(String, String)], property: &str) -> Option<&'a str> {
    decls
        .iter()
        .rev()
        .find(|(name, _)| name == property)
        .map(|(_, value)| value.as_str())
}

/// Marks expressed by a style attribute.
pub fn sniff_marks(style: &str) -> Vec<Mark> {
    let decls = declarations(style);
    let mut marks = Vec::new();

    if let Some(weight) = value(&decls, "font-weight")
        && is_bold_weight(weight)
    {
        marks.push(Mark::Bold);
    }

    if let Some(font_style) = value(&decls, "font-style")
        && matches!(font_style, "italic" | "oblique")
    {
        marks.push(Mark::Italic);
    }

    let decoration = value(&decls, "text-decoration")
        .or_else(|| value(&decls, "text-decoration-line"))
        .unwrap_or_default();
    if decoration.contains("underline") {
        marks.push(Mark::Underline);
    }
    if decoration.contains("line-through") {
        marks.push(Mark::Strike);
    }

    if let Some(background) =
        value(&decls, "background-color").or_else(|| value(&decls, "background"))
        && !matches!(background, "transparent" | "none" | "initial" | "inherit")
    {
        marks.push(Mark::Highlight);
    }

    marks
}

fn is_bold_weight(weight: &str) -> bool {
    match weight {
        "bold" | "bolder" => true,
        other => other.parse::<u16>().is_ok_and(|w| w >= 600),
    }
}

/// Callout severity implied by a background color, if it is one of the
/// callout colors.
pub fn sniff_callout(style: &str) -> Option<Severity> {
    let decls = declarations(style);
    let color = value(&decls, "background-color").or_else(|| value(&decls, "background"))?;
    let color: String = color.chars().filter(|c| !c.is_whitespace()).collect();

    match color.as_str() {
        "#fff3cd" | "rgb(255,243,205)" => Some(Severity::Warning),
        "#f8d7da" | "rgb(248,215,218)" => Some(Severity::Safety),
        "#d1ecf1" | "rgb(209,236,241)" => Some(Severity::Info),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn declarations_are_lowercased_and_trimmed() {
        assert_eq!(
            declarations("Font-Weight: BOLD ; color:red;"),
            vec![
                ("font-weight".to_string(), "bold".to_string()),
                ("color".to_string(), "red".to_string())
            ]
        );
    }

    #[rstest]
    #[case::bold("font-weight: bold", vec![Mark::Bold])]
    #[case::numeric_bold("font-weight:700", vec![Mark::Bold])]
    #[case::normal_weight("font-weight: 400", vec![])]
    #[case::italic("font-style: italic", vec![Mark::Italic])]
    #[case::underline_and_strike(
        "text-decoration: underline line-through",
        vec![Mark::Underline, Mark::Strike]
    )]
    #[case::highlight("background-color: yellow", vec![Mark::Highlight])]
    #[case::transparent("background-color: transparent", vec![])]
    #[case::empty("", vec![])]
    fn sniffs_marks(#[case] style: &str, #[case] expected: Vec<Mark>) {
        assert_eq!(sniff_marks(style), expected);
    }

    #[rstest]
    #[case::warning("background-color: #FFF3CD", Some(Severity::Warning))]
    #[case::safety("padding: 4px; background: #f8d7da", Some(Severity::Safety))]
    #[case::info_rgb("background-color: rgb(209, 236, 241)", Some(Severity::Info))]
    #[case::other("background-color: #ffffff", None)]
    #[case::none("color: #fff3cd", None)]
    fn sniffs_callouts(#[case] style: &str, #[case] expected: Option<Severity>) {
        assert_eq!(sniff_callout(style), expected);
    }
}
