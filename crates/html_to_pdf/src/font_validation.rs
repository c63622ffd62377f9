//! Font declaration checks
//!
//! Conformant output must embed every font it uses, so every `font-family`
//! declaration in the HTML needs an entry in the font map. The check is line
//! based: a declaration line passes when any font map key occurs anywhere in
//! it. A key of `arial` therefore also satisfies `font-family: arial-bold`.

use crate::error::{GenerationError, Result};
use crate::FontMap;

const FONT_FAMILY: &str = "font-family";

/// Fail with the first `font-family` line no font map key matches
pub fn validate(html: &str, font_map: &FontMap) -> Result<()> {
    tracing::debug!(fonts = font_map.len(), "validating font-family declarations");

    match find_undeclared_font(html, font_map) {
        Some(declaration) => {
            tracing::debug!(declaration = %declaration, "font-family declaration has no font");
            Err(GenerationError::font_validation(format!(
                "html element requests {}. It is not passed in the font map, cannot encode.",
                declaration
            )))
        }
        None => Ok(()),
    }
}

/// The first unmatched declaration line, without semicolons and trimmed
pub fn find_undeclared_font(html: &str, font_map: &FontMap) -> Option<String> {
    html.lines()
        .filter(|line| line.contains(FONT_FAMILY))
        .map(str::trim)
        .find(|line| !font_map.keys().any(|font| line.contains(font.as_str())))
        .map(|line| line.replace(';', "").trim().to_string())
}
