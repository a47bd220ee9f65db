//! Small helpers over `scraper` element references.

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::ExtractError;
use crate::normalize::collapse_whitespace;

/// Parses a CSS selector, mapping failure into an [`ExtractError`].
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if `css` is not a valid selector.
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        css: css.to_string(),
        reason: e.to_string(),
    })
}

/// All descendants of `scope` matching `css`, in document order.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if `css` is not a valid selector.
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).collect())
}

/// First descendant of `scope` matching `css`.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if `css` is not a valid selector.
pub fn select_first<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).next())
}

/// Concatenated text of every descendant text node, untrimmed.
#[must_use]
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Text content with whitespace collapsed.
#[must_use]
pub fn clean_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&text_content(el))
}

/// Cleaned text of the first match of `css` inside `scope`, or empty.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if `css` is not a valid selector.
pub fn first_text(scope: ElementRef<'_>, css: &str) -> Result<String, ExtractError> {
    Ok(select_first(scope, css)?.map(clean_text).unwrap_or_default())
}

pub fn child_elements(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap).collect()
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Element ancestors, nearest first.
pub fn ancestor_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

/// Resolves `raw` against `base`. Falls back to `raw` itself when there is no
/// base or the reference cannot be joined; empty stays empty.
#[must_use]
pub fn absolute_url(base: Option<&Url>, raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    match base.map(|b| b.join(raw)) {
        Some(Ok(url)) => url.to_string(),
        _ => raw.to_string(),
    }
}
