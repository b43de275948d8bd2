//! Markdown rendering and HTML sanitization using lol_html
//!
//! Model output is treated as untrusted. It is rendered with pulldown-cmark
//! and then passed through an allow-list rewriter before anyone displays it.

use lol_html::{comments, element, rewrite_str, text, RewriteStrSettings};
use pulldown_cmark::{html, Options, Parser};

/// Elements kept as-is (attributes still filtered)
const ALLOWED_TAGS: &[&str] = &[
    "a", "blockquote", "br", "code", "del", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "img",
    "li", "ol", "p", "pre", "s", "strong", "sup", "table", "tbody", "td", "th", "thead", "tr",
    "ul",
];

/// Elements removed together with everything inside them
const DROPPED_TAGS: &[&str] = &[
    "applet", "base", "embed", "form", "frame", "frameset", "head", "iframe", "link", "listing",
    "math", "meta", "noembed", "noframes", "noscript", "object", "plaintext", "script", "select",
    "style", "svg", "template", "textarea", "title", "xmp",
];

/// Elements whose content the tokenizer treats as raw text
const RAW_TEXT_SELECTOR: &str = "xmp, noembed, noframes, plaintext, listing";

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),
}

/// Render markdown to sanitized HTML
pub fn render_markdown(markdown: &str) -> Result<String, RenderError> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut unsafe_html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut unsafe_html, parser);

    sanitize_html(&unsafe_html)
}

/// Reduce HTML to an allow-list of elements and attributes.
///
/// Unknown elements are unwrapped (their text survives), dangerous ones are
/// dropped with their content, comments are removed, and links may only use
/// http, https, mailto or relative targets.
pub fn sanitize_html(html: &str) -> Result<String, RenderError> {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("*", |el| {
                    let tag = el.tag_name().to_ascii_lowercase();

                    if DROPPED_TAGS.contains(&tag.as_str()) {
                        el.remove();
                        return Ok(());
                    }
                    if !ALLOWED_TAGS.contains(&tag.as_str()) {
                        el.remove_and_keep_content();
                        return Ok(());
                    }

                    // Table alignment arrives as an inline style
                    let alignment = el
                        .get_attribute("style")
                        .and_then(|style| text_align(&style).map(str::to_string));

                    let names: Vec<String> = el.attributes().iter().map(|a| a.name()).collect();
                    for name in names {
                        let keep = match name.as_str() {
                            "href" if tag == "a" => el
                                .get_attribute("href")
                                .map(|v| is_safe_url(&v, true))
                                .unwrap_or(false),
                            "src" if tag == "img" => el
                                .get_attribute("src")
                                .map(|v| is_safe_url(&v, false))
                                .unwrap_or(false),
                            "alt" if tag == "img" => true,
                            "title" => true,
                            "align" => matches!(tag.as_str(), "th" | "td"),
                            "start" => tag == "ol",
                            _ => false,
                        };
                        if !keep {
                            el.remove_attribute(&name);
                        }
                    }

                    if let Some(align) = alignment {
                        if matches!(tag.as_str(), "th" | "td") {
                            el.set_attribute("align", &align)?;
                        }
                    }
                    if tag == "a" && el.get_attribute("href").is_some() {
                        el.set_attribute("rel", "nofollow noopener noreferrer")?;
                    }
                    Ok(())
                }),
                // Raw text never reaches the element handler as markup
                text!(RAW_TEXT_SELECTOR, |t| {
                    t.remove();
                    Ok(())
                }),
                comments!("*", |c| {
                    c.remove();
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RenderError::RewriteError(e.to_string()))?;

    Ok(result)
}

/// `text-align: left|center|right` from an inline style
fn text_align(style: &str) -> Option<&'static str> {
    let compact: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.trim_end_matches(';') {
        "text-align:left" => Some("left"),
        "text-align:center" => Some("center"),
        "text-align:right" => Some("right"),
        _ => None,
    }
}

/// Whether a link target is harmless
fn is_safe_url(url: &str, allow_mailto: bool) -> bool {
    // Browsers decode entities and ignore embedded whitespace in schemes
    let decoded = html_escape::decode_html_entities(url);
    let normalized: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = normalized.find(':');
    let path_start = normalized.find(&['/', '?', '#'][..]);
    match (scheme_end, path_start) {
        (Some(colon), Some(slash)) if slash < colon => true,
        (Some(colon), _) => {
            let scheme = &normalized[..colon];
            scheme == "http" || scheme == "https" || (allow_mailto && scheme == "mailto")
        }
        (None, _) => true,
    }
}
