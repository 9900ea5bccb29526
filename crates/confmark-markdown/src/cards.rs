//! Titles for link cards.

use percent_encoding::percent_decode_str;
use url::Url;

/// Hosts of design tools whose links get a labelled rendering.
const DESIGN_TOOLS: &[(&str, &str)] = &[("figma.com", "Figma")];

/// Path segment that precedes the file key in design tool URLs.
const DESIGN_MARKER: &str = "design";

/// Render an embed card link.
///
/// Design tool links become `**Tool:** [title](url)`, everything else `[url](url)`.
pub(crate) fn embed_card(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return format!("[{url}]({url})");
    };
    match design_tool(&parsed) {
        Some(tool) => {
            let title = design_title(&parsed).unwrap_or_else(|| url.to_owned());
            format!("**{tool}:** [{title}]({url})")
        }
        None => format!("[{url}]({url})"),
    }
}

fn design_tool(url: &Url) -> Option<&'static str> {
    let host = url.host_str()?;
    DESIGN_TOOLS.iter().find_map(|&(domain, name)| {
        let matches = host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'));
        matches.then_some(name)
    })
}

/// Title from `/design/{key}/{Title-Words}`; the key is used when no title segment exists.
fn design_title(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let marker = segments.iter().position(|&s| s == DESIGN_MARKER)?;
    let rest = &segments[marker + 1..];
    let segment = rest.get(1).or_else(|| rest.first())?;

    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let title = decoded.trim_start_matches('-').replace('-', " ");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_owned())
}

/// Derive a readable title from a URL path.
///
/// Uses the last path segment with `+`, `-` and `_` turned into spaces. Numeric
/// segments (page ids) fall back to the host name.
pub(crate) fn title_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_owned();
    };

    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|segment| {
            let spaced = segment.replace('+', " ");
            percent_decode_str(&spaced)
                .decode_utf8_lossy()
                .replace(['-', '_'], " ")
                .trim()
                .to_owned()
        })
        .filter(|title| !title.is_empty() && !title.chars().all(|c| c.is_ascii_digit()));

    last.or_else(|| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
