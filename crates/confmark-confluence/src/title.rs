//! Reading the `<title>` of an HTML page.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};

/// Extract the document title from HTML.
///
/// The reader runs in lenient mode so that void elements (`<meta>`, `<link>`)
/// and mismatched end tags do not stop it. Whitespace inside the title is
/// collapsed. Returns `None` when there is no non-empty title.
pub(crate) fn html_title(html: &str) -> Option<String> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut in_title = false;
    let mut title = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if is_title(e.local_name().as_ref()) => in_title = true,
            Ok(Event::End(e)) if in_title && is_title(e.local_name().as_ref()) => break,
            Ok(Event::Text(e)) if in_title => {
                if let Ok(text) = reader.decoder().decode(&e) {
                    title.push_str(&text);
                }
            }
            Ok(Event::CData(e)) if in_title => {
                if let Ok(text) = reader.decoder().decode(&e) {
                    title.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(e)) if in_title => push_entity(&mut title, &e),
            Ok(Event::Eof) => break,
            // Scripts and attribute soup may not be well-formed; stop at the
            // first hard error unless the title is already open.
            Err(_) if !in_title => return None,
            Err(_) => break,
            Ok(_) => {}
        }
    }

    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn is_title(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"title")
}

/// Append the text of `&name;`, keeping unknown entities verbatim.
fn push_entity(out: &mut String, entity: &BytesRef<'_>) {
    if let Ok(Some(ch)) = entity.resolve_char_ref() {
        out.push(ch);
        return;
    }
    let Ok(name) = entity.decode() else {
        return;
    };
    match resolve_predefined_entity(&name) {
        Some(text) => out.push_str(text),
        None if name == "nbsp" => out.push(' '),
        None => {
            out.push('&');
            out.push_str(&name);
            out.push(';');
        }
    }
}
