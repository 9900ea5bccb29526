//! XML text helpers.

/// Escape text for use in element content or a double-quoted attribute.
pub(crate) fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Wrap text in a CDATA section, splitting it wherever `]]>` occurs.
pub(crate) fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a < b && "c" > d's"#), "a &lt; b &amp;&amp; &quot;c&quot; &gt; d's");
    }

    #[test]
    fn test_cdata_splits_terminator() {
        assert_eq!(cdata("x = a[b[0]];"), "<![CDATA[x = a[b[0]];]]>");
        assert_eq!(cdata("if a[b]]>c"), "<![CDATA[if a[b]]]]><![CDATA[>c]]>");
    }
}
