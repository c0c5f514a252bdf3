//! Small text helpers shared by the candidate and review extractors.

/// Strip HTML tags, decode common entities and collapse whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    collapse_whitespace(&decode_html(&out))
}

/// Undo HTML entity and JSON string escaping seen in embedded page data.
pub(crate) fn decode_html(value: &str) -> String {
    value
        .replace("\\/", "/")
        .replace("\\\"", "\"")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\u0026", "&")
        .replace("\\u0027", "'")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element and its descendants, whitespace-collapsed.
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags_and_collapses_whitespace() {
        assert_eq!(
            strip_html("<b>Chips</b>\n  <i>Ahoy!</i>"),
            "Chips Ahoy!"
        );
    }

    #[test]
    fn decode_html_handles_entities_and_json_escapes() {
        assert_eq!(decode_html("Salt &amp; Vinegar"), "Salt & Vinegar");
        assert_eq!(decode_html("\\/p\\/oreo\\/0001"), "/p/oreo/0001");
        assert_eq!(decode_html("\\u002Fp\\u002Fmilk"), "/p/milk");
    }
}
