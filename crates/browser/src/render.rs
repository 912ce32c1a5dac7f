//! Plain text rendering of a fetched document.
//!
//! Rendering is two single passes over the text:
//!
//! 1. [`strip_tags`] drops markup and, for ordinary pages, everything outside `<body>`
//! 2. [`decode_entities`] replaces `&lt;`, `&gt;` and `&amp;`, any other entity is left as is
//!
//! Entities are decoded after the tags are gone, so `&lt;b&gt;` shows up as `<b>` and is
//! never taken for markup.

use micro_fetch_http::protocol::Document;

/// Which characters outside of tags are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Everything, used for view-source documents.
    All,
    /// Only what lies between `<body>` and `</body>`.
    Body,
}

const ENTITIES: [(&str, char); 3] = [("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&')];

/// Byte length of the longest entity in [`ENTITIES`]
const MAX_ENTITY_LEN: usize = 5;

/// Renders `document`: view-source documents keep the text outside `<body>`.
pub fn render(document: &Document) -> String {
    let scope = if document.view_source() { Scope::All } else { Scope::Body };
    decode_entities(&strip_tags(document.text(), scope))
}

/// Removes tags from `text`.
///
/// A tag runs from `<` to the next `>`. Its name is the content up to the first
/// whitespace and is compared case-sensitively: `body` opens the body scope and
/// `/body` closes it. A `>` outside of a tag is ordinary text.
pub fn strip_tags(text: &str, scope: Scope) -> String {
    let mut output = String::with_capacity(text.len());
    let mut tag = String::new();
    let mut in_tag = false;
    let mut in_body = false;

    for c in text.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
                match tag_name(&tag) {
                    "body" => in_body = true,
                    "/body" => in_body = false,
                    _ => {}
                }
            } else {
                tag.push(c);
            }
        } else if c == '<' {
            in_tag = true;
            tag.clear();
        } else if scope == Scope::All || in_body {
            output.push(c);
        }
    }

    output
}

fn tag_name(tag: &str) -> &str {
    tag.split(|c: char| c.is_ascii_whitespace()).next().unwrap_or_default()
}

/// Replaces the supported entities in one forward pass.
///
/// Characters are written out as they come. `&` marks a candidate start, a later `&`
/// moves the mark. On `;` the candidate is looked up and, when it is known, the output is
/// cut back to the mark and the decoded character pushed instead. A decoded `&` never
/// starts a new candidate, so `&amp;lt;` becomes `&lt;`.
pub fn decode_entities(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut candidate: Option<usize> = None;

    for c in text.chars() {
        if c == '&' {
            candidate = Some(output.len());
            output.push(c);
            continue;
        }

        output.push(c);
        let Some(start) = candidate else {
            continue;
        };

        if c == ';' {
            if let Some(decoded) = lookup(&output[start..]) {
                output.truncate(start);
                output.push(decoded);
            }
            candidate = None;
        } else if output.len() - start >= MAX_ENTITY_LEN {
            candidate = None;
        }
    }

    output
}

fn lookup(entity: &str) -> Option<char> {
    ENTITIES.iter().find(|(name, _)| *name == entity).map(|&(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn body_scope() {
        let html = "<html><head><title>T</title></head><body>Hi<script>...</script>Bye</body></html>";
        assert_eq!(strip_tags(html, Scope::Body), "Hi...Bye");
    }

    #[test]
    fn all_scope_keeps_text_outside_body() {
        let html = "<html><head><title>T</title></head><body>Hi</body>tail</html>";
        assert_eq!(strip_tags(html, Scope::All), "THitail");
    }

    #[test]
    fn body_tag_with_attributes() {
        let html = indoc! {r#"
            <html>
            <body class="main" id="top">
            <p>para</p>
            </body>
            </html>
        "#};
        assert_eq!(strip_tags(html, Scope::Body), "\npara\n");
    }

    #[test]
    fn body_name_is_case_sensitive() {
        assert_eq!(strip_tags("<BODY>shouted</BODY>", Scope::Body), "");
        assert_eq!(strip_tags("<body>a</BODY>b</body>c", Scope::Body), "ab");
        assert_eq!(strip_tags("<bodyx>no</bodyx>", Scope::Body), "");
    }

    #[test]
    fn stray_close_bracket_is_text() {
        assert_eq!(strip_tags("<body>1 > 0</body>", Scope::Body), "1 > 0");
        assert_eq!(strip_tags("a > b", Scope::All), "a > b");
    }

    #[test]
    fn unterminated_tag_swallows_rest() {
        assert_eq!(strip_tags("<body>before<p class=", Scope::Body), "before");
    }

    #[test]
    fn entities() {
        assert_eq!(decode_entities("a &lt; b &gt; c"), "a < b > c");
        assert_eq!(decode_entities("say &quot;hi&quot;"), "say &quot;hi&quot;");
        assert_eq!(decode_entities("fish &amp; chips"), "fish & chips");
    }

    #[test]
    fn decoding_is_single_pass() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn unknown_and_broken_entities_stay() {
        assert_eq!(decode_entities("&nbsp;x"), "&nbsp;x");
        assert_eq!(decode_entities("AT&T;"), "AT&T;");
        assert_eq!(decode_entities("a & b; c"), "a & b; c");
        assert_eq!(decode_entities("&lt"), "&lt");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn new_ampersand_restarts_candidate() {
        assert_eq!(decode_entities("&&lt;"), "&<");
        assert_eq!(decode_entities("&x&gt;"), "&x>");
    }

    #[test]
    fn long_candidate_is_abandoned() {
        assert_eq!(decode_entities("&verylongname;"), "&verylongname;");
        assert_eq!(decode_entities("&lotsofstuff &lt;"), "&lotsofstuff <");
    }

    #[test]
    fn non_ascii_text() {
        assert_eq!(decode_entities("中文 &lt;标签&gt;"), "中文 <标签>");
        assert_eq!(decode_entities("&中文;"), "&中文;");
    }

    #[test]
    fn render_body_page() {
        let document = Document::new("UTF-8", "<html><head>x</head><body><p>a &lt; b</p></body></html>", false);
        assert_eq!(render(&document), "a < b");
    }

    #[test]
    fn render_view_source() {
        let document = Document::new("UTF-8", "<title>t</title><body>&lt;b&gt;</body>", true);
        assert_eq!(render(&document), "t<b>");
    }
}
