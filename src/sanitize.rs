//! Whitelist HTML filter for user-supplied text.
//!
//! Bookmark titles and descriptions are stored exactly as submitted and run
//! through [`sanitize`] on the way out, so a front end that renders them as
//! HTML never receives a live `<script>` or event handler.
//!
//! - Whitelisted tags survive with only their whitelisted attributes.
//! - Every other tag is turned into text (`<script>` becomes `&lt;script&gt;`).
//! - Stray `<` and `>` in text are escaped; nothing else is touched.
//! - Comments are dropped.
//!
//! Output fed back through [`sanitize`] comes out unchanged.

/// Attributes allowed on each whitelisted tag. `None` means the tag itself is
/// not allowed.
fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    let attrs: &'static [&'static str] = match tag {
        "a" => &["target", "href", "title"],
        "abbr" | "acronym" => &["title"],
        "area" => &["shape", "coords", "href", "alt"],
        "bdo" => &["dir"],
        "blockquote" | "q" => &["cite"],
        "col" | "colgroup" => &["align", "valign", "span", "width"],
        "del" | "ins" => &["datetime"],
        "details" => &["open"],
        "font" => &["color", "size", "face"],
        "img" => &["src", "alt", "title", "width", "height"],
        "table" => &["width", "border", "align", "valign"],
        "td" | "th" => &["width", "rowspan", "colspan", "align", "valign"],
        "tr" => &["rowspan", "align", "valign"],
        "tbody" | "thead" | "tfoot" => &["align", "valign"],
        "address" | "article" | "aside" | "b" | "bdi" | "big" | "br" | "caption" | "center"
        | "cite" | "code" | "dd" | "div" | "dl" | "dt" | "em" | "figcaption" | "figure"
        | "footer" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hr" | "i" | "li"
        | "mark" | "nav" | "ol" | "p" | "pre" | "s" | "section" | "small" | "span" | "sub"
        | "summary" | "sup" | "strong" | "strike" | "tt" | "u" | "ul" => &[],
        _ => return None,
    };
    Some(attrs)
}

pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(rel) = input[pos..].find('<') {
        let lt = pos + rel;
        push_text(&input[pos..lt], &mut out);

        if input[lt..].starts_with("<!--") {
            if let Some(end) = input[lt + 4..].find("-->") {
                pos = lt + 4 + end + 3;
                continue;
            }
        }

        match scan_tag(input.as_bytes(), lt) {
            Some(gt) => {
                write_tag(&input[lt..=gt], &mut out);
                pos = gt + 1;
            }
            None => {
                out.push_str("&lt;");
                pos = lt + 1;
            }
        }
    }

    push_text(&input[pos..], &mut out);
    out
}

fn push_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Finds the `>` closing the tag that opens at `lt`. Returns `None` when the
/// `<` does not start a tag: no name, another `<` first, or no `>` at all.
/// A quote only opens a value right after `=`, so a lone apostrophe in an
/// otherwise sane tag does not swallow the rest of the input.
fn scan_tag(bytes: &[u8], lt: usize) -> Option<usize> {
    let mut i = lt + 1;
    if bytes.get(i) == Some(&b'/') {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    if i == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }

    let mut quote: Option<u8> = None;
    let mut last_significant = 0u8;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'>' => return Some(i),
                b'<' => return None,
                b'"' | b'\'' if last_significant == b'=' => quote = Some(b),
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            last_significant = b;
        }
        i += 1;
    }

    None
}

/// `tag` spans from `<` to `>` inclusive, as found by [`scan_tag`].
fn write_tag(tag: &str, out: &mut String) {
    let inner = &tag[1..tag.len() - 1];
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_len = rest.bytes().take_while(|b| is_name_byte(*b)).count();
    let name = rest[..name_len].to_ascii_lowercase();

    let Some(allowed) = allowed_attributes(&name) else {
        push_text(tag, out);
        return;
    };

    out.push('<');
    if closing {
        out.push('/');
        out.push_str(&name);
        out.push('>');
        return;
    }

    out.push_str(&name);
    let attrs = &rest[name_len..];
    for (attr, value) in parse_attributes(attrs) {
        if !allowed.contains(&attr.as_str()) {
            continue;
        }
        match value {
            Some(value) => {
                if matches!(attr.as_str(), "href" | "src") && !is_safe_url(&attr, value) {
                    continue;
                }
                out.push(' ');
                out.push_str(&attr);
                out.push_str("=\"");
                push_attribute_value(value, out);
                out.push('"');
            }
            None => {
                out.push(' ');
                out.push_str(&attr);
            }
        }
    }

    if attrs.trim_end().ends_with('/') {
        out.push_str(" /");
    }
    out.push('>');
}

fn parse_attributes(s: &str) -> Vec<(String, Option<&str>)> {
    let bytes = s.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/') {
            i += 1;
        }
        if i == name_start {
            // a bare '=' with no name in front of it
            i += 1;
            continue;
        }
        let name = s[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            attrs.push((name, None));
            continue;
        }

        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let value = match bytes.get(j) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let start = j + 1;
                let end = s[start..].find(q as char).map_or(s.len(), |e| start + e);
                i = (end + 1).min(s.len());
                &s[start..end]
            }
            _ => {
                let start = j;
                let mut end = start;
                while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                i = end;
                &s[start..end]
            }
        };
        attrs.push((name, Some(value)));
    }

    attrs
}

fn push_attribute_value(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn is_safe_url(attr: &str, value: &str) -> bool {
    let normalized: String = decode_entities(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if normalized.starts_with("javascript:") || normalized.starts_with("vbscript:") {
        return false;
    }
    if normalized.starts_with("data:") {
        return attr == "src" && normalized.starts_with("data:image/");
    }
    true
}

/// Decodes numeric character references and the few named ones that can be
/// used to hide a URL scheme. Only used for checking, never for output.
fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(semi) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..semi];
        let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = entity.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match entity.to_ascii_lowercase().as_str() {
                "colon" => Some(':'),
                "tab" => Some('\t'),
                "newline" => Some('\n'),
                _ => None,
            }
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
