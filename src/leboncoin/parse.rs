//! String-scanning extraction for Leboncoin search and ad pages.
//!
//! The markup is stable enough that scanning for `data-qa-id` markers beats
//! dragging in a DOM parser. Scans run on an ASCII-lowercased copy so tag
//! case never matters, while slices are taken from the original document.

/// Slice out every ad card on a search page. A card is the `<a ...
/// data-qa-id="aditem_container" ...>...</a>` element wrapping one result.
pub fn listing_cards(html: &str) -> Vec<&str> {
    let lc = ascii_lowercase(html);
    let marker = "data-qa-id=\"aditem_container\"";
    let mut cards = Vec::new();
    let mut from = 0;
    while let Some(rel) = lc[from..].find(marker) {
        let hit = from + rel;
        from = hit + marker.len();
        // The marker sits inside the card's own opening <a> tag.
        let Some(start) = lc[..hit].rfind("<a ") else {
            continue;
        };
        let Some(end_rel) = lc[hit..].find("</a>") else {
            continue;
        };
        cards.push(&html[start..hit + end_rel + "</a>".len()]);
    }
    cards
}

/// The `href` of a card's wrapping anchor, entity-decoded.
pub fn card_href(card: &str) -> Option<String> {
    let open_end = card.find('>')?;
    attr_value(&card[..open_end + 1], "href")
}

/// Pull a double-quoted attribute value out of an opening tag.
pub fn attr_value(tag: &str, name: &str) -> Option<String> {
    let lc = ascii_lowercase(tag);
    let pattern = format!("{}=\"", name);
    let start = lc.find(&pattern)? + pattern.len();
    let end = lc[start..].find('"')? + start;
    Some(normalize_entities(&tag[start..end]))
}

/// Text content of the element tagged `data-qa-id="{qa_id}"`, with nested
/// markup stripped, entities decoded and whitespace collapsed.
///
/// Tracks nesting depth of the element's own tag name, so a description
/// `<div>` containing further `<div>`s still closes at the right spot.
pub fn element_inner(html: &str, qa_id: &str) -> Option<String> {
    let lc = ascii_lowercase(html);
    let marker = format!("data-qa-id=\"{}\"", qa_id);
    let hit = lc.find(&marker)?;
    let tag_start = lc[..hit].rfind('<')?;
    let name: String = lc[tag_start + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        return None;
    }
    let open_end = lc[hit..].find('>')? + hit + 1;
    let open_pat = format!("<{}", name);
    let close_pat = format!("</{}", name);
    let mut depth = 1usize;
    let mut pos = open_end;
    let inner_end = loop {
        let close = next_tag_token(&lc, &close_pat, pos)?;
        match next_tag_token(&lc, &open_pat, pos) {
            Some(open) if open < close => {
                depth += 1;
                pos = open + open_pat.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    break close;
                }
                pos = close + close_pat.len();
            }
        }
    };
    Some(clean_text(&html[open_end..inner_end]))
}

/// First run of digits after dropping every kind of space Leboncoin uses to
/// group thousands (regular, no-break and narrow no-break).
pub fn extract_price(text: &str) -> Option<u32> {
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    let digits: String = compact
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Find `pat` at a tag-name boundary, so `<p` never matches `<pre`.
fn next_tag_token(haystack: &str, pat: &str, mut from: usize) -> Option<usize> {
    while let Some(rel) = haystack.get(from..)?.find(pat) {
        let hit = from + rel;
        let after = hit + pat.len();
        let at_boundary = haystack
            .as_bytes()
            .get(after)
            .map_or(true, |b| !b.is_ascii_alphanumeric());
        if at_boundary {
            return Some(hit);
        }
        from = after;
    }
    None
}

fn clean_text(fragment: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(fragment)))
}

/// Lowercase ASCII only, leaving multi-byte characters untouched so byte
/// offsets stay valid against the original document.
fn ascii_lowercase(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
