//! Minimal HTML table extraction.
//!
//! Only what the stats pages need: locate a `<table>` by id (also inside
//! `<!-- -->` comments, where some tables are shipped), split it into rows and
//! cells, and keep the cell text plus the `data-append-csv` attribute.
//!
//! Tag and attribute matching is ASCII case-insensitive. Searches run on an
//! ASCII-lowercased copy, which keeps byte offsets identical to the source.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// `data-append-csv` attribute (player id on stats pages).
    pub append_csv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub class: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Find the first table whose `id` is one of `ids` (checked in order).
pub fn extract_table(html: &str, ids: &[&str]) -> Option<Table> {
    let src = html.replace("<!--", "").replace("-->", "");
    let lc = src.to_ascii_lowercase();

    ids.iter().find_map(|id| {
        let (start, end) = find_table(&src, &lc, id)?;
        Some(parse_table(&src[start..end], &lc[start..end]))
    })
}

fn find_table(src: &str, lc: &str, id: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some((start, open_end)) = next_open_tag(lc, "table", from) {
        if attr(&src[start..open_end], "id").as_deref() == Some(id) {
            let close = lc[open_end..].find("</table")? + open_end;
            return Some((start, close));
        }
        from = open_end;
    }
    None
}

fn parse_table(src: &str, lc: &str) -> Table {
    let thead = section(lc, "thead");
    let tbody = section(lc, "tbody");

    let mut header_rows = match thead {
        Some((s, e)) => rows_in(&src[s..e], &lc[s..e]),
        None => Vec::new(),
    };
    let mut body_rows = match (tbody, thead) {
        (Some((s, e)), _) => rows_in(&src[s..e], &lc[s..e]),
        (None, Some((_, e))) => rows_in(&src[e..], &lc[e..]),
        (None, None) => rows_in(src, lc),
    };
    if header_rows.is_empty() && !body_rows.is_empty() {
        header_rows.push(body_rows.remove(0));
    }

    // Grouping rows ("over_header") come first; the column names are last.
    let headers = header_rows
        .pop()
        .map(|r| r.cells.into_iter().map(|c| c.text).collect())
        .unwrap_or_default();

    Table {
        headers,
        rows: body_rows,
    }
}

/// Byte range of the first `<tag ...>...</tag>` body.
fn section(lc: &str, tag: &str) -> Option<(usize, usize)> {
    let (_, open_end) = next_open_tag(lc, tag, 0)?;
    let close = lc[open_end..].find(&format!("</{tag}"))? + open_end;
    Some((open_end, close))
}

fn rows_in(src: &str, lc: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut from = 0;
    while let Some((start, open_end)) = next_open_tag(lc, "tr", from) {
        let end = lc[open_end..]
            .find("</tr")
            .map(|e| e + open_end)
            .or_else(|| next_open_tag(lc, "tr", open_end).map(|(s, _)| s))
            .unwrap_or(lc.len());

        rows.push(Row {
            class: attr(&src[start..open_end], "class").unwrap_or_default(),
            cells: cells_in(&src[open_end..end], &lc[open_end..end]),
        });
        from = end;
    }
    rows
}

fn cells_in(src: &str, lc: &str) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut from = 0;
    loop {
        let th = next_open_tag(lc, "th", from);
        let td = next_open_tag(lc, "td", from);
        let (start, open_end) = match (th, td) {
            (Some(a), Some(b)) => {
                if a.0 < b.0 {
                    a
                } else {
                    b
                }
            }
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => break,
        };

        let rest = &lc[open_end..];
        let end = [rest.find("</td"), rest.find("</th"), rest.find("<td"), rest.find("<th")]
            .into_iter()
            .flatten()
            .min()
            .map(|e| e + open_end)
            .unwrap_or(lc.len());

        cells.push(Cell {
            text: decode_entities(&strip_tags(&src[open_end..end])),
            append_csv: attr(&src[start..open_end], "data-append-csv"),
        });
        from = end;
    }
    cells
}

/// Next `<tag` followed by whitespace, `/` or `>` at or after `from`.
///
/// Returns the tag start and the byte just past its closing `>`.
fn next_open_tag(lc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let pat = format!("<{tag}");
    let mut pos = from;
    loop {
        let start = lc.get(pos..)?.find(&pat)? + pos;
        let after = start + pat.len();
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {
                let open_end = lc[after..].find('>')? + after + 1;
                return Some((start, open_end));
            }
            Some(_) => pos = after,
            None => return None,
        }
    }
}

/// Attribute value from an open tag, e.g. `attr("<td id=\"x\">", "id")`.
fn attr(open_tag: &str, name: &str) -> Option<String> {
    let lc = open_tag.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lc[from..].find(name) {
        let at = from + rel;
        from = at + name.len();

        let preceded = at > 0 && lc.as_bytes()[at - 1].is_ascii_whitespace();
        let rest = lc[from..].trim_start();
        if !preceded || !rest.starts_with('=') {
            continue;
        }
        let value_start = lc.len() - rest.len() + 1;
        let tail = &open_tag[value_start..];
        let tail_trimmed = tail.trim_start();
        let offset = value_start + (tail.len() - tail_trimmed.len());

        let value = match tail_trimmed.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let inner = &open_tag[offset + 1..];
                inner.find(q).map(|e| &inner[..e])?
            }
            _ => {
                let end = tail_trimmed
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(tail_trimmed.len());
                &tail_trimmed[..end]
            }
        };
        return Some(decode_entities(value));
    }
    None
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

/// Decode the handful of entities seen in table cells, then collapse whitespace.
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, semi + 1))
        });
        match decoded {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
