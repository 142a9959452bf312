use crate::trace::row::EventRow;
use anyhow::{Context, bail};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parse an event table file into rows, in file order.
///
/// Expected shape (one event per line):
/// timestamp[:]  key=value  key=value ...
///
/// Example:
/// 676.614396: cpus=00000000,0000000f freq=1900000 load=87 power=1406
pub fn parse_event_file(path: &Path) -> anyhow::Result<Vec<EventRow>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read event file {}", path.display()))?;
    parse_event_text(&text, &path.display().to_string())
}

/// Parse event table text. `origin` only shows up in error messages.
pub fn parse_event_text(text: &str, origin: &str) -> anyhow::Result<Vec<EventRow>> {
    // Capture:
    // 1) timestamp: seconds, optional fraction, optional trailing ':'
    // 2) payload: rest of line
    let line_re = Regex::new(r#"^\s*([0-9]+(?:\.[0-9]+)?):?\s+(.*?)\s*$"#)?;
    let field_re = Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)=(\S+)$"#)?;

    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let line = line.trim_end();

        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let caps = match line_re.captures(line) {
            Some(c) => c,
            None => {
                bail!(
                    "event parse error at {}:{}: cannot parse line: {:?}",
                    origin,
                    lno,
                    line
                );
            }
        };

        let time: f64 = caps[1]
            .parse()
            .with_context(|| format!("bad timestamp at {}:{}: {}", origin, lno, &caps[1]))?;

        let mut fields = BTreeMap::new();
        for token in caps[2].split_whitespace() {
            let Some(kv) = field_re.captures(token) else {
                bail!(
                    "event parse error at {}:{}: expected key=value, got {:?}",
                    origin,
                    lno,
                    token
                );
            };
            if fields.insert(kv[1].to_string(), kv[2].to_string()).is_some() {
                bail!(
                    "duplicate field {} in event at {}:{}",
                    &kv[1],
                    origin,
                    lno
                );
            }
        }

        out.push(EventRow {
            lineno: lno,
            time,
            fields,
        });
    }

    Ok(out)
}
