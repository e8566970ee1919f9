#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const GAP: &str = "  ";

/// Render an aligned table of string cells.
///
/// Widths are measured in characters so names with accents line up. When
/// `max_width` is set the widest columns give way first, never below their
/// header.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| char_len(cell))
                .max()
                .unwrap_or(0)
                .max(char_len(header))
                .max(MIN_COLUMN)
        })
        .collect();

    let floors: Vec<usize> = headers
        .iter()
        .map(|h| char_len(h).max(MIN_COLUMN))
        .collect();
    shrink_to(&mut widths, &floors, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&clip(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(GAP);

    let divider = "-".repeat(char_len(&header_line));

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line.trim_end().to_owned());
    lines.push(divider);
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let clipped = clip(value, *width);
                let right = is_count(&clipped);
                let padded = pad(&clipped, *width, right);
                if options.color {
                    paint_status(&clipped, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(GAP);
        lines.push(line.trim_end().to_owned());
    }
    lines.join("\n")
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn shrink_to(widths: &mut [usize], floors: &[usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * GAP.len();
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > floors[*idx])
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        let Some(idx) = widest else {
            break;
        };
        widths[idx] -= 1;
        total -= 1;
    }
}

fn clip(value: &str, width: usize) -> String {
    if char_len(value) <= width {
        return value.to_owned();
    }
    if width <= 1 {
        return "…".to_owned();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn is_count(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

fn pad(value: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(char_len(value)));
    if right {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// Color a padded cell by the row status it holds, if any.
fn paint_status(value: &str, padded: String) -> String {
    let code = match value {
        "completed" | "found" | "deliverable" | "synced" | "signed in" => "32",
        "risky" | "unknown" | "pending" | "processing" | "searching" | "verifying" => "33",
        "failed" | "not_found" | "undeliverable" => "31",
        _ => return padded,
    };
    let rest = &padded[value.len()..];
    format!("\u{1b}[{code}m{value}\u{1b}[0m{rest}")
}
