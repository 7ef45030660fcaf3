use terminal_size::{terminal_size, Height, Width};

use crate::catalog::Recipe;

/// Render rows as an ASCII table no wider than `termw` columns.
/// Returns the lines without printing so callers (and tests) can inspect them.
pub fn render_table(cols: &[&str], rows: &[Vec<String>], termw: usize) -> Vec<String> {
    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(termw)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] { widths[i] = w.min(termw); }
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 4);
    let sep = build_separator(&widths);
    out.push(fit_line_to_width(&sep, termw));
    let header: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
    out.push(fit_line_to_width(&build_row_header_colored(&header, &widths), termw));
    out.push(fit_line_to_width(&sep, termw));
    for r in rows {
        out.push(fit_line_to_width(&build_row(r, &widths), termw));
    }
    out.push(fit_line_to_width(&sep, termw));
    out
}

pub fn print_table(cols: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        println!("(no rows)");
        return;
    }
    let termw = get_terminal_width();
    for line in render_table(cols, rows, termw) {
        println!("{}", line);
    }
    println!("rows: {}", rows.len());
}

pub const RECIPE_COLUMNS: [&str; 5] = ["id", "title", "ingredients", "minutes", "servings"];

pub fn recipe_rows(recipes: &[Recipe]) -> Vec<Vec<String>> {
    recipes
        .iter()
        .map(|r| vec![
            r.id.clone(),
            r.title.clone(),
            r.ingredients.join(", "),
            r.cooking_time.map(|t| t.to_string()).unwrap_or_default(),
            r.servings.map(|s| s.to_string()).unwrap_or_default(),
        ])
        .collect()
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let (text, align_right) = (truncate(&cell, *w), is_numeric_like(&cell));
        let pad = w.saturating_sub(visible_len(&text));
        s.push(' ');
        if align_right {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push_str(" |");
    }
    s
}

// Header names in green; padding is computed on the visible width.
fn build_row_header_colored(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        s.push(' ');
        s.push_str(&format!("\x1b[32m{}\x1b[0m", text));
        s.push_str(&" ".repeat(w.saturating_sub(visible_len(&text))));
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    !st.is_empty() && st.chars().all(|c| c.is_ascii_digit())
}

fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), Height(_))) if w > 8 => (w - 4) as usize,
        _ => 80,
    }
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if visible_len(s) <= maxw { return s.to_string(); }
    // Cut on visible characters, keeping escape sequences intact, then reset color.
    let mut out = String::new();
    let mut shown = 0usize;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            out.push(ch);
            if chars.peek() == Some(&'[') {
                for c in chars.by_ref() {
                    out.push(c);
                    if c.is_ascii_alphabetic() { break; }
                }
            }
            continue;
        }
        if shown + 1 >= maxw { break; }
        out.push(ch);
        shown += 1;
    }
    out.push('…');
    out.push_str("\x1b[0m");
    out
}

/// Count visible chars, skipping ANSI CSI sequences.
fn visible_len(s: &str) -> usize {
    let mut count = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() { break; }
                }
            }
            continue;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_len_skips_ansi() {
        assert_eq!(visible_len("\x1b[32mabc\x1b[0m"), 3);
        assert_eq!(visible_len("héllo"), 5);
    }

    #[test]
    fn table_shape() {
        let rows = vec![vec!["1".to_string(), "Pancakes".to_string()]];
        let lines = render_table(&["id", "title"], &rows, 80);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "+----+----------+");
        assert_eq!(lines[3], "|  1 | Pancakes |");
    }

    #[test]
    fn long_lines_are_cut_to_width() {
        let rows = vec![vec!["x".repeat(200)]];
        for line in render_table(&["text"], &rows, 40) {
            assert!(visible_len(&line) <= 40, "line too wide: {}", line);
        }
    }

    #[test]
    fn recipe_rows_join_ingredients() {
        let r = Recipe { id: "a".into(), title: "T".into(), ingredients: vec!["egg".into(), "milk".into()], cooking_time: Some(5), ..Default::default() };
        let rows = recipe_rows(&[r]);
        assert_eq!(rows[0][2], "egg, milk");
        assert_eq!(rows[0][3], "5");
        assert_eq!(rows[0][4], "");
    }
}
