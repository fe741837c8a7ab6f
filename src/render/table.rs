//! Pre-rendered table markup.

/// Render a table as an HTML `<table>`.
///
/// A `<thead>` is emitted only when there are headers. Cell text is escaped.
pub fn table_to_html(headers: &[String], data: &[Vec<String>]) -> String {
    let mut output = String::from("<table>\n");

    if !headers.is_empty() {
        output.push_str("<thead>\n");
        render_html_row(&mut output, headers, "th");
        output.push_str("</thead>\n");
    }

    output.push_str("<tbody>\n");
    for row in data {
        render_html_row(&mut output, row, "td");
    }
    output.push_str("</tbody>\n");

    output.push_str("</table>");
    output
}

fn render_html_row(output: &mut String, cells: &[String], tag: &str) {
    output.push_str("<tr>");
    for cell in cells {
        output.push_str(&format!("<{}>{}</{}>", tag, escape_html(cell), tag));
    }
    output.push_str("</tr>\n");
}

/// Render a table as a GitHub-flavored Markdown table.
///
/// Without headers the first data row takes the header position, since
/// Markdown tables require one.
pub fn table_to_markdown(headers: &[String], data: &[Vec<String>]) -> String {
    let (head, body): (&[String], &[Vec<String>]) = if !headers.is_empty() {
        (headers, data)
    } else if let Some((first, rest)) = data.split_first() {
        (first.as_slice(), rest)
    } else {
        return String::new();
    };

    let col_count = body
        .iter()
        .map(|row| row.len())
        .chain(std::iter::once(head.len()))
        .max()
        .unwrap_or(0);
    if col_count == 0 {
        return String::new();
    }

    let mut output = String::new();
    render_markdown_row(&mut output, head, col_count);
    output.push('|');
    for _ in 0..col_count {
        output.push_str(" --- |");
    }
    output.push('\n');
    for row in body {
        render_markdown_row(&mut output, row, col_count);
    }

    output.trim_end().to_string()
}

fn render_markdown_row(output: &mut String, cells: &[String], col_count: usize) {
    output.push('|');
    for i in 0..col_count {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        output.push_str(&format!(" {} |", escape_markdown_cell(cell.trim())));
    }
    output.push('\n');
}

/// Escape a cell so it cannot break the table structure.
fn escape_markdown_cell(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' => result.push_str("\\|"),
            '\n' => result.push_str("<br>"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Escape HTML special characters.
pub(crate) fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
