//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Casemind CLI.

use owo_colors::OwoColorize;

/// Widest a table cell may grow before it is truncated.
const MAX_CELL_WIDTH: usize = 32;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the Casemind banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "Casemind AI".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed(),
                "High-risk claims review".bright_white()
            );
        } else {
            println!(
                "\n   Casemind AI v{}\n   High-risk claims review\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print the next step below an error, on stderr like the error itself
    pub fn error_hint(&self, message: &str) {
        if self.colored {
            eprintln!("    {}", message.dimmed());
        } else {
            eprintln!("    {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a paragraph of free text, indented under the current section
    pub fn paragraph(&self, text: &str) {
        for line in text.lines() {
            println!("    {}", line);
        }
    }

    /// Print one chat line with the speaker highlighted
    pub fn chat_line(&self, speaker: &str, assistant: bool, content: &str) {
        if self.colored {
            let label = if assistant {
                format!("{}:", speaker).magenta().bold().to_string()
            } else {
                format!("{}:", speaker).cyan().bold().to_string()
            };
            println!("    {} {}", label, content);
        } else {
            println!("    {}: {}", speaker, content);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print a table sized to its contents
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let widths = column_widths(headers, rows);
        let header = format_row(headers.iter().copied(), &widths);
        let rule_len = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2;

        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(rule_len).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(rule_len));
        }
        for row in rows {
            println!("    {}", format_row(row.iter().map(String::as_str), &widths));
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count().min(MAX_CELL_WIDTH);
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Cut `value` to `width` characters, marking the cut with `…`.
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = value.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_output_default() {
        let output = Output::default();
        assert!(output.colored);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("RS Harapan Kita", 40), "RS Harapan Kita");
        assert_eq!(truncate("RS Harapan Kita", 6), "RS Ha…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_column_widths_follow_longest_cell() {
        let rows = vec![
            vec!["C-1".to_string(), "0.91".to_string()],
            vec!["C-100234".to_string(), "0.5".to_string()],
        ];
        assert_eq!(column_widths(&["Claim", "Risk"], &rows), vec![8, 4]);
    }

    #[test]
    fn test_column_widths_are_capped() {
        let rows = vec![vec!["x".repeat(80)]];
        assert_eq!(column_widths(&["Facility"], &rows), vec![MAX_CELL_WIDTH]);
    }

    #[test]
    fn test_format_row_pads_and_trims() {
        let row = format_row(["a", "bb"].into_iter(), &[3, 4]);
        assert_eq!(row, "a    bb");
    }

    #[test]
    fn test_table_formatting_no_panic() {
        // Ragged rows and empty tables should not panic
        let output = Output::no_color();
        output.table(&["Claim", "Risk"], &[vec!["C-1".to_string()]]);
        output.table(&["Claim"], &[vec!["C-1".to_string(), "extra".to_string()]]);
        output.table(&[], &[]);
    }

    #[test]
    fn test_output_methods_no_panic() {
        // Smoke test - ensure none of the output methods panic
        let output = Output::no_color();

        output.banner();
        output.success("test success");
        output.info("test info");
        output.warning("test warning");
        output.error("test error");
        output.error_hint("error hint");
        output.header("Test Header");
        output.subheader("Test Subheader");
        output.kv("key", "value");
        output.list_item("item");
        output.paragraph("line one\nline two");
        output.chat_line("Copilot", true, "hello");
        output.hint("hint message");
        output.command("some command");
        output.newline();
    }

    #[test]
    fn test_output_methods_colored_no_panic() {
        // Smoke test for colored output
        let output = Output::new();

        output.banner();
        output.success("test success");
        output.info("test info");
        output.warning("test warning");
        output.error("test error");
        output.error_hint("error hint");
        output.header("Test Header");
        output.subheader("Test Subheader");
        output.kv("key", "value");
        output.list_item("item");
        output.chat_line("You", false, "hi");
        output.hint("hint message");
        output.command("some command");
        output.newline();
    }
}
