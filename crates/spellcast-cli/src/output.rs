// Output formatting and styling

use colored::Colorize;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Format a key sequence or key name
    pub fn code(&self, code: &str) -> String {
        if self.use_colors {
            code.cyan().to_string()
        } else {
            code.to_string()
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a section header
    pub fn section(&self, title: &str) -> String {
        if self.use_colors {
            format!(
                "\n{}\n{}",
                title.bold().underline(),
                "─".repeat(title.chars().count())
            )
        } else {
            format!("\n{}\n{}", title, "─".repeat(title.chars().count()))
        }
    }

    /// Format a list item
    pub fn list_item(&self, item: &str) -> String {
        format!("  • {}", item)
    }

    /// Format a key-value pair
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.use_colors {
            format!("  {}: {}", key.bold(), value)
        } else {
            format!("  {}: {}", key, value)
        }
    }

    /// Format error with suggestions
    pub fn error_with_suggestion(&self, error: &str, suggestion: &str) -> String {
        let error_msg = self.error(error);
        let suggestion_msg = self.info(&format!("Suggestion: {}", suggestion));
        format!("{}\n  {}", error_msg, suggestion_msg)
    }

    /// Format warning with suggestions
    pub fn warning_with_suggestion(&self, warning: &str, suggestion: &str) -> String {
        let warning_msg = self.warning(warning);
        let suggestion_msg = self.info(&format!("Suggestion: {}", suggestion));
        format!("{}\n  {}", warning_msg, suggestion_msg)
    }
}

/// Print an error message to stderr
pub fn print_error(msg: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.error(msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_formatting() {
        let style = OutputStyle::plain();
        assert_eq!(style.success("done"), "✓ done");
        assert_eq!(style.error("failed"), "✗ failed");
        assert_eq!(style.key_value("spell", "terminal"), "  spell: terminal");
        assert_eq!(style.section("Keys"), "\nKeys\n────");
    }

    #[test]
    fn test_suggestion_formatting() {
        let style = OutputStyle::plain();
        assert_eq!(
            style.error_with_suggestion("bad prefix", "use alt+space"),
            "✗ bad prefix\n  ℹ Suggestion: use alt+space"
        );
    }
}
