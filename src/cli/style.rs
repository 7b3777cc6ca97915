//! Terminal styling helpers

use owo_colors::{OwoColorize, Stream};

/// Check mark used in success lines
pub const CHECK: &str = "✅";

/// Check mark in the success color
pub fn check() -> String {
    CHECK.success()
}

/// Semantic colors for CLI output, honoring `NO_COLOR` and non-tty stdout
pub trait Stylize: std::fmt::Display + Sized {
    /// De-emphasized text
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Bold text
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    /// Highlighted value
    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    /// Success message
    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    /// Warning message
    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    /// Error message (stderr)
    fn error(&self) -> String {
        self.if_supports_color(Stream::Stderr, |t| t.red())
            .to_string()
    }
}

impl<T: std::fmt::Display> Stylize for T {}

/// Render a URL as a clickable terminal hyperlink when supported
pub fn link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}
