//! Terminal output helpers shared by every task.

pub use anstream::println as aprintln;

/// Tokyo Night palette, as 24-bit ANSI escapes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[38;2;247;118;142m";
    pub const GREEN: &str = "\x1b[38;2;158;206;106m";
    pub const YELLOW: &str = "\x1b[38;2;224;175;104m";
    pub const BLUE: &str = "\x1b[38;2;122;162;247m";
    pub const CYAN: &str = "\x1b[38;2;125;207;255m";
}

fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, colors::RESET)
}

/// Success and created resources.
pub fn p_g(text: &str) -> String {
    paint(colors::GREEN, text)
}

/// Failures and incompatible state.
pub fn p_r(text: &str) -> String {
    paint(colors::RED, text)
}

/// Pending work.
pub fn p_y(text: &str) -> String {
    paint(colors::YELLOW, text)
}

/// Labels and progress.
pub fn p_b(text: &str) -> String {
    paint(colors::BLUE, text)
}

/// Section headings.
pub fn p_c(text: &str) -> String {
    paint(colors::CYAN, text)
}
