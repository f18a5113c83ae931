//! ANSI console rendering of audit checks.

use crate::audit::CheckObserver;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Renders check outcomes to stdout: boxed section headings, green `[x]`
/// lines for passes, red `[ ]` lines for failures.
#[derive(Debug, Clone)]
pub struct ConsoleObserver {
    color: bool,
}

impl ConsoleObserver {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl CheckObserver for ConsoleObserver {
    fn heading(&mut self, title: &str) {
        let bar = "─".repeat(title.chars().count() + 2);
        println!("╭{bar}╮");
        println!("│ {} │", self.paint(BOLD, title));
        println!("╰{bar}╯");
    }

    fn passed(&mut self, text: &str) {
        println!("{}", self.paint(GREEN, &format!("[x] {text}")));
    }

    fn failed(&mut self, text: &str) {
        println!("{}", self.paint(RED, &format!("[ ] {text}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_respects_color_switch() {
        let colored = ConsoleObserver::new(true);
        assert_eq!(colored.paint(GREEN, "ok"), "\x1b[32mok\x1b[0m");

        let plain = ConsoleObserver::new(false);
        assert_eq!(plain.paint(GREEN, "ok"), "ok");
    }
}
