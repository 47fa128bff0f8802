use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{controller::Notifier, presenter::ArtifactView};

// ── Terminal helpers ──────────────────────────────────────────────────────────

fn term_width() -> usize {
    Term::stdout().size().1.max(60) as usize
}

fn rule() -> String {
    "─".repeat(term_width().min(64))
}

// ── Banner ────────────────────────────────────────────────────────────────────

pub fn print_banner() {
    let _ = Term::stdout().clear_screen();

    println!();
    println!(
        "{}",
        style("   ▲ artix-config").cyan().bold()
    );
    println!(
        "{}",
        style("   setup.conf generator  ·  v0.1.0").dim().italic()
    );
    println!();
    println!("{}", style(rule()).dim());
    println!();
}

// ── Step header ───────────────────────────────────────────────────────────────

/// Prints a visually distinct numbered step header.
pub fn print_step(step: u8, total: u8, title: &str) {
    println!();
    let tag = style(format!(" {}/{} ", step, total)).black().on_cyan().bold();
    let heading = style(format!("  {}", title)).white().bold();
    println!("{}{}", tag, heading);
    println!("{}", style(rule()).dim());
}

// ── Feedback messages ─────────────────────────────────────────────────────────

pub fn print_success(msg: &str) {
    println!("  {}  {}", style("✓").green().bold(), style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("  {}  {}", style("→").blue().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {}  {}", style("⚠").yellow().bold(), style(msg).yellow());
}

/// Written to stderr.
pub fn print_error(msg: &str) {
    eprintln!("  {}  {}", style("✗").red().bold(), style(msg).red());
}

// ── Info box ──────────────────────────────────────────────────────────────────

/// Renders a bordered key→value box.
///
/// ```text
/// ┌─ Your answers ─────────────────────────┐
/// │  username     artix
/// │  hostname     box
/// └────────────────────────────────────────┘
/// ```
pub fn print_kv_box(title: &str, rows: &[(&str, &str)]) {
    const BOX_INNER: usize = 46;

    let dashes = "─".repeat(BOX_INNER.saturating_sub(title.chars().count() + 2));
    println!(
        "  ┌─ {} {}┐",
        style(title).white().bold(),
        style(&dashes).dim()
    );

    for (key, val) in rows {
        println!(
            "  │  {:<21}{}",
            style(*key).dim(),
            style(*val).white().bold()
        );
    }

    println!("  └{}┘", style("─".repeat(BOX_INNER + 2)).dim());
}

// ── Artifact ──────────────────────────────────────────────────────────────────

/// Prints the configuration text with a line-number gutter. The text itself
/// is printed as-is; only the gutter is styled.
pub fn print_artifact(title: &str, text: &str) {
    println!();
    println!("  {}", style(format!("┌─ {title}")).cyan().bold());
    if text.is_empty() {
        println!("  {}  {}", style("│").cyan(), style("(empty)").dim().italic());
    }
    for (n, line) in text.lines().enumerate() {
        println!("  {} {}  {}", style("│").cyan(), style(format!("{:>4}", n + 1)).dim(), line);
    }
    println!("  {}", style("└─").cyan().bold());
}

// ── Transient status ──────────────────────────────────────────────────────────

/// A one-line status that stays until the caller clears it with
/// `pb.finish_and_clear()`.
pub fn status_line(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {prefix:.green.bold}  {msg:.green}") {
        pb.set_style(style);
    }
    pb.set_prefix("✓");
    pb.set_message(msg.into());
    pb.tick();
    pb
}

// ── Terminal surfaces ─────────────────────────────────────────────────────────

/// Output region on the terminal. Rendering only updates the buffer; the
/// region is printed when it is scrolled into view.
#[derive(Debug, Default)]
pub struct TerminalView {
    buffer: String,
}

impl ArtifactView for TerminalView {
    fn render_artifact(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.push_str(text);
    }

    fn scroll_into_view(&mut self) {
        print_artifact("setup.conf", &self.buffer);
    }
}

/// Error alert on stderr. It does not read stdin: the action menu may be
/// waiting for input while a request fails in the background, and the next
/// menu answer serves as the acknowledgment.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!();
        print_error(message);
    }
}
