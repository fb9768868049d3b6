use resub::{Engine, ExecutionPlan};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

const INDENT: &str = "  ";

/// Print the execution plan to stdout.
pub fn print_plan(engine: &Engine, plan: &ExecutionPlan, color: bool) {
    let palette = ansi::Palette::new(color);
    let graph = engine.graph();

    println!(
        "\n{}",
        palette.bold(palette.paint(
            "The following replacements will occur. Actions indented less will be performed before those indented more.",
            ansi::CYAN
        ))
    );

    println!("\n{}", palette.paint("━━━ Plan ━━━", ansi::GRAY));
    if plan.is_empty() {
        println!("{}", palette.dim("  No rules"));
    }
    for entry in &plan.entries {
        let label = if entry.depth == 0 {
            palette.bold(palette.paint(&entry.label, ansi::GREEN))
        } else {
            palette.paint(&entry.label, ansi::BLUE)
        };
        println!("{}{} {}", INDENT.repeat(entry.depth), label, palette.dim(format!("#{}", entry.rule)));
    }

    println!("\n{}", palette.paint("━━━ Graph ━━━", ansi::GRAY));
    println!(
        "  Rules: {}  │  Edges: {}  │  Roots: {}{}",
        palette.paint(graph.len().to_string(), ansi::GREEN),
        palette.paint(graph.edges().count().to_string(), ansi::YELLOW),
        palette.paint(graph.roots().len().to_string(), ansi::CYAN),
        if engine.options().explicit { palette.dim("  (explicit order)") } else { String::new() },
    );
    for (from, to, kind) in graph.edges() {
        println!(
            "    {} {} {}  {}",
            palette.paint(graph.label(from), ansi::BLUE),
            palette.dim("before"),
            palette.paint(graph.label(to), ansi::BLUE),
            palette.dim(format!("{kind:?}")),
        );
    }
    println!();
}
