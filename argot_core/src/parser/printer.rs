use terminal_size::{terminal_size, Width};

use crate::constant::{DEFAULT_SYNTAX_WIDTH, USAGE_PREFIX};
use crate::entity::Owner;
use crate::parser::interface::{
    ColumnRenderer, ConsoleInterface, LeftWidth, MiddleWidth, PaddingWidth, TotalWidth,
    UserInterface,
};

/// Receives the help document piece by piece.
///
/// Implement this to render help somewhere other than the console.
pub trait HelpPrinter {
    /// Called before anything else is printed.
    fn begin(&mut self) {}

    /// Print a line of free text.
    fn print_text(&mut self, text: &str);

    /// Print a blank separating line.
    fn print_separator(&mut self);

    /// Print one two-column entry.
    fn print_entry(&mut self, syntax: &str, description: &str);

    /// Called once everything has been printed.
    fn end(&mut self) {}
}

const INDENT: usize = 2;
const PADDING: usize = 2;

/// The default printer: indented entries with the syntax in a fixed-width column.
///
/// Descriptions wrap to the terminal width when one is detected.
pub struct ColumnPrinter {
    renderer: ColumnRenderer,
    user_interface: Box<dyn UserInterface>,
}

impl ColumnPrinter {
    /// Create a printer whose syntax column is `syntax_width` characters wide.
    pub fn new(syntax_width: usize) -> Self {
        let total_width = if let Some((Width(w), _)) = terminal_size() {
            Some(w as usize)
        } else {
            None
        };

        Self::with_interface(syntax_width, total_width, Box::new(ConsoleInterface::default()))
    }

    pub(crate) fn with_interface(
        syntax_width: usize,
        total_width: Option<usize>,
        user_interface: Box<dyn UserInterface>,
    ) -> Self {
        let padding = PaddingWidth::new(PADDING).expect("internal error - padding must be valid");
        let left = LeftWidth::new(std::cmp::max(syntax_width, 1))
            .expect("internal error - left width must be valid");
        let renderer = match total_width {
            Some(total) => ColumnRenderer::guided(INDENT, padding, left, TotalWidth(total)),
            None => ColumnRenderer::new(padding, left, MiddleWidth::unbounded()),
        };

        Self {
            renderer,
            user_interface,
        }
    }
}

impl Default for ColumnPrinter {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_WIDTH)
    }
}

impl HelpPrinter for ColumnPrinter {
    fn print_text(&mut self, text: &str) {
        self.user_interface.print(text.to_string());
    }

    fn print_separator(&mut self) {
        self.user_interface.print(String::default());
    }

    fn print_entry(&mut self, syntax: &str, description: &str) {
        for line in self.renderer.render(INDENT, syntax, description) {
            self.user_interface.print(line);
        }
    }
}

pub(crate) enum UsageEntry {
    Text(String),
    Entity(Owner),
}

impl UsageEntry {
    fn render(&self) -> String {
        match self {
            UsageEntry::Text(text) => text.clone(),
            UsageEntry::Entity(owner) => owner.borrow().usage_entry(),
        }
    }
}

pub(crate) enum HelpEntry {
    Entry { syntax: String, description: String },
    Text(String),
    Separator,
    Subcommands {
        caption: String,
        entries: Vec<(String, String)>,
    },
    // Rendered from whatever the declaration looks like at print time.
    Entity(Owner),
}

/// Everything the help screen is assembled from, in declaration order.
#[derive(Default)]
pub(crate) struct HelpDocument {
    pub(crate) name: String,
    pub(crate) usage: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) epilogue: Option<String>,
    pub(crate) usage_entries: Vec<UsageEntry>,
    pub(crate) entries: Vec<HelpEntry>,
}

impl HelpDocument {
    pub(crate) fn usage_line(&self) -> String {
        match &self.usage {
            Some(usage) => usage.clone(),
            None => {
                let mut line = format!("{USAGE_PREFIX} {}", self.name);

                for entry in &self.usage_entries {
                    line.push(' ');
                    line.push_str(&entry.render());
                }

                line
            }
        }
    }

    pub(crate) fn render(&self, printer: &mut dyn HelpPrinter) {
        printer.begin();
        printer.print_text(&self.usage_line());
        printer.print_separator();

        if let Some(description) = &self.description {
            printer.print_text(description);
            printer.print_separator();
        }

        for entry in &self.entries {
            match entry {
                HelpEntry::Entry {
                    syntax,
                    description,
                } => printer.print_entry(syntax, description),
                HelpEntry::Text(text) => printer.print_text(text),
                HelpEntry::Separator => printer.print_separator(),
                HelpEntry::Subcommands { caption, entries } => {
                    printer.print_text(caption);

                    for (syntax, description) in entries {
                        printer.print_entry(syntax, description);
                    }

                    printer.print_separator();
                }
                HelpEntry::Entity(owner) => {
                    let entity = owner.borrow().clone();
                    printer.print_entry(&entity.help_syntax(), &entity.help_description());
                }
            }
        }

        if let Some(epilogue) = &self.epilogue {
            printer.print_separator();
            printer.print_text(epilogue);
        }

        printer.end();
    }
}
