#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug)]
pub(crate) struct PaddingWidth(usize);

impl PaddingWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // padding must be at least 1
        if width >= 1 {
            Ok(PaddingWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct LeftWidth(usize);

impl LeftWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        if width >= 1 {
            Ok(LeftWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct MiddleWidth(usize);

impl MiddleWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // middle must be at least 2 (so we can hyphenate)
        if width >= 2 {
            Ok(MiddleWidth(width))
        } else {
            Err(())
        }
    }

    pub(crate) fn unbounded() -> Self {
        MiddleWidth(usize::MAX)
    }
}

#[derive(Debug)]
pub(crate) struct TotalWidth(pub usize);

/// Lays out a syntax column followed by a word-wrapped description column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// Share of the terminal width the help screen may occupy.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Three five-letter words and their separating spaces.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer whose description column fills what the terminal leaves over.
    pub(crate) fn guided(
        indent: usize,
        padding: PaddingWidth,
        left: LeftWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle: usize = indent + left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;

        if non_middle + MINIMUM_MIDDLE_WIDTH <= target_total_width {
            let guided_middle = target_total_width - non_middle;
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Description column {guided_middle} wide (target {target_total_width}, fixed {non_middle}).");
            }

            Self::new(padding, left, MiddleWidth(guided_middle))
        } else if non_middle + MINIMUM_MIDDLE_WIDTH <= total_width.0 {
            let calculated_middle = total_width.0 - non_middle;
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Description column {calculated_middle} wide (terminal {}, fixed {non_middle}).", total_width.0);
            }

            Self::new(padding, left, MiddleWidth(calculated_middle))
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Terminal {} too narrow for {non_middle} fixed columns, using the minimum description width.", total_width.0);
            }

            Self::new(padding, left, MiddleWidth(MINIMUM_MIDDLE_WIDTH))
        }
    }

    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    /// Render one entry.
    /// A `left` wider than its column gets a line of its own, with the description starting on the next line.
    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let left_column_width = self.left.0;
        let padding = format!("{:width$}", "", width = self.padding.0);
        let blank = format!("{:indent$}{:left_column_width$}{padding}", "", "");
        let overflow = left.chars().count() > left_column_width;
        let middle_parts = chunk(middle, self.middle.0);
        let mut out = Vec::default();

        if overflow || middle_parts.is_empty() {
            out.push(format!("{:indent$}{left}", ""));
        }

        for (i, part) in middle_parts.iter().enumerate() {
            if i == 0 && !overflow {
                out.push(format!(
                    "{:indent$}{:left_column_width$}{padding}{part}",
                    "", left
                ));
            } else {
                out.push(format!("{blank}{part}"));
            }
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.chars().count() + word.chars().count() + 1 <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while characters.len() - left > width {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

/// Where rendered help and error text ends up.
pub(crate) trait UserInterface {
    fn print(&self, message: String);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }
}
