//! Parsed block-list form of a vault document.
//!
//! Mutations operate on whole blocks located by id, never on raw line
//! indices. Untouched blocks keep their original lines verbatim, so editing
//! one record leaves every other byte of the document alone.

use std::fmt::Write as _;

const HEADER_PREFIX: &str = "## ";

/// One `## <Kind> <id>` block and the lines that follow it, up to the next
/// header or end of document.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: String,
    pub id: String,
    lines: Vec<String>,
}

impl Block {
    /// Builds a normalized block: header, one line per field, trailing blank.
    pub fn from_fields(kind: &str, id: &str, fields: &[(&str, String)]) -> Self {
        let mut lines = Vec::with_capacity(fields.len() + 3);
        lines.push(format!("{HEADER_PREFIX}{kind} {id}"));
        lines.push(String::new());
        for (label, value) in fields {
            lines.push(format!("- {label}: {value}"));
        }
        lines.push(String::new());
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
            lines,
        }
    }

    /// Looks up a field value by label. Splits on the first colon only, so
    /// values containing colons (URLs, timestamps) survive intact.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let rest = line.strip_prefix("- ")?;
            let (candidate, value) = rest.split_once(':')?;
            if candidate.trim() == label {
                Some(value.strip_prefix(' ').unwrap_or(value))
            } else {
                None
            }
        })
    }

    /// Field value coerced to `None` when blank.
    pub fn field_opt(&self, label: &str) -> Option<&str> {
        self.field(label).filter(|value| !value.trim().is_empty())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// A whole document: preamble lines (title and anything before the first
/// header) followed by an ordered block list.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    preamble: Vec<String>,
    blocks: Vec<Block>,
}

impl Document {
    /// An empty document carrying only the `# <year> <title>` heading.
    pub fn with_title(year: i32, title: &str) -> Self {
        Self {
            preamble: vec![format!("# {year} {title}"), String::new()],
            blocks: Vec::new(),
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut preamble = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();
        let mut current: Option<Block> = None;

        for raw in text.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if let Some(rest) = line.strip_prefix(HEADER_PREFIX) {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                let (kind, id) = split_header(rest);
                current = Some(Block {
                    kind,
                    id,
                    lines: vec![line.to_string()],
                });
            } else if let Some(block) = current.as_mut() {
                block.lines.push(line.to_string());
            } else {
                preamble.push(line.to_string());
            }
        }
        if let Some(block) = current.take() {
            blocks.push(block);
        }

        Self { preamble, blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    /// Appends a block, keeping a blank separator line before it.
    pub fn append(&mut self, block: Block) {
        let separated = match self.blocks.last() {
            Some(previous) => previous.lines.last().map_or(false, |line| line.is_empty()),
            None => self.preamble.last().map_or(true, |line| line.is_empty()),
        };
        if !separated {
            match self.blocks.last_mut() {
                Some(previous) => previous.lines.push(String::new()),
                None => self.preamble.push(String::new()),
            }
        }
        self.blocks.push(block);
    }

    /// Replaces the block with the replacement's id, preserving its position.
    /// Returns false when no block carries that id.
    pub fn replace(&mut self, replacement: Block) -> bool {
        match self.blocks.iter_mut().find(|block| block.id == replacement.id) {
            Some(slot) => {
                *slot = replacement;
                true
            }
            None => false,
        }
    }

    /// Removes the identified block and every line it owns (through the next
    /// header or end of document). Returns false when absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != id);
        self.blocks.len() != before
    }

    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in &self.preamble {
            let _ = writeln!(text, "{line}");
        }
        for block in &self.blocks {
            for line in &block.lines {
                let _ = writeln!(text, "{line}");
            }
        }
        text
    }
}

fn split_header(rest: &str) -> (String, String) {
    let rest = rest.trim();
    match rest.split_once(char::is_whitespace) {
        Some((kind, id)) => (kind.to_string(), id.trim().to_string()),
        None => (rest.to_string(), String::new()),
    }
}
