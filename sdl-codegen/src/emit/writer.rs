//! Indentation-aware string builder for SDL declaration blocks.

/// Accumulates lines at a two-space indent per open block.
pub struct SdlWriter {
    buf: String,
    depth: usize,
}

impl Default for SdlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SdlWriter {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            depth: 0,
        }
    }

    /// Write a line at the current indentation level.
    pub fn line(&mut self, text: &str) {
        self.write_indent();
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Open a block: write `text {` and increase indent.
    pub fn open(&mut self, text: &str) {
        self.write_indent();
        self.buf.push_str(text);
        self.buf.push_str(" {\n");
        self.depth += 1;
    }

    /// Close a block: decrease indent and write `}`.
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.write_indent();
        self.buf.push_str("}\n");
    }

    /// Consume and return the built text, without the final newline.
    pub fn finish(mut self) -> String {
        if self.buf.ends_with('\n') {
            self.buf.pop();
        }
        self.buf
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }
}
