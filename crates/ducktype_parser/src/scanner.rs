pub struct Scanner {
    cursor: usize,
    offset: usize,
    characters: Vec<char>,
}

impl Scanner {
    pub fn new(string: &str) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            characters: string.chars().collect(),
        }
    }

    /// Returns the byte offset of the next character. Useful for reporting errors.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the next character without advancing the cursor.
    /// AKA "lookahead"
    pub fn peek(&self, lookahead: usize) -> Option<char> {
        self.characters.get(self.cursor + lookahead).copied()
    }

    /// Returns true if further progress is not possible.
    pub fn is_done(&self) -> bool {
        self.cursor == self.characters.len()
    }

    /// Returns the next character (if available) and advances the cursor.
    pub fn pop(&mut self) -> Option<char> {
        let character = self.characters.get(self.cursor).copied()?;
        self.cursor += 1;
        self.offset += character.len_utf8();
        Some(character)
    }
}
