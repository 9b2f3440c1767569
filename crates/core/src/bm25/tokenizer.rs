//! Case-folding whitespace/punctuation tokenizer.
//!
//! Tokenizes text by lowercasing and splitting on non-alphanumeric
//! characters. Every term is kept: the knowledge base is small and queries
//! are short, so stop-word pruning buys nothing and would make the sparse
//! ranking drop legitimate FAQ terms. Uses a zero-per-token allocation design
//! via byte spans into a single lowercased buffer.

/// Tokenized text: owns the lowercased buffer, provides `&str` slices via
/// byte spans. Only one heap allocation (the lowercased `String`) instead of
/// N per-token `String`s.
pub struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>, // (start, end) byte offsets into buffer
}

impl Tokens {
    /// Returns an iterator over the token `&str` slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Tokenize text: lowercase, split on non-alphanumeric runs.
pub fn tokenize(text: &str) -> Tokens {
    let buffer = text.to_lowercase();
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in buffer.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start {
            spans.push((s as u32, i as u32));
            start = None;
        }
    }
    // Last token has no trailing separator
    if let Some(s) = start {
        spans.push((s as u32, buffer.len() as u32));
    }

    Tokens { buffer, spans }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let tokens = tokenize("How do I reset my Password?");
        let words: Vec<&str> = tokens.iter().collect();
        assert_eq!(words, vec!["how", "do", "i", "reset", "my", "password"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t\n ...!?").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_digits() {
        let tokens = tokenize("error 404 on page-2");
        let words: Vec<&str> = tokens.iter().collect();
        assert_eq!(words, vec!["error", "404", "on", "page", "2"]);
    }

    #[test]
    fn test_tokenize_unicode() {
        let tokens = tokenize("Cómo restablecer la contraseña");
        let words: Vec<&str> = tokens.iter().collect();
        assert_eq!(words, vec!["cómo", "restablecer", "la", "contraseña"]);
    }
}
