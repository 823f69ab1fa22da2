use std::collections::VecDeque;
use std::io::{self, BufRead};

/// A whitespace-delimited token and the 0-based line it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: u64,
}

/// Streams whitespace-delimited tokens from a reader while tracking line numbers.
/// Invalid UTF-8 is replaced rather than rejected.
pub struct TokenReader<R> {
    reader: R,
    buf: Vec<u8>,
    pending: VecDeque<Token>,
    /// Line number of the next line to be read
    next_line: u64,
    done: bool,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            pending: VecDeque::new(),
            next_line: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.next_line
    }

    fn fill(&mut self) -> io::Result<()> {
        while self.pending.is_empty() && !self.done {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                self.done = true;
                break;
            }

            let line = self.next_line;
            self.next_line += 1;
            let text = String::from_utf8_lossy(&self.buf);
            self.pending.extend(text.split_whitespace().map(|t| Token {
                text: t.to_string(),
                line,
            }));
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for TokenReader<R> {
    type Item = io::Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.fill() {
            self.done = true;
            return Some(Err(e));
        }
        self.pending.pop_front().map(Ok)
    }
}

/// Fold a term to its canonical (case-insensitive) form
#[inline]
pub fn fold_term(term: &str) -> String {
    term.to_lowercase()
}

/// Split query text on whitespace and fold every token
pub fn tokenize_query(query: &str) -> Vec<String> {
    query.split_whitespace().map(fold_term).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &str) -> Vec<(String, u64)> {
        TokenReader::new(Cursor::new(input))
            .map(|t| t.unwrap())
            .map(|t| (t.text, t.line))
            .collect()
    }

    #[test]
    fn test_tokens_with_lines() {
        let tokens = collect("$DOC d1\n$BODY cat  dog\n\n\tcat\n");
        assert_eq!(
            tokens,
            vec![
                ("$DOC".to_string(), 0),
                ("d1".to_string(), 0),
                ("$BODY".to_string(), 1),
                ("cat".to_string(), 1),
                ("dog".to_string(), 1),
                ("cat".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_no_trailing_newline_and_crlf() {
        let tokens = collect("a b\r\nc");
        assert_eq!(
            tokens,
            vec![("a".to_string(), 0), ("b".to_string(), 0), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn test_lines_read() {
        let mut reader = TokenReader::new(Cursor::new("x\ny\n\n"));
        while reader.next().is_some() {}
        assert_eq!(reader.lines_read(), 3);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let bytes: &[u8] = b"ok \xff\xfe done";
        let tokens: Vec<_> = TokenReader::new(Cursor::new(bytes))
            .map(|t| t.unwrap().text)
            .collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2], "done");
    }

    #[test]
    fn test_tokenize_query() {
        assert_eq!(tokenize_query("  Dog CAT\tdog\n"), vec!["dog", "cat", "dog"]);
        assert!(tokenize_query("   ").is_empty());
    }
}
