//! Document scanner: turns the raw tagged corpus into document and term events.

use crate::error::{IndexError, Result};
use crate::index::types::IndexConfig;
use crate::utils::tokenizer::{Token, TokenReader};
use log::warn;
use std::io::BufRead;
use std::path::PathBuf;

/// Something the ingestion driver has to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A document-open marker followed by its id
    DocumentOpen { doc_id: String, start_line: u64 },
    /// A body term belonging to the most recently opened document
    Term(String),
}

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Before the first document-open marker
    Preamble,
    /// Document-open seen, the next token is the doc id
    SeekingDoc { start_line: u64 },
    /// Doc id captured, waiting for a section marker
    SeekingHeader,
    IndexingBody,
}

/// Streaming scanner over a tagged corpus
pub struct Scanner<'c, R> {
    tokens: TokenReader<R>,
    config: &'c IndexConfig,
    state: ScanState,
    /// Source name used in error messages
    source: PathBuf,
}

impl<'c, R: BufRead> Scanner<'c, R> {
    pub fn new(reader: R, config: &'c IndexConfig) -> Self {
        Self {
            tokens: TokenReader::new(reader),
            config,
            state: ScanState::Preamble,
            source: PathBuf::from("<corpus>"),
        }
    }

    /// Name the input so I/O errors point at it
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    pub fn lines_read(&self) -> u64 {
        self.tokens.lines_read()
    }

    /// Advance the state machine by one token
    fn step(&mut self, token: Token) -> Option<ScanEvent> {
        if self.config.is_doc_marker(&token.text) {
            self.state = ScanState::SeekingDoc {
                start_line: token.line,
            };
            return None;
        }

        let is_marker = self.config.is_marker(&token.text);
        match self.state {
            ScanState::Preamble => None,
            ScanState::SeekingDoc { start_line } => {
                if is_marker {
                    warn!(
                        "{}:{}: document marker without an id, skipping to next document",
                        self.source.display(),
                        token.line + 1
                    );
                    self.state = ScanState::Preamble;
                    return None;
                }
                self.state = ScanState::SeekingHeader;
                Some(ScanEvent::DocumentOpen {
                    doc_id: token.text,
                    start_line,
                })
            }
            ScanState::SeekingHeader => {
                if is_marker {
                    self.state = ScanState::IndexingBody;
                }
                None
            }
            ScanState::IndexingBody => {
                if is_marker {
                    None
                } else {
                    Some(ScanEvent::Term(token.text))
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for Scanner<'_, R> {
    type Item = Result<ScanEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = match self.tokens.next()? {
                Ok(token) => token,
                Err(e) => return Some(Err(IndexError::io(self.source.clone(), e))),
            };
            if let Some(event) = self.step(token) {
                return Some(Ok(event));
            }
        }
    }
}
