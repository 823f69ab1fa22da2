use crate::error::{IndexError, Result};
use crate::index::types::{Document, IndexConfig};
use crate::utils::tokenizer::TokenReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Outcome of looking a document's title up in the raw corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleLookup {
    Found(String),
    /// The document exists but has no header section
    Untitled,
    /// The corpus has no matching document at the stored line
    NotFound,
}

/// Re-read the raw corpus at the document's starting line and extract the
/// text of its header section
pub fn fetch_title(corpus_path: &Path, document: &Document, config: &IndexConfig) -> Result<TitleLookup> {
    let file = File::open(corpus_path).map_err(|e| IndexError::io(corpus_path, e))?;
    read_title(BufReader::new(file), document, config)
        .map_err(|e| IndexError::io(corpus_path, e))
}

/// Title extraction over any reader
pub fn read_title<R: BufRead>(
    reader: R,
    document: &Document,
    config: &IndexConfig,
) -> std::io::Result<TitleLookup> {
    let mut tokens = TokenReader::new(reader)
        .skip_while(|t| matches!(t, Ok(t) if t.line < document.start_line));

    // The stored line must open the expected document
    match tokens.next().transpose()? {
        Some(t) if t.line == document.start_line && config.is_doc_marker(&t.text) => {}
        _ => return Ok(TitleLookup::NotFound),
    }
    match tokens.next().transpose()? {
        Some(t) if t.text == document.doc_id => {}
        _ => return Ok(TitleLookup::NotFound),
    }

    let mut title: Option<Vec<String>> = None;
    for token in tokens {
        let token = token?;
        if !config.is_marker(&token.text) && !config.is_doc_marker(&token.text) {
            if let Some(words) = title.as_mut() {
                words.push(token.text);
            }
            continue;
        }
        if title.is_some() {
            break;
        }
        if token.text == config.header_marker {
            title = Some(Vec::new());
        } else {
            // Another section started before any header
            return Ok(TitleLookup::Untitled);
        }
    }

    Ok(match title {
        Some(words) if !words.is_empty() => TitleLookup::Found(words.join(" ")),
        _ => TitleLookup::Untitled,
    })
}
