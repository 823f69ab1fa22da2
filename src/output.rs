//! Ranked result formatting and pagination

use crate::index::types::{Document, IndexConfig};
use crate::query::RankedDoc;
use crate::utils::title::{TitleLookup, fetch_title};
use log::warn;
use std::io::{self, Write};
use std::path::PathBuf;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One page of matching documents
#[derive(Debug, Clone, Copy)]
pub struct Page<'r, 'a> {
    /// 0-based page number after clamping
    pub number: usize,
    pub total_pages: usize,
    /// Number of matching documents in the whole ranking
    pub matches: usize,
    /// 0-based rank of the first entry
    pub first_rank: usize,
    pub entries: &'r [RankedDoc<'a>],
}

/// Cut one page out of a ranking. Listing stops at the first non-matching
/// document; a page past the end is clamped to the last page.
pub fn paginate<'r, 'a>(ranked: &'r [RankedDoc<'a>], page: usize, page_size: usize) -> Page<'r, 'a> {
    let page_size = page_size.max(1);
    let matches = ranked
        .iter()
        .take_while(|r| r.relevance.is_match())
        .count();
    let total_pages = matches.div_ceil(page_size);
    let number = page.min(total_pages.saturating_sub(1));
    let first_rank = number * page_size;
    let end = (first_rank + page_size).min(matches);

    Page {
        number,
        total_pages,
        matches,
        first_rank,
        entries: &ranked[first_rank.min(end)..end],
    }
}

/// Resolves display titles from the raw corpus
#[derive(Debug, Clone)]
pub struct TitleResolver {
    corpus: PathBuf,
    config: IndexConfig,
}

impl TitleResolver {
    pub fn new(corpus: PathBuf, config: IndexConfig) -> Self {
        Self { corpus, config }
    }

    pub fn title(&self, document: &Document) -> String {
        match fetch_title(&self.corpus, document, &self.config) {
            Ok(TitleLookup::Found(title)) => title,
            Ok(TitleLookup::Untitled) => "<no title>".to_string(),
            Ok(TitleLookup::NotFound) => "<not in corpus>".to_string(),
            Err(e) => {
                warn!("title lookup for '{}' failed: {}", document.doc_id, e);
                "<unavailable>".to_string()
            }
        }
    }
}

/// Print a page of results to stdout
pub fn print_page(page: &Page<'_, '_>, titles: Option<&TitleResolver>, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_page(&mut stdout, page, titles)
}

/// Write a page of results: a header line, then rank, score, doc id and title
pub fn write_page(
    out: &mut dyn WriteColor,
    page: &Page<'_, '_>,
    titles: Option<&TitleResolver>,
) -> io::Result<()> {
    if page.matches == 0 {
        writeln!(out, "No matching documents.")?;
        return Ok(());
    }

    writeln!(
        out,
        "Results {}-{} of {} (page {}/{})",
        page.first_rank + 1,
        page.first_rank + page.entries.len(),
        page.matches,
        page.number + 1,
        page.total_pages
    )?;

    for (i, result) in page.entries.iter().enumerate() {
        write!(out, "{:>4}. ", page.first_rank + i + 1)?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:.4}", result.relevance.score())?;
        out.reset()?;
        write!(out, "  ")?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{}", result.document.doc_id)?;
        out.reset()?;

        match titles {
            Some(resolver) => writeln!(out, "  {}", resolver.title(result.document))?,
            None => writeln!(out)?,
        }
    }

    Ok(())
}
