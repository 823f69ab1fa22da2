//! Interactive query loop with paging

use crate::output::{TitleResolver, paginate, write_page};
use crate::query::{QueryEngine, RankedDoc};
use std::io::{self, BufRead};
use termcolor::WriteColor;

const HELP: &str = "Enter keywords separated by spaces.\n  :n  next page\n  :p  previous page\n  :q  quit\n";

/// Shell command parsed from one input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Next,
    Previous,
    Quit,
    Help,
    Search(&'a str),
    Empty,
}

fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Empty,
        ":n" => Command::Next,
        ":p" => Command::Previous,
        ":q" | "q" => Command::Quit,
        ":h" | ":help" => Command::Help,
        query => Command::Search(query),
    }
}

/// Read queries from `input` until `:q` or end of input
pub fn run_shell<R: BufRead>(
    engine: &QueryEngine,
    titles: Option<&TitleResolver>,
    page_size: usize,
    mut input: R,
    out: &mut dyn WriteColor,
) -> io::Result<()> {
    let mut ranked: Option<Vec<RankedDoc<'_>>> = None;
    let mut page = 0usize;
    let mut line = String::new();

    write!(out, "{}", HELP)?;
    loop {
        write!(out, "query> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Help => write!(out, "{}", HELP)?,
            Command::Search(query) => {
                ranked = Some(engine.search(query));
                page = 0;
            }
            Command::Next => page += 1,
            Command::Previous => page = page.saturating_sub(1),
        }

        match &ranked {
            Some(results) => {
                let shown = paginate(results, page, page_size);
                // Keep the cursor on the page actually shown
                page = shown.number;
                write_page(out, &shown, titles)?;
            }
            None => writeln!(out, "No query yet.")?,
        }
    }

    Ok(())
}
