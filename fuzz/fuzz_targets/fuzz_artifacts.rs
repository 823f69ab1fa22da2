#![no_main]

use invfile::index::reader::{LoadedIndex, read_dictionary, read_documents, read_postings};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Split the input into three artifacts; loading must fail cleanly, never panic
    let mut parts = data.splitn(3, |&b| b == 0);
    let dictionary = parts.next().unwrap_or_default();
    let postings = parts.next().unwrap_or_default();
    let documents = parts.next().unwrap_or_default();

    let source = Path::new("fuzz");
    let (Ok(d), Ok(p), Ok(t)) = (
        read_dictionary(Cursor::new(dictionary), source),
        read_postings(Cursor::new(postings), source),
        read_documents(Cursor::new(documents), source),
    ) else {
        return;
    };

    if let Ok(index) = LoadedIndex::new(d, p, t) {
        let _ = invfile::query::QueryEngine::from_index(index).map(|e| e.search("a b c").len());
    }
});
