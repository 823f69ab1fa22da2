#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a corpus: scanning and tree maintenance must not panic,
    // and whatever gets indexed must keep the tree balanced
    let config = invfile::index::IndexConfig::default();
    let mut builder = invfile::index::IndexBuilder::new();
    let scanner = invfile::index::scanner::Scanner::new(std::io::Cursor::new(data), &config);
    if builder.ingest(scanner).is_ok() {
        assert!(builder.tree().verify().is_ok());
    }
});
