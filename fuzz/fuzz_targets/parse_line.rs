#![no_main]

use codefuse_search::lexical::plain::parse_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    if let Some(raw) = parse_line(&line) {
        assert!(raw.line_number > 0);
        assert!(!raw.path.is_empty());
    }
});
