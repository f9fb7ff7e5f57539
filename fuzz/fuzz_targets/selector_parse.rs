#![no_main]

use libfuzzer_sys::fuzz_target;
use portweave_select::{parse_selector, Addressing, PathSelector, SelectorConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if parse_selector(text).is_err() {
        return;
    }

    let sel = PathSelector::with_config(SelectorConfig::small());
    let Ok(ambiguous) = sel.is_ambiguous(text) else {
        return;
    };
    if ambiguous {
        return;
    }
    // Every expanded identifier must round-trip and match its own selector
    if let Ok(ids) = sel.make_index(text) {
        for id in &ids {
            let canonical = sel.to_identifier(id);
            assert!(sel.is_identifier(&canonical));
            assert_eq!(sel.make_index(&canonical).ok(), Some(vec![id.clone()]));
            assert_eq!(sel.matches(text, id).ok(), Some(true));
        }
    }
});
