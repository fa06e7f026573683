#![no_main]

use datatext::Manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(manifest) = Manifest::from_bytes(data) else {
        return;
    };

    // Anything that parses must survive a second trip through its own text
    let reparsed = Manifest::parse(&manifest.to_text()).expect("manifest text must reparse");
    assert_eq!(reparsed.len(), manifest.len());

    for entry in manifest.iter() {
        assert_eq!(manifest.lookup(entry.id), Some(entry.name.as_str()));
    }
});
