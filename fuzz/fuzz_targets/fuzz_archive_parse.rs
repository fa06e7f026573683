#![no_main]

use datatext::ArchiveReader;
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Smaller than an end-of-central-directory record
    if data.len() < 22 {
        return;
    }

    // Write fuzz data to temporary file
    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };

    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }

    // Try to open archive - should never panic
    let mut reader = match ArchiveReader::open(temp_file.path()) {
        Ok(r) => r,
        Err(_) => return, // Expected for invalid data
    };

    let names = reader.entry_names();
    let _ = reader.list_files();
    let _ = reader.read_manifest();
    let _ = reader.read_entries();

    for name in &names {
        let _ = reader.read_text(name);
    }

    let _ = reader.contains(".ids");
    let _ = reader.contains("");
    let _ = reader.contains("../../../etc/passwd");
});
