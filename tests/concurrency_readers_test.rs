//! Readers running alongside an editor always see a consistent archive
//!
//! Every mutation replaces the archive by rename under the exclusive lock,
//! so a reader holding the shared lock never observes a half-written file
//! or a manifest that disagrees with the stored entries.

use datatext::viewer::read_code_snippets;
use datatext::DtxArchive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_readers_during_writes() {
    let dir = tempfile::tempdir().unwrap();
    let archive = DtxArchive::open_or_create(dir.path().join("data.dtx")).unwrap();
    archive
        .add_bytes("base.txt", b"content of base.txt")
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();

    for _ in 0..3 {
        let path = archive.path().to_path_buf();
        let done = Arc::clone(&done);
        readers.push(thread::spawn(move || {
            let mut reads = 0usize;
            while !done.load(Ordering::SeqCst) || reads == 0 {
                let snippets = read_code_snippets(&path).unwrap();
                let ids: Vec<u32> = snippets.iter().map(|s| s.id).collect();
                let expected: Vec<u32> = (1..=snippets.len() as u32).collect();
                assert_eq!(ids, expected);
                for snippet in &snippets {
                    assert_eq!(snippet.code, format!("content of {}", snippet.name));
                }
                reads += 1;
                thread::sleep(Duration::from_millis(2));
            }
            reads
        }));
    }

    archive.remove("base.txt").unwrap();
    for round in 0..20 {
        let name = format!("file{}.txt", round);
        archive
            .add_bytes(&name, format!("content of {}", name).as_bytes())
            .unwrap();
        if round % 3 == 0 {
            archive.remove(&name).unwrap();
        }
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        let reads = reader.join().expect("reader thread panicked");
        assert!(reads > 0);
    }

    let manifest = archive.manifest().unwrap();
    assert!(manifest.is_dense());
    assert_eq!(manifest.len(), 13);
}
