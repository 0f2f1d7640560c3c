//! Interoperability with archives written by the `zip` crate.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;

use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;
use zipguard_core::EntryType;
use zipguard_core::ExtractOptions;
use zipguard_core::extract;
use zipguard_core::list_entries;
use zipguard_core::test_utils::ZipBuilder;

fn sample_archive(method: CompressionMethod) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .unix_permissions(0o755);

    zip.add_directory("docs/", options).unwrap();
    zip.start_file("docs/readme.txt", options).unwrap();
    zip.write_all(b"read me").unwrap();
    zip.start_file("bin/tool", options).unwrap();
    zip.write_all(&[0x7f, b'E', b'L', b'F']).unwrap();
    zip.start_file("data/big.bin", options).unwrap();
    zip.write_all(&vec![0xAB_u8; 256 * 1024]).unwrap();
    zip.start_file("unicode/naïve café.txt", options).unwrap();
    zip.write_all("héllo".as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

#[test]
fn test_extract_stored_zip_crate_archive() {
    let temp = TempDir::new().unwrap();
    let bytes = sample_archive(CompressionMethod::Stored);

    let report = extract(Cursor::new(bytes), temp.path(), &ExtractOptions::default()).unwrap();

    assert!(report.is_success(), "failures: {:?}", report.first_failure());
    assert_eq!(report.files_written, 4);
    assert_eq!(report.directories_created, 1);
    assert_eq!(
        fs::read(temp.path().join("docs/readme.txt")).unwrap(),
        b"read me"
    );
    assert_eq!(
        fs::read(temp.path().join("data/big.bin")).unwrap().len(),
        256 * 1024
    );
}

#[test]
fn test_extract_deflated_zip_crate_archive() {
    let temp = TempDir::new().unwrap();
    let bytes = sample_archive(CompressionMethod::Deflated);

    let report = extract(Cursor::new(bytes), temp.path(), &ExtractOptions::default()).unwrap();

    assert!(report.is_success(), "failures: {:?}", report.first_failure());
    assert_eq!(
        fs::read_to_string(temp.path().join("unicode/naïve café.txt")).unwrap(),
        "héllo"
    );
    assert!(
        fs::read(temp.path().join("data/big.bin"))
            .unwrap()
            .iter()
            .all(|b| *b == 0xAB)
    );
}

#[test]
fn test_list_matches_zip_crate_view() {
    let bytes = sample_archive(CompressionMethod::Deflated);
    let ours = list_entries(Cursor::new(bytes.clone())).unwrap();
    let mut theirs = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

    assert_eq!(ours.len(), theirs.len());
    for (index, entry) in ours.iter().enumerate() {
        let other = theirs.by_index(index).unwrap();
        assert_eq!(entry.name, other.name());
        assert_eq!(entry.uncompressed_size, other.size());
        assert_eq!(entry.compressed_size, other.compressed_size());
        assert_eq!(entry.crc32, other.crc32());
        assert_eq!(entry.is_dir(), other.is_dir());
    }
    assert_eq!(ours[0].entry_type, EntryType::Directory);
}

#[cfg(unix)]
#[test]
fn test_preserved_permissions_from_zip_crate() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let bytes = sample_archive(CompressionMethod::Stored);
    let options = ExtractOptions::default().with_preserve_permissions(true);

    extract(Cursor::new(bytes), temp.path(), &options).unwrap();

    let mode = fs::metadata(temp.path().join("bin/tool"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o7777, 0o755);
}

#[test]
fn test_zip_crate_reads_builder_archives() {
    let bytes = ZipBuilder::new()
        .add_directory("dir/")
        .add_file("dir/a.txt", b"hello")
        .add_deflated_file("dir/b.txt", b"compressed content, compressed content")
        .comment(b"comment")
        .build();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 3);

    let mut content = String::new();
    archive
        .by_name("dir/b.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "compressed content, compressed content");
}
