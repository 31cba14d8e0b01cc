//! Archive builders

use flate2::write::GzEncoder;
use flate2::Compression;
use std::env::consts::EXE_SUFFIX;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Name of the platform executable inside a test archive
pub fn binary_entry() -> String {
    format!("platform{}", EXE_SUFFIX)
}

fn append_files(writer: &mut ZipWriter<Cursor<Vec<u8>>>, files: &[(&str, &[u8])]) {
    let options = SimpleFileOptions::default().unix_permissions(0o755);
    for (path, data) in files {
        writer.start_file(*path, options).expect("start zip entry");
        writer.write_all(data).expect("write zip entry");
    }
}

/// Build a zip archive from `(path, content)` pairs
pub fn build_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    append_files(&mut writer, files);
    writer.finish().expect("finish zip archive").into_inner()
}

/// Build a zip archive that also carries a directory marker and a symlink
pub fn build_archive_with_extras(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer
        .add_directory("docs/", options)
        .expect("add directory entry");
    writer
        .add_symlink("docs/latest", "README.md", options)
        .expect("add symlink entry");
    append_files(&mut writer, files);

    writer.finish().expect("finish zip archive").into_inner()
}

/// Build a gzip-compressed tar archive from `(path, content)` pairs
pub fn build_tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path, *data)
            .expect("append archive entry");
    }

    builder
        .into_inner()
        .expect("finish tar stream")
        .finish()
        .expect("finish gzip stream")
}

/// The standard platform archive used across tests
pub fn standard_archive() -> Vec<u8> {
    let binary = binary_entry();
    build_archive(&[
        (binary.as_str(), b"#!/bin/sh\necho 2.1.7\n"),
        ("config/default.json", b"{\"port\": 8080}\n"),
        ("lib/core/runtime.so", b"\x7fELF runtime"),
        ("README.md", b"# Platform\n"),
    ])
}

/// Number of files in [`standard_archive`]
pub const STANDARD_ARCHIVE_FILES: usize = 4;
