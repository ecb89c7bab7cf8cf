#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;

pub const BUSYBOX_HASH: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";
pub const MOTD_HASH: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c4b5a69788796a5b4c3d2e1f0";
pub const BOOT_PNG_HASH: &str = "5555aaaa5555aaaa5555aaaa5555aaaa5555aaaa5555aaaa5555aaaa5555aaaa";

/// Lines in the busybox hex dump, more than the default render limit.
pub const HEXDUMP_LINES: usize = 1500;

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

pub fn manifest_json() -> serde_json::Value {
    json!({
        "/bin/busybox": {
            "checksum": BUSYBOX_HASH,
            "size": 1000,
            "magic": "ELF 32-bit LSB executable, ARM",
            "name": "busybox",
            "realpath": "/unpack/rootfs/bin",
            "tags": ["elf", "static"],
            "scans": [
                {"offset": 0, "scanname": "elf", "size": 1000},
                {"offset": 512, "scanname": "gzip", "size": 100}
            ]
        },
        "/bin/sh": {
            "checksum": "",
            "size": 7,
            "magic": "symbolic link to `busybox'",
            "name": "sh",
            "realpath": "/unpack/rootfs/bin",
            "tags": ["symlink"]
        },
        "/etc/motd": {
            "checksum": MOTD_HASH,
            "size": 12,
            "magic": "ASCII text",
            "tags": ["text"]
        },
        "/etc/empty.conf": {
            "checksum": "",
            "size": 0,
            "tags": ["empty"]
        },
        "/var/log/boot.png": {
            "checksum": BOOT_PNG_HASH,
            "size": 300,
            "magic": "PNG image data",
            "tags": ["graphics", "png"]
        }
    })
}

fn hexdump_text() -> String {
    (0..HEXDUMP_LINES)
        .map(|i| format!("{:08x}  7f 45 4c 46 01 01 01 00  |.ELF<..>|\n", i * 16))
        .collect()
}

/// Members of a typical scan-result archive.
pub fn sample_members() -> Vec<(String, Vec<u8>)> {
    let manifest = serde_json::to_vec(&manifest_json()).unwrap();
    vec![
        ("scandata.json".to_string(), manifest),
        (
            format!("reports/{}-elfreport.html.gz", BUSYBOX_HASH),
            gzip(b"<h1>ELF</h1><img src=\"REPLACEME/logo.png\">"),
        ),
        (
            format!("reports/{}-functionmatches.html.gz", BUSYBOX_HASH),
            gzip(b"<h1>Functions</h1>"),
        ),
        (
            format!("reports/{}-hexdump.gz", BUSYBOX_HASH),
            gzip(hexdump_text().as_bytes()),
        ),
        (
            format!("reports/{}-names.gz", MOTD_HASH),
            gzip(b"raw names page"),
        ),
        (
            format!("reports/{}-unique.html.gz", MOTD_HASH),
            gzip(b"<p>unique</p>"),
        ),
        (format!("images/{}.png", BOOT_PNG_HASH), b"\x89PNG hashed".to_vec()),
        (
            format!("images/{}-piechart.png", BUSYBOX_HASH),
            b"\x89PNG pie".to_vec(),
        ),
        ("images/logo.png".to_string(), b"\x89PNG logo".to_vec()),
        ("data/rootfs/bin/busybox".to_string(), vec![0x7f, b'E', b'L', b'F']),
    ]
}

pub fn tar_bytes(members: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_slice())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

/// Write an archive into `dir`, gzip-compressed or plain.
pub fn write_archive(dir: &Path, name: &str, members: &[(String, Vec<u8>)], compressed: bool) -> PathBuf {
    let tar = tar_bytes(members);
    let bytes = if compressed { gzip(&tar) } else { tar };
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Write a `.tar.gz` made of two concatenated gzip members, split at `split`
/// bytes into the tar stream (as parallel compressors produce).
pub fn write_multi_member_archive(
    dir: &Path,
    name: &str,
    members: &[(String, Vec<u8>)],
    split: usize,
) -> PathBuf {
    let tar = tar_bytes(members);
    let mut bytes = gzip(&tar[..split]);
    bytes.extend(gzip(&tar[split..]));
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

pub fn sample_archive(dir: &Path) -> PathBuf {
    write_archive(dir, "scan.tar.gz", &sample_members(), true)
}

/// Number of entries left in a directory.
pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
