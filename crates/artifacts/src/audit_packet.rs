//! Deterministic audit-packet assembly (spec §4.8): "Audit packets are zip
//! bundles assembled deterministically (sorted entries, fixed mtime, gzip
//! level 9, `SHA256SUMS` at root)."

use std::io::Write;

use settld_codec::sha256_hex;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::ArtifactError;

/// The fixed mtime every entry in an audit packet carries, so that two
/// packets built from identical inputs produce byte-identical zips. Zip's
/// DOS-epoch timestamp floor is 1980-01-01.
fn fixed_mtime() -> DateTime {
    DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0).expect("1980-01-01 is a valid zip datetime")
}

/// One logical file going into the packet: a relative path and its bytes.
pub struct PacketEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Assembles `entries` plus a generated `SHA256SUMS` manifest into a
/// deterministic zip archive: entries are sorted by name before writing,
/// every entry (including `SHA256SUMS` itself) carries [`fixed_mtime`], and
/// compression is Deflate at the maximum level.
pub fn assemble_audit_packet(mut entries: Vec<PacketEntry>) -> Result<Vec<u8>, ArtifactError> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut checksums = String::new();
    for entry in &entries {
        let digest = sha256_hex(&entry.bytes)?;
        checksums.push_str(&format!("{digest}  {}\n", entry.name));
    }

    let mut buf = Vec::new();
    {
        let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9))
            .last_modified_time(fixed_mtime());

        for entry in &entries {
            writer.start_file(entry.name.clone(), options)?;
            writer.write_all(&entry.bytes)?;
        }
        writer.start_file("SHA256SUMS", options)?;
        writer.write_all(checksums.as_bytes())?;
        writer.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_zip::{safe_unzip, UnzipLimits};

    #[test]
    fn assembly_is_deterministic() {
        let build = || {
            assemble_audit_packet(vec![
                PacketEntry {
                    name: "b.json".to_string(),
                    bytes: b"{\"b\":1}".to_vec(),
                },
                PacketEntry {
                    name: "a.json".to_string(),
                    bytes: b"{\"a\":1}".to_vec(),
                },
            ])
            .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn contains_sha256sums_covering_every_entry() {
        let packet = assemble_audit_packet(vec![PacketEntry {
            name: "statement.json".to_string(),
            bytes: b"{\"payoutCents\":100}".to_vec(),
        }])
        .unwrap();
        let entries = safe_unzip(&packet, UnzipLimits::default()).unwrap();
        let sums = entries
            .iter()
            .find(|e| e.path.to_string_lossy() == "SHA256SUMS")
            .expect("SHA256SUMS present");
        let text = String::from_utf8(sums.bytes.clone()).unwrap();
        assert!(text.contains("statement.json"));
    }

    #[test]
    fn entries_are_sorted_regardless_of_input_order() {
        let packet = assemble_audit_packet(vec![
            PacketEntry {
                name: "z.json".to_string(),
                bytes: b"{}".to_vec(),
            },
            PacketEntry {
                name: "a.json".to_string(),
                bytes: b"{}".to_vec(),
            },
        ])
        .unwrap();
        let entries = safe_unzip(&packet, UnzipLimits::default()).unwrap();
        let names: Vec<String> = entries
            .iter()
            .map(|e| e.path.to_string_lossy().to_string())
            .filter(|n| n != "SHA256SUMS")
            .collect();
        assert_eq!(names, vec!["a.json".to_string(), "z.json".to_string()]);
    }
}
