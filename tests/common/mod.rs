#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

/// Builds odc archives byte by byte for tests.
#[derive(Default)]
pub struct OdcBuilder {
    bytes: Vec<u8>,
    next_ino: u32,
}

impl OdcBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, 0o100644, 1_700_000_000, data)
    }

    pub fn dir(self, name: &str) -> Self {
        self.entry(name, 0o040755, 1_700_000_000, b"")
    }

    pub fn entry(mut self, name: &str, mode: u32, mtime: u64, data: &[u8]) -> Self {
        self.next_ino += 1;
        self.bytes.extend_from_slice(b"070707");
        for v in [0o777, self.next_ino, mode, 1000, 1000, 1, 0] {
            self.bytes.extend_from_slice(format!("{v:06o}").as_bytes());
        }
        self.bytes.extend_from_slice(format!("{mtime:011o}").as_bytes());
        self.bytes.extend_from_slice(format!("{:06o}", name.len() + 1).as_bytes());
        self.bytes.extend_from_slice(format!("{:011o}", data.len()).as_bytes());
        self.bytes.extend_from_slice(name.as_bytes());
        self.bytes.push(0);
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn trailer(self) -> Self {
        self.entry("TRAILER!!!", 0, 0, b"")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}
