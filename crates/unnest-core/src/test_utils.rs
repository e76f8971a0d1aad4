//! Test utilities for building archives in memory.
//!
//! Used by the unit tests, the integration tests, the benchmark and the CLI
//! tests. Not part of the supported API.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Creates an in-memory TAR archive from a list of `(path, content)` entries.
///
/// # Examples
///
/// ```
/// use unnest_core::test_utils::create_test_tar;
///
/// let tar_data = create_test_tar(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_tar(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(TarTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Creates an in-memory ZIP archive from a list of `(path, content)` entries.
///
/// # Examples
///
/// ```
/// use unnest_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(ZipTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Gzip-compresses `data`.
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Builder for TAR test archives with various entry types.
///
/// # Examples
///
/// ```
/// use unnest_core::test_utils::TarTestBuilder;
///
/// let tar_gz = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_symlink("link", "file.txt")
///     .build_gz();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mtime(path, data, 0)
    }

    /// Adds a regular file with a recorded modification time.
    #[must_use]
    pub fn add_file_with_mtime(mut self, path: &str, data: &[u8], mtime: u64) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mtime(path, 0)
    }

    /// Adds a directory with a recorded modification time.
    #[must_use]
    pub fn add_directory_with_mtime(mut self, path: &str, mtime: u64) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_mtime(mtime);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Symlink, 0o777)
    }

    /// Adds a hardlink to an earlier member.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Link, 0o644)
    }

    fn add_link(mut self, path: &str, target: &str, kind: tar::EntryType, mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(mode);
        header.set_entry_type(kind);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a FIFO member.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Fifo);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a regular file whose stored name is written verbatim.
    ///
    /// `tar::Builder` refuses names such as `../x`, so the header is filled
    /// in by hand. `name` must fit the 100-byte header field.
    #[must_use]
    pub fn add_raw_name_file(mut self, name: &[u8], data: &[u8]) -> Self {
        let mut header = tar::Header::new_old();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Builds the TAR archive.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }

    /// Builds the TAR archive and gzip-compresses it.
    #[must_use]
    pub fn build_gz(self) -> Vec<u8> {
        gzip(&self.build())
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ZIP test archives written with the `zip` crate.
///
/// # Examples
///
/// ```
/// use unnest_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a deflated regular file.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a regular file with the given DOS modification time
    /// `(year, month, day, hour, minute, second)`.
    #[must_use]
    pub fn add_file_with_time(
        mut self,
        path: &str,
        data: &[u8],
        (year, month, day, hour, minute, second): (u16, u8, u8, u8, u8, u8),
    ) -> Self {
        use zip::write::SimpleFileOptions;

        let time = zip::DateTime::from_date_and_time(year, month, day, hour, minute, second)
            .unwrap();
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .last_modified_time(time);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Builds the ZIP archive.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// DOS timestamp written by [`RawZipBuilder`]: 2023-01-15 10:30:00.
const RAW_DOS_TIME: u16 = (10 << 11) | (30 << 5);
const RAW_DOS_DATE: u16 = ((2023 - 1980) << 9) | (1 << 5) | 15;

/// Writes stored ZIP archives byte by byte.
///
/// Entry names are emitted exactly as given and the UTF-8 flag is never set,
/// which the `zip` writer does not allow. Used for legacy-encoded names and
/// hostile names like `../evil.txt`.
#[derive(Default)]
pub struct RawZipBuilder {
    body: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl RawZipBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored file with a raw name.
    #[must_use]
    pub fn add_file(mut self, name: &[u8], data: &[u8]) -> Self {
        let mut crc = flate2::Crc::new();
        crc.update(data);
        let crc = crc.sum();
        let offset = u32::try_from(self.body.len()).unwrap();
        let name_len = u16::try_from(name.len()).unwrap();
        let size = u32::try_from(data.len()).unwrap();

        // Local file header
        put_u32(&mut self.body, 0x0403_4b50);
        put_u16(&mut self.body, 20);
        put_u16(&mut self.body, 0);
        put_u16(&mut self.body, 0);
        put_u16(&mut self.body, RAW_DOS_TIME);
        put_u16(&mut self.body, RAW_DOS_DATE);
        put_u32(&mut self.body, crc);
        put_u32(&mut self.body, size);
        put_u32(&mut self.body, size);
        put_u16(&mut self.body, name_len);
        put_u16(&mut self.body, 0);
        self.body.extend_from_slice(name);
        self.body.extend_from_slice(data);

        // Central directory header
        put_u32(&mut self.central, 0x0201_4b50);
        put_u16(&mut self.central, 20);
        put_u16(&mut self.central, 20);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, RAW_DOS_TIME);
        put_u16(&mut self.central, RAW_DOS_DATE);
        put_u32(&mut self.central, crc);
        put_u32(&mut self.central, size);
        put_u32(&mut self.central, size);
        put_u16(&mut self.central, name_len);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u32(&mut self.central, 0);
        put_u32(&mut self.central, offset);
        self.central.extend_from_slice(name);

        self.count += 1;
        self
    }

    /// Builds the archive.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut out = self.body;
        let central_offset = u32::try_from(out.len()).unwrap();
        let central_size = u32::try_from(self.central.len()).unwrap();
        out.extend_from_slice(&self.central);

        // End of central directory record
        put_u32(&mut out, 0x0605_4b50);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.count);
        put_u16(&mut out, self.count);
        put_u32(&mut out, central_size);
        put_u32(&mut out, central_offset);
        put_u16(&mut out, 0);
        out
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
