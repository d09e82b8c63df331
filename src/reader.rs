use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use crate::block::{self, ChecksumPolicy, IntegrityGap};
use crate::consts;
use crate::ctype::{default_codec, CodecFactory};
use crate::cursor::ByteReader;
use crate::error::{Error, Result};
use crate::extract;
use crate::file::{parse_file_entry, FileEntries, FileEntry};
use crate::folder::{parse_folder_entry, FolderEntries, FolderEntry};
use crate::header::CabinetHeader;

/// Options controlling how an [`ArchiveReader`] decodes data blocks.
#[derive(Clone, Copy, Debug)]
pub struct ReadOptions {
    pub(crate) checksum_policy: ChecksumPolicy,
    pub(crate) cache_folders: bool,
    pub(crate) codecs: CodecFactory,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions {
            checksum_policy: ChecksumPolicy::Strict,
            cache_folders: true,
            codecs: default_codec,
        }
    }
}

impl ReadOptions {
    /// Returns the default options: strict checksums, folder caching on,
    /// and the built-in codecs.
    pub fn new() -> ReadOptions {
        ReadOptions::default()
    }

    /// Sets what happens when a data block fails its checksum.
    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> ReadOptions {
        self.checksum_policy = policy;
        self
    }

    /// Sets whether a folder's decompressed stream is kept after the first
    /// read so that later reads from the same folder skip decoding.
    pub fn cache_folders(mut self, cache: bool) -> ReadOptions {
        self.cache_folders = cache;
        self
    }

    /// Sets the factory used to pick a codec for each folder.
    pub fn codecs(mut self, codecs: CodecFactory) -> ReadOptions {
        self.codecs = codecs;
        self
    }
}

/// A random-access, read-only view of a cabinet.
///
/// The header, folder table, and file table are parsed when the reader is
/// created; data blocks are decoded only when a member is read.
pub struct ArchiveReader<R> {
    reader: ByteReader<R>,
    base: u64,
    header: CabinetHeader,
    folders: Vec<FolderEntry>,
    files: Vec<FileEntry>,
    options: ReadOptions,
    cache: HashMap<usize, Vec<u8>>,
    gaps: Vec<IntegrityGap>,
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Opens a cabinet with the default options.  The cabinet starts at the
    /// current position of `reader`, so a cabinet embedded in a larger file
    /// can be opened by seeking to it first.
    pub fn new(reader: R) -> Result<ArchiveReader<R>> {
        ArchiveReader::with_options(reader, ReadOptions::default())
    }

    /// Opens a cabinet with the given options.
    pub fn with_options(
        mut reader: R,
        options: ReadOptions,
    ) -> Result<ArchiveReader<R>> {
        let base = reader.stream_position()?;
        let mut reader = ByteReader::new(reader, base);
        let header = CabinetHeader::parse(&mut reader)?;
        let stream_len = reader.stream_len()?;
        let cabinet_end = base + header.total_size as u64;
        if stream_len < cabinet_end {
            format_error!(
                "Cabinet declares {} bytes but only {} are present",
                header.total_size,
                stream_len.saturating_sub(base)
            );
        }
        let folder_reserve_size = header.folder_reserve_size as usize;
        let mut folders = Vec::with_capacity(header.num_folders as usize);
        for _ in 0..header.num_folders {
            folders.push(parse_folder_entry(&mut reader, folder_reserve_size)?);
        }
        reader.seek_to(base + header.first_file_offset as u64)?;
        let mut files = Vec::with_capacity(header.num_files as usize);
        for index in 0..header.num_files {
            let entry = parse_file_entry(&mut reader)?;
            if entry.folder_index as usize >= folders.len() {
                if entry.folder_index >= consts::FOLDER_CONTINUED_FROM_PREV {
                    format_error!(
                        "File {:?} continues into another cabinet",
                        entry.name()
                    );
                }
                format_error!(
                    "File entry {} refers to folder {}, but the cabinet has \
                     only {} folders",
                    index,
                    entry.folder_index,
                    folders.len()
                );
            }
            files.push(entry);
        }
        let data_reserve_size = header.data_reserve_size as usize;
        for folder in folders.iter_mut() {
            let size = block::scan_folder(
                &mut reader,
                base,
                folder,
                data_reserve_size,
                cabinet_end,
            )?;
            folder.set_uncompressed_size(size);
        }
        for file in files.iter() {
            let folder = &folders[file.folder_index as usize];
            let end = file.uncompressed_offset as u64
                + file.uncompressed_size() as u64;
            if end > folder.uncompressed_size() {
                format_error!(
                    "File {:?} ends at offset {} of folder {}, which holds \
                     only {} bytes",
                    file.name(),
                    end,
                    file.folder_index,
                    folder.uncompressed_size()
                );
            }
        }
        log::debug!(
            "Opened cabinet at offset {}: {} bytes, {} folders, {} files",
            base,
            header.total_size,
            folders.len(),
            files.len()
        );
        Ok(ArchiveReader {
            reader,
            base,
            header,
            folders,
            files,
            options,
            cache: HashMap::new(),
            gaps: Vec::new(),
        })
    }

    /// Returns the parsed cabinet header.
    pub fn header(&self) -> &CabinetHeader {
        &self.header
    }

    /// Returns an iterator over the folder entries in this cabinet.
    pub fn folder_entries(&self) -> FolderEntries<'_> {
        FolderEntries { iter: self.folders.iter() }
    }

    /// Returns an iterator over the file entries in file-table order.
    pub fn file_entries(&self) -> FileEntries<'_> {
        FileEntries { iter: self.files.iter() }
    }

    /// Returns the member names in file-table order.  A name that appears
    /// in several records is listed once per record.
    pub fn list_members(&self) -> Vec<&str> {
        self.files.iter().map(FileEntry::name).collect()
    }

    /// Returns the entry for the member with the given name, if any.  When
    /// several records share the name, the last one wins.
    pub fn get_file_entry(&self, name: &str) -> Option<&FileEntry> {
        self.find_file(name).map(|index| &self.files[index])
    }

    /// Like [`get_file_entry`](ArchiveReader::get_file_entry), but fails
    /// with [`Error::MemberNotFound`] if there is no such member.
    pub fn stat(&self, name: &str) -> Result<&FileEntry> {
        self.get_file_entry(name)
            .ok_or_else(|| Error::MemberNotFound(name.to_string()))
    }

    /// Returns the decompressed contents of the named member.
    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        match self.find_file(name) {
            Some(index) => self.read_file_at(index),
            None => Err(Error::MemberNotFound(name.to_string())),
        }
    }

    /// Returns the whole decompressed stream of the folder at `index`.
    pub fn read_folder(&mut self, index: usize) -> Result<Vec<u8>> {
        if index >= self.folders.len() {
            invalid_input!(
                "Folder index {} is out of range (cabinet has {} folders)",
                index,
                self.folders.len()
            );
        }
        Ok(self.folder_stream(index)?.into_owned())
    }

    /// Writes the named member below `dest_dir` and returns the path that
    /// was written.  Names that would land outside `dest_dir` are rejected
    /// before anything is written.
    pub fn extract_member<P: AsRef<Path>>(
        &mut self,
        name: &str,
        dest_dir: P,
    ) -> Result<PathBuf> {
        let dest_dir = dest_dir.as_ref();
        extract::destination_path(dest_dir, name)?;
        let data = self.read_member(name)?;
        extract::write_member(dest_dir, name, &data)
    }

    /// Extracts every member below `dest_dir`, in file-table order, and
    /// returns the paths written.  Stops at the first member that cannot be
    /// read or whose name is unsafe.
    pub fn extract_all<P: AsRef<Path>>(
        &mut self,
        dest_dir: P,
    ) -> Result<Vec<PathBuf>> {
        let dest_dir = dest_dir.as_ref();
        for file in self.files.iter() {
            extract::destination_path(dest_dir, file.name())?;
        }
        let mut paths = Vec::with_capacity(self.files.len());
        for index in 0..self.files.len() {
            let data = self.read_file_at(index)?;
            let name = self.files[index].name();
            paths.push(extract::write_member(dest_dir, name, &data)?);
        }
        Ok(paths)
    }

    /// Returns the damaged blocks encountered so far under
    /// [`ChecksumPolicy::Ignore`].
    pub fn integrity_gaps(&self) -> &[IntegrityGap] {
        &self.gaps
    }

    /// Consumes the reader, dropping any cached folder data, and returns the
    /// underlying stream.
    pub fn close(self) -> R {
        self.reader.into_inner()
    }

    fn find_file(&self, name: &str) -> Option<usize> {
        self.files.iter().rposition(|file| file.name() == name)
    }

    fn read_file_at(&mut self, index: usize) -> Result<Vec<u8>> {
        let file = &self.files[index];
        let folder_index = file.folder_index as usize;
        let start = file.uncompressed_offset as usize;
        let end = start + file.uncompressed_size() as usize;
        let stream = self.folder_stream(folder_index)?;
        match stream.get(start..end) {
            Some(data) => Ok(data.to_vec()),
            None => format_error!(
                "Folder {} decoded to {} bytes, too short for a member \
                 ending at offset {}",
                folder_index,
                stream.len(),
                end
            ),
        }
    }

    fn folder_stream(&mut self, index: usize) -> Result<Cow<'_, [u8]>> {
        if !self.options.cache_folders {
            return Ok(Cow::Owned(self.decode_folder(index)?));
        }
        if !self.cache.contains_key(&index) {
            let data = self.decode_folder(index)?;
            self.cache.insert(index, data);
        }
        Ok(Cow::Borrowed(self.cache[&index].as_slice()))
    }

    fn decode_folder(&mut self, index: usize) -> Result<Vec<u8>> {
        let folder = &self.folders[index];
        let mut codec = (self.options.codecs)(folder.compression_type())?;
        let mut gaps = Vec::new();
        let data = block::decode_folder(
            &mut self.reader,
            self.base,
            index,
            folder,
            self.header.data_reserve_size as usize,
            codec.as_mut(),
            self.options.checksum_policy,
            &mut gaps,
        )?;
        for gap in gaps {
            if !self.gaps.contains(&gap) {
                self.gaps.push(gap);
            }
        }
        log::debug!(
            "Decoded folder {} ({}, {} blocks, {} bytes)",
            index,
            folder.compression_type(),
            folder.num_data_blocks(),
            data.len()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Seek, SeekFrom};

    use time::macros::datetime;

    use super::{ArchiveReader, ReadOptions};
    use crate::block::ChecksumPolicy;
    use crate::ctype::CompressionType;
    use crate::error::Error;

    const ONE_FILE: &[u8] = b"MSCF\0\0\0\0\x59\0\0\0\0\0\0\0\
        \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x01\0\0\0\x34\x12\0\0\
        \x43\0\0\0\x01\0\0\0\
        \x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\x01\0hi.txt\0\
        \x4c\x1a\x2e\x7f\x0e\0\x0e\0Hello, world!\n";

    const TWO_FILES: &[u8] = b"MSCF\0\0\0\0\x80\0\0\0\0\0\0\0\
        \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x02\0\0\0\x34\x12\0\0\
        \x5b\0\0\0\x01\0\0\0\
        \x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xe7\x59\x01\0hi.txt\0\
        \x0f\0\0\0\x0e\0\0\0\0\0\x6c\x22\xe7\x59\x01\0bye.txt\0\
        \0\0\0\0\x1d\0\x1d\0Hello, world!\nSee you later!\n";

    fn open(bytes: &[u8]) -> ArchiveReader<Cursor<&[u8]>> {
        ArchiveReader::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn read_uncompressed_cabinet_with_one_file() {
        assert_eq!(ONE_FILE.len(), 0x59);
        let mut cabinet = open(ONE_FILE);
        assert_eq!(cabinet.header().set_id(), 0x1234);
        assert_eq!(cabinet.header().set_index(), 0);
        assert_eq!(cabinet.header().reserve_data(), &[] as &[u8]);
        assert_eq!(cabinet.folder_entries().len(), 1);
        {
            let file = cabinet.stat("hi.txt").unwrap();
            assert_eq!(file.name(), "hi.txt");
            assert!(!file.is_name_utf());
            assert!(file.is_read_only());
            assert_eq!(file.datetime(), Some(datetime!(1997-03-12 11:13:52)));
        }
        assert_eq!(cabinet.read_folder(0).unwrap(), b"Hello, world!\n");
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");
    }

    #[test]
    fn read_uncompressed_cabinet_with_two_files() {
        assert_eq!(TWO_FILES.len(), 0x80);
        let mut cabinet = open(TWO_FILES);
        assert_eq!(cabinet.list_members(), vec!["hi.txt", "bye.txt"]);
        assert_eq!(
            cabinet.read_folder(0).unwrap(),
            b"Hello, world!\nSee you later!\n"
        );
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");
        assert_eq!(
            cabinet.read_member("bye.txt").unwrap(),
            b"See you later!\n"
        );
        assert_eq!(cabinet.folder_entries().next().unwrap().uncompressed_size(), 29);
    }

    #[test]
    fn read_uncompressed_cabinet_with_two_data_blocks() {
        let binary: &[u8] = b"MSCF\0\0\0\0\x61\0\0\0\0\0\0\0\
            \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x01\0\0\0\x34\x12\0\0\
            \x43\0\0\0\x02\0\0\0\
            \x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\x01\0hi.txt\0\
            \0\0\0\0\x06\0\x06\0Hello,\
            \0\0\0\0\x08\0\x08\0 world!\n";
        assert_eq!(binary.len(), 0x61);
        let mut cabinet = open(binary);
        assert_eq!(cabinet.folder_entries().next().unwrap().num_data_blocks(), 2);
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");
    }

    #[test]
    fn read_mszip_cabinet_with_two_files() {
        let binary: &[u8] = b"MSCF\0\0\0\0\x88\0\0\0\0\0\0\0\
            \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x02\0\0\0\x34\x12\0\0\
            \x5b\0\0\0\x01\0\x01\0\
            \x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xe7\x59\x01\0hi.txt\0\
            \x0f\0\0\0\x0e\0\0\0\0\0\x6c\x22\xe7\x59\x01\0bye.txt\0\
            \0\0\0\0\x25\0\x1d\0CK\xf3H\xcd\xc9\xc9\xd7Q(\xcf/\xcaIQ\xe4\
            \nNMU\xa8\xcc/U\xc8I,I-R\xe4\x02\x00\x93\xfc\t\x91";
        assert_eq!(binary.len(), 0x88);
        let mut cabinet = open(binary);
        assert_eq!(
            cabinet.folder_entries().next().unwrap().compression_type(),
            CompressionType::MsZip
        );
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");
        assert_eq!(
            cabinet.read_member("bye.txt").unwrap(),
            b"See you later!\n"
        );
    }

    #[test]
    fn read_lzx_cabinet_with_two_files() {
        let binary: &[u8] =
            b"\x4d\x53\x43\x46\x00\x00\x00\x00\x97\x00\x00\x00\x00\x00\x00\
            \x00\x2c\x00\x00\x00\x00\x00\x00\x00\x03\x01\x01\x00\x02\x00\
            \x00\x00\x2d\x05\x00\x00\x5b\x00\x00\x00\x01\x00\x03\x13\x0f\
            \x00\x00\x00\x00\x00\x00\x00\x00\x00\x21\x53\x0d\xb2\x20\x00\
            \x68\x69\x2e\x74\x78\x74\x00\x10\x00\x00\x00\x0f\x00\x00\x00\
            \x00\x00\x21\x53\x0b\xb2\x20\x00\x62\x79\x65\x2e\x74\x78\x74\
            \x00\x5c\xef\x2a\xc7\x34\x00\x1f\x00\x5b\x80\x80\x8d\x00\x30\
            \xf0\x01\x10\x00\x00\x00\x01\x00\x00\x00\x01\x00\x00\x00\x48\
            \x65\x6c\x6c\x6f\x2c\x20\x77\x6f\x72\x6c\x64\x21\x0d\x0a\x53\
            \x65\x65\x20\x79\x6f\x75\x20\x6c\x61\x74\x65\x72\x21\x0d\x0a\
            \x00";
        assert_eq!(binary.len(), 0x97);
        let mut cabinet = open(binary);
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\r\n");
        assert_eq!(
            cabinet.read_member("bye.txt").unwrap(),
            b"See you later!\r\n"
        );
    }

    #[test]
    fn read_uncompressed_cabinet_with_non_ascii_filename() {
        let binary: &[u8] = b"MSCF\0\0\0\0\x55\0\0\0\0\0\0\0\
            \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x01\0\0\0\0\0\0\0\
            \x44\0\0\0\x01\0\0\0\
            \x09\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\xa0\0\xe2\x98\x83.txt\0\
            \x3d\x0f\x08\x56\x09\0\x09\0Snowman!\n";
        assert_eq!(binary.len(), 0x55);
        let mut cabinet = open(binary);
        assert!(cabinet.stat("\u{2603}.txt").unwrap().is_name_utf());
        assert_eq!(cabinet.read_member("\u{2603}.txt").unwrap(), b"Snowman!\n");
    }

    #[test]
    fn read_cabinet_embedded_after_other_data() {
        let mut binary = b"MZ stub\0".to_vec();
        binary.extend_from_slice(ONE_FILE);
        let mut cursor = Cursor::new(binary);
        cursor.seek(SeekFrom::Start(8)).unwrap();
        let mut cabinet = ArchiveReader::new(cursor).unwrap();
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");
        assert_eq!(cabinet.close().position(), 8 + 0x59);
    }

    #[test]
    fn missing_member() {
        let mut cabinet = open(ONE_FILE);
        assert!(cabinet.get_file_entry("missing.txt").is_none());
        match cabinet.read_member("missing.txt") {
            Err(Error::MemberNotFound(name)) => assert_eq!(name, "missing.txt"),
            other => panic!("expected MemberNotFound, got {:?}", other),
        }
        assert!(matches!(
            cabinet.stat("missing.txt"),
            Err(Error::MemberNotFound(_))
        ));
        assert!(matches!(cabinet.read_folder(1), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn truncated_cabinet_fails_at_open() {
        for len in [0x20, 0x40, 0x50, 0x58] {
            match ArchiveReader::new(Cursor::new(&ONE_FILE[..len])) {
                Err(Error::Format(_)) => {}
                Err(other) => panic!("len {}: unexpected error {:?}", len, other),
                Ok(_) => panic!("len {}: truncated cabinet was accepted", len),
            }
        }
    }

    #[test]
    fn folder_index_out_of_range() {
        let mut binary = ONE_FILE.to_vec();
        binary[0x34] = 1; // folder index of hi.txt
        assert!(matches!(
            ArchiveReader::new(Cursor::new(binary)),
            Err(Error::Format(_))
        ));
        let mut binary = ONE_FILE.to_vec();
        binary[0x34] = 0xfd;
        binary[0x35] = 0xff;
        assert!(matches!(
            ArchiveReader::new(Cursor::new(binary)),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn member_past_end_of_folder() {
        let mut binary = ONE_FILE.to_vec();
        binary[0x2c] = 0x0f; // uncompressed size of hi.txt
        assert!(matches!(
            ArchiveReader::new(Cursor::new(binary)),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn checksum_mismatch_under_each_policy() {
        let mut binary = ONE_FILE.to_vec();
        binary[0x4b] ^= 0x20; // "hello" instead of "Hello"
        let mut cabinet = open(&binary);
        assert!(matches!(
            cabinet.read_member("hi.txt"),
            Err(Error::Integrity { folder: 0, block: 0, .. })
        ));

        let options =
            ReadOptions::new().checksum_policy(ChecksumPolicy::Ignore);
        let mut cabinet =
            ArchiveReader::with_options(Cursor::new(&binary[..]), options)
                .unwrap();
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"hello, world!\n");
        assert_eq!(cabinet.integrity_gaps().len(), 1);
        assert_eq!(cabinet.integrity_gaps()[0].range, 0..14);
    }

    #[test]
    fn read_cabinet_with_data_block_reserve() {
        let binary: &[u8] = b"MSCF\0\0\0\0\x60\0\0\0\0\0\0\0\
            \x30\0\0\0\0\0\0\0\x03\x01\x01\0\x01\0\x04\0\x34\x12\0\0\
            \0\0\0\x03\
            \x47\0\0\0\x01\0\0\0\
            \x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\x01\0hi.txt\0\
            \x4f\x18\x2f\x7f\x0e\0\x0e\0\x01\x02\x03Hello, world!\n";
        assert_eq!(binary.len(), 0x60);
        let mut cabinet = open(binary);
        assert_eq!(cabinet.header().data_reserve_size, 3);
        assert_eq!(cabinet.folder_entries().next().unwrap().uncompressed_size(), 14);
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");

        let mut damaged = binary.to_vec();
        damaged[0x51] ^= 0x01; // last reserve byte
        let mut cabinet = open(&damaged);
        match cabinet.read_member("hi.txt") {
            Err(Error::Integrity { folder: 0, block: 0, expected, actual }) => {
                assert_eq!(expected, 0x7f2f184f);
                assert_eq!(actual, 0x7f2f184e);
            }
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn uncached_reads_decode_each_time() {
        let options = ReadOptions::new().cache_folders(false);
        let mut cabinet =
            ArchiveReader::with_options(Cursor::new(TWO_FILES), options)
                .unwrap();
        assert_eq!(cabinet.read_member("bye.txt").unwrap(), b"See you later!\n");
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"Hello, world!\n");
        assert!(cabinet.cache.is_empty());
    }

    #[test]
    fn duplicate_names_resolve_to_last_record() {
        let mut binary = TWO_FILES.to_vec();
        binary[0x53..0x5b].copy_from_slice(b"hi.txt\0\0");
        let mut cabinet = open(&binary);
        assert_eq!(cabinet.list_members(), vec!["hi.txt", "hi.txt"]);
        assert_eq!(cabinet.stat("hi.txt").unwrap().uncompressed_offset(), 14);
        assert_eq!(cabinet.read_member("hi.txt").unwrap(), b"See you later!\n");
    }

    #[test]
    fn parsing_twice_yields_identical_tables() {
        let first = open(TWO_FILES);
        let second = open(TWO_FILES);
        assert_eq!(first.header(), second.header());
        assert!(first.folder_entries().eq(second.folder_entries()));
        assert!(first.file_entries().eq(second.file_entries()));
    }
}
