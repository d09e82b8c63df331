use std::io::Write;

use time::PrimitiveDateTime;

use crate::block::{self, DataBlock};
use crate::consts;
use crate::ctype::{default_codec, CodecFactory, CompressionType};
use crate::cursor::ByteWriter;
use crate::datetime::DosDateTime;
use crate::error::Result;
use crate::file::{validate_file_name, FileEntry};
use crate::folder::FolderEntry;
use crate::header::CabinetHeader;

/// The most decompressed data one folder can hold: 65,535 blocks of 32 KiB.
const MAX_FOLDER_STREAM_SIZE: u64 =
    consts::MAX_NUM_DATA_BLOCKS as u64 * consts::MAX_UNCOMPRESSED_BLOCK_SIZE as u64;

/// Options controlling how an [`ArchiveWriter`] lays out a new cabinet.
#[derive(Clone, Debug)]
pub struct WriteOptions {
    pub(crate) compression: CompressionType,
    pub(crate) cabinet_set_id: u16,
    pub(crate) reserve_data: Vec<u8>,
    pub(crate) codecs: CodecFactory,
}

impl Default for WriteOptions {
    fn default() -> WriteOptions {
        WriteOptions {
            compression: CompressionType::None,
            cabinet_set_id: 0,
            reserve_data: Vec::new(),
            codecs: default_codec,
        }
    }
}

impl WriteOptions {
    /// Returns the default options: stored (uncompressed) folders, set ID
    /// zero, no reserve data, and the built-in codecs.
    pub fn new() -> WriteOptions {
        WriteOptions::default()
    }

    /// Sets the compression used for members that do not choose their own.
    pub fn compression(mut self, ctype: CompressionType) -> WriteOptions {
        self.compression = ctype;
        self
    }

    /// Sets the cabinet set ID recorded in the header.
    pub fn cabinet_set_id(mut self, set_id: u16) -> WriteOptions {
        self.cabinet_set_id = set_id;
        self
    }

    /// Sets the header reserve data.  The meaning of this data is
    /// application-defined.  The data must be no more than 60,000 bytes
    /// long.
    pub fn reserve_data(mut self, data: Vec<u8>) -> WriteOptions {
        self.reserve_data = data;
        self
    }

    /// Sets the factory used to pick a codec for each folder.
    pub fn codecs(mut self, codecs: CodecFactory) -> WriteOptions {
        self.codecs = codecs;
        self
    }
}

/// A member staged for writing.  Returned by
/// [`ArchiveWriter::stage_member`] so that its metadata can be adjusted
/// before the cabinet is finalized.
#[derive(Clone, Debug)]
pub struct MemberBuilder {
    name: String,
    data: Vec<u8>,
    attributes: u16,
    datetime: DosDateTime,
    compression: Option<CompressionType>,
}

impl MemberBuilder {
    fn new(name: String, data: Vec<u8>) -> MemberBuilder {
        MemberBuilder {
            name,
            data,
            attributes: consts::ATTR_ARCH,
            datetime: DosDateTime::now(),
            compression: None,
        }
    }

    /// Returns the member's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the member's contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sets the datetime for this member.  In the CAB format, this
    /// "is typically considered the 'last modified' time in local time, but
    /// the actual definition is application-defined."
    ///
    /// The CAB file format only supports storing datetimes with years from
    /// 1980 to 2107 (inclusive), with a resolution of two seconds.  If the
    /// given datetime is outside this range/resolution, it will be
    /// clamped/rounded to the nearest legal value.
    ///
    /// By default, the datetime of a new member is the current UTC time.
    pub fn set_datetime(&mut self, datetime: PrimitiveDateTime) {
        self.datetime = DosDateTime::from_datetime(datetime);
    }

    /// Sets the raw DOS date and time words for this member.
    pub fn set_dos_datetime(&mut self, datetime: DosDateTime) {
        self.datetime = datetime;
    }

    /// Sets whether this member has the "read-only" attribute set.  This
    /// attribute is false by default.
    pub fn set_is_read_only(&mut self, is_read_only: bool) {
        self.set_attribute(consts::ATTR_READ_ONLY, is_read_only);
    }

    /// Sets whether this member has the "hidden" attribute set.  This
    /// attribute is false by default.
    pub fn set_is_hidden(&mut self, is_hidden: bool) {
        self.set_attribute(consts::ATTR_HIDDEN, is_hidden);
    }

    /// Sets whether this member has the "system file" attribute set.  This
    /// attribute is false by default.
    pub fn set_is_system(&mut self, is_system_file: bool) {
        self.set_attribute(consts::ATTR_SYSTEM, is_system_file);
    }

    /// Sets whether this member has the "archive" (modified since last
    /// backup) attribute set.  This attribute is true by default.
    pub fn set_is_archive(&mut self, is_archive: bool) {
        self.set_attribute(consts::ATTR_ARCH, is_archive);
    }

    /// Sets whether this member has the "execute after extraction" attribute
    /// set.  This attribute is false by default.
    pub fn set_is_exec(&mut self, is_exec: bool) {
        self.set_attribute(consts::ATTR_EXEC, is_exec);
    }

    /// Stores this member in a folder with the given compression instead of
    /// the writer's default.
    pub fn set_compression_type(&mut self, ctype: CompressionType) {
        self.compression = Some(ctype);
    }

    /// Replaces all attribute bits.  The "name is UTF" bit is recomputed
    /// from the name when the cabinet is written.
    pub(crate) fn set_attributes(&mut self, attributes: u16) {
        self.attributes = attributes;
    }

    fn set_attribute(&mut self, bit: u16, enable: bool) {
        if enable {
            self.attributes |= bit;
        } else {
            self.attributes &= !bit;
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum WriterState {
    Accumulating,
    Finalized,
}

/// Assembles a new cabinet from staged members.
///
/// Members are collected in memory; [`finalize`](ArchiveWriter::finalize)
/// then lays out and serializes the whole cabinet in one pass.  Once
/// finalized, the writer accepts no more members.
pub struct ArchiveWriter {
    options: WriteOptions,
    members: Vec<MemberBuilder>,
    state: WriterState,
}

impl Default for ArchiveWriter {
    fn default() -> ArchiveWriter {
        ArchiveWriter::new()
    }
}

impl ArchiveWriter {
    /// Creates an empty writer with the default options.
    pub fn new() -> ArchiveWriter {
        ArchiveWriter::with_options(WriteOptions::default())
    }

    /// Creates an empty writer with the given options.
    pub fn with_options(options: WriteOptions) -> ArchiveWriter {
        ArchiveWriter {
            options,
            members: Vec::new(),
            state: WriterState::Accumulating,
        }
    }

    /// Stages a member.  If a member with the same name is already staged it
    /// is replaced, and the new member moves to the end of the staging
    /// order.
    pub fn stage_member<S, D>(
        &mut self,
        name: S,
        data: D,
    ) -> Result<&mut MemberBuilder>
    where
        S: Into<String>,
        D: Into<Vec<u8>>,
    {
        if self.state == WriterState::Finalized {
            invalid_state!("Cannot stage members after the cabinet is finalized");
        }
        let name = name.into();
        let data = data.into();
        validate_file_name(&name)?;
        if data.len() as u64 > consts::MAX_FILE_SIZE as u64 {
            invalid_input!(
                "Member {:?} is too large ({} bytes; max is {} bytes)",
                name,
                data.len(),
                consts::MAX_FILE_SIZE
            );
        }
        let existing =
            self.members.iter().position(|member| member.name == name);
        if let Some(index) = existing {
            log::warn!("Replacing previously staged member {:?}", name);
            self.members.remove(index);
        } else if self.members.len() >= consts::MAX_NUM_FILES {
            invalid_input!(
                "Cabinet has too many files (max is {})",
                consts::MAX_NUM_FILES
            );
        }
        let index = self.members.len();
        self.members.push(MemberBuilder::new(name, data));
        Ok(&mut self.members[index])
    }

    /// Returns the names of the staged members, in staging order.
    pub fn staged_names(&self) -> Vec<&str> {
        self.members.iter().map(MemberBuilder::name).collect()
    }

    /// Returns the number of staged members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if no members are staged.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true once [`finalize`](ArchiveWriter::finalize) has
    /// succeeded.
    pub fn is_finalized(&self) -> bool {
        self.state == WriterState::Finalized
    }

    /// Serializes the staged members as a complete cabinet.  On error the
    /// writer stays open so that the caller may fix the problem and retry.
    pub fn finalize(&mut self) -> Result<Vec<u8>> {
        if self.state == WriterState::Finalized {
            invalid_state!("Cabinet has already been finalized");
        }
        let bytes = self.serialize()?;
        self.state = WriterState::Finalized;
        self.members.clear();
        Ok(bytes)
    }

    /// Finalizes the cabinet and writes it to `writer`.  Nothing is written
    /// unless serialization succeeds, and if writing fails the writer stays
    /// open with its members staged.
    pub fn finalize_into<W: Write>(&mut self, mut writer: W) -> Result<()> {
        self.finalize_with(|bytes| {
            writer.write_all(bytes)?;
            writer.flush()?;
            Ok(())
        })
    }

    /// Serializes the cabinet and hands the bytes to `sink`.  The writer is
    /// only marked finalized once `sink` succeeds.
    pub(crate) fn finalize_with<F>(&mut self, sink: F) -> Result<()>
    where
        F: FnOnce(&[u8]) -> Result<()>,
    {
        if self.state == WriterState::Finalized {
            invalid_state!("Cabinet has already been finalized");
        }
        let bytes = self.serialize()?;
        sink(&bytes)?;
        self.state = WriterState::Finalized;
        self.members.clear();
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        let reserve_size = self.options.reserve_data.len();
        if reserve_size > consts::MAX_HEADER_RESERVE_SIZE {
            invalid_input!(
                "Cabinet header reserve data is too large \
                 ({} bytes; max is {} bytes)",
                reserve_size,
                consts::MAX_HEADER_RESERVE_SIZE
            );
        }
        let (plans, placements) = plan_folders(
            &self.members,
            self.options.compression,
            MAX_FOLDER_STREAM_SIZE,
        )?;

        let mut streams: Vec<Vec<u8>> = plans
            .iter()
            .map(|plan| Vec::with_capacity(plan.size as usize))
            .collect();
        for (member, placement) in self.members.iter().zip(placements.iter()) {
            streams[placement.folder].extend_from_slice(&member.data);
        }
        let mut folder_blocks: Vec<Vec<DataBlock>> =
            Vec::with_capacity(plans.len());
        for (plan, stream) in plans.iter().zip(streams.iter()) {
            let mut codec = (self.options.codecs)(plan.compression_type)?;
            folder_blocks.push(block::frame_folder(stream, codec.as_mut())?);
        }

        let files: Vec<FileEntry> = self
            .members
            .iter()
            .zip(placements.iter())
            .map(|(member, placement)| {
                FileEntry::new(
                    member.name.clone(),
                    member.attributes,
                    member.datetime,
                    placement.folder as u16,
                    placement.offset,
                    member.data.len() as u32,
                )
            })
            .collect();

        let mut header = CabinetHeader::new(
            self.options.cabinet_set_id,
            self.options.reserve_data.clone(),
        );
        header.num_folders = plans.len() as u16;
        header.num_files = files.len() as u16;
        let file_table_offset = header.first_folder_offset() as u64
            + plans.len() as u64 * header.folder_entry_size() as u64;
        let mut offset = file_table_offset
            + files.iter().map(|file| file.serialized_size() as u64).sum::<u64>();
        let mut folders = Vec::with_capacity(plans.len());
        for (plan, blocks) in plans.iter().zip(folder_blocks.iter()) {
            folders.push(FolderEntry::new(
                plan.compression_type,
                offset as u32,
                blocks.len() as u16,
                plan.size,
            ));
            offset += blocks
                .iter()
                .map(|block| block.serialized_size() as u64)
                .sum::<u64>();
        }
        if offset > consts::MAX_TOTAL_CAB_SIZE as u64 {
            invalid_input!(
                "Cabinet would be too large ({} bytes; max is {} bytes)",
                offset,
                consts::MAX_TOTAL_CAB_SIZE
            );
        }
        header.first_file_offset = file_table_offset as u32;
        header.total_size = offset as u32;

        let mut writer = ByteWriter::new(Vec::with_capacity(offset as usize));
        header.write(&mut writer)?;
        for folder in folders.iter() {
            folder.write(&mut writer, header.folder_reserve_size as usize)?;
        }
        for file in files.iter() {
            file.write(&mut writer)?;
        }
        for block in folder_blocks.iter().flatten() {
            block.write(&mut writer)?;
        }
        debug_assert_eq!(writer.position(), offset);
        log::debug!(
            "Finalized cabinet: {} bytes, {} folders, {} files",
            offset,
            folders.len(),
            files.len()
        );
        Ok(writer.into_inner())
    }
}

/// One folder to be written: its compression and the length of its
/// decompressed stream.
#[derive(Debug)]
struct FolderPlan {
    compression_type: CompressionType,
    size: u64,
}

/// Where a member's data lands.
#[derive(Debug)]
struct Placement {
    folder: usize,
    offset: u32,
}

/// Groups members into folders, one open folder per compression type in
/// order of first use.  A folder is closed and a new one opened when the
/// next member would push it past `max_folder_size`.
fn plan_folders(
    members: &[MemberBuilder],
    default_compression: CompressionType,
    max_folder_size: u64,
) -> Result<(Vec<FolderPlan>, Vec<Placement>)> {
    let mut plans: Vec<FolderPlan> = Vec::new();
    let mut open: Vec<(CompressionType, usize)> = Vec::new();
    let mut placements = Vec::with_capacity(members.len());
    for member in members {
        let ctype = member.compression.unwrap_or(default_compression);
        let len = member.data.len() as u64;
        let slot = open.iter().position(|&(open_ctype, _)| open_ctype == ctype);
        let folder = match slot {
            Some(slot) if plans[open[slot].1].size + len <= max_folder_size => {
                open[slot].1
            }
            _ => {
                plans.push(FolderPlan { compression_type: ctype, size: 0 });
                let folder = plans.len() - 1;
                match slot {
                    Some(slot) => open[slot].1 = folder,
                    None => open.push((ctype, folder)),
                }
                folder
            }
        };
        let plan = &mut plans[folder];
        placements.push(Placement { folder, offset: plan.size as u32 });
        plan.size += len;
    }
    if plans.len() > consts::MAX_NUM_FOLDERS {
        invalid_input!(
            "Cabinet has too many folders ({}; max is {})",
            plans.len(),
            consts::MAX_NUM_FOLDERS
        );
    }
    Ok((plans, placements))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use time::macros::datetime;

    use super::{plan_folders, ArchiveWriter, MemberBuilder, WriteOptions};
    use crate::ctype::CompressionType;
    use crate::error::Error;
    use crate::reader::ArchiveReader;

    #[test]
    fn write_uncompressed_cabinet_with_one_file() {
        let mut writer = ArchiveWriter::new();
        writer
            .stage_member("hi.txt", b"Hello, world!\n".to_vec())
            .unwrap()
            .set_datetime(datetime!(1997-03-12 11:13:52));
        let output = writer.finalize().unwrap();
        let expected: &[u8] = b"MSCF\0\0\0\0\x59\0\0\0\0\0\0\0\
            \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x01\0\0\0\0\0\0\0\
            \x43\0\0\0\x01\0\0\0\
            \x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\x20\0hi.txt\0\
            \x4c\x1a\x2e\x7f\x0e\0\x0e\0Hello, world!\n";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn write_uncompressed_cabinet_with_two_files() {
        let dt = datetime!(2018-01-06 15:19:42);
        let mut writer = ArchiveWriter::new();
        writer.stage_member("hi.txt", "Hello, world!\n").unwrap().set_datetime(dt);
        writer.stage_member("bye.txt", "See you later!\n").unwrap().set_datetime(dt);
        let output = writer.finalize().unwrap();
        let expected: &[u8] = b"MSCF\0\0\0\0\x80\0\0\0\0\0\0\0\
            \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x02\0\0\0\0\0\0\0\
            \x5b\0\0\0\x01\0\0\0\
            \x0e\0\0\0\0\0\0\0\0\0\x26\x4c\x75\x7a\x20\0hi.txt\0\
            \x0f\0\0\0\x0e\0\0\0\0\0\x26\x4c\x75\x7a\x20\0bye.txt\0\
            \x1a\x54\x09\x35\x1d\0\x1d\0Hello, world!\nSee you later!\n";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn write_uncompressed_cabinet_with_non_ascii_filename() {
        let mut writer = ArchiveWriter::new();
        writer
            .stage_member("\u{2603}.txt", "Snowman!\n")
            .unwrap()
            .set_datetime(datetime!(1997-03-12 11:13:52));
        let output = writer.finalize().unwrap();
        let expected: &[u8] = b"MSCF\0\0\0\0\x55\0\0\0\0\0\0\0\
            \x2c\0\0\0\0\0\0\0\x03\x01\x01\0\x01\0\0\0\0\0\0\0\
            \x44\0\0\0\x01\0\0\0\
            \x09\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\xa0\0\xe2\x98\x83.txt\0\
            \x3d\x0f\x08\x56\x09\0\x09\0Snowman!\n";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn write_empty_cabinet() {
        let mut writer = ArchiveWriter::new();
        assert!(writer.is_empty());
        let output = writer.finalize().unwrap();
        assert_eq!(output.len(), 36);
        let cabinet = ArchiveReader::new(Cursor::new(output)).unwrap();
        assert!(cabinet.list_members().is_empty());
        assert_eq!(cabinet.folder_entries().len(), 0);
    }

    #[test]
    fn attributes_and_reserve_data_survive_reading() {
        let options = WriteOptions::new()
            .cabinet_set_id(0x4242)
            .reserve_data(b"reserved".to_vec());
        let mut writer = ArchiveWriter::with_options(options);
        {
            let member = writer.stage_member("sys.dat", vec![1, 2, 3]).unwrap();
            member.set_is_read_only(true);
            member.set_is_hidden(true);
            member.set_is_system(true);
            member.set_is_archive(false);
            member.set_is_exec(true);
        }
        let bytes = writer.finalize().unwrap();
        let mut cabinet = ArchiveReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(cabinet.header().set_id(), 0x4242);
        assert_eq!(cabinet.header().reserve_data(), b"reserved");
        let entry = cabinet.stat("sys.dat").unwrap();
        assert!(entry.is_read_only());
        assert!(entry.is_hidden());
        assert!(entry.is_system());
        assert!(!entry.is_archive());
        assert!(entry.is_exec());
        assert_eq!(cabinet.read_member("sys.dat").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn staging_after_finalize_is_invalid() {
        let mut writer = ArchiveWriter::new();
        writer.stage_member("a.txt", "a").unwrap();
        writer.finalize().unwrap();
        assert!(writer.is_finalized());
        assert!(matches!(
            writer.stage_member("b.txt", "b"),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(writer.finalize(), Err(Error::InvalidState(_))));
    }

    struct BrokenSink;

    impl std::io::Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_finalize_into_keeps_members_staged() {
        let mut writer = ArchiveWriter::new();
        writer.stage_member("a.txt", "a").unwrap();
        assert!(matches!(
            writer.finalize_into(BrokenSink),
            Err(Error::Io(_))
        ));
        assert!(!writer.is_finalized());
        assert_eq!(writer.staged_names(), vec!["a.txt"]);

        let mut output = Vec::new();
        writer.finalize_into(&mut output).unwrap();
        assert!(writer.is_finalized());
        let mut cabinet = ArchiveReader::new(Cursor::new(output)).unwrap();
        assert_eq!(cabinet.read_member("a.txt").unwrap(), b"a");
    }

    #[test]
    fn duplicate_name_replaces_earlier_member() {
        let mut writer = ArchiveWriter::new();
        writer.stage_member("a.txt", "first").unwrap();
        writer.stage_member("b.txt", "bee").unwrap();
        writer.stage_member("a.txt", "second").unwrap();
        assert_eq!(writer.staged_names(), vec!["b.txt", "a.txt"]);
        assert_eq!(writer.len(), 2);
        let bytes = writer.finalize().unwrap();
        let mut cabinet = ArchiveReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(cabinet.list_members(), vec!["b.txt", "a.txt"]);
        assert_eq!(cabinet.read_member("a.txt").unwrap(), b"second");
    }

    #[test]
    fn bad_names_and_reserve_data_are_rejected() {
        let mut writer = ArchiveWriter::new();
        assert!(matches!(
            writer.stage_member("", "x"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            writer.stage_member("x".repeat(300), "x"),
            Err(Error::InvalidInput(_))
        ));
        assert!(writer.is_empty());

        let options = WriteOptions::new().reserve_data(vec![0; 60_001]);
        let mut writer = ArchiveWriter::with_options(options);
        writer.stage_member("a.txt", "a").unwrap();
        assert!(matches!(writer.finalize(), Err(Error::InvalidInput(_))));
        assert!(!writer.is_finalized());
    }

    #[test]
    fn members_are_grouped_by_compression_type() {
        let options = WriteOptions::new().compression(CompressionType::MsZip);
        let mut writer = ArchiveWriter::with_options(options);
        writer.stage_member("one.txt", "one one one one\n").unwrap();
        writer
            .stage_member("raw.bin", vec![0xffu8; 100])
            .unwrap()
            .set_compression_type(CompressionType::None);
        writer.stage_member("two.txt", "two two two two\n").unwrap();
        let bytes = writer.finalize().unwrap();
        let mut cabinet = ArchiveReader::new(Cursor::new(bytes)).unwrap();
        let ctypes: Vec<CompressionType> = cabinet
            .folder_entries()
            .map(|folder| folder.compression_type())
            .collect();
        assert_eq!(ctypes, vec![CompressionType::MsZip, CompressionType::None]);
        assert_eq!(cabinet.list_members(), vec!["one.txt", "raw.bin", "two.txt"]);
        let two = cabinet.stat("two.txt").unwrap();
        assert_eq!(two.folder_index(), 0);
        assert_eq!(two.uncompressed_offset(), 16);
        assert_eq!(cabinet.read_member("raw.bin").unwrap(), vec![0xffu8; 100]);
        assert_eq!(
            cabinet.read_member("two.txt").unwrap(),
            b"two two two two\n"
        );
    }

    #[test]
    fn lzx_compression_is_unsupported_for_writing() {
        let ctype = CompressionType::Lzx(lzxd::WindowSize::KB32);
        let mut writer =
            ArchiveWriter::with_options(WriteOptions::new().compression(ctype));
        writer.stage_member("a.txt", "a").unwrap();
        assert!(matches!(
            writer.finalize(),
            Err(Error::UnsupportedCompression(_))
        ));
    }

    #[test]
    fn full_folders_are_split() {
        let members: Vec<MemberBuilder> = (0..5)
            .map(|i| MemberBuilder::new(format!("{}.bin", i), vec![0; 40]))
            .collect();
        let (plans, placements) =
            plan_folders(&members, CompressionType::None, 100).unwrap();
        let sizes: Vec<u64> = plans.iter().map(|plan| plan.size).collect();
        assert_eq!(sizes, vec![80, 80, 40]);
        let folders: Vec<(usize, u32)> = placements
            .iter()
            .map(|placement| (placement.folder, placement.offset))
            .collect();
        assert_eq!(folders, vec![(0, 0), (0, 40), (1, 0), (1, 40), (2, 0)]);
    }
}
