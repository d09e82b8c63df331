use std::io::Cursor;

use cabfile::{ArchiveReader, ArchiveWriter, CompressionType, WriteOptions};
use time::macros::datetime;

fn writer_with(ctype: CompressionType) -> ArchiveWriter {
    ArchiveWriter::with_options(WriteOptions::new().compression(ctype))
}

fn reopen(bytes: Vec<u8>) -> ArchiveReader<Cursor<Vec<u8>>> {
    ArchiveReader::new(Cursor::new(bytes)).unwrap()
}

#[test]
fn cabinet_with_one_small_uncompressed_text_file() {
    let original = lipsum::lipsum(500);
    let datetime = datetime!(2063-04-05 23:14:38);

    let mut writer = ArchiveWriter::new();
    {
        let member = writer
            .stage_member("lorem_ipsum.txt", original.as_bytes())
            .unwrap();
        member.set_datetime(datetime);
        member.set_is_read_only(true);
        member.set_is_system(true);
        member.set_is_archive(false);
    }
    let mut cabinet = reopen(writer.finalize().unwrap());
    {
        let file_entry = cabinet.get_file_entry("lorem_ipsum.txt").unwrap();
        assert_eq!(file_entry.datetime(), Some(datetime));
        assert!(file_entry.is_read_only());
        assert!(!file_entry.is_hidden());
        assert!(file_entry.is_system());
        assert!(!file_entry.is_archive());
    }
    let output = cabinet.read_member("lorem_ipsum.txt").unwrap();
    assert_eq!(String::from_utf8_lossy(&output), original);
}

#[test]
fn cabinet_with_one_small_mszipped_text_file() {
    let original = lipsum::lipsum(500);

    let mut writer = writer_with(CompressionType::MsZip);
    writer.stage_member("lorem_ipsum.txt", original.as_bytes()).unwrap();
    let mut cabinet = reopen(writer.finalize().unwrap());
    assert_eq!(
        cabinet.folder_entries().next().unwrap().compression_type(),
        CompressionType::MsZip
    );
    let output = cabinet.read_member("lorem_ipsum.txt").unwrap();
    assert_eq!(String::from_utf8_lossy(&output), original);
}

#[test]
fn cabinet_with_one_big_uncompressed_text_file() {
    let original = lipsum::lipsum(30000);

    let mut writer = ArchiveWriter::new();
    writer.stage_member("lorem_ipsum.txt", original.as_bytes()).unwrap();
    let cab_file = writer.finalize().unwrap();
    assert!(cab_file.len() > original.len());

    let mut cabinet = reopen(cab_file);
    {
        let folder = cabinet.folder_entries().next().unwrap();
        assert_eq!(folder.compression_type(), CompressionType::None);
        assert!(folder.num_data_blocks() > 1);
        assert_eq!(folder.uncompressed_size() as usize, original.len());
        let file = cabinet.file_entries().next().unwrap();
        assert_eq!(file.uncompressed_size() as usize, original.len());
    }
    let output = cabinet.read_member("lorem_ipsum.txt").unwrap();
    assert_eq!(output.len(), original.len());
    assert_eq!(String::from_utf8_lossy(&output), original);
}

#[test]
fn cabinet_with_one_big_mszipped_text_file() {
    let original = lipsum::lipsum(30000);

    let mut writer = writer_with(CompressionType::MsZip);
    writer.stage_member("lorem_ipsum.txt", original.as_bytes()).unwrap();
    let cab_file = writer.finalize().unwrap();
    assert!(cab_file.len() < original.len());

    let mut cabinet = reopen(cab_file);
    let output = cabinet.read_member("lorem_ipsum.txt").unwrap();
    assert_eq!(output.len(), original.len());
    assert_eq!(String::from_utf8_lossy(&output), original);
}

#[test]
fn cabinet_with_many_members_across_block_boundaries() {
    let members: Vec<(String, Vec<u8>)> = (0..40)
        .map(|index| {
            let text = lipsum::lipsum(200 * (index + 1));
            (format!("dir\\file{:02}.txt", index), text.into_bytes())
        })
        .collect();
    for ctype in [CompressionType::None, CompressionType::MsZip] {
        let mut writer = writer_with(ctype);
        for (name, data) in members.iter() {
            writer.stage_member(name.as_str(), data.clone()).unwrap();
        }
        let mut cabinet = reopen(writer.finalize().unwrap());
        let names: Vec<&str> =
            members.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(cabinet.list_members(), names);
        for (name, data) in members.iter() {
            assert_eq!(&cabinet.read_member(name).unwrap(), data);
        }
    }
}

fn random_data_roundtrip(num_bytes: usize, ctype: CompressionType) {
    use rand::{RngCore, SeedableRng};

    let mut original = vec![0; num_bytes];
    rand::rngs::SmallRng::from_entropy().fill_bytes(&mut original);

    let mut writer = writer_with(ctype);
    writer.stage_member("binary", original.clone()).unwrap();
    let mut cabinet = reopen(writer.finalize().unwrap());
    {
        let folder = cabinet.folder_entries().next().unwrap();
        assert_eq!(folder.compression_type(), ctype);
        assert!((folder.num_data_blocks() as usize) >= (num_bytes / 0x8000));
        let file = cabinet.file_entries().next().unwrap();
        assert_eq!(file.name(), "binary");
        assert_eq!(file.uncompressed_size() as usize, original.len());
    }
    assert_eq!(cabinet.read_member("binary").unwrap(), original);
}

#[test]
fn cabinet_with_one_small_uncompressed_binary_file() {
    random_data_roundtrip(10_000, CompressionType::None);
}

#[test]
fn cabinet_with_one_small_mszipped_binary_file() {
    random_data_roundtrip(10_000, CompressionType::MsZip);
}

#[test]
fn cabinet_with_one_big_uncompressed_binary_file() {
    random_data_roundtrip(1_000_000, CompressionType::None);
}

#[test]
fn cabinet_with_one_big_mszipped_binary_file() {
    random_data_roundtrip(1_000_000, CompressionType::MsZip);
}
