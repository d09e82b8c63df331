use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cabfile::{
    ArchiveReader, CabFile, ChecksumPolicy, CompressionType, FileEntry,
    FolderEntry, Mode, ReadOptions,
};
use clap::{Parser, Subcommand, ValueEnum};

/// Manipulates CAB files
#[derive(Parser)]
#[command(name = "cabtool", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Concatenates and prints members
    Cat {
        cab: PathBuf,
        files: Vec<String>,
    },
    /// Creates a new cabinet
    Create {
        /// Sets compression type
        #[arg(short, long, value_enum, default_value = "mszip")]
        compress: Compression,
        /// Sets output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        files: Vec<PathBuf>,
    },
    /// Extracts members into a directory
    Extract {
        cab: PathBuf,
        /// Sets destination directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Extracts damaged blocks instead of failing on checksum errors
        #[arg(long)]
        ignore_checksums: bool,
    },
    /// Prints the header and folder table
    Info { cab: PathBuf },
    /// Lists files in the cabinet
    Ls {
        /// Lists in long format
        #[arg(short, long)]
        long: bool,
        cab: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Compression {
    None,
    Mszip,
}

impl From<Compression> for CompressionType {
    fn from(compression: Compression) -> CompressionType {
        match compression {
            Compression::None => CompressionType::None,
            Compression::Mszip => CompressionType::MsZip,
        }
    }
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Cat { cab, files } => {
            let mut cabinet = open_cab(&cab, ReadOptions::new())?;
            let mut stdout = io::stdout().lock();
            for name in files {
                let data = cabinet.read_member(&name)?;
                stdout.write_all(&data)?;
            }
        }
        Command::Create { compress, output, files } => {
            let out_path = output.unwrap_or_else(next_free_path);
            let mut cab = CabFile::open_with_compression(
                &out_path,
                Mode::Write,
                compress.into(),
            )?;
            for path in files {
                cab.write(&path, None)
                    .with_context(|| format!("Failed to add {}", path.display()))?;
            }
            cab.close()?;
            println!("Wrote {}", out_path.display());
        }
        Command::Extract { cab, output, ignore_checksums } => {
            let policy = if ignore_checksums {
                ChecksumPolicy::Ignore
            } else {
                ChecksumPolicy::Strict
            };
            let options = ReadOptions::new().checksum_policy(policy);
            let mut cabinet = open_cab(&cab, options)?;
            for path in cabinet.extract_all(&output)? {
                println!("{}", path.display());
            }
            for gap in cabinet.integrity_gaps() {
                eprintln!(
                    "warning: folder {} block {} is damaged (bytes {}..{}{})",
                    gap.folder,
                    gap.block,
                    gap.range.start,
                    gap.range.end,
                    if gap.zero_filled { ", zero-filled" } else { "" }
                );
            }
        }
        Command::Info { cab } => {
            let cabinet = open_cab(&cab, ReadOptions::new())?;
            let header = cabinet.header();
            let (major, minor) = header.version();
            println!("version = {}.{}", major, minor);
            println!("total_size = {}", header.total_size());
            println!("set_id = {:#06x}", header.set_id());
            println!("set_index = {}", header.set_index());
            println!("reserve_data = {:?}", header.reserve_data());
            for (index, folder) in cabinet.folder_entries().enumerate() {
                println!("Folder #{}:", index);
                println!("  compression_type = {}", folder.compression_type());
                println!("  num_data_blocks = {}", folder.num_data_blocks());
                println!("  uncompressed_size = {}", folder.uncompressed_size());
                let files = cabinet
                    .file_entries()
                    .filter(|file| file.folder_index() as usize == index);
                for file in files {
                    println!(
                        "  {:?} ({} bytes at offset {})",
                        file.name(),
                        file.uncompressed_size(),
                        file.uncompressed_offset()
                    );
                }
            }
        }
        Command::Ls { long, cab } => {
            let cabinet = open_cab(&cab, ReadOptions::new())?;
            let folders: Vec<&FolderEntry> = cabinet.folder_entries().collect();
            for file in cabinet.file_entries() {
                let folder = folders[file.folder_index() as usize];
                list_file(file, folder, long);
            }
        }
    }
    Ok(())
}

fn list_file(file: &FileEntry, folder: &FolderEntry, long: bool) {
    if !long {
        println!("{}", file.name());
        return;
    }
    let ctype = match folder.compression_type() {
        CompressionType::None => "None".to_string(),
        CompressionType::MsZip => "MsZip".to_string(),
        CompressionType::Quantum(v, m) => format!("Q{}/{}", v, m),
        CompressionType::Lzx(w) => format!("Lzx{:?}", w),
    };
    let file_size = if file.uncompressed_size() >= 100_000_000 {
        format!("{} MB", file.uncompressed_size() / (1 << 20))
    } else if file.uncompressed_size() >= 1_000_000 {
        format!("{} kB", file.uncompressed_size() / (1 << 10))
    } else {
        format!("{} B ", file.uncompressed_size())
    };
    println!(
        "{}{}{}{}{}{} {:>2} {:<8} {:>10} {} {}",
        if file.is_read_only() { 'R' } else { '-' },
        if file.is_hidden() { 'H' } else { '-' },
        if file.is_system() { 'S' } else { '-' },
        if file.is_archive() { 'A' } else { '-' },
        if file.is_exec() { 'E' } else { '-' },
        if file.is_name_utf() { 'U' } else { '-' },
        file.folder_index(),
        ctype,
        file_size,
        file.datetime()
            .map(|dt| dt.to_string())
            .unwrap_or_else(|| "invalid datetime".to_string()),
        file.name()
    );
}

fn open_cab(
    path: &Path,
    options: ReadOptions,
) -> anyhow::Result<ArchiveReader<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    ArchiveReader::with_options(BufReader::new(file), options)
        .context("Failed to read cabinet file")
}

fn next_free_path() -> PathBuf {
    let mut path = PathBuf::from("out.cab");
    let mut index: i32 = 0;
    while path.exists() {
        index += 1;
        path = PathBuf::from(format!("out{}.cab", index));
    }
    path
}
