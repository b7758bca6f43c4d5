//! Assetpack LZ4 command-line tool
//!
//! Compresses and decompresses single LZ4 frames, reading from a file or
//! stdin and writing to a file or stdout. Logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Compress with 64 KiB blocks and a content checksum
//! assetpack compress textures.bin -o textures.lz4 --block-size 64k --content-checksum
//!
//! # Decompress, failing on any checksum mismatch
//! assetpack decompress textures.lz4 -o textures.bin --checksum-policy strict
//!
//! # Buffer sizes
//! assetpack bound --len 1048576
//! assetpack bound --frame textures.lz4
//!
//! # Settings from a JSON file
//! assetpack --config codec.json compress < in.bin > out.lz4
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use assetpack_lz4::{
    compress_bound, decompress_bound, BlockSize, ChecksumPolicy, CodecConfig, FrameDecoder,
    FrameEncoder,
};

#[derive(Parser, Debug)]
#[command(name = "assetpack")]
#[command(version)]
#[command(about = "LZ4 frame compression for packaged assets", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Codec configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into one LZ4 frame
    Compress(CompressArgs),

    /// Decompress one LZ4 frame
    Decompress(DecompressArgs),

    /// Print an output buffer bound
    Bound(BoundArgs),
}

#[derive(ClapArgs, Debug)]
struct CompressArgs {
    /// Input file (stdin if omitted)
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Block size class: 64k, 256k, 1m or 4m
    #[arg(short, long)]
    block_size: Option<BlockSize>,

    /// Store the input length in the frame header
    #[arg(long)]
    content_size: bool,

    /// Append a checksum after every block
    #[arg(long)]
    block_checksum: bool,

    /// Append a checksum of the whole input
    #[arg(long)]
    content_checksum: bool,
}

#[derive(ClapArgs, Debug)]
struct DecompressArgs {
    /// Input file (stdin if omitted)
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output size cap for frames without a declared size
    #[arg(long)]
    max_size: Option<usize>,

    /// How to treat checksum mismatches
    #[arg(long, value_enum)]
    checksum_policy: Option<PolicyArg>,
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct BoundArgs {
    /// Worst-case compressed size for this many input bytes
    #[arg(long)]
    len: Option<usize>,

    /// Decompressed size bound for this frame file
    #[arg(long)]
    frame: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Ignore,
    Warn,
    Strict,
}

impl From<PolicyArg> for ChecksumPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Ignore => ChecksumPolicy::Ignore,
            PolicyArg::Warn => ChecksumPolicy::Warn,
            PolicyArg::Strict => ChecksumPolicy::Strict,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading codec config");
            CodecConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => CodecConfig::default(),
    };

    match args.command {
        Command::Compress(cmd) => run_compress(cmd, config),
        Command::Decompress(cmd) => run_decompress(cmd, config),
        Command::Bound(cmd) => run_bound(cmd),
    }
}

fn run_compress(args: CompressArgs, config: CodecConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut frame_config = config.frame;
    if let Some(block_size) = args.block_size {
        frame_config.block_size = block_size;
    }
    frame_config.content_size |= args.content_size;
    frame_config.block_checksum |= args.block_checksum;
    frame_config.content_checksum |= args.content_checksum;

    let input = read_input(args.input.as_deref())?;
    let (frame, stats) = FrameEncoder::with_config(frame_config).encode_with_stats(&input)?;
    write_output(args.output.as_deref(), &frame)?;

    info!(
        "Compressed {} -> {} bytes ({:.1}% saved) in {} blocks ({} raw), {:.1} MB/s",
        stats.original_size,
        stats.compressed_size,
        stats.ratio().savings_percent(),
        stats.blocks_processed,
        stats.raw_blocks,
        stats.throughput_mbs()
    );
    Ok(())
}

fn run_decompress(
    args: DecompressArgs,
    config: CodecConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut decoder_config = config.decoder;
    if let Some(policy) = args.checksum_policy {
        decoder_config.checksum_policy = policy.into();
    }

    let input = read_input(args.input.as_deref())?;
    let decoded = FrameDecoder::with_config(decoder_config).decode(&input, args.max_size)?;
    write_output(args.output.as_deref(), &decoded.data)?;

    info!(
        "Decompressed {} -> {} bytes in {} blocks, {} integrity warnings",
        decoded.summary.bytes_read,
        decoded.summary.bytes_written,
        decoded.summary.blocks,
        decoded.summary.warnings.len()
    );
    Ok(())
}

fn run_bound(args: BoundArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bound = match (args.len, args.frame) {
        (Some(len), _) => compress_bound(len),
        (None, Some(path)) => decompress_bound(&fs::read(path)?)?,
        (None, None) => return Err("either --len or --frame is required".into()),
    };
    writeln!(io::stdout(), "{}", bound)?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}
