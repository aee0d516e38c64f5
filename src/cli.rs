// Command-line front end for dvpl.
//
// Subcommands map onto the file helpers in `io`. Directories are walked
// sequentially; each file is converted on its own and a failure either
// aborts the run or, with --keep-going, is counted and the run moves on.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use walkdir::WalkDir;

use crate::container::{CompressionType, EncodeOptions, FOOTER_LEN};
use crate::io::{self, IoError};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// DVPL container packer/unpacker.
#[derive(Parser, Debug)]
#[command(
    name = "dvpl",
    version,
    about = "Pack and unpack DVPL containers",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,

    /// Continue with the next file after a per-file failure.
    #[arg(long = "keep-going", short = 'k', global = true)]
    keep_going: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Wrap raw files into DVPL containers.
    Pack(PackArgs),
    /// Restore raw files from DVPL containers.
    Unpack(UnpackArgs),
    /// Print the footer of a DVPL container.
    Info(InfoArgs),
    /// Fully decode DVPL containers without writing output.
    Verify(VerifyArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TypeArg {
    /// `.tex` stored, everything else lz4hc.
    Auto,
    Stored,
    Lz4,
    Lz4hc,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// Input file, or directory with --recursive.
    #[arg(value_hint = ValueHint::AnyPath)]
    input: PathBuf,

    /// Output file (default: input with `.dvpl` appended).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Compression type.
    #[arg(long = "type", short = 't', value_enum, default_value_t = TypeArg::Auto)]
    compression: TypeArg,

    /// LZ4HC level for lz4hc payloads.
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=12), default_value_t = crate::container::lz4::HC_LEVEL)]
    level: i32,

    /// Walk a directory and pack every file that is not already a container.
    #[arg(long, short = 'r')]
    recursive: bool,

    /// Remove each input file after it was packed.
    #[arg(long = "delete-original")]
    delete_original: bool,
}

#[derive(Args, Debug)]
struct UnpackArgs {
    /// Input container, or directory with --recursive.
    #[arg(value_hint = ValueHint::AnyPath)]
    input: PathBuf,

    /// Output file (default: input without its `.dvpl` suffix).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Walk a directory and unpack every `*.dvpl` file.
    #[arg(long, short = 'r')]
    recursive: bool,

    /// Remove each container after it was unpacked.
    #[arg(long = "delete-original")]
    delete_original: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Container file(s).
    #[arg(value_hint = ValueHint::FilePath, required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Container file, or directory with --recursive.
    #[arg(value_hint = ValueHint::AnyPath)]
    input: PathBuf,

    /// Walk a directory and verify every `*.dvpl` file.
    #[arg(long, short = 'r')]
    recursive: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Pack,
    Unpack,
    Info,
    Verify,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    keep_going: bool,
    recursive: bool,
    delete_original: bool,
    /// `None` selects the type from each file's extension.
    encode: Option<EncodeOptions>,
    inputs: Vec<PathBuf>,
    output_file: Option<PathBuf>,
}

fn encode_options(ty: TypeArg, level: i32) -> Option<EncodeOptions> {
    let compression = match ty {
        TypeArg::Auto => return None,
        TypeArg::Stored => CompressionType::Stored,
        TypeArg::Lz4 => CompressionType::Lz4,
        TypeArg::Lz4hc => CompressionType::Lz4Hc,
    };
    Some(EncodeOptions {
        compression,
        hc_level: level,
    })
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        keep_going: cli.keep_going,
        recursive: false,
        delete_original: false,
        encode: None,
        inputs: Vec::new(),
        output_file: None,
    };

    match cli.command {
        Cmd::Pack(args) => {
            opts.command = Command::Pack;
            opts.recursive = args.recursive;
            opts.delete_original = args.delete_original;
            opts.encode = encode_options(args.compression, args.level);
            opts.inputs = vec![args.input];
            opts.output_file = args.output;
        }
        Cmd::Unpack(args) => {
            opts.command = Command::Unpack;
            opts.recursive = args.recursive;
            opts.delete_original = args.delete_original;
            opts.inputs = vec![args.input];
            opts.output_file = args.output;
        }
        Cmd::Info(args) => {
            opts.command = Command::Info;
            opts.inputs = args.inputs;
        }
        Cmd::Verify(args) => {
            opts.command = Command::Verify;
            opts.recursive = args.recursive;
            opts.inputs = vec![args.input];
        }
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("dvpl".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Input collection
// ---------------------------------------------------------------------------

/// Expand the input into the list of files to process.
///
/// A plain file is returned as is. A directory requires `recursive` and is
/// walked in sorted order, keeping files accepted by `wanted`.
fn collect_inputs(
    input: &Path,
    recursive: bool,
    wanted: fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, String> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !recursive {
        return Err(format!(
            "{} is a directory, use --recursive",
            input.display()
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("{}: {e}", input.display()))?;
        if entry.file_type().is_file() && wanted(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn not_dvpl(path: &Path) -> bool {
    !io::is_dvpl_path(path)
}

// ---------------------------------------------------------------------------
// Batch driver
// ---------------------------------------------------------------------------

/// Per-run tally shared by pack/unpack/verify.
#[derive(Default)]
struct Tally {
    ok: u64,
    failed: u64,
    bytes_in: u64,
    bytes_out: u64,
    files: Vec<serde_json::Value>,
}

impl Tally {
    fn exit_code(&self) -> i32 {
        if self.failed > 0 { 1 } else { 0 }
    }

    fn report(&self, opts: &Options, command: &str) {
        if opts.verbose > 0 && !opts.quiet {
            eprintln!(
                "dvpl: {command}: {} ok, {} failed, {} -> {} bytes",
                self.ok, self.failed, self.bytes_in, self.bytes_out
            );
        }
        if opts.json_output {
            let json = serde_json::json!({
                "command": command,
                "ok": self.ok,
                "failed": self.failed,
                "input_bytes": self.bytes_in,
                "output_bytes": self.bytes_out,
                "files": self.files,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(s) => eprintln!("{s}"),
                Err(e) => log::error!("json output: {e}"),
            }
        }
    }
}

enum Outcome {
    Done,
    Failed,
}

/// Run `step` over every file, honoring --keep-going.
fn for_each_file(
    opts: &Options,
    files: &[PathBuf],
    tally: &mut Tally,
    mut step: impl FnMut(&Path, &mut Tally) -> Outcome,
) {
    for file in files {
        match step(file, tally) {
            Outcome::Done => tally.ok += 1,
            Outcome::Failed => {
                tally.failed += 1;
                if !opts.keep_going {
                    break;
                }
            }
        }
    }
}

/// Refuse an output that already exists (unless --force) or that is the
/// input file itself, which --force must never overwrite.
fn check_output(opts: &Options, input: &Path, output: &Path) -> Result<(), String> {
    if !output.exists() {
        return Ok(());
    }
    if same_file(input, output) {
        return Err(format!(
            "output is the same file as the input: {}",
            output.display()
        ));
    }
    if !opts.force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            output.display()
        ));
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn delete_original(opts: &Options, input: &Path) {
    if !opts.delete_original {
        return;
    }
    if let Err(e) = std::fs::remove_file(input) {
        log::warn!("could not remove {}: {e}", input.display());
    }
}

fn hex(digest: &Option<[u8; 32]>) -> Option<String> {
    digest.map(|d| d.iter().map(|b| format!("{b:02x}")).collect())
}

// ---------------------------------------------------------------------------
// Pack command
// ---------------------------------------------------------------------------

fn cmd_pack(opts: &Options) -> i32 {
    let input = &opts.inputs[0];
    let files = match collect_inputs(input, opts.recursive, not_dvpl) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dvpl: {e}");
            return 1;
        }
    };
    if files.len() > 1 && opts.output_file.is_some() {
        eprintln!("dvpl: an output name cannot be given for a directory input");
        return 1;
    }

    let mut tally = Tally::default();
    for_each_file(opts, &files, &mut tally, |file, tally| {
        let output = opts
            .output_file
            .clone()
            .unwrap_or_else(|| io::packed_path(file));
        if let Err(e) = check_output(opts, file, &output) {
            eprintln!("dvpl: {e}");
            return Outcome::Failed;
        }
        match io::pack_file(file, &output, opts.encode) {
            Ok(stats) => {
                tally.bytes_in += stats.input_size;
                tally.bytes_out += stats.output_size;
                if opts.json_output {
                    tally.files.push(serde_json::json!({
                        "input": file.display().to_string(),
                        "output": output.display().to_string(),
                        "type": stats.compression.name(),
                        "input_size": stats.input_size,
                        "output_size": stats.output_size,
                        "input_sha256": hex(&stats.input_sha256),
                    }));
                }
                delete_original(opts, file);
                Outcome::Done
            }
            Err(e) => {
                eprintln!("dvpl: pack error: {e}");
                Outcome::Failed
            }
        }
    });

    tally.report(opts, "pack");
    tally.exit_code()
}

// ---------------------------------------------------------------------------
// Unpack command
// ---------------------------------------------------------------------------

fn unpack_target(opts: &Options, file: &Path) -> Result<PathBuf, IoError> {
    match &opts.output_file {
        Some(out) => Ok(out.clone()),
        None => io::unpacked_path(file).ok_or_else(|| IoError::NotDvplName(file.to_path_buf())),
    }
}

fn cmd_unpack(opts: &Options) -> i32 {
    let input = &opts.inputs[0];
    let files = match collect_inputs(input, opts.recursive, io::is_dvpl_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dvpl: {e}");
            return 1;
        }
    };
    if files.len() > 1 && opts.output_file.is_some() {
        eprintln!("dvpl: an output name cannot be given for a directory input");
        return 1;
    }

    let mut tally = Tally::default();
    for_each_file(opts, &files, &mut tally, |file, tally| {
        let output = match unpack_target(opts, file) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("dvpl: unpack error: {e}");
                return Outcome::Failed;
            }
        };
        if let Err(e) = check_output(opts, file, &output) {
            eprintln!("dvpl: {e}");
            return Outcome::Failed;
        }
        match io::unpack_file(file, &output) {
            Ok(stats) => {
                tally.bytes_in += stats.input_size;
                tally.bytes_out += stats.output_size;
                if opts.json_output {
                    tally.files.push(serde_json::json!({
                        "input": file.display().to_string(),
                        "output": output.display().to_string(),
                        "type": stats.compression.name(),
                        "input_size": stats.input_size,
                        "output_size": stats.output_size,
                        "output_sha256": hex(&stats.output_sha256),
                    }));
                }
                delete_original(opts, file);
                Outcome::Done
            }
            Err(e) => {
                eprintln!("dvpl: unpack error: {e}");
                Outcome::Failed
            }
        }
    });

    tally.report(opts, "unpack");
    tally.exit_code()
}

// ---------------------------------------------------------------------------
// Verify command
// ---------------------------------------------------------------------------

fn cmd_verify(opts: &Options) -> i32 {
    let input = &opts.inputs[0];
    let files = match collect_inputs(input, opts.recursive, io::is_dvpl_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dvpl: {e}");
            return 1;
        }
    };

    let mut tally = Tally::default();
    for_each_file(opts, &files, &mut tally, |file, tally| {
        match io::verify_file(file) {
            Ok(stats) => {
                tally.bytes_in += stats.input_size;
                tally.bytes_out += stats.output_size;
                if !opts.quiet && !opts.json_output {
                    println!("{}: OK ({})", file.display(), stats.compression);
                }
                if opts.json_output {
                    tally.files.push(serde_json::json!({
                        "input": file.display().to_string(),
                        "status": "ok",
                        "type": stats.compression.name(),
                        "output_size": stats.output_size,
                        "output_sha256": hex(&stats.output_sha256),
                    }));
                }
                Outcome::Done
            }
            Err(e) => {
                eprintln!("dvpl: verify error: {e}");
                if opts.json_output {
                    tally.files.push(serde_json::json!({
                        "input": file.display().to_string(),
                        "status": "failed",
                        "error": e.to_string(),
                    }));
                }
                Outcome::Failed
            }
        }
    });

    tally.report(opts, "verify");
    tally.exit_code()
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn cmd_info(opts: &Options) -> i32 {
    let mut status = 0;
    for input in &opts.inputs {
        let info = match io::inspect_file(input) {
            Ok(i) => i,
            Err(e) => {
                eprintln!("dvpl: info error: {e}");
                status = 1;
                if opts.keep_going {
                    continue;
                }
                break;
            }
        };

        if opts.json_output {
            let json = serde_json::json!({
                "file": input.display().to_string(),
                "original_size": info.footer.original_size,
                "compressed_size": info.footer.compressed_size,
                "crc32": format!("{:08X}", info.footer.crc32),
                "type": info.footer.kind,
                "type_name": info.compression.name(),
                "container_size": info.container_len,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(s) => println!("{s}"),
                Err(e) => log::error!("json output: {e}"),
            }
            continue;
        }

        println!("{}:", input.display());
        println!("  original size:   {}", info.footer.original_size);
        println!("  compressed size: {}", info.footer.compressed_size);
        println!("  crc32:           {:08X}", info.footer.crc32);
        println!(
            "  type:            {} ({})",
            info.footer.kind, info.compression
        );
        if opts.verbose > 0 {
            println!("  container size:  {}", info.container_len);
            println!("  ratio:           {:.3}", info.ratio());
        }
    }
    status
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("dvpl version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("FOOTER_LEN={FOOTER_LEN}");
    eprintln!("LZ4HC_LEVEL={}", crate::container::lz4::HC_LEVEL);
    eprintln!("LZ4_MAX_BLOCK_INPUT={}", crate::container::lz4::MAX_BLOCK_INPUT);
    eprintln!("STORED_EXTENSION=.{}", crate::container::encoder::STORED_EXTENSION);
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Pack => cmd_pack(&opts),
        Command::Unpack => cmd_unpack(&opts),
        Command::Info => cmd_info(&opts),
        Command::Verify => cmd_verify(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("dvpl".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn pack_subcommand_maps_correctly() {
        let opts = parse_opts(&["pack", "--type", "lz4hc", "--level", "9", "in.bin", "out.dvpl"]);
        assert_eq!(opts.command, Command::Pack);
        assert_eq!(opts.inputs, vec![PathBuf::from("in.bin")]);
        assert_eq!(opts.output_file, Some(PathBuf::from("out.dvpl")));
        assert_eq!(
            opts.encode,
            Some(EncodeOptions {
                compression: CompressionType::Lz4Hc,
                hc_level: 9,
            })
        );
    }

    #[test]
    fn pack_defaults_to_extension_policy() {
        let opts = parse_opts(&["pack", "in.tex"]);
        assert_eq!(opts.encode, None);
        assert_eq!(opts.output_file, None);
        assert!(!opts.recursive);
    }

    #[test]
    fn stored_type_flag() {
        let opts = parse_opts(&["pack", "-t", "stored", "in.bin"]);
        assert_eq!(
            opts.encode.map(|e| e.compression),
            Some(CompressionType::Stored)
        );
    }

    #[test]
    fn level_out_of_range_rejected() {
        let argv = ["dvpl", "pack", "--level", "13", "in.bin"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn unpack_subcommand_maps_correctly() {
        let opts = parse_opts(&["--keep-going", "unpack", "-r", "--delete-original", "assets"]);
        assert_eq!(opts.command, Command::Unpack);
        assert!(opts.recursive);
        assert!(opts.delete_original);
        assert!(opts.keep_going);
        assert_eq!(opts.inputs, vec![PathBuf::from("assets")]);
    }

    #[test]
    fn info_accepts_many_files() {
        let opts = parse_opts(&["info", "a.dvpl", "b.dvpl"]);
        assert_eq!(opts.command, Command::Info);
        assert_eq!(opts.inputs.len(), 2);
    }

    #[test]
    fn global_flags() {
        let opts = parse_opts(&["--force", "--json", "verify", "a.dvpl"]);
        assert!(opts.force);
        assert!(opts.json_output);
        assert_eq!(opts.command, Command::Verify);
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-vvvv", "config"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(log_filter(&opts), "debug");
        let quiet = parse_opts(&["-q", "config"]);
        assert_eq!(log_filter(&quiet), "error");
    }

    #[test]
    fn directory_requires_recursive() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_inputs(dir.path(), false, not_dvpl).is_err());
    }

    #[test]
    fn directory_walk_filters_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.tex"), b"a").unwrap();
        std::fs::write(dir.path().join("sub/b.sc2.dvpl"), b"b").unwrap();

        let raw = collect_inputs(dir.path(), true, not_dvpl).unwrap();
        assert_eq!(raw, vec![dir.path().join("a.tex")]);

        let packed = collect_inputs(dir.path(), true, io::is_dvpl_path).unwrap();
        assert_eq!(packed, vec![dir.path().join("sub/b.sc2.dvpl")]);
    }

    #[test]
    fn unpack_target_needs_suffix() {
        let opts = parse_opts(&["unpack", "plain.bin"]);
        assert!(matches!(
            unpack_target(&opts, Path::new("plain.bin")),
            Err(IoError::NotDvplName(_))
        ));
        assert_eq!(
            unpack_target(&opts, Path::new("x/plain.bin.dvpl")).unwrap(),
            PathBuf::from("x/plain.bin")
        );
    }

    #[test]
    fn output_equal_to_input_is_refused_even_with_force() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.bin");
        std::fs::write(&file, b"only copy").unwrap();

        let opts = parse_opts(&["--force", "pack", "a.bin"]);
        assert!(check_output(&opts, &file, &file).is_err());

        let dotted = dir.path().join(".").join("a.bin");
        assert!(check_output(&opts, &file, &dotted).is_err());

        let other = dir.path().join("b.bin");
        std::fs::write(&other, b"old").unwrap();
        assert!(check_output(&opts, &file, &other).is_ok());
        assert!(check_output(&opts, &file, &dir.path().join("c.bin")).is_ok());
    }

    #[test]
    fn existing_output_without_force_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.bin");
        let other = dir.path().join("a.bin.dvpl");
        std::fs::write(&file, b"x").unwrap();
        std::fs::write(&other, b"y").unwrap();

        let opts = parse_opts(&["pack", "a.bin"]);
        assert!(check_output(&opts, &file, &other).is_err());
    }

    #[test]
    fn fuzz_parse_does_not_panic() {
        fuzz_try_parse_args(&["pack".into(), "--type".into(), "bogus".into()]);
        fuzz_try_parse_args(&[]);
    }
}
