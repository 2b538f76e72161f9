// Command-line interface for lzwin.
//
// Explicit subcommands for compress/decompress plus token inspection. Files
// are read and written whole; the codec itself never touches the filesystem.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::{
    self, Config, DEFAULT_LEVEL, DEFAULT_LOOKAHEAD, LITERAL_FLAG, MAX_DISTANCE,
    MAX_LITERAL_RUN, MAX_MATCH_LENGTH, MIN_MATCH_LENGTH, SENTINEL,
};
use crate::format::{StreamStats, Token, Tokens};
use crate::io::{self as file_io, EXTENSION};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Sliding-window LZ77 compressor.
#[derive(Parser, Debug)]
#[command(
    name = "lzwin",
    version,
    about = "Sliding-window LZ77 compressor",
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
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file.
    Compress(CompressArgs),
    /// Decompress a file.
    Decompress(DecompressArgs),
    /// List the tokens of a compressed file.
    Inspect(InspectArgs),
    /// Print build/format details.
    Config,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Compression level (0-9). Level 0 stores literal runs only.
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=9), default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// Override the level's match search horizon in bytes.
    #[arg(long)]
    lookahead: Option<usize>,

    /// Write to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file (default: input name plus `.mkc`).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Write to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file (default: input name without `.mkc`).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Compressed file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Inspect,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    level: u32,
    lookahead: Option<usize>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(3),
        level: DEFAULT_LEVEL,
        lookahead: None,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Compress(args) => Options {
            command: Command::Compress,
            use_stdout: args.stdout,
            level: args.level,
            lookahead: args.lookahead,
            input_file: Some(args.input),
            output_file: args.output,
            ..base
        },
        Cmd::Decompress(args) => Options {
            command: Command::Decompress,
            use_stdout: args.stdout,
            input_file: Some(args.input),
            output_file: args.output,
            ..base
        },
        Cmd::Inspect(args) => Options {
            command: Command::Inspect,
            input_file: Some(args.input),
            ..base
        },
        Cmd::Config => base,
    }
}

fn build_config(opts: &Options) -> Config {
    let config = Config::for_level(opts.level);
    match opts.lookahead {
        Some(lookahead) => config.with_lookahead(lookahead),
        None => config,
    }
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn print_json(value: serde_json::Value) {
    eprintln!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn read_input(path: &Path) -> Result<Vec<u8>, i32> {
    std::fs::read(path).map_err(|e| {
        eprintln!("lzwin: input file: {}: {e}", path.display());
        1
    })
}

/// Refuse to clobber an existing output file without `--force`.
fn check_overwrite(opts: &Options, path: &Path) -> Result<(), i32> {
    if path.exists() && !opts.force {
        eprintln!(
            "lzwin: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return Err(1);
    }
    Ok(())
}

fn write_stdout(data: &[u8]) -> Result<(), file_io::IoError> {
    let mut out = io::stdout().lock();
    out.write_all(data)?;
    out.flush()?;
    Ok(())
}

fn report_error(e: impl std::fmt::Display) -> i32 {
    eprintln!("lzwin: {e}");
    1
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    let config = build_config(opts);
    let Some(input_path) = opts.input_file.as_deref() else {
        eprintln!("lzwin: no input file");
        return 1;
    };
    let output_path = opts
        .output_file
        .clone()
        .unwrap_or_else(|| file_io::compressed_path(input_path));

    let result = if opts.use_stdout {
        let input = match read_input(input_path) {
            Ok(data) => data,
            Err(code) => return code,
        };
        let (stream, stats) = file_io::compress_bytes(&input, &config);
        write_stdout(&stream).map(|()| stats)
    } else {
        if let Err(code) = check_overwrite(opts, &output_path) {
            return code;
        }
        file_io::compress_file(input_path, &output_path, &config)
    };
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => return report_error(e),
    };

    let ratio = stats.ratio();
    if !opts.quiet && !opts.use_stdout {
        eprintln!("lzwin: compressed {}", output_path.display());
        match ratio {
            Some(r) => eprintln!("lzwin: compression ratio: {r:.2}"),
            None => eprintln!("lzwin: compression ratio: n/a (empty input)"),
        }
    }
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "lzwin: input size: {}, output size: {}, matches: {}, literal runs: {}, time: {:.3?}",
            stats.input_size,
            stats.output_size,
            stats.encode.match_tokens,
            stats.encode.literal_runs,
            stats.elapsed
        );
    }

    if opts.json_output {
        print_json(serde_json::json!({
            "command": "compress",
            "level": opts.level,
            "lookahead": config.lookahead(),
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "ratio": ratio,
            "match_tokens": stats.encode.match_tokens,
            "literal_runs": stats.encode.literal_runs,
            "literal_bytes": stats.encode.literal_bytes,
            "elapsed_ms": stats.elapsed.as_secs_f64() * 1000.0,
            "input_sha256": stats.input_sha256.map(|d| hex(&d)),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> i32 {
    let config = Config::default();
    let Some(input_path) = opts.input_file.as_deref() else {
        eprintln!("lzwin: no input file");
        return 1;
    };

    let result = if opts.use_stdout {
        let stream = match read_input(input_path) {
            Ok(data) => data,
            Err(code) => return code,
        };
        file_io::decompress_bytes(&stream, &config)
            .map_err(file_io::IoError::from)
            .and_then(|(output, stats)| write_stdout(&output).map(|()| stats))
    } else {
        let output_path = match &opts.output_file {
            Some(path) => path.clone(),
            None => match file_io::decompressed_path(input_path) {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("lzwin: {e}; pass an output file name");
                    return 1;
                }
            },
        };
        if let Err(code) = check_overwrite(opts, &output_path) {
            return code;
        }
        file_io::decompress_file(input_path, &output_path, &config)
    };
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => return report_error(e),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "lzwin: input size: {}, output size: {}, time: {:.3?}",
            stats.input_size, stats.output_size, stats.elapsed
        );
    }
    if opts.json_output {
        print_json(serde_json::json!({
            "command": "decompress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "elapsed_ms": stats.elapsed.as_secs_f64() * 1000.0,
            "output_sha256": stats.output_sha256.map(|d| hex(&d)),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn describe(token: &Token<'_>, last: bool) -> String {
    match *token {
        Token::Match {
            distance,
            length,
            continuation,
        } if last && continuation == SENTINEL => {
            format!("MATCH   distance={distance:<3} length={length:<3} end")
        }
        Token::Match {
            distance,
            length,
            continuation,
        } => format!(
            "MATCH   distance={distance:<3} length={length:<3} next={continuation:#04x}"
        ),
        Token::Literal(bytes) => format!("LITERAL run={:<3} {}", bytes.len(), hex(bytes)),
    }
}

/// Write the token listing (unless `quiet`) and the summary line.
fn write_listing(out: &mut impl Write, stream: &[u8], quiet: bool) -> Result<StreamStats, i32> {
    for item in Tokens::new(stream) {
        let (offset, token) = item.map_err(report_error)?;
        if !quiet {
            let last = offset + token.encoded_len() == stream.len();
            writeln!(out, "{offset:>8}  {}", describe(&token, last)).map_err(report_error)?;
        }
    }

    let stats = StreamStats::scan(stream, SENTINEL).map_err(report_error)?;
    writeln!(
        out,
        "tokens: {} ({} matches, {} literal runs), stream size: {}, decoded size: {}",
        stats.tokens(),
        stats.match_tokens,
        stats.literal_runs,
        stats.stream_len,
        stats.decoded_len()
    )
    .map_err(report_error)?;
    Ok(stats)
}

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(input_path) = opts.input_file.as_deref() else {
        eprintln!("lzwin: no input file");
        return 1;
    };
    let stream = match read_input(input_path) {
        Ok(data) => data,
        Err(code) => return code,
    };

    let stats = match write_listing(&mut io::stdout().lock(), &stream, opts.quiet) {
        Ok(stats) => stats,
        Err(code) => return code,
    };

    if opts.json_output {
        print_json(serde_json::json!({
            "command": "inspect",
            "stream_size": stats.stream_len,
            "match_tokens": stats.match_tokens,
            "literal_runs": stats.literal_runs,
            "literal_bytes": stats.literal_bytes,
            "copied_bytes": stats.copied_bytes,
            "decoded_size": stats.decoded_len(),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("lzwin version {version}");

    let file_io = cfg!(feature = "file-io") as u8;
    eprintln!("FILE_IO={file_io}");
    eprintln!("EXTENSION=.{EXTENSION}");
    eprintln!("MAX_DISTANCE={MAX_DISTANCE}");
    eprintln!("MAX_MATCH_LENGTH={MAX_MATCH_LENGTH}");
    eprintln!("DEFAULT_LOOKAHEAD={DEFAULT_LOOKAHEAD}");
    eprintln!("MIN_MATCH_LENGTH={MIN_MATCH_LENGTH}");
    eprintln!("MAX_LITERAL_RUN={MAX_LITERAL_RUN}");
    eprintln!("LITERAL_FLAG={LITERAL_FLAG}");
    eprintln!("SENTINEL={SENTINEL}");
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");
    for level in 0..=9 {
        let p = config::profile_for_level(level);
        eprintln!("LEVEL_{level}={} (lookahead {})", p.name, p.lookahead);
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Inspect => cmd_inspect(&opts),
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
        let argv: Vec<String> = std::iter::once("lzwin".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn compress_subcommand_maps_correctly() {
        let opts = parse_opts(&["compress", "--level", "9", "in.txt", "out.mkc"]);
        assert_eq!(opts.command, Command::Compress);
        assert_eq!(opts.level, 9);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.txt")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.mkc")));
        assert!(!opts.use_stdout);
        assert_eq!(build_config(&opts).lookahead(), MAX_MATCH_LENGTH);
    }

    #[test]
    fn compress_defaults() {
        let opts = parse_opts(&["compress", "in.txt"]);
        assert_eq!(opts.level, DEFAULT_LEVEL);
        assert_eq!(opts.output_file, None);
        assert_eq!(build_config(&opts), Config::default());
    }

    #[test]
    fn lookahead_override() {
        let opts = parse_opts(&["compress", "--lookahead", "20", "-l", "1", "in.txt"]);
        assert_eq!(build_config(&opts).lookahead(), 20);
    }

    #[test]
    fn level_out_of_range_is_rejected() {
        let argv = ["lzwin", "compress", "--level", "10", "in.txt"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn decompress_subcommand_maps_correctly() {
        let opts = parse_opts(&["decompress", "-c", "in.txt.mkc"]);
        assert_eq!(opts.command, Command::Decompress);
        assert!(opts.use_stdout);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.txt.mkc")));
        assert_eq!(opts.output_file, None);
    }

    #[test]
    fn global_flags() {
        let opts = parse_opts(&["-f", "--json", "inspect", "a.mkc"]);
        assert_eq!(opts.command, Command::Inspect);
        assert!(opts.force);
        assert!(opts.json_output);

        let opts = parse_opts(&["config", "-vvvvv"]);
        assert_eq!(opts.command, Command::Config);
        assert_eq!(opts.verbose, 3);
        assert_eq!(log_filter(opts.verbose), "trace");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let argv = ["lzwin", "-q", "-v", "config"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn describe_tokens() {
        let m = Token::Match {
            distance: 1,
            length: 9,
            continuation: SENTINEL,
        };
        assert!(describe(&m, true).ends_with("end"));
        assert!(describe(&m, false).ends_with("next=0x24"));
        assert!(describe(&Token::Literal(b"AB"), false).ends_with("4142"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn listing_write_failure_is_an_error() {
        let stream = [129, b'A', 1, 9, SENTINEL];
        assert_eq!(write_listing(&mut FailingWriter, &stream, false).unwrap_err(), 1);
        // The summary line is still written under --quiet.
        assert_eq!(write_listing(&mut FailingWriter, &stream, true).unwrap_err(), 1);
    }

    #[test]
    fn listing_quiet_prints_summary_only() {
        let stream = [129, b'A', 1, 9, SENTINEL];
        let mut out = Vec::new();
        let stats = write_listing(&mut out, &stream, true).unwrap();
        assert_eq!(stats.decoded_len(), 10);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("tokens: 2"));
    }

    #[test]
    fn corrupt_listing_prints_nothing_under_quiet() {
        let stream = [129, b'A', 1, 9];
        let mut out = Vec::new();
        assert_eq!(write_listing(&mut out, &stream, true).unwrap_err(), 1);
        assert!(out.is_empty());

        let mut out = Vec::new();
        assert_eq!(write_listing(&mut out, &stream, false).unwrap_err(), 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
