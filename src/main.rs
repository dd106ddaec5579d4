use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use talkie_dict::{order_sources, CompileOptions, Compiler, PackReport, Result, TalkieError};

#[derive(Parser, Debug)]
#[command(name = "talkie-dict", version, about = "Compile Talkie speech datastreams into canonical headers and a binary dictionary")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: OptionArgs,

    /// Show progress logs (honours RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logs
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite every source file as a canonical header
    Standardize {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Extension of the source files to read
        #[arg(long, default_value = "ino")]
        ext: String,
    },
    /// Pack canonical headers into a data file and an index file
    Pack {
        input_dir: PathBuf,
        #[arg(long, default_value = "h")]
        ext: String,
        #[command(flatten)]
        outputs: OutputArgs,
    },
    /// Standardize sources and pack them in one run
    Build {
        input_dir: PathBuf,
        #[arg(long, default_value = "ino")]
        ext: String,
        /// Also write canonical headers to this directory
        #[arg(long)]
        standard_dir: Option<PathBuf>,
        #[command(flatten)]
        outputs: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    #[arg(long, default_value = "talkie.dat")]
    data: PathBuf,
    #[arg(long, default_value = "talkie.ndx")]
    index: PathBuf,
}

#[derive(Args, Debug)]
struct OptionArgs {
    /// Byte literals per line of canonical output
    #[arg(long, global = true, default_value_t = 24)]
    wrap_width: usize,
    /// Storage qualifier marking declarations
    #[arg(long, global = true, default_value = "PROGMEM")]
    qualifier: String,
    /// Accepted element type keywords
    #[arg(long = "type-keyword", global = true, value_delimiter = ',', default_values = ["byte", "uint8_t"])]
    type_keywords: Vec<String>,
    /// Identifier prefix stripped from dictionary names
    #[arg(long, global = true, default_value = "sp")]
    prefix: String,
    /// Files whose name contains this are packed first
    #[arg(long, global = true, default_value = "_us_")]
    first: String,
    /// Files whose name contains this are packed last
    #[arg(long = "final", global = true, default_value = "_uk_")]
    final_marker: String,
    /// Encoding of the source files
    #[arg(long, global = true, default_value = "utf-8")]
    encoding: String,
}

impl From<OptionArgs> for CompileOptions {
    fn from(args: OptionArgs) -> Self {
        CompileOptions {
            wrap_width: args.wrap_width,
            storage_qualifier: args.qualifier,
            type_keywords: args.type_keywords,
            name_prefix: args.prefix,
            first_marker: args.first,
            final_marker: args.final_marker,
            encoding: args.encoding,
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut compiler = Compiler::new(cli.options.into())?;

    match cli.command {
        Command::Standardize { input_dir, output_dir, ext } => {
            fs::create_dir_all(&output_dir)?;
            for path in list_sources(&input_dir, &ext)? {
                let output = header_path(&output_dir, &path);
                println!("Processing {}...", path.display());
                let text = compiler.decode_source(&fs::read(&path)?)?;
                let file = compiler.standardize(&display(&path), &display(&output), &text)?;
                fs::write(&output, file.text)?;
            }
            println!();
            println!("{}", compiler.standardize_summary());
        }
        Command::Pack { input_dir, ext, outputs } => {
            let sources = order_sources(list_sources(&input_dir, &ext)?.iter().map(|p| display(p)).collect(), compiler.options());
            for source in &sources {
                println!("Loading words from: {}", source);
                let text = compiler.decode_source(&fs::read(source)?)?;
                compiler.load_canonical(source, &text)?;
            }
            write_dictionary(compiler.finish(), &outputs)?;
        }
        Command::Build { input_dir, ext, standard_dir, outputs } => {
            let mut files = Vec::new();
            for path in list_sources(&input_dir, &ext)? {
                let origin = display(&path);
                let text = compiler.decode_source(&fs::read(&path)?)?;
                let output = standard_dir.as_deref().map(|dir| header_path(dir, &path));
                let label = output.as_deref().map(display).unwrap_or_default();
                let file = compiler.standardize(&origin, &label, &text)?;
                if let Some(output) = output {
                    if let Some(dir) = output.parent() {
                        fs::create_dir_all(dir)?;
                    }
                    fs::write(&output, &file.text)?;
                }
                files.push((origin, file));
            }
            println!("{}", compiler.standardize_summary());
            println!();

            let ordered = talkie_dict::order_sources_by(files, compiler.options(), |(origin, _)| origin.as_str());
            for (origin, file) in &ordered {
                compiler.forward(origin, file);
            }
            write_dictionary(compiler.finish(), &outputs)?;
        }
    }
    Ok(())
}

fn write_dictionary(report: PackReport, outputs: &OutputArgs) -> Result<()> {
    for failure in &report.failures {
        println!("  *** Name [{}] from {}: {}", failure.name, failure.origin, failure.error);
        println!("    {}", failure.tokens.join(","));
    }
    report.artifact.write_to(&outputs.data, &outputs.index)?;

    println!("{}", report.stats);
    println!();
    println!(
        "Output {} words to {} ({:5} bytes).",
        report.stats.words,
        outputs.index.display(),
        report.stats.index_bytes
    );
    println!(
        "Output {} words to {} ({:5} bytes).",
        report.stats.words,
        outputs.data.display(),
        report.stats.data_bytes
    );
    Ok(())
}

/// Files in `dir` with extension `ext` (case-insensitive), sorted by name.
fn list_sources(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TalkieError::InvalidOption(format!("{} is not a directory", dir.display())));
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// `<output_dir>/<source stem, lower-cased>.h`
fn header_path(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or("words")
        .to_lowercase();
    output_dir.join(format!("{}.h", stem))
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
