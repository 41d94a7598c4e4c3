use clap::{ArgAction, Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

use glkern::diagnostic::Diagnostic;
use glkern::{compile_module, source_hash, CodegenError, CodegenOptions, KernelModule};

#[derive(Parser)]
#[command(
    name = "glkern",
    version,
    about = "GLSL fragment shaders from kernel IR"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Codegen settings (default: ./glkern.toml if present)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile JSON kernel modules to .glsl files
    Build {
        /// Kernel module files (.json)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Spaces per indentation level (overrides the config file)
        #[arg(long)]
        indent: Option<usize>,
        /// Skip constant folding after texture-load injection
        #[arg(long)]
        no_simplify: bool,
        /// Print the BLAKE3 hash of each module
        #[arg(long)]
        hash: bool,
    },
    /// Compile a kernel module and dump its GLSL to stderr
    Dump {
        /// Kernel module file (.json)
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = load_options(cli.config.as_deref());

    match cli.command {
        Command::Build {
            inputs,
            output,
            indent,
            no_simplify,
            hash,
        } => {
            let mut options = options;
            if let Some(indent) = indent {
                options.indent_width = indent;
            }
            if no_simplify {
                options.simplify = false;
            }
            cmd_build(&inputs, output.as_deref(), &options, hash)
        }
        Command::Dump { input } => cmd_dump(&input, &options),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(path: Option<&Path>) -> CodegenOptions {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from("glkern.toml"), false),
    };
    if !explicit && !path.exists() {
        return CodegenOptions::default();
    }
    match CodegenOptions::load(&path) {
        Ok(options) => options,
        Err(d) => {
            let filename = path.display().to_string();
            let source = std::fs::read_to_string(&path).unwrap_or_default();
            d.render(&filename, &source);
            process::exit(1);
        }
    }
}

// --- glkern build ---

/// Why one input file failed.
enum Failure {
    Io(String),
    Parse {
        filename: String,
        source: String,
        diagnostic: Diagnostic,
    },
    Codegen {
        filename: String,
        error: CodegenError,
    },
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Codegen { error, .. } if error.is_internal() => 101,
            _ => 1,
        }
    }

    fn report(&self) {
        match self {
            Failure::Io(message) => eprintln!("error: {}", message),
            Failure::Parse {
                filename,
                source,
                diagnostic,
            } => diagnostic.render(filename, source),
            Failure::Codegen { filename, error } => eprintln!("error: {}: {}", filename, error),
        }
    }
}

struct Built {
    output: PathBuf,
    kernels: usize,
    hash: blake3::Hash,
}

fn read_module(input: &Path) -> Result<KernelModule, Failure> {
    let filename = input.display().to_string();
    let source = std::fs::read_to_string(input)
        .map_err(|e| Failure::Io(format!("cannot read '{}': {}", filename, e)))?;
    KernelModule::parse(&source).map_err(|diagnostic| Failure::Parse {
        filename,
        source,
        diagnostic,
    })
}

fn build_one(
    input: &Path,
    out_dir: Option<&Path>,
    options: &CodegenOptions,
) -> Result<Built, Failure> {
    let module = read_module(input)?;
    let backend = compile_module(&module, options).map_err(|error| Failure::Codegen {
        filename: input.display().to_string(),
        error,
    })?;

    let file_name = input.with_extension("glsl");
    let output = match out_dir {
        Some(dir) => dir.join(file_name.file_name().unwrap_or_default()),
        None => file_name,
    };
    std::fs::write(&output, backend.source())
        .map_err(|e| Failure::Io(format!("cannot write '{}': {}", output.display(), e)))?;

    Ok(Built {
        output,
        kernels: module.kernels.len(),
        hash: source_hash(backend.source()),
    })
}

fn cmd_build(inputs: &[PathBuf], out_dir: Option<&Path>, options: &CodegenOptions, hash: bool) {
    if let Some(dir) = out_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("error: cannot create directory '{}': {}", dir.display(), e);
            process::exit(1);
        }
    }

    // One backend per file: modules are independent.
    let results: Vec<Result<Built, Failure>> = inputs
        .par_iter()
        .map(|input| build_one(input, out_dir, options))
        .collect();

    let mut exit_code = 0;
    for result in &results {
        match result {
            Ok(built) => {
                if hash {
                    println!("{}  {}", built.hash.to_hex(), built.output.display());
                } else {
                    eprintln!(
                        "Compiled {} kernel(s) -> {}",
                        built.kernels,
                        built.output.display()
                    );
                }
            }
            Err(failure) => {
                failure.report();
                exit_code = exit_code.max(failure.exit_code());
            }
        }
    }
    if exit_code != 0 {
        process::exit(exit_code);
    }
}

// --- glkern dump ---

fn cmd_dump(input: &Path, options: &CodegenOptions) {
    let result = read_module(input).and_then(|module| {
        compile_module(&module, options).map_err(|error| Failure::Codegen {
            filename: input.display().to_string(),
            error,
        })
    });
    match result {
        Ok(backend) => backend.dump(),
        Err(failure) => {
            failure.report();
            process::exit(failure.exit_code());
        }
    }
}
