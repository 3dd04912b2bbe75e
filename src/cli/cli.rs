use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli::progress::{ProgressDisplayer, progress_displayer};
use crate::cores::resource::OnFailure;
use crate::errors::RetdecError;
use crate::modules::decompiler::{Decompilation, DecompilationArguments, Decompiler, detect_mode};
use crate::modules::fileinfo::{AnalysisArguments, Fileinfo};
use crate::services::{ApiTester, Service, ServiceConfig};

// logging
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "retdec",
    about = "Client of the retdec.com decompilation service",
    version
)]
pub struct Cli {
    /// global log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// API key (default: $RETDEC_API_KEY)
    #[arg(short = 'k', long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// URL to the API (default: $RETDEC_API_URL or the public service)
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decompile a file and save the outputs next to it (or into -o DIR)
    Decompile(DecompileArgs),
    /// Analyze a file and print the result
    Fileinfo {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// print all available information
        #[arg(long)]
        verbose: bool,
    },
    /// Check that the API key is accepted
    Auth,
}

#[derive(clap::Args, Debug)]
pub struct DecompileArgs {
    /// file to decompile
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// decompilation mode (default: automatic detection)
    #[arg(short, long, value_parser = ["c", "bin"])]
    pub mode: Option<String>,

    /// save the outputs into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// print no progress
    #[arg(short, long)]
    pub quiet: bool,

    /// print a progress bar instead of the phase log
    #[arg(short, long)]
    pub brief: bool,

    /// also generate and download an archive with all outputs
    #[arg(long)]
    pub archive: bool,

    /// also generate and download the call graph
    #[arg(long)]
    pub cg: bool,

    /// also generate and download control-flow graphs of all functions
    #[arg(long)]
    pub cfgs: bool,

    #[arg(long, value_parser = ["c", "py"])]
    pub target_language: Option<String>,

    #[arg(long, value_parser = ["x86", "arm", "thumb", "mips", "pic32", "powerpc"])]
    pub architecture: Option<String>,

    #[arg(long, value_parser = ["png", "svg", "pdf"])]
    pub graph_format: Option<String>,

    #[arg(long, value_parser = ["none", "limited", "normal", "aggressive"])]
    pub optimizations: Option<String>,

    /// decompile only the given functions (comma separated)
    #[arg(long, value_name = "FUNCS")]
    pub select_functions: Option<String>,
}

impl DecompileArgs {
    fn to_arguments(&self) -> DecompilationArguments {
        let mut args = DecompilationArguments::new(&self.file);
        args.mode = self.mode.clone();
        args.target_language = self.target_language.clone();
        args.architecture = self.architecture.clone();
        args.graph_format = self.graph_format.clone();
        args.decomp_optimizations = self.optimizations.clone();
        args.sel_decomp_funcs = self.select_functions.clone();
        args.generate_archive = self.archive.then_some(true);
        args.generate_cg = self.cg.then_some(true);
        args.generate_cfgs = self.cfgs.then_some(true);
        args
    }

    fn mode(&self) -> String {
        match &self.mode {
            Some(m) => m.to_lowercase(),
            None => detect_mode(&self.file).to_string(),
        }
    }
}

/// Directory the outputs are saved into, as an absolute path.
pub fn output_dir(input_file: &Path, explicit: Option<&Path>) -> io::Result<PathBuf> {
    let dir = match explicit {
        Some(d) => d,
        None => input_file.parent().unwrap_or(Path::new("")),
    };
    if dir.as_os_str().is_empty() {
        std::env::current_dir()
    } else {
        std::path::absolute(dir)
    }
}

pub fn run_from_args<I, T>(args: I) -> Result<(), RetdecError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // initialize tracing according to log_level (ok if already initialized in tests)
    let env_filter = EnvFilter::new(cli.log_level.clone());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
    info!("Starting retdec, log_level={}", cli.log_level);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

/// Runs a parsed command, writing its output to `out`.
pub fn execute(cli: Cli, out: &mut dyn Write) -> Result<(), RetdecError> {
    let service = Service::new(ServiceConfig {
        api_key: cli.api_key,
        api_url: cli.api_url,
        ..Default::default()
    })?;

    match cli.cmd {
        Commands::Decompile(args) => decompile(&service, &args, out),
        Commands::Fileinfo { file, verbose } => {
            let fileinfo = Fileinfo::new(&service)?;
            let mut analysis_args = AnalysisArguments::new(&file);
            if verbose {
                analysis_args = analysis_args.verbose(true);
            }
            let mut analysis = fileinfo.run_analysis(&analysis_args)?;
            analysis.wait_until_finished(OnFailure::Raise)?;
            out.write_all(analysis.get_output()?.as_bytes())?;
            Ok(())
        }
        Commands::Auth => {
            ApiTester::new(&service)?.auth()?;
            writeln!(out, "authentication to {} succeeded", service.api_url())?;
            Ok(())
        }
    }
}

fn decompile(
    service: &Service,
    args: &DecompileArgs,
    out: &mut dyn Write,
) -> Result<(), RetdecError> {
    let decompiler = Decompiler::new(service)?;
    let mut dec = decompiler.run_decompilation(&args.to_arguments())?;
    let mut displayer = progress_displayer(args.quiet, args.brief);

    // the first failed write stops progress output and is reported after the wait
    let mut progress_error: Option<io::Error> = None;
    dec.wait_until_finished_with(
        |d| {
            if progress_error.is_none()
                && let Err(e) = displayer.display_decompilation_progress(&mut *out, d)
            {
                progress_error = Some(e);
            }
        },
        OnFailure::Raise,
    )?;
    if let Some(e) = progress_error {
        return Err(e.into());
    }

    let dir = output_dir(&args.file, args.output_dir.as_deref())?;
    let saved = dec.save_hll_code(Some(dir.as_path()))?;
    announce(displayer.as_mut(), out, &saved)?;
    let saved = dec.save_dsm_code(Some(dir.as_path()))?;
    announce(displayer.as_mut(), out, &saved)?;

    if args.mode() == "c" {
        let saved = dec.save_binary(Some(dir.as_path()))?;
        announce(displayer.as_mut(), out, &saved)?;
    }
    if args.archive {
        dec.wait_until_archive_is_generated(OnFailure::Raise)?;
        let saved = dec.save_archive(Some(dir.as_path()))?;
        announce(displayer.as_mut(), out, &saved)?;
    }
    if args.cg {
        dec.wait_until_cg_is_generated(OnFailure::Raise)?;
        let saved = dec.save_cg(Some(dir.as_path()))?;
        announce(displayer.as_mut(), out, &saved)?;
    }
    if args.cfgs {
        save_cfgs(&mut dec, &dir, displayer.as_mut(), out)?;
    }
    Ok(())
}

fn save_cfgs(
    dec: &mut Decompilation,
    dir: &Path,
    displayer: &mut dyn ProgressDisplayer,
    out: &mut dyn Write,
) -> Result<(), RetdecError> {
    for func in dec.funcs_with_cfg()? {
        dec.wait_until_cfg_is_generated(&func, OnFailure::Raise)?;
        let saved = dec.save_cfg(&func, Some(dir))?;
        announce(displayer, out, &saved)?;
    }
    Ok(())
}

fn announce(
    displayer: &mut dyn ProgressDisplayer,
    out: &mut dyn Write,
    saved: &Path,
) -> Result<(), RetdecError> {
    let name = saved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    displayer.display_download_progress(out, &name)?;
    Ok(())
}

pub fn run() -> Result<(), RetdecError> {
    run_from_args(std::env::args())
}
