use eyre::{Result, WrapErr};
use std::io::Write;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod progmem;
mod ydl;

/// ydl2progmem: THR preset bank to C array
///
/// Dumps the patches of a .YDL file as a PROGMEM byte array on stdout.
#[derive(StructOpt, Debug)]
#[structopt(name = "ydl2progmem")]
struct Opt {
    /// Name of patch file in YDL format
    #[structopt(name = "PATCHFILE", parse(from_os_str))]
    patchfile: PathBuf,

    /// Number of patches to convert, at most 100
    #[structopt(
        short = "n",
        long = "numpatches",
        default_value = "100",
        allow_hyphen_values = true
    )]
    numpatches: i64,

    /// Read the whole requested length or fail
    #[structopt(long)]
    strict: bool,

    /// List all patches in the file
    #[structopt(short, long, conflicts_with_all = &["patch", "strict"])]
    list: bool,

    /// Dump one patch as a sysex message, needs --output
    #[structopt(short, long, requires = "output")]
    patch: Option<usize>,

    /// Sysex output file
    #[structopt(short, long, parse(from_os_str), requires = "patch")]
    output: Option<PathBuf>,

    /// Log more to stderr, repeat for more detail
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn init_logging(verbose: u8) {
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

fn convert<W: Write>(path: &Path, count: i64, strict: bool, out: &mut W) -> Result<()> {
    let patches = {
        let f = std::fs::File::open(path)
            .wrap_err_with(|| format!("Cannot open patch file {}", path.display()))?;
        ydl::read_patches(f, count, strict)
            .wrap_err_with(|| format!("Cannot read patch file {}", path.display()))?
    };
    info!(bytes = patches.len(), "read patch data");

    progmem::write_array(out, &patches).wrap_err("Could not write to stdout")?;
    out.flush()?;

    Ok(())
}

fn list<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let bank = ydl::PatchBank::load(path)
        .wrap_err_with(|| format!("Cannot load preset file {}", path.display()))?;
    if bank.is_empty() {
        warn!("no complete patches in {}", path.display());
    }
    debug!(patches = bank.len(), "loaded bank");

    for (index, name) in bank.names() {
        writeln!(out, "{}: {}", index, name)?;
    }

    Ok(())
}

fn dump_sysex(path: &Path, index: usize, output: &Path) -> Result<()> {
    let bank = ydl::PatchBank::load(path)
        .wrap_err_with(|| format!("Cannot load preset file {}", path.display()))?;
    let msg = bank.sysex(index)?;

    std::fs::write(output, &msg[..])
        .wrap_err_with(|| format!("Cannot write output file {}", output.display()))?;
    info!(patch = index, file = %output.display(), "wrote sysex");

    Ok(())
}

fn run(args: &Opt) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.list {
        if args.numpatches != ydl::MAX_PATCHES {
            warn!(numpatches = args.numpatches, "--numpatches has no effect with --list");
        }
        return list(&args.patchfile, &mut out);
    }

    match (args.patch, &args.output) {
        (Some(index), Some(output)) => dump_sysex(&args.patchfile, index, output),
        _ => convert(&args.patchfile, args.numpatches, args.strict, &mut out),
    }
}

fn main() {
    let args = Opt::from_args();
    init_logging(args.verbose);
    debug!(?args, "parsed arguments");

    match run(&args) {
        Ok(_) => (),
        Err(e) => {
            let stderr = std::io::stderr();
            // Nothing left to report to if stderr is gone.
            let _ = writeln!(&mut stderr.lock(), "Error: {:?}", e);
            std::process::exit(1);
        }
    }
}
