use clap::{Parser, Subcommand};
use ctl_analysis::{LocusLimits, disk_margins, pole_zero_map_one, root_locus_map_with};
use ctl_core::{AnalysisDefaults, logspace};
use ctl_lti::{FrequencyResponseData, Lti, System};
use ctl_project::{SystemSet, build_systems_with};
use num_complex::Complex64;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;

use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "ctl-cli")]
#[command(about = "ctlkit CLI - linear system analysis from model files", long_about = None)]
struct Cli {
    /// Analysis defaults (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate model file syntax and structure
    Validate {
        /// Path to the model file
        model_path: PathBuf,
    },
    /// Print systems of a model file
    Show {
        /// Path to the model file
        model_path: PathBuf,
        /// Only this system
        #[arg(long)]
        system: Option<String>,
    },
    /// Poles, zeros and damping
    Pzmap {
        /// Path to the model file
        model_path: PathBuf,
        /// Only this system
        #[arg(long)]
        system: Option<String>,
    },
    /// Closed-loop roots under static output feedback
    Rlocus {
        /// Path to the model file
        model_path: PathBuf,
        /// System ID (SISO)
        #[arg(long)]
        system: String,
        /// Feedback gains (defaults to a log-spaced sweep)
        #[arg(long, num_args = 1.., value_delimiter = ',', allow_negative_numbers = true)]
        gains: Option<Vec<f64>>,
        /// Real-axis limits as `lo,hi`
        #[arg(long, num_args = 2, value_delimiter = ',', allow_negative_numbers = true)]
        xlim: Option<Vec<f64>>,
        /// Imaginary-axis limits as `lo,hi`
        #[arg(long, num_args = 2, value_delimiter = ',', allow_negative_numbers = true)]
        ylim: Option<Vec<f64>>,
    },
    /// Frequency response on a log-spaced grid
    Freqresp {
        /// Path to the model file
        model_path: PathBuf,
        /// System ID
        #[arg(long)]
        system: String,
        /// Lowest frequency in rad/s
        #[arg(long)]
        wmin: f64,
        /// Highest frequency in rad/s
        #[arg(long)]
        wmax: f64,
        /// Number of frequencies
        #[arg(long)]
        points: Option<usize>,
        /// Output CSV file path (optional, prints a table otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Disk-based gain and phase margins
    Margins {
        /// Path to the model file
        model_path: PathBuf,
        /// Loop transfer function system ID
        #[arg(long)]
        system: String,
        /// Lowest frequency in rad/s
        #[arg(long)]
        wmin: f64,
        /// Highest frequency in rad/s
        #[arg(long)]
        wmax: f64,
        /// Number of frequencies
        #[arg(long)]
        points: Option<usize>,
        /// 1 for S-based, -1 for T-based, 0 for balanced disks
        #[arg(long, allow_hyphen_values = true)]
        skew: Option<f64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let defaults = match &cli.config {
        Some(path) => AnalysisDefaults::load(path)?,
        None => AnalysisDefaults::default(),
    };

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path),
        Commands::Show { model_path, system } => {
            cmd_show(&model_path, system.as_deref(), &defaults)
        }
        Commands::Pzmap { model_path, system } => {
            cmd_pzmap(&model_path, system.as_deref(), &defaults)
        }
        Commands::Rlocus {
            model_path,
            system,
            gains,
            xlim,
            ylim,
        } => {
            let limits = LocusLimits {
                xlim: axis_limits(xlim.as_deref(), "xlim")?,
                ylim: axis_limits(ylim.as_deref(), "ylim")?,
            };
            cmd_rlocus(&model_path, &system, gains.as_deref(), limits, &defaults)
        }
        Commands::Freqresp {
            model_path,
            system,
            wmin,
            wmax,
            points,
            output,
        } => {
            let omega = sweep(wmin, wmax, points, &defaults)?;
            cmd_freqresp(&model_path, &system, &omega, output.as_deref(), &defaults)
        }
        Commands::Margins {
            model_path,
            system,
            wmin,
            wmax,
            points,
            skew,
        } => {
            let omega = sweep(wmin, wmax, points, &defaults)?;
            let skew = skew.unwrap_or(defaults.margins.skew);
            cmd_margins(&model_path, &system, &omega, skew, &defaults)
        }
    }
}

/// Log-spaced grid; without an explicit count, the configured density per
/// decade is used.
fn sweep(
    wmin: f64,
    wmax: f64,
    points: Option<usize>,
    defaults: &AnalysisDefaults,
) -> CliResult<Vec<f64>> {
    if !(wmin > 0.0 && wmax > wmin && wmax.is_finite()) {
        return Err(CliError::InvalidInput(format!(
            "need 0 < wmin < wmax, got wmin = {wmin}, wmax = {wmax}"
        )));
    }
    let (lo, hi) = (wmin.log10(), wmax.log10());
    let n = points.unwrap_or_else(|| {
        ((hi - lo) * defaults.sweep.points_per_decade as f64).ceil() as usize + 1
    });
    if n == 0 {
        return Err(CliError::InvalidInput("points must be positive".to_string()));
    }
    Ok(logspace(lo, hi, n))
}

fn load_systems(model_path: &Path, defaults: &AnalysisDefaults) -> CliResult<SystemSet> {
    let project = ctl_project::load(model_path)?;
    info!(name = %project.name, systems = project.systems.len(), "loaded model file");
    Ok(build_systems_with(&project, defaults)?)
}

fn selected<'a>(
    systems: &'a SystemSet,
    id: Option<&'a str>,
) -> CliResult<Vec<(&'a str, &'a System)>> {
    match id {
        Some(id) => Ok(vec![(id, systems.require(id)?)]),
        None => Ok(systems.iter().collect()),
    }
}

fn fmt_complex(c: Complex64) -> String {
    if c.im == 0.0 {
        format!("{:.6}", c.re)
    } else {
        format!("{:.6}{:+.6}j", c.re, c.im)
    }
}

fn cmd_validate(model_path: &Path) -> CliResult<()> {
    println!("Validating model file: {}", model_path.display());
    let project = ctl_project::load(model_path)?;
    println!("✓ Model file is valid ({} systems)", project.systems.len());
    Ok(())
}

fn cmd_show(model_path: &Path, id: Option<&str>, defaults: &AnalysisDefaults) -> CliResult<()> {
    let systems = load_systems(model_path, defaults)?;
    if systems.is_empty() {
        println!("No systems found in model file");
    }
    for (id, sys) in selected(&systems, id)? {
        println!("[{id}] {}", sys.kind());
        println!("{sys}");
    }
    Ok(())
}

fn cmd_pzmap(model_path: &Path, id: Option<&str>, defaults: &AnalysisDefaults) -> CliResult<()> {
    let systems = load_systems(model_path, defaults)?;
    for (id, sys) in selected(&systems, id)? {
        if matches!(sys, System::Frd(_)) {
            println!("[{id}] frequency response data has no poles or zeros");
            continue;
        }
        let pz = match pole_zero_map_one(sys) {
            Ok(pz) => pz,
            Err(e) => {
                println!("[{id}] {e}");
                continue;
            }
        };
        println!("[{id}] {} ({})", pz.sysname, pz.timebase);
        println!("  Poles:");
        for d in pz.damping() {
            println!(
                "    {:>28}  wn = {:.4}  zeta = {:.4}",
                fmt_complex(d.pole),
                d.natural_frequency,
                d.damping_ratio
            );
        }
        println!("  Zeros:");
        for z in &pz.zeros {
            println!("    {:>28}", fmt_complex(*z));
        }
    }
    Ok(())
}

fn axis_limits(values: Option<&[f64]>, flag: &str) -> CliResult<Option<(f64, f64)>> {
    match values {
        None => Ok(None),
        Some(&[lo, hi]) if lo < hi => Ok(Some((lo, hi))),
        Some(_) => Err(CliError::InvalidInput(format!(
            "--{flag} needs two increasing values"
        ))),
    }
}

fn cmd_rlocus(
    model_path: &Path,
    id: &str,
    gains: Option<&[f64]>,
    limits: LocusLimits,
    defaults: &AnalysisDefaults,
) -> CliResult<()> {
    let systems = load_systems(model_path, defaults)?;
    let sys = systems.require(id)?;
    let rl = root_locus_map_with(sys, gains, limits, &defaults.rlocus)?;
    println!(
        "Root locus of {} ({} gains)",
        rl.sysname,
        rl.gains.as_ref().map_or(0, Vec::len)
    );
    if let (Some(xlim), Some(ylim)) = (rl.xlim, rl.ylim) {
        println!(
            "  Real axis [{:.3}, {:.3}], imaginary axis [{:.3}, {:.3}]",
            xlim.0, xlim.1, ylim.0, ylim.1
        );
    }
    if let (Some(gains), Some(loci)) = (&rl.gains, &rl.loci) {
        for (k, roots) in gains.iter().zip(loci) {
            let roots: Vec<String> = roots.iter().map(|r| fmt_complex(*r)).collect();
            println!("{k:>14.6e}  {}", roots.join("  "));
        }
    }
    Ok(())
}

fn cmd_freqresp(
    model_path: &Path,
    id: &str,
    omega: &[f64],
    output: Option<&Path>,
    defaults: &AnalysisDefaults,
) -> CliResult<()> {
    let systems = load_systems(model_path, defaults)?;
    let sys = systems.require(id)?;
    let frd = match sys {
        System::Frd(data) => data.frequency_response(omega)?,
        other => FrequencyResponseData::from_system(other, omega)?,
    };

    match output {
        Some(path) => {
            frd.write_csv(BufWriter::new(File::create(path)?))?;
            println!("✓ Wrote {} frequencies to {}", frd.len(), path.display());
        }
        None => print!("{frd}"),
    }
    Ok(())
}

fn cmd_margins(
    model_path: &Path,
    id: &str,
    omega: &[f64],
    skew: f64,
    defaults: &AnalysisDefaults,
) -> CliResult<()> {
    let systems = load_systems(model_path, defaults)?;
    let sys = systems.require(id)?;
    let dm = disk_margins(sys, omega, skew)?;
    let Some(min) = dm.minimum() else {
        return Err(CliError::InvalidInput("empty frequency grid".to_string()));
    };
    println!("Disk margins of {} (skew = {skew})", sys.name());
    println!("  min(DM) = {:.6} at {:.4} rad/s", min.disk.0, min.disk.1);
    println!("  min(GM) = {:.6} dB at {:.4} rad/s", min.gain_db.0, min.gain_db.1);
    println!("  min(PM) = {:.6} deg at {:.4} rad/s", min.phase_deg.0, min.phase_deg.1);
    Ok(())
}
