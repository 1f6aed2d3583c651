use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use exafs_ccwt::config::{CcwtConfig, ExtrapolationPolicy};
use exafs_ccwt::logging::{init_logging, LogLevel};
use exafs_ccwt::pipeline::{run, RunOptions, RunSummary};
use exafs_ccwt::{CcwtError, Result};

/// Continuous Cauchy wavelet transform of an EXAFS spectrum
#[derive(Parser, Debug)]
#[command(name = "exafs-ccwt", version)]
struct Cli {
    /// Two-column (k, chi) input file
    input: PathBuf,

    /// TOML file with analysis parameters (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cauchy wavelet order
    #[arg(short = 'n', long)]
    order: Option<usize>,

    /// Minimum R-space distance (Å)
    #[arg(long)]
    r_min: Option<f64>,

    /// Maximum R-space distance (Å)
    #[arg(long)]
    r_max: Option<f64>,

    /// Number of R-space intervals
    #[arg(long)]
    na: Option<usize>,

    /// Leading lines of the input file to skip
    #[arg(long)]
    skip: Option<usize>,

    /// Start of the resampled k range (1/Å)
    #[arg(long, conflicts_with = "k_from_data")]
    k_min: Option<f64>,

    /// End of the resampled k range (1/Å)
    #[arg(long, conflicts_with = "k_from_data")]
    k_max: Option<f64>,

    /// Resample over the k range of the data instead of k-min..k-max
    #[arg(long)]
    k_from_data: bool,

    /// Number of resampled points
    #[arg(long)]
    nt: Option<usize>,

    /// Zero-padding factor of the Fourier transform
    #[arg(short = 'z', long)]
    oversampling: Option<usize>,

    /// Behaviour when the k range exceeds the data: clamp or reject
    #[arg(long)]
    extrapolation: Option<ExtrapolationPolicy>,

    /// Directory for the output files (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// k columns of the display mesh
    #[arg(long)]
    display_nk: Option<usize>,

    /// R rows of the display mesh
    #[arg(long)]
    display_nr: Option<usize>,

    /// Upper bound of the color scale
    #[arg(long)]
    vmax: Option<f64>,

    /// Skip PNG rendering
    #[arg(long)]
    no_plot: bool,

    /// Suppress the banner and informational logs
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Defaults, then the config file, then explicit flags
    fn resolve_config(&self) -> Result<CcwtConfig> {
        let mut config = match &self.config {
            Some(path) => CcwtConfig::from_file(path)?,
            None => CcwtConfig::default(),
        };

        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(r_min) = self.r_min {
            config.r_min = r_min;
        }
        if let Some(r_max) = self.r_max {
            config.r_max = r_max;
        }
        if let Some(na) = self.na {
            config.na = na;
        }
        if let Some(skip) = self.skip {
            config.skip = skip;
        }
        if let Some(k_min) = self.k_min {
            config.k_min = k_min;
        }
        if let Some(k_max) = self.k_max {
            config.k_max = k_max;
        }
        if self.k_from_data {
            config.k_from_data = true;
        }
        if let Some(nt) = self.nt {
            config.nt = nt;
        }
        if let Some(z) = self.oversampling {
            config.oversampling = z;
        }
        if let Some(policy) = self.extrapolation {
            config.extrapolation = policy;
        }
        if let Some(nk) = self.display_nk {
            config.display.nk = Some(nk);
        }
        if let Some(nr) = self.display_nr {
            config.display.nr = Some(nr);
        }
        if let Some(vmax) = self.vmax {
            config.display.vmax = Some(vmax);
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_banner() {
    println!();
    println!("%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%");
    println!("%         CONTINUOUS CAUCHY WAVELET TRANSFORM     %");
    println!("%                 OF EXAFS SIGNAL                 %");
    println!("%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%");
    println!();
    println!("Reference:");
    println!("  Munoz M., Argoul P. and Farges F. (2003)");
    println!("  Continuous Cauchy wavelet transform analyses of EXAFS spectra:");
    println!("  a qualitative approach. American Mineralogist 88, 694-700.");
    println!();
}

/// Resolve the configuration and run the pipeline
fn execute(cli: &Cli) -> Result<RunSummary> {
    let config = cli.resolve_config()?;
    let options = RunOptions {
        input: cli.input.clone(),
        output_dir: cli.output_dir.clone(),
        plot: !cli.no_plot,
    };
    run(&options, &config)
}

fn diagnostic(err: &CcwtError) -> String {
    format!("error [{}]: {}", err.stage(), err)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LogLevel::from_flags(cli.verbose, cli.quiet));

    if !cli.quiet {
        print_banner();
    }

    match execute(&cli) {
        Ok(summary) => {
            if !cli.quiet {
                println!("Wrote {}", summary.artifacts.surface.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", diagnostic(&e));
            ExitCode::FAILURE
        }
    }
}
