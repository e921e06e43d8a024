use clap::{Parser, Subcommand};
use pf_app::{AnalysisReport, AppError, AppResult, ModesSummary};
use pf_core::{Sweep, VelocityUnit};
use pf_flutter::{DAMPING_NOISE_THRESHOLD, DetectorConfig, Diagnostic, FlutterReport};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "PanelFlutter CLI - aeroelastic panel flutter analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an analysis case file
    Validate {
        /// Path to the case file (YAML, or JSON by extension)
        case_path: PathBuf,
    },
    /// Print the stiffness and natural modes of a case
    Modes {
        /// Path to the case file
        case_path: PathBuf,
    },
    /// Run the full flutter analysis of a case
    Analyze {
        /// Path to the case file
        case_path: PathBuf,
        /// Write the JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the sweep as CSV here
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Stop sweeping once flutter is confirmed
        #[arg(long)]
        stop_at_onset: bool,
    },
    /// Run the onset detector on external solver records
    Detect {
        /// JSON array of { velocity, damping[], frequency_hz[] } records
        records_path: PathBuf,
        /// Velocity unit of the records (m/s, cm/s, mm/s, in/s, ft/s, kn, km/h)
        #[arg(long, default_value = "m/s")]
        unit: VelocityUnit,
        /// Damping noise threshold
        #[arg(long, default_value_t = DAMPING_NOISE_THRESHOLD)]
        threshold: f64,
        /// Accept a single point above the threshold as flutter
        #[arg(long)]
        no_confirmation: bool,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Modes { case_path } => cmd_modes(&case_path),
        Commands::Analyze {
            case_path,
            output,
            csv,
            stop_at_onset,
        } => cmd_analyze(&case_path, output.as_deref(), csv.as_deref(), stop_at_onset),
        Commands::Detect {
            records_path,
            unit,
            threshold,
            no_confirmation,
        } => cmd_detect(&records_path, unit, threshold, !no_confirmation),
    }
}

fn cmd_validate(case_path: &Path) -> AppResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = pf_app::load_case(case_path)?;
    println!("✓ Case '{}' is valid", case.name);
    println!("  Case id: {}", pf_app::compute_case_id(&case));
    Ok(())
}

fn cmd_modes(case_path: &Path) -> AppResult<()> {
    let case = pf_app::load_case(case_path)?;
    let summary = pf_app::run_modes(&case)?;
    print_modes(&summary);
    Ok(())
}

fn print_modes(summary: &ModesSummary) {
    let stiffness = summary.modal.stiffness();
    println!("Material: {}", summary.material.kind_name());
    println!(
        "  D11 = {:.4e} N*m, D22 = {:.4e} N*m, D12 = {:.4e} N*m, D66 = {:.4e} N*m",
        stiffness.d11(),
        stiffness.d22(),
        stiffness.d12(),
        stiffness.d66()
    );
    println!(
        "  h = {:.4} mm, rho = {:.1} kg/m^3",
        stiffness.thickness * 1e3,
        stiffness.density
    );
    println!("Modes:");
    println!("  {:>3}  {:>3} {:>3}  {:>10}  {:>12}", "#", "m", "n", "f [Hz]", "M_gen [kg]");
    for (i, row) in summary.rows().iter().enumerate() {
        println!(
            "  {:>3}  {:>3} {:>3}  {:>10.3}  {:>12.5}",
            i + 1,
            row.m,
            row.n,
            row.frequency.value,
            row.generalized_mass
        );
    }
    for approximation in &summary.modal.provenance().approximations {
        println!("  ! {:?}", approximation);
    }
}

fn cmd_analyze(
    case_path: &Path,
    output: Option<&Path>,
    csv: Option<&Path>,
    stop_at_onset: bool,
) -> AppResult<()> {
    let mut case = pf_app::load_case(case_path)?;
    case.stop_at_first_onset |= stop_at_onset;
    println!("Analyzing case: {}", case.name);

    let report = pf_app::run_analysis(&case)?;
    print_report(&report);

    if let Some(path) = output {
        pf_app::save_report(path, &report)?;
        println!("✓ Report written to {}", path.display());
    }
    if let Some(path) = csv {
        let content = sweep_csv(&report.sweep);
        std::fs::write(path, content).map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        println!("✓ Sweep written to {}", path.display());
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!(
        "  Theory: {} (Mach {:.3}, bounds {:.2}/{:.2})",
        report.regime.theory,
        report.regime.mach,
        report.regime.subsonic_limit,
        report.regime.piston_min_mach
    );
    println!(
        "  Sweep: {} points, {} gaps, {} refined{}",
        report.sweep.len(),
        report.sweep.gap_count(),
        report.refined_points,
        if report.terminated_early {
            ", stopped early"
        } else {
            ""
        }
    );
    if let Some(piston) = &report.piston {
        println!(
            "  Piston: beta = {:.4}, q = {:.1} Pa, lambda = {:.2}, lambda (classical) = {:.2}",
            piston.beta, piston.dynamic_pressure, piston.lambda, piston.lambda_classical
        );
    }
    print_verdict(&report.flutter);
    for approximation in &report.provenance.approximations {
        println!("  ! {:?}", approximation);
    }
}

fn print_verdict(report: &FlutterReport) {
    match report.result.onset() {
        Some(onset) => println!(
            "✗ Flutter at {:.2} m/s, {:.2} Hz (mode slot {}, points {}-{})",
            onset.critical_velocity.value,
            onset.critical_frequency.value,
            onset.mode,
            onset.bracket.0,
            onset.bracket.1
        ),
        None => println!(
            "✓ No flutter in range (threshold {})",
            report.threshold
        ),
    }
    for diagnostic in &report.diagnostics {
        let (label, mode, velocity, damping) = match diagnostic {
            Diagnostic::RejectedSpike {
                mode,
                velocity,
                damping,
            } => ("rejected spike", mode, velocity, damping),
            Diagnostic::UnconfirmedAtEnd {
                mode,
                velocity,
                damping,
            } => ("unconfirmed at range end", mode, velocity, damping),
            Diagnostic::UnstableAtStart {
                mode,
                velocity,
                damping,
            } => ("unstable at first point", mode, velocity, damping),
        };
        println!(
            "  - {} : mode {} at {:.2} m/s, g = {:+.5}",
            label, mode, velocity.value, damping
        );
    }
}

fn sweep_csv(sweep: &Sweep) -> String {
    let mut csv = String::from("velocity_mps,mode,damping,frequency_hz\n");
    for point in sweep.points() {
        match &point.modes {
            Some(modes) => {
                for (i, sample) in modes.iter().enumerate() {
                    csv.push_str(&format!(
                        "{},{},{},{}\n",
                        point.velocity.value, i, sample.damping, sample.frequency.value
                    ));
                }
            }
            None => csv.push_str(&format!("{},,,\n", point.velocity.value)),
        }
    }
    csv
}

fn cmd_detect(
    records_path: &Path,
    unit: VelocityUnit,
    threshold: f64,
    require_confirmation: bool,
) -> AppResult<()> {
    let json = std::fs::read_to_string(records_path).map_err(|e| AppError::FileRead {
        path: records_path.to_path_buf(),
        source: e,
    })?;
    let config = DetectorConfig {
        threshold,
        require_confirmation,
    };
    debug!(?config, %unit, "Detector settings");
    let report = pf_app::detect_external(&json, unit, &config)?;
    print_verdict(&report);
    let summary = serde_json::to_string_pretty(&report.result)?;
    println!("{}", summary);
    Ok(())
}
