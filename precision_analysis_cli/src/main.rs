use clap::{Parser, Subcommand};
use log::{debug, info};
use precision_analysis::{
    calibration::Method,
    geometry::{to_transforms, Transform},
    io::{parse_records, read_poses, read_to_string, write_records, PoseError, PoseRecord},
    metrics::summarize_errors,
    noise::{GaussianNoise, NoiseModel, PerlinDrift},
    reporting::{format_transform, CalibrationReport, MethodResult},
};
use std::fs::File;

const DEFAULT_A: &str = "data/calibF/MeasuredPositionsLeica.txt";
const DEFAULT_B: &str = "data/calibF/MeasuredPositionsTS_ModelLines.txt";

fn init_logging() {
    if let Ok(path) = std::env::var("PRECISION_ANALYSIS_LOG") {
        match File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", path, e);
                env_logger::Builder::from_default_env().init();
            }
        }
    } else {
        env_logger::Builder::from_default_env().init();
    }
}

/// Precision analysis of pose measurements and AX = YB calibration.
#[derive(Parser)]
#[command(name = "precision_analysis_cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare AX = YB calibration methods on two matching pose files.
    Calibrate {
        /// tsai-lenz | park-martin | daniilidis | li-wang-wu | shah | all
        #[arg(long, short, default_value = "all")]
        method: String,
        /// Poses of the first measuring system (A)
        #[arg(long, short = 'a', default_value = DEFAULT_A)]
        file_a: String,
        /// Poses of the second measuring system (B)
        #[arg(long, short = 'b', default_value = DEFAULT_B)]
        file_b: String,
        /// Print the X and Y matrices of a single method
        #[arg(long)]
        print_xy: bool,
        /// Print a JSON report instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Parse a pose file and print its points.
    Parse { path: String },
    /// Write a copy of a pose file with synthetic noise added.
    Noise {
        #[command(subcommand)]
        model: NoiseCommand,
    },
}

#[derive(Subcommand)]
enum NoiseCommand {
    /// Correlated Gaussian noise.
    Gaussian {
        input: String,
        output: String,
        /// Position standard deviation
        #[arg(long, default_value_t = 0.5)]
        pos_std: f64,
        /// Angle standard deviation (degrees)
        #[arg(long, default_value_t = 0.05)]
        rot_std: f64,
        /// Correlation between axes, in [0, 1)
        #[arg(long, default_value_t = 0.1)]
        correlation: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Smooth Perlin drift.
    Perlin {
        input: String,
        output: String,
        #[arg(long, default_value_t = 5.0)]
        pos_scale: f64,
        #[arg(long, default_value_t = 0.05)]
        rot_scale: f64,
        #[arg(long, default_value_t = 4)]
        octaves: u32,
        #[arg(long, default_value_t = 0.5)]
        persistence: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

/// Methods selected on the command line, or `None` for an unknown name.
fn select_methods(name: &str) -> Option<Vec<Method>> {
    match name.to_ascii_lowercase().as_str() {
        "all" | "--all" => Some(Method::ALL.to_vec()),
        other => other.parse::<Method>().ok().map(|m| vec![m]),
    }
}

fn load_inputs(file_a: &str, file_b: &str) -> Result<(Vec<Transform>, Vec<Transform>), PoseError> {
    let points = |records: Vec<PoseRecord>| -> Vec<_> { records.into_iter().map(|r| r.point).collect() };
    let a = to_transforms(&points(read_poses(file_a)?));
    let b = to_transforms(&points(read_poses(file_b)?));
    debug!("loaded {} poses from {} and {} from {}", a.len(), file_a, b.len(), file_b);
    Ok((a, b))
}

fn run_calibration(methods: &[Method], a: &[Transform], b: &[Transform]) -> CalibrationReport {
    let mut report = CalibrationReport::new(a.len());
    for &method in methods {
        let result = match method.solve(a, b) {
            Ok(solution) => {
                MethodResult::success(method, &solution, summarize_errors(a, b, &solution))
            }
            Err(e) => {
                info!("{} failed: {}", method, e);
                MethodResult::failure(method, e)
            }
        };
        report.push(result);
    }
    report
}

fn print_report(report: &CalibrationReport, print_xy: bool) {
    let (translation, rotation) = report.tables();
    println!("\nTranslation errors (mm):");
    print!("{translation}");
    println!("\nRotation errors (deg):");
    print!("{rotation}");

    if let [res] = report.results.as_slice() {
        if let Some(reason) = &res.failure {
            eprintln!("{}: {}", res.method, reason);
        } else if let (true, Some(solution)) = (print_xy, &res.solution) {
            println!();
            print!("{}", format_transform("X", &solution.x));
            print!("{}", format_transform("Y", &solution.y));
            println!();
        }
    }
}

fn apply_noise(input: &str, output: &str, model: &dyn NoiseModel) {
    match read_to_string(input) {
        Ok(contents) => {
            let noisy = model.apply(&parse_records(&contents));
            match write_records(output, &noisy) {
                Ok(()) => println!("Wrote {} records to {}", noisy.len(), output),
                Err(e) => eprintln!("Error writing {}: {}", output, e),
            }
        }
        Err(e) => eprintln!("Error reading {}: {}", input, e),
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Calibrate {
            method,
            file_a,
            file_b,
            print_xy,
            json,
        } => {
            let Some(methods) = select_methods(&method) else {
                eprintln!(
                    "Unknown method '{}'. Available: tsai-lenz | park-martin | daniilidis | li-wang-wu | shah | all",
                    method
                );
                std::process::exit(1);
            };
            match load_inputs(&file_a, &file_b) {
                Ok((a, b)) => {
                    let report = run_calibration(&methods, &a, &b);
                    if json {
                        match report.to_json() {
                            Ok(text) => println!("{text}"),
                            Err(e) => eprintln!("Error serializing report: {}", e),
                        }
                    } else {
                        print_report(&report, print_xy);
                    }
                }
                Err(e) => eprintln!("Error reading inputs: {}", e),
            }
        }
        Commands::Parse { path } => match read_to_string(&path) {
            Ok(contents) => {
                let records = parse_records(&contents);
                for rec in &records {
                    let p = rec.point.position;
                    let a = rec.point.orientation.to_degrees();
                    println!(
                        "{}: {:.3},{:.3},{:.3} | {:.3},{:.3},{:.3}",
                        rec.id, p.x, p.y, p.z, a[0], a[1], a[2]
                    );
                }
                println!("Parsed {} points", records.len());
            }
            Err(e) => eprintln!("Error reading {}: {}", path, e),
        },
        Commands::Noise { model } => match model {
            NoiseCommand::Gaussian {
                input,
                output,
                pos_std,
                rot_std,
                correlation,
                seed,
            } => match GaussianNoise::new(pos_std, rot_std, correlation, seed) {
                Ok(noise) => apply_noise(&input, &output, &noise),
                Err(e) => eprintln!("Invalid noise settings: {}", e),
            },
            NoiseCommand::Perlin {
                input,
                output,
                pos_scale,
                rot_scale,
                octaves,
                persistence,
                seed,
            } => {
                let drift = PerlinDrift {
                    pos_scale,
                    rot_scale,
                    octaves,
                    persistence,
                    seed,
                };
                apply_noise(&input, &output, &drift);
            }
        },
    }
}
