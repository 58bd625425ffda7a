use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use gradecalc::config::Config;
use gradecalc::grading::{
    validate_worksheet, FinalExamQuery, GradeEntry, GradeScheme, GradingConfig, WeightFormat,
};
use gradecalc::saved::{CalculationData, StoreError, MAX_SAVED_PER_ACCOUNT};
use gradecalc::worksheet::Worksheet;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Weighted average of graded work
    Calc {
        /// Graded row as LABEL:GRADE:WEIGHT or GRADE:WEIGHT (repeatable)
        #[arg(short, long = "entry", value_name = "LABEL:GRADE:WEIGHT")]
        entries: Vec<GradeEntry>,

        /// YAML worksheet with entries (and optionally goal / remaining_weight)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        grading: GradingArgs,

        /// Overall grade you want to finish with
        #[arg(long)]
        goal: Option<String>,

        /// Weight of the work still to be graded
        #[arg(long)]
        remaining: Option<String>,

        #[command(flatten)]
        save: SaveArgs,
    },
    /// Score needed on the final exam to reach a desired grade
    Final {
        /// Current grade in the course
        #[arg(long, allow_hyphen_values = true)]
        current: String,

        /// Grade you want to finish with
        #[arg(long, allow_hyphen_values = true)]
        desired: String,

        /// Final exam weight as a percentage of the course grade
        #[arg(long, allow_hyphen_values = true)]
        weight: String,

        #[command(flatten)]
        save: SaveArgs,
    },
    /// Check a worksheet file and report every problem
    Validate {
        /// YAML worksheet to check
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        grading: GradingArgs,
    },
    /// Manage saved calculations
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Subcommand, Debug)]
enum SavedCommand {
    /// List saved calculations for the account
    List,
    /// Show a saved calculation by its index number
    Show {
        /// Index number (1-based, as shown in list)
        index: usize,
    },
    /// Delete a saved calculation by its index number
    Delete {
        /// Index number (1-based, as shown in list)
        index: usize,
    },
}

#[derive(Args, Debug)]
struct GradingArgs {
    /// Grade scheme: letters or mixed (overrides config)
    #[arg(long)]
    scheme: Option<GradeScheme>,

    /// Weight format: percentage or points (overrides config)
    #[arg(long = "weights")]
    weight_format: Option<WeightFormat>,
}

impl GradingArgs {
    fn resolve(&self, base: GradingConfig) -> GradingConfig {
        GradingConfig::new(
            self.scheme.unwrap_or(base.scheme),
            self.weight_format.unwrap_or(base.weight_format),
        )
    }
}

#[derive(Args, Debug)]
struct SaveArgs {
    /// Save the result to the account, optionally under a name
    #[arg(long, value_name = "NAME", num_args = 0..=1, default_missing_value = "")]
    save: Option<String>,

    /// Description stored with a saved result
    #[arg(long, requires = "save")]
    description: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "gradecalc")]
#[command(about = "Weighted grade average and final exam calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gradecalc/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Account that saved calculations belong to (overrides config)
    #[arg(short, long, global = true)]
    account: Option<String>,

    /// Saved calculations file (defaults to ~/.config/gradecalc/saved.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// An error together with the process exit code it maps to.
struct Failure {
    code: i32,
    error: anyhow::Error,
}

trait OrExit<T> {
    fn or_exit(self, code: i32) -> Result<T, Failure>;
}

impl<T, E: Into<anyhow::Error>> OrExit<T> for Result<T, E> {
    fn or_exit(self, code: i32) -> Result<T, Failure> {
        self.map_err(|e| Failure {
            code,
            error: e.into(),
        })
    }
}

/// Settings shared by every command after config and flags are merged.
struct Session {
    grading: GradingConfig,
    account: Option<String>,
    store_path: PathBuf,
    use_colors: bool,
}

impl Session {
    fn account(&self) -> Result<&str, Failure> {
        self.account
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(StoreError::MissingAccount)
            .or_exit(EXIT_STORAGE)
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "gradecalc=debug"
    } else {
        "gradecalc=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Init = cli.command {
        if let Err(e) = gradecalc::config::init::run_init_wizard(cli.config.clone()) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match gradecalc::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = gradecalc::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let session = match build_session(&cli, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    tracing::debug!(
        scheme = %session.grading.scheme,
        weight_format = %session.grading.weight_format,
        store = %session.store_path.display(),
        "session ready"
    );

    let result = match cli.command {
        Commands::Calc {
            entries,
            file,
            grading,
            goal,
            remaining,
            save,
        } => run_calc(&session, entries, file, &grading, goal, remaining, &save),
        Commands::Final {
            current,
            desired,
            weight,
            save,
        } => run_final(&session, &current, &desired, &weight, &save),
        Commands::Validate { file, grading } => run_validate(&session, &file, &grading),
        Commands::Saved { action } => run_saved(&session, action),
        Commands::Init => Ok(()),
    };

    if let Err(failure) = result {
        eprintln!("Error: {:#}", failure.error);
        std::process::exit(failure.code);
    }

    std::process::exit(EXIT_SUCCESS);
}

fn build_session(cli: &Cli, config: Config) -> anyhow::Result<Session> {
    let store_path = match cli.store.clone().or(config.store_path) {
        Some(path) => path,
        None => gradecalc::saved::get_store_path()?,
    };
    Ok(Session {
        grading: config.grading,
        account: cli.account.clone().or(config.account),
        store_path,
        use_colors: gradecalc::output::should_use_colors(),
    })
}

fn run_calc(
    session: &Session,
    entries: Vec<GradeEntry>,
    file: Option<PathBuf>,
    grading: &GradingArgs,
    goal: Option<String>,
    remaining: Option<String>,
    save: &SaveArgs,
) -> Result<(), Failure> {
    let mut worksheet = match file {
        Some(path) => gradecalc::worksheet::load_worksheet(&path).or_exit(EXIT_INPUT)?,
        None => Worksheet::default(),
    };
    worksheet.entries.extend(entries);
    let worksheet = worksheet.with_goal(goal, remaining);

    let grading = grading.resolve(session.grading);
    let report = worksheet.evaluate(&grading).or_exit(EXIT_INPUT)?;

    if let Some(ref projection) = report.projection {
        if projection.unattainable {
            tracing::warn!(required = projection.required, "goal is out of reach");
        }
    }

    println!(
        "{}",
        gradecalc::output::format_grade_report(&report, session.use_colors)
    );

    save_calculation(session, save, CalculationData::Grade(report))
}

fn run_final(
    session: &Session,
    current: &str,
    desired: &str,
    weight: &str,
    save: &SaveArgs,
) -> Result<(), Failure> {
    let query = FinalExamQuery::parse(current, desired, weight).or_exit(EXIT_INPUT)?;
    let result = query.solve().or_exit(EXIT_INPUT)?;

    println!(
        "{}",
        gradecalc::output::format_final_result(&result, session.use_colors)
    );

    save_calculation(session, save, CalculationData::Final(result))
}

fn run_validate(session: &Session, file: &Path, grading: &GradingArgs) -> Result<(), Failure> {
    let worksheet = gradecalc::worksheet::load_worksheet(file).or_exit(EXIT_INPUT)?;
    let grading = grading.resolve(session.grading);

    match validate_worksheet(&worksheet, &grading) {
        Ok(()) => {
            println!(
                "{}: {} rows, valid ({} scheme, {} weights)",
                file.display(),
                worksheet.entries.len(),
                grading.scheme,
                grading.weight_format
            );
            Ok(())
        }
        Err(errors) => {
            eprintln!("{}:", file.display());
            for error in &errors {
                eprintln!("  - {}", error);
            }
            Err(Failure {
                code: EXIT_INPUT,
                error: anyhow::anyhow!("worksheet has {} problem(s)", errors.len()),
            })
        }
    }
}

fn save_calculation(
    session: &Session,
    save: &SaveArgs,
    data: CalculationData,
) -> Result<(), Failure> {
    let Some(ref name) = save.save else {
        return Ok(());
    };
    let account = session.account()?;

    let mut store = gradecalc::saved::load_store(&session.store_path).or_exit(EXIT_STORAGE)?;
    let saved_name = store
        .save(
            account,
            name,
            save.description.as_deref().unwrap_or_default(),
            data,
        )
        .or_exit(EXIT_STORAGE)?
        .name
        .clone();
    gradecalc::saved::save_store(&session.store_path, &store).or_exit(EXIT_STORAGE)?;

    println!();
    println!(
        "Saved \"{}\" to account {} ({} of {}).",
        saved_name,
        account,
        store.list(account).len(),
        MAX_SAVED_PER_ACCOUNT
    );
    Ok(())
}

fn run_saved(session: &Session, action: SavedCommand) -> Result<(), Failure> {
    let account = session.account()?;
    let mut store = gradecalc::saved::load_store(&session.store_path).or_exit(EXIT_STORAGE)?;

    match action {
        SavedCommand::List => {
            println!(
                "{}",
                gradecalc::output::format_saved_list(store.list(account), session.use_colors)
            );
        }
        SavedCommand::Show { index } => {
            let calc = store.get(account, index).or_exit(EXIT_STORAGE)?;
            println!(
                "{}",
                gradecalc::output::format_saved_detail(calc, session.use_colors)
            );
        }
        SavedCommand::Delete { index } => {
            let removed = store.delete(account, index).or_exit(EXIT_STORAGE)?;
            gradecalc::saved::save_store(&session.store_path, &store).or_exit(EXIT_STORAGE)?;
            println!("Deleted \"{}\".", removed.name);
        }
    }
    Ok(())
}
