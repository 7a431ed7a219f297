use std::fmt;
use std::path::{Path, PathBuf};

use prep_core::Clock;
use prep_core::listing::{
    DifficultyFilter, ParseFilterError, ProblemFilter, SortKey, SortOrder, StatusFilter,
    clamp_page, filter_problems, paginate, sort_problems,
};
use prep_core::model::{ProblemStatus, ProgressDraft, Timeframe};
use services::AppServices;
use services::sync::detect_changes;
use services::validate::validate_data_dir;
use storage::local::LocalProgressStore;
use storage::repository::{InMemoryRepository, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingPositional { name: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidTimeframe { raw: String },
    InvalidStatus { raw: String },
    InvalidFilter(ParseFilterError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingPositional { name } => write!(f, "missing argument: <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
            ArgsError::InvalidTimeframe { raw } => write!(f, "invalid --timeframe value: {raw}"),
            ArgsError::InvalidStatus { raw } => write!(f, "invalid status: {raw}"),
            ArgsError::InvalidFilter(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ParseFilterError> for ArgsError {
    fn from(err: ParseFilterError) -> Self {
        ArgsError::InvalidFilter(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- companies [--search <query>]");
    eprintln!("  cargo run -p app -- problems <company> [--timeframe <label>]");
    eprintln!("      [--search <query>] [--difficulty all|easy|medium|hard]");
    eprintln!("      [--status all|not_started|in_progress|completed]");
    eprintln!("      [--sort title|frequency|acceptance] [--order asc|desc]");
    eprintln!("      [--page <n>] [--page-size <n>]");
    eprintln!("  cargo run -p app -- status <company> <title> <status>");
    eprintln!("  cargo run -p app -- stats <company>");
    eprintln!("  cargo run -p app -- validate");
    eprintln!("  cargo run -p app -- snapshot");
    eprintln!("  cargo run -p app -- diff <source-dir>");
    eprintln!();
    eprintln!("Common flags: [--db <sqlite_url>] [--data-dir <path>] [--user <id>]");
    eprintln!("              [--snapshot-file <path>] [--local-store <json_path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:prepdash.sqlite3");
    eprintln!("  --data-dir data");
    eprintln!("  --user local");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_DB_URL, PREP_DATA_DIR, PREP_USER");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Companies,
    Problems,
    Status,
    Stats,
    Validate,
    Snapshot,
    Diff,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "companies" => Some(Self::Companies),
            "problems" => Some(Self::Problems),
            "status" => Some(Self::Status),
            "stats" => Some(Self::Stats),
            "validate" => Some(Self::Validate),
            "snapshot" => Some(Self::Snapshot),
            "diff" => Some(Self::Diff),
            _ => None,
        }
    }
}

/// Flags shared by every subcommand, with env-var defaults.
struct Common {
    db_url: String,
    data_dir: PathBuf,
    user_id: String,
    snapshot_path: Option<PathBuf>,
    local_store: Option<PathBuf>,
}

impl Common {
    fn from_env() -> Self {
        let db_url = std::env::var("PREP_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://prepdash.sqlite3".into(), normalize_sqlite_url);
        let data_dir = std::env::var("PREP_DATA_DIR")
            .ok()
            .map_or_else(|| PathBuf::from("data"), PathBuf::from);
        let user_id = std::env::var("PREP_USER").unwrap_or_else(|_| "local".into());
        Self {
            db_url,
            data_dir,
            user_id,
            snapshot_path: None,
            local_store: None,
        }
    }

    /// Consumes one shared flag; returns false when the flag is not shared.
    fn try_flag(
        &mut self,
        arg: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match arg {
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                self.db_url = normalize_sqlite_url(value);
            }
            "--data-dir" => {
                self.data_dir = PathBuf::from(require_value(args, "--data-dir")?);
            }
            "--user" => {
                self.user_id = require_value(args, "--user")?;
            }
            "--snapshot-file" => {
                self.snapshot_path = Some(PathBuf::from(require_value(args, "--snapshot-file")?));
            }
            "--local-store" => {
                self.local_store = Some(PathBuf::from(require_value(args, "--local-store")?));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path.clone().unwrap_or_else(|| {
            self.data_dir
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .join("companies.json")
        })
    }
}

#[derive(Default)]
struct CompaniesArgs {
    search: Option<String>,
}

struct ProblemsArgs {
    company: String,
    timeframe: Option<Timeframe>,
    filter: ProblemFilter,
    sort_key: SortKey,
    sort_order: SortOrder,
    page: usize,
    page_size: usize,
}

struct StatusArgs {
    company: String,
    title: String,
    status: ProblemStatus,
}

struct StatsArgs {
    company: String,
}

struct DiffArgs {
    source_dir: PathBuf,
}

/// Per-command arguments after flag parsing.
enum Parsed {
    Companies(CompaniesArgs),
    Problems(ProblemsArgs),
    Status(StatusArgs),
    Stats(StatsArgs),
    Snapshot,
}

fn parse_companies(
    common: &mut Common,
    args: &mut impl Iterator<Item = String>,
) -> Result<CompaniesArgs, ArgsError> {
    let mut parsed = CompaniesArgs::default();
    while let Some(arg) = args.next() {
        if common.try_flag(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "--search" => parsed.search = Some(require_value(args, "--search")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(parsed)
}

fn parse_problems(
    common: &mut Common,
    args: &mut impl Iterator<Item = String>,
) -> Result<ProblemsArgs, ArgsError> {
    let mut company = None;
    let mut timeframe = None;
    let mut filter = ProblemFilter::default();
    let mut sort_key = SortKey::default();
    let mut sort_order = SortOrder::default();
    let mut page = 1;
    let mut page_size = 10;

    while let Some(arg) = args.next() {
        if common.try_flag(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "--timeframe" => {
                let raw = require_value(args, "--timeframe")?;
                timeframe = Some(
                    Timeframe::from_label(&raw)
                        .ok_or(ArgsError::InvalidTimeframe { raw })?,
                );
            }
            "--search" => filter.search = require_value(args, "--search")?,
            "--difficulty" => {
                filter.difficulty = DifficultyFilter::parse(&require_value(args, "--difficulty")?);
            }
            "--status" => {
                filter.status = StatusFilter::parse(&require_value(args, "--status")?)?;
            }
            "--sort" => sort_key = SortKey::parse(&require_value(args, "--sort")?)?,
            "--order" => sort_order = SortOrder::parse(&require_value(args, "--order")?)?,
            "--page" => page = parse_positive(args, "--page")?,
            "--page-size" => page_size = parse_positive(args, "--page-size")?,
            _ if !arg.starts_with("--") && company.is_none() => company = Some(arg),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(ProblemsArgs {
        company: company.ok_or(ArgsError::MissingPositional { name: "company" })?,
        timeframe,
        filter,
        sort_key,
        sort_order,
        page,
        page_size,
    })
}

fn parse_positive(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<usize, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ArgsError::InvalidNumber { flag, raw })
}

fn parse_status(
    common: &mut Common,
    args: &mut impl Iterator<Item = String>,
) -> Result<StatusArgs, ArgsError> {
    let mut positionals = Vec::new();
    while let Some(arg) = args.next() {
        if common.try_flag(&arg, args)? {
            continue;
        }
        if arg.starts_with("--") {
            return Err(ArgsError::UnknownArg(arg));
        }
        positionals.push(arg);
    }

    let mut positionals = positionals.into_iter();
    let company = positionals
        .next()
        .ok_or(ArgsError::MissingPositional { name: "company" })?;
    let title = positionals
        .next()
        .ok_or(ArgsError::MissingPositional { name: "title" })?;
    let raw_status = positionals
        .next()
        .ok_or(ArgsError::MissingPositional { name: "status" })?;
    let status = ProblemStatus::parse(&raw_status)
        .map_err(|_| ArgsError::InvalidStatus { raw: raw_status })?;

    Ok(StatusArgs {
        company,
        title,
        status,
    })
}

fn parse_single_positional(
    common: &mut Common,
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    let mut value = None;
    while let Some(arg) = args.next() {
        if common.try_flag(&arg, args)? {
            continue;
        }
        if arg.starts_with("--") || value.is_some() {
            return Err(ArgsError::UnknownArg(arg));
        }
        value = Some(arg);
    }
    value.ok_or(ArgsError::MissingPositional { name })
}

fn parse_flags_only(
    common: &mut Common,
    args: &mut impl Iterator<Item = String>,
) -> Result<(), ArgsError> {
    while let Some(arg) = args.next() {
        if common.try_flag(&arg, args)? {
            continue;
        }
        return Err(ArgsError::UnknownArg(arg));
    }
    Ok(())
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn status_marker(status: ProblemStatus) -> &'static str {
    match status {
        ProblemStatus::NotStarted => "[ ]",
        ProblemStatus::InProgress => "[~]",
        ProblemStatus::Completed => "[x]",
    }
}

async fn run_companies(app: &AppServices, parsed: CompaniesArgs) {
    let companies = match parsed.search {
        Some(query) => app.catalog().search(&query).await,
        None => app.catalog().companies().await,
    };

    if companies.is_empty() {
        println!("no companies found");
        return;
    }
    for name in companies {
        println!("{name}");
    }
}

async fn run_problems(
    app: &AppServices,
    common: &Common,
    parsed: ProblemsArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the timeframe: explicit flag wins, then the persisted
    // selection, then All; an explicit choice is persisted for next time.
    let timeframe = match parsed.timeframe {
        Some(timeframe) => {
            app.ui_state().set_selected_timeframe(timeframe).await?;
            timeframe
        }
        None => app
            .ui_state()
            .selected_timeframe()
            .await?
            .unwrap_or(Timeframe::All),
    };
    app.ui_state().set_selected_company(&parsed.company).await?;

    let load = app.problems().load_company(&parsed.company).await;
    let problems = load.problems.problems(timeframe);

    let index = app
        .progress()
        .status_index(&common.user_id, &parsed.company)
        .await?;
    let status_of = |title: &str| index.get(title).copied().unwrap_or_default();

    let mut survivors = filter_problems(problems, &parsed.filter, status_of);
    sort_problems(&mut survivors, parsed.sort_key, parsed.sort_order);

    let total = survivors.len();
    let page_count = total.div_ceil(parsed.page_size);
    let page_number = clamp_page(parsed.page, page_count);
    let page = paginate(&survivors, page_number, parsed.page_size);

    println!("{} / {} ({} problems)", parsed.company, timeframe, total);
    if page.items.is_empty() {
        println!("nothing matches the current filters");
        return Ok(());
    }

    for problem in page.items {
        println!(
            "{} {:<7} {:<50} freq {:>6.1}  acc {:>5.2}  {}",
            status_marker(status_of(&problem.title)),
            problem.difficulty.label(),
            problem.title,
            problem.frequency,
            problem.acceptance_rate,
            problem.topics,
        );
    }
    println!(
        "page {page_number} of {page_count} ({}..{})",
        page.start_index + 1,
        page.end_index
    );
    Ok(())
}

async fn run_status(
    app: &AppServices,
    common: &Common,
    parsed: StatusArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let load = app.problems().load_company(&parsed.company).await;
    let problem = Timeframe::ALL
        .into_iter()
        .flat_map(|timeframe| load.problems.problems(timeframe))
        .find(|problem| problem.title == parsed.title)
        .ok_or_else(|| {
            format!(
                "problem \"{}\" not found in {} data",
                parsed.title, parsed.company
            )
        })?;

    let record = app
        .progress()
        .set_status(
            &common.user_id,
            ProgressDraft {
                problem_id: problem.title.clone(),
                company: parsed.company.clone(),
                difficulty: problem.difficulty.label().to_string(),
                title: problem.title.clone(),
                status: parsed.status,
            },
        )
        .await?;

    println!(
        "{} {} ({})",
        status_marker(record.status),
        record.title,
        record.status
    );
    Ok(())
}

async fn run_stats(
    app: &AppServices,
    common: &Common,
    parsed: StatsArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let counts = app
        .progress()
        .company_stats(&common.user_id, &parsed.company)
        .await?;

    println!("{} progress:", parsed.company);
    println!("  completed    {}", counts.completed);
    println!("  in progress  {}", counts.in_progress);
    println!("  not started  {}", counts.not_started);
    println!("  completion   {:.1}%", counts.completion_rate());
    Ok(())
}

async fn run_validate(common: &Common) -> Result<bool, Box<dyn std::error::Error>> {
    let report = validate_data_dir(&common.data_dir).await?;

    println!(
        "validated {} companies, {} files, {} problems ({} valid)",
        report.stats.companies,
        report.stats.files,
        report.stats.problems,
        report.stats.valid_problems
    );
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    Ok(report.is_ok())
}

async fn run_snapshot(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = app.catalog().write_snapshot().await?;
    println!(
        "wrote snapshot of {} companies",
        snapshot.metadata.total_companies
    );
    Ok(())
}

async fn run_diff(
    common: &Common,
    parsed: DiffArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = detect_changes(&parsed.source_dir, &common.data_dir).await?;

    if report.is_empty() {
        println!("no changes detected");
        return Ok(());
    }
    for name in &report.added {
        println!("added: {name}");
    }
    for name in &report.removed {
        println!("removed: {name}");
    }
    for (name, files) in &report.modified {
        println!("modified: {name} ({})", files.join(", "));
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: list companies when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Companies,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Companies,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut common = Common::from_env();
    let mut iter = argv.into_iter();

    // Validate and diff never touch the progress store, so they skip the
    // SQLite bootstrap entirely.
    match cmd {
        Command::Validate => {
            parse_flags_only(&mut common, &mut iter).map_err(usage_error)?;
            let ok = run_validate(&common).await?;
            if !ok {
                std::process::exit(1);
            }
            return Ok(());
        }
        Command::Diff => {
            let source_dir = parse_single_positional(&mut common, &mut iter, "source-dir")
                .map_err(usage_error)?;
            return run_diff(
                &common,
                DiffArgs {
                    source_dir: PathBuf::from(source_dir),
                },
            )
            .await;
        }
        _ => {}
    }

    let parsed = match cmd {
        Command::Companies => {
            Parsed::Companies(parse_companies(&mut common, &mut iter).map_err(usage_error)?)
        }
        Command::Problems => {
            Parsed::Problems(parse_problems(&mut common, &mut iter).map_err(usage_error)?)
        }
        Command::Status => {
            Parsed::Status(parse_status(&mut common, &mut iter).map_err(usage_error)?)
        }
        Command::Stats => {
            let company = parse_single_positional(&mut common, &mut iter, "company")
                .map_err(usage_error)?;
            Parsed::Stats(StatsArgs { company })
        }
        Command::Snapshot => {
            parse_flags_only(&mut common, &mut iter).map_err(usage_error)?;
            Parsed::Snapshot
        }
        Command::Validate | Command::Diff => unreachable!("handled above"),
    };

    // Open + migrate SQLite at startup, or run against the local fallback
    // store when no backing service is wanted. Keep this in the binary glue
    // so core/services stay pure.
    let app = match &common.local_store {
        Some(path) => {
            let local = LocalProgressStore::open(path)?;
            let store = Storage {
                progress: std::sync::Arc::new(local),
                // Selection state is session-only in local mode.
                ui_state: std::sync::Arc::new(InMemoryRepository::new()),
            };
            AppServices::with_storage(
                store,
                common.data_dir.clone(),
                common.snapshot_path(),
                Clock::default_clock(),
            )
        }
        None => {
            prepare_sqlite_file(&common.db_url)?;
            AppServices::new_sqlite(
                &common.db_url,
                common.data_dir.clone(),
                common.snapshot_path(),
                Clock::default_clock(),
            )
            .await?
        }
    };

    match parsed {
        Parsed::Companies(args) => run_companies(&app, args).await,
        Parsed::Problems(args) => run_problems(&app, &common, args).await?,
        Parsed::Status(args) => run_status(&app, &common, args).await?,
        Parsed::Stats(args) => run_stats(&app, &common, args).await?,
        Parsed::Snapshot => run_snapshot(&app).await?,
    }

    Ok(())
}

fn usage_error(err: ArgsError) -> Box<dyn std::error::Error> {
    eprintln!("{err}");
    print_usage();
    Box::new(err)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
