use crate::config::AppConfig;
use crate::currency::{self, RatesClient};
use crate::dictionary::DictionaryClient;
use crate::motion::{self, MotionInput};
use crate::proposals::report::{self, group_thousands};
use crate::proposals::{
    model::local_now, Category, ListFilter, Priority, Proposal, ProposalFields, ProposalPatch,
    ProposalStore, ReportData, ReportFormat, ReportKind, Statistics, Status, StoreError,
};
use crate::reliability;
use crate::text_summary::{self, TextSummary};
use crate::weather::{self, WeatherClient, CITIES};
use crate::{http, puzzle, storage};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
///
/// Locks are taken per line so interactive prompts can share the terminal.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let mut out = stdout.lock();
                    let _ = writeln!(out, "{}", msg);
                    let _ = out.flush();
                }
                OutputLine::Stderr(msg) => {
                    let mut err = stderr.lock();
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }
    });
    (tx, handle)
}

/// Where command results go: pretty JSON or text lines on stdout, notes on stderr.
struct Output {
    tx: mpsc::UnboundedSender<OutputLine>,
    json: bool,
}

impl Output {
    fn line(&self, msg: impl Into<String>) {
        let _ = self.tx.send(OutputLine::Stdout(msg.into()));
    }

    fn note(&self, msg: impl Into<String>) {
        let _ = self.tx.send(OutputLine::Stderr(msg.into()));
    }

    fn emit<T: Serialize + ?Sized>(
        &self,
        value: &T,
        text: impl FnOnce() -> Vec<String>,
    ) -> Result<()> {
        if self.json {
            self.line(serde_json::to_string_pretty(value)?);
        } else {
            for l in text() {
                self.line(l);
            }
        }
        Ok(())
    }

    fn summary<T: Serialize + ?Sized>(&self, value: &T, summary: TextSummary) -> Result<()> {
        self.emit(value, || summary.lines)
    }
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "classwork",
    version,
    about = "Classroom toolkit: dictionary, weather, puzzle, calculators, currency, proposals"
)]
pub struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/classwork/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Proposal database file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Directory for generated reports
    #[arg(long, global = true)]
    pub reports_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Look up a word: English definitions or English translations of a Russian word
    Dict {
        word: String,
    },

    /// Current weather interpreted through the rule table
    Weather(WeatherArgs),

    /// Rebuild a hidden word from its shuffled letters
    Puzzle {
        /// Word to hide; prompted for without echo when omitted.
        /// A word given here is visible in the shell history.
        #[arg(long)]
        word: Option<String>,
    },

    /// Uniformly accelerated motion: final velocity, distance and S(t) plot
    Motion(MotionArgs),

    /// Durability under the exponential failure law
    Durability {
        /// Survival probability P(t), in (0, 1]
        #[arg(long, default_value_t = reliability::DEFAULT_SURVIVAL)]
        p: f64,
        /// Operating time t, hours
        #[arg(long, default_value_t = reliability::DEFAULT_HOURS)]
        t: f64,
    },

    /// Defect-free coefficient of a three-state system
    Defects {
        /// Probability of the defect-free state
        #[arg(long, default_value_t = reliability::DEFAULT_STATES[0])]
        p0: f64,
        /// Probability of working with a defect
        #[arg(long, default_value_t = reliability::DEFAULT_STATES[1])]
        p1: f64,
        /// Probability of failure
        #[arg(long, default_value_t = reliability::DEFAULT_STATES[2])]
        p2: f64,
    },

    /// Convert an amount between RUB, USD, EUR, CNY and KRW
    Convert(ConvertArgs),

    /// Show current exchange rates against USD
    Rates,

    /// Manage system enhancement proposals
    #[command(subcommand)]
    Proposals(ProposalsCommand),
}

#[derive(Debug, Args, Clone)]
pub struct WeatherArgs {
    /// City name in English or Russian
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// List the built-in cities and exit
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Args, Clone)]
pub struct MotionArgs {
    /// Initial velocity, m/s
    #[arg(long, allow_negative_numbers = true)]
    pub v0: f64,

    /// Acceleration, m/s²
    #[arg(long, allow_negative_numbers = true)]
    pub a: f64,

    /// Travel time, s
    #[arg(long, allow_negative_numbers = true)]
    pub t: f64,

    /// Show the S(t) chart in the terminal
    #[arg(long)]
    pub plot: bool,

    /// Write the sampled trajectory as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ConvertArgs {
    #[arg(allow_negative_numbers = true)]
    pub amount: f64,

    #[arg(long, default_value = "RUB")]
    pub from: String,

    #[arg(long, default_value = "USD")]
    pub to: String,

    /// Exchange the source and target currencies
    #[arg(long)]
    pub swap: bool,
}

impl ConvertArgs {
    /// Source and target codes after `--swap`.
    fn pair(self) -> (String, String) {
        if self.swap {
            (self.to, self.from)
        } else {
            (self.from, self.to)
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum ProposalsCommand {
    /// Add a proposal
    Add(AddArgs),

    /// List proposals by priority, newest first
    List {
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long, value_enum)]
        category: Option<Category>,
    },

    /// Show one proposal
    Show { id: i64 },

    /// Edit fields of a proposal
    Update(UpdateArgs),

    /// Delete a proposal
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Counts and costs by status, category and priority
    Stats,

    /// Write a report to the reports directory
    Report {
        #[arg(value_enum, default_value_t = ReportKind::Full)]
        kind: ReportKind,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Write a single proposal card to the reports directory
    Card {
        id: i64,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Args, Clone)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, value_enum, default_value_t = Category::Other)]
    pub category: Category,
    #[arg(long, value_enum, default_value_t = Status::New)]
    pub status: Status,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub department: String,
    /// 1 = high, 2 = medium, 3 = low
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub priority: u8,
    /// Expected benefit
    #[arg(long, default_value = "")]
    pub benefit: String,
    /// Estimated cost
    #[arg(long, default_value_t = 0.0)]
    pub cost: f64,
    /// Implementation time, free text
    #[arg(long = "time", default_value = "")]
    pub implementation_time: String,
    #[arg(long, default_value = "")]
    pub risks: String,
}

impl AddArgs {
    fn into_fields(self) -> Result<ProposalFields> {
        Ok(ProposalFields {
            title: self.title,
            description: self.description,
            category: self.category,
            status: self.status,
            author: self.author,
            department: self.department,
            priority: Priority::try_from(self.priority)?,
            expected_benefit: self.benefit,
            estimated_cost: self.cost,
            implementation_time: self.implementation_time,
            risks: self.risks,
        })
    }
}

#[derive(Debug, Args, Clone)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_enum)]
    pub category: Option<Category>,
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub priority: Option<u8>,
    #[arg(long)]
    pub benefit: Option<String>,
    #[arg(long)]
    pub cost: Option<f64>,
    #[arg(long = "time")]
    pub implementation_time: Option<String>,
    #[arg(long)]
    pub risks: Option<String>,
}

impl UpdateArgs {
    fn into_patch(self) -> Result<ProposalPatch> {
        Ok(ProposalPatch {
            title: self.title,
            description: self.description,
            category: self.category,
            status: self.status,
            author: self.author,
            department: self.department,
            priority: self.priority.map(Priority::try_from).transpose()?,
            expected_benefit: self.benefit,
            estimated_cost: self.cost,
            implementation_time: self.implementation_time,
            risks: self.risks,
        })
    }
}

/// Defaults, then config file, then environment, then flags.
pub fn build_config(args: &Cli) -> Result<AppConfig> {
    let mut cfg = AppConfig::load(args.config.as_deref())?;
    if let Some(db) = args.db.clone() {
        cfg.database = db;
    }
    if let Some(dir) = args.reports_dir.clone() {
        cfg.reports_dir = dir;
    }
    Ok(cfg)
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    tracing::debug!(command = ?args.command, "dispatching");

    let (tx, writer) = spawn_output_writer();
    let out = Output {
        tx,
        json: args.json,
    };

    let res = dispatch(args.command, &cfg, &out).await;

    // Closing the channel lets the writer drain and exit.
    drop(out);
    let _ = writer.await;
    res
}

async fn dispatch(command: Command, cfg: &AppConfig, out: &Output) -> Result<()> {
    match command {
        Command::Dict { word } => run_dict(&word, cfg, out).await,
        Command::Weather(args) => run_weather(args, cfg, out).await,
        Command::Puzzle { word } => run_puzzle(word, out).await,
        Command::Motion(args) => run_motion(args, out).await,
        Command::Durability { p, t } => {
            let d = reliability::durability(p, t)?;
            out.summary(&d, text_summary::durability_summary(&d))
        }
        Command::Defects { p0, p1, p2 } => {
            let d = reliability::defect_free(p0, p1, p2)?;
            out.summary(&d, text_summary::defect_free_summary(&d))
        }
        Command::Convert(args) => run_convert(args, cfg, out).await,
        Command::Rates => {
            let table = RatesClient::new(http::build_client(cfg)?, &cfg.rates_url)
                .load()
                .await;
            out.summary(&table, text_summary::rates_summary(&table))
        }
        Command::Proposals(cmd) => run_proposals(cmd, cfg, out).await,
    }
}

async fn run_dict(word: &str, cfg: &AppConfig, out: &Output) -> Result<()> {
    let client = DictionaryClient::new(
        http::build_client(cfg)?,
        &cfg.dictionary_url,
        &cfg.yandex_url,
        cfg.yandex_key.clone(),
    );
    let lookup = client.lookup(word).await?;
    out.emit(&lookup, || lookup.render())
}

async fn run_weather(args: WeatherArgs, cfg: &AppConfig, out: &Output) -> Result<()> {
    if args.list {
        return out.emit(&CITIES, || {
            CITIES
                .iter()
                .map(|c| {
                    format!(
                        "{:<18} {:<16} {:>8.4} {:>8.4}",
                        c.name, c.local_name, c.lat, c.lon
                    )
                })
                .collect()
        });
    }

    let (place, lat, lon) = match (args.city, args.lat, args.lon) {
        (Some(name), _, _) => {
            let city = weather::find_city(&name)?;
            (city.name.to_string(), city.lat, city.lon)
        }
        (None, Some(lat), Some(lon)) => (format!("{lat:.4}, {lon:.4}"), lat, lon),
        _ => {
            let city = CITIES[0];
            (city.name.to_string(), city.lat, city.lon)
        }
    };

    let client = WeatherClient::new(http::build_client(cfg)?, &cfg.weather_url);
    let current = client
        .current(lat, lon)
        .await
        .with_context(|| format!("fetch weather for {place}"))?;
    let report = weather::interpret(&place, &current);
    out.summary(&report, text_summary::weather_summary(&report))
}

async fn run_puzzle(word: Option<String>, out: &Output) -> Result<()> {
    let entry = puzzle::WordEntry::for_stdin();
    let solved = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut stdout = std::io::stdout();
        puzzle::play(&mut input, &mut stdout, &mut rand::thread_rng(), word, entry)
    })
    .await??;
    out.note(format!("Rounds solved: {solved}"));
    Ok(())
}

#[derive(Debug, Serialize)]
struct TrajectoryRow {
    t: f64,
    s: f64,
    v: f64,
}

#[derive(Serialize)]
struct MotionOutput<'a> {
    analysis: &'a motion::MotionAnalysis,
    trajectory: &'a motion::Trajectory,
}

/// One `t,s,v` CSV row per trajectory sample.
fn export_trajectory(
    path: &Path,
    input: &MotionInput,
    trajectory: &motion::Trajectory,
) -> Result<()> {
    let rows: Vec<TrajectoryRow> = trajectory
        .points
        .iter()
        .map(|&(t, s)| TrajectoryRow {
            t,
            s,
            v: input.velocity_at(t),
        })
        .collect();
    storage::export_csv(path, &rows)
}

async fn run_motion(args: MotionArgs, out: &Output) -> Result<()> {
    let input = MotionInput::new(args.v0, args.a, args.t)?;
    let analysis = motion::analyze(input);
    let trajectory = motion::trajectory(&input);

    if args.plot {
        #[cfg(feature = "tui")]
        crate::tui::show_motion(analysis.clone(), trajectory.clone()).await?;
        #[cfg(not(feature = "tui"))]
        anyhow::bail!("--plot needs a build with the `tui` feature");
    }

    if let Some(path) = args.export_csv.as_deref() {
        export_trajectory(path, &input, &trajectory)?;
        out.note(format!("Trajectory saved: {}", path.display()));
    }

    out.summary(
        &MotionOutput {
            analysis: &analysis,
            trajectory: &trajectory,
        },
        text_summary::motion_summary(&analysis),
    )
}

async fn run_convert(args: ConvertArgs, cfg: &AppConfig, out: &Output) -> Result<()> {
    let amount = args.amount;
    let (from, to) = args.pair();
    // Validate before any network round trip.
    currency::normalize_code(&from)?;
    currency::normalize_code(&to)?;

    let table = RatesClient::new(http::build_client(cfg)?, &cfg.rates_url)
        .load()
        .await;
    let conversion = currency::convert(&table, &from, &to, amount)?;
    out.summary(
        &serde_json::json!({ "conversion": conversion, "rates": table.source }),
        text_summary::conversion_summary(&conversion, &table),
    )
}

async fn run_proposals(cmd: ProposalsCommand, cfg: &AppConfig, out: &Output) -> Result<()> {
    let store = ProposalStore::open(&cfg.database)
        .await
        .with_context(|| format!("open proposal store {}", cfg.database.display()))?;
    let res = proposals_command(cmd, &store, cfg, out).await;
    store.close().await;
    res
}

async fn proposals_command(
    cmd: ProposalsCommand,
    store: &ProposalStore,
    cfg: &AppConfig,
    out: &Output,
) -> Result<()> {
    match cmd {
        ProposalsCommand::Add(args) => {
            let p = store.add(args.into_fields()?).await?;
            out.emit(&p, || vec![format!("Added proposal #{}: {}", p.id, p.fields.title)])
        }
        ProposalsCommand::List { status, category } => {
            let list = store.list(ListFilter { status, category }).await?;
            out.emit(&list, || proposal_table(&list))
        }
        ProposalsCommand::Show { id } => {
            let p = fetch(store, id).await?;
            out.emit(&p, || report::render_card(&p, local_now()))
        }
        ProposalsCommand::Update(args) => {
            let id = args.id;
            let patch = args.into_patch()?;
            if patch.is_empty() {
                anyhow::bail!("nothing to update; pass at least one field flag");
            }
            let p = store.update(id, patch).await?;
            out.emit(&p, || vec![format!("Updated proposal #{}: {}", p.id, p.fields.title)])
        }
        ProposalsCommand::Delete { id, yes } => {
            let p = fetch(store, id).await?;
            if !yes {
                let question = format!("Delete proposal #{} \"{}\"? [y/N] ", p.id, p.fields.title);
                let confirmed = tokio::task::spawn_blocking(move || {
                    confirm(&mut std::io::stdin().lock(), &mut std::io::stderr(), &question)
                })
                .await??;
                if !confirmed {
                    out.note("Cancelled.");
                    return Ok(());
                }
            }
            store.delete(id).await?;
            out.emit(&serde_json::json!({ "deleted": id }), || {
                vec![format!("Deleted proposal #{id}")]
            })
        }
        ProposalsCommand::Stats => {
            let stats = store.statistics().await?;
            out.emit(&stats, || statistics_lines(&stats))
        }
        ProposalsCommand::Report { kind, format } => {
            let data = ReportData::load(store).await?;
            let path = report::write_report(kind, format, &data, &cfg.reports_dir)?;
            out.emit(&serde_json::json!({ "path": path }), || {
                vec![format!("Report saved: {}", path.display())]
            })
        }
        ProposalsCommand::Card { id, format } => {
            let p = fetch(store, id).await?;
            let path = report::write_card(&p, format, &cfg.reports_dir, local_now())?;
            out.emit(&serde_json::json!({ "path": path }), || {
                vec![format!("Card saved: {}", path.display())]
            })
        }
    }
}

async fn fetch(store: &ProposalStore, id: i64) -> Result<Proposal> {
    Ok(store.get(id).await?.ok_or(StoreError::NotFound(id))?)
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<bool> {
    write!(out, "{question}")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn proposal_table(list: &[Proposal]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>4}  {:<8} {:<12} {:<24} {:<32} {:>12}",
        "ID", "Priority", "Status", "Category", "Title", "Cost"
    )];
    for p in list {
        let f = &p.fields;
        let title: String = f.title.chars().take(32).collect();
        lines.push(format!(
            "{:>4}  {:<8} {:<12} {:<24} {:<32} {:>12}",
            p.id,
            f.priority.label(),
            f.status.label(),
            f.category.label(),
            title,
            group_thousands(f.estimated_cost)
        ));
    }
    lines.push(format!("{} proposal(s)", list.len()));
    lines
}

fn statistics_lines(stats: &Statistics) -> Vec<String> {
    let mut lines = vec![
        format!("Total proposals: {}", stats.total),
        format!(
            "Total cost (excluding rejected): {}",
            group_thousands(stats.total_cost)
        ),
        String::new(),
        "By status:".to_string(),
    ];
    for b in &stats.by_status {
        lines.push(format!(
            "  {:<14} {:>3} ({:>5.1}%) {:>12}",
            b.key.label(),
            b.count,
            b.share(stats.total),
            group_thousands(b.cost)
        ));
    }
    lines.push("By category:".to_string());
    for b in &stats.by_category {
        lines.push(format!("  {:<24} {:>3}", b.key.label(), b.count));
    }
    lines.push("By priority:".to_string());
    for b in &stats.by_priority {
        lines.push(format!("  {:<8} {:>3}", b.key.label(), b.count));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["classwork", "rates", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Rates));
    }

    #[test]
    fn motion_accepts_negative_acceleration() {
        let cli =
            Cli::try_parse_from(["classwork", "motion", "--v0", "10", "--a", "-2", "--t", "8"])
                .unwrap();
        match cli.command {
            Command::Motion(m) => {
                assert_eq!((m.v0, m.a, m.t), (10.0, -2.0, 8.0));
                assert!(!m.plot);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reliability_defaults() {
        let cli = Cli::try_parse_from(["classwork", "defects"]).unwrap();
        match cli.command {
            Command::Defects { p0, p1, p2 } => assert_eq!((p0, p1, p2), (0.85, 0.10, 0.05)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn swap_exchanges_currencies() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["classwork", "convert", "100", "--from", "eur", "--to", "krw"];
            argv.extend_from_slice(extra);
            match Cli::try_parse_from(argv).unwrap().command {
                Command::Convert(c) => c.pair(),
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(parse(&[]), ("eur".to_string(), "krw".to_string()));
        assert_eq!(parse(&["--swap"]), ("krw".to_string(), "eur".to_string()));
    }

    #[test]
    fn convert_defaults_to_rub_into_usd() {
        let cli = Cli::try_parse_from(["classwork", "convert", "500"]).unwrap();
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.amount, 500.0);
        assert_eq!(args.pair(), ("RUB".to_string(), "USD".to_string()));
    }

    #[test]
    fn trajectory_csv_has_a_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots/motion.csv");
        let input = MotionInput::new(10.0, -2.0, 8.0).unwrap();
        export_trajectory(&path, &input, &motion::trajectory(&input)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), motion::TRAJECTORY_SAMPLES + 1);
        assert_eq!(lines[0], "t,s,v");
        assert_eq!(lines[1], "0.0,0.0,10.0");
        assert_eq!(lines[motion::TRAJECTORY_SAMPLES], "8.0,16.0,-6.0");
    }

    #[test]
    fn weather_city_conflicts_with_coordinates() {
        assert!(Cli::try_parse_from([
            "classwork", "weather", "--city", "Moscow", "--lat", "1", "--lon", "2",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["classwork", "weather", "--lat", "1"]).is_err());
    }

    #[test]
    fn add_args_build_fields() {
        let cli = Cli::try_parse_from([
            "classwork", "proposals", "add", "--title", "SSO", "--description", "Single sign-on",
            "--author", "Lee", "--department", "IT", "--category", "security", "--priority", "1",
            "--cost", "5000",
        ])
        .unwrap();
        let Command::Proposals(ProposalsCommand::Add(args)) = cli.command else {
            panic!("expected add");
        };
        let fields = args.into_fields().unwrap();
        assert_eq!(fields.category, Category::Security);
        assert_eq!(fields.priority, Priority::High);
        assert_eq!(fields.status, Status::New);
        assert_eq!(fields.estimated_cost, 5000.0);
    }

    #[test]
    fn priority_out_of_range_is_rejected_by_parser() {
        assert!(Cli::try_parse_from([
            "classwork", "proposals", "update", "3", "--priority", "4",
        ])
        .is_err());
    }

    #[test]
    fn update_args_build_sparse_patch() {
        let cli = Cli::try_parse_from([
            "classwork", "proposals", "update", "3", "--status", "in-progress",
        ])
        .unwrap();
        let Command::Proposals(ProposalsCommand::Update(args)) = cli.command else {
            panic!("expected update");
        };
        let patch = args.into_patch().unwrap();
        assert_eq!(patch.status, Some(Status::InProgress));
        assert!(patch.title.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("c.toml");
        std::fs::write(&cfg_path, "reports_dir = \"from-file\"\n").unwrap();
        let cli = Cli::try_parse_from([
            "classwork",
            "--config",
            cfg_path.to_str().unwrap(),
            "--db",
            "/tmp/flag.db",
            "rates",
        ])
        .unwrap();
        let cfg = build_config(&cli).unwrap();
        assert_eq!(cfg.database, PathBuf::from("/tmp/flag.db"));
        if std::env::var(crate::config::ENV_REPORTS_DIR).is_err() {
            assert_eq!(cfg.reports_dir, PathBuf::from("from-file"));
        }
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut sink = Vec::new();
        assert!(confirm(&mut Cursor::new("y\n"), &mut sink, "? ").unwrap());
        assert!(confirm(&mut Cursor::new("YES\n"), &mut sink, "? ").unwrap());
        assert!(!confirm(&mut Cursor::new("\n"), &mut sink, "? ").unwrap());
        assert!(!confirm(&mut Cursor::new(""), &mut sink, "? ").unwrap());
        assert_eq!(String::from_utf8(sink).unwrap(), "? ? ? ? ");
    }

    #[test]
    fn table_lists_each_proposal() {
        let p = Proposal {
            id: 9,
            created_date: local_now(),
            fields: ProposalFields {
                title: "Backups".into(),
                estimated_cost: 12_500.0,
                ..Default::default()
            },
        };
        let lines = proposal_table(&[p]);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Backups"));
        assert!(lines[1].ends_with("12,500"));
        assert_eq!(lines[2], "1 proposal(s)");
    }
}
