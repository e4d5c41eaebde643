//! `deskbook` CLI: check windows for conflicts offline, or talk to the booking backend.
//!
//! ## Usage
//!
//! ```sh
//! # Does 9:00-10:30 collide with the reservations in a file?
//! # Exit status 1 on a conflict, 2 on any error.
//! deskbook check --start 9:00 --end 10:30 -i reservations.json
//!
//! # Free gaps of at least an hour between 9:00 and 18:00
//! deskbook free -i reservations.json --min 60
//!
//! # Reservations on a room, straight from the backend
//! deskbook --token $TOKEN availability --resource DR001 --date 2026-10-19
//!
//! # Book it (conflicts are checked before anything is sent)
//! deskbook --token $TOKEN book --resource DR001 --start 11:00 --end 12:00 --purpose "1:1"
//! ```

use std::io::{self, Read};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use deskbook_client::types::{
    AvailabilityResponse, ConflictType, OnBehalfOf, RaiseConflictRequest, Severity,
    VisitorPassRequest,
};
use deskbook_client::{
    Availability, BlockReason, BookingMetadata, BookingPlanner, ClientConfig, ClientError,
    DeskbookClient, Session, Verdict, WeeklySchedule, CONFLICT_WARNING,
};
use deskbook_engine::validation::{is_valid_workspace_id, parse_date};
use deskbook_engine::{
    find_conflicts, find_first_free_slot, find_free_slots, BookingPolicy, Conflict, FreeSlot,
    ProposedWindow, ReservationWindow, ResourceId, ResourceKind, TimeMinutes, Window,
};
use serde::Serialize;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "deskbook", version, about = "Workspace booking from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend root URL
    #[arg(long, env = "DESKBOOK_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "DESKBOOK_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Log in with this email when no token is given
    #[arg(long, env = "DESKBOOK_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "DESKBOOK_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a window against reservations read from a file or stdin
    Check {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Reservations JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List the free gaps between reservations
    Free {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long, default_value = "9:00")]
        open: TimeMinutes,
        #[arg(long, default_value = "18:00")]
        close: TimeMinutes,
        /// Only show gaps of at least this many minutes
        #[arg(long, default_value_t = 0)]
        min: i64,
    },
    /// Start times offered for a resource kind
    Slots {
        #[arg(long)]
        kind: ResourceKind,
    },
    /// Fetch a resource's reservations for a date
    Availability {
        #[arg(long)]
        resource: ResourceId,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Book a resource after checking it for conflicts
    Book {
        #[arg(long)]
        resource: ResourceId,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        purpose: String,
        #[arg(long)]
        date: Option<String>,
        /// Repeat on these weekdays, e.g. `mo,we,fr`
        #[arg(long)]
        schedule: Option<WeeklySchedule>,
    },
    /// List your bookings
    Bookings,
    /// Cancel one of your bookings
    Cancel { booking_id: String },
    /// Mark tomorrow as working from home
    Wfh,
    /// Occupancy of every workspace of a kind
    Seats {
        #[arg(long)]
        kind: ResourceKind,
    },
    /// Ask facilities for an immediate seat or room
    RaiseConflict {
        #[arg(long)]
        kind: ResourceKind,
        #[arg(long, value_enum, default_value_t = SeverityArg::Medium)]
        severity: SeverityArg,
        /// Raise on behalf of this team instead of yourself
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Request a visitor pass
    VisitorPass {
        #[arg(long)]
        name: String,
        /// Ten-digit phone number
        #[arg(long)]
        phone: String,
        #[arg(long)]
        purpose: String,
    },
    /// Backend health
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

#[derive(Serialize)]
struct ConflictReport<'a> {
    start: TimeMinutes,
    end: TimeMinutes,
    conflict: bool,
    conflicts: Vec<ConflictEntry<'a>>,
    /// First free gap long enough for the proposed window, if any.
    suggestion: Option<FreeSlot>,
}

impl<'a> ConflictReport<'a> {
    fn new(proposed: &ProposedWindow, conflicts: &'a [Conflict], suggestion: Option<FreeSlot>) -> Self {
        ConflictReport {
            start: proposed.start(),
            end: proposed.end(),
            conflict: !conflicts.is_empty(),
            conflicts: conflicts.iter().map(ConflictEntry::from).collect(),
            suggestion,
        }
    }
}

#[derive(Serialize)]
struct ConflictEntry<'a> {
    occupant: &'a str,
    start: TimeMinutes,
    end: TimeMinutes,
    overlap_minutes: i64,
}

impl<'a> From<&'a Conflict> for ConflictEntry<'a> {
    fn from(c: &'a Conflict) -> Self {
        ConflictEntry {
            occupant: c.reservation.occupant(),
            start: c.reservation.start(),
            end: c.reservation.end(),
            overlap_minutes: c.overlap_minutes,
        }
    }
}

/// Exit status when the window collides with an existing reservation.
const EXIT_CONFLICT: i32 = 1;
/// Exit status for every other failure (bad input, I/O, backend errors).
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(&cli).await {
        eprintln!("Error: {:?}", err);
        process::exit(EXIT_ERROR);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Check { start, end, input } => {
            let reservations = read_reservations(input.as_deref())?;
            let proposed = ProposedWindow::parse(start, end).context("Invalid window")?;
            let conflicts = find_conflicts(&proposed, &reservations);

            if conflicts.is_empty() {
                if cli.json {
                    print_json(&ConflictReport::new(&proposed, &conflicts, None))?;
                } else {
                    println!("{}-{} is free", proposed.start(), proposed.end());
                }
            } else {
                let policy = BookingPolicy::default();
                report_conflict(&proposed, &conflicts, &reservations, &policy, cli.json)?;
                process::exit(EXIT_CONFLICT);
            }
        }
        Commands::Free {
            input,
            open,
            close,
            min,
        } => {
            let reservations = read_reservations(input.as_deref())?;
            let slots: Vec<_> = find_free_slots(&reservations, *open, *close)
                .into_iter()
                .filter(|s| s.duration_minutes >= *min)
                .collect();

            if cli.json {
                print_json(&slots)?;
            } else if slots.is_empty() {
                println!("No free slots");
            } else {
                for slot in &slots {
                    println!("{}-{}  ({} min)", slot.start, slot.end, slot.duration_minutes);
                }
            }
        }
        Commands::Slots { kind } => {
            let times = BookingPolicy::default().slot_times(*kind);
            if cli.json {
                print_json(&times)?;
            } else {
                let labels: Vec<String> = times.iter().map(|t| t.to_string()).collect();
                println!("{}: {}", kind, labels.join(" "));
            }
        }
        Commands::Health => {
            let client = build_client(cli, Arc::new(Session::new()))?;
            let health = client.health().await.context("Health check failed")?;
            if cli.json {
                print_json(&health)?;
            } else {
                println!("{}", health.status);
            }
        }
        command => {
            if let Commands::Book { resource, .. } = command {
                warn_if_not_canonical(resource);
            }
            let client = authenticated_client(cli).await?;
            run_online(&client, command, cli.json).await?;
        }
    }

    Ok(())
}

/// Commands that need a signed-in session.
async fn run_online(client: &DeskbookClient, command: &Commands, json: bool) -> Result<()> {
    match command {
        Commands::Availability { resource, date } => {
            let date = resolve_date(date.as_deref())?;
            let reservations = client
                .check_availability(resource, date)
                .await
                .with_context(|| format!("Failed to load availability for {}", resource))?;

            if json {
                print_json(&reservations)?;
            } else if reservations.is_empty() {
                println!("{} is free all day on {}", resource, date);
            } else {
                for r in &reservations {
                    println!("{}-{}  {}", r.start(), r.end(), r.occupant());
                }
            }
        }
        Commands::Book {
            resource,
            start,
            end,
            purpose,
            date,
            schedule,
        } => {
            let date = resolve_date(date.as_deref())?;
            book(client, resource, date, start, end, purpose, schedule.clone(), json).await?;
        }
        Commands::Bookings => {
            let bookings = client.my_bookings().await.context("Failed to load bookings")?;
            if json {
                print_json(&bookings)?;
            } else if bookings.is_empty() {
                println!("No bookings");
            } else {
                for b in &bookings {
                    println!(
                        "{}  {}  {}-{}  {}",
                        b.booking_id,
                        b.workspace_id.as_deref().unwrap_or("-"),
                        b.start_time.as_deref().unwrap_or("?"),
                        b.end_time.as_deref().unwrap_or("?"),
                        b.purpose.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Commands::Cancel { booking_id } => {
            client
                .cancel_booking(booking_id)
                .await
                .with_context(|| format!("Failed to cancel booking {}", booking_id))?;
            println!("Cancelled {}", booking_id);
        }
        Commands::Wfh => {
            let response = client.mark_wfh_tomorrow().await.context("Failed to mark WFH")?;
            if json {
                print_json(&response)?;
            } else {
                println!("{}", response.message);
            }
        }
        Commands::Seats { kind } => {
            let seats = client
                .list_workspaces(*kind)
                .await
                .with_context(|| format!("Failed to list {} workspaces", kind))?;
            if json {
                print_json(&seats)?;
            } else {
                for seat in &seats {
                    let slot = seat
                        .time_slot
                        .as_ref()
                        .map(|(s, e)| format!("{}-{}", s, e))
                        .unwrap_or_default();
                    println!(
                        "{}  {}  {}  {}",
                        seat.workspace_id,
                        seat.status,
                        seat.occupant.as_deref().unwrap_or("-"),
                        slot
                    );
                }
            }
        }
        Commands::RaiseConflict {
            kind,
            severity,
            team,
            description,
            start,
            end,
        } => {
            let window = ProposedWindow::parse(start, end).context("Invalid required time")?;
            let request = RaiseConflictRequest {
                conflict_type: ConflictType::for_kind(*kind),
                on_behalf_of: if team.is_some() {
                    OnBehalfOf::Team
                } else {
                    OnBehalfOf::Myself
                },
                team_name: team.clone(),
                severity: (*severity).into(),
                description: description.clone(),
                required_time: format!("{} - {}", window.start(), window.end()),
            };
            let ticket = client
                .raise_conflict(&request)
                .await
                .context("Failed to raise conflict")?;
            if json {
                print_json(&ticket)?;
            } else {
                println!("Conflict {} is {}", ticket.conflict_id, ticket.status);
                if let Some(resource) = &ticket.assigned_resource {
                    println!("Assigned: {}", resource);
                }
            }
        }
        Commands::VisitorPass {
            name,
            phone,
            purpose,
        } => {
            let request = VisitorPassRequest {
                visitor_name: name.clone(),
                visitor_phone: phone.clone(),
                purpose: purpose.clone(),
            };
            let pass = client
                .request_visitor_pass(&request)
                .await
                .context("Failed to request visitor pass")?;
            if json {
                print_json(&pass)?;
            } else {
                println!("{}", pass.visitor_pass_link);
            }
        }
        Commands::Check { .. } | Commands::Free { .. } | Commands::Slots { .. } | Commands::Health => {
            unreachable!("offline commands are handled in main")
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn book(
    client: &DeskbookClient,
    resource: &ResourceId,
    date: NaiveDate,
    start: &str,
    end: &str,
    purpose: &str,
    schedule: Option<WeeklySchedule>,
    json: bool,
) -> Result<()> {
    let policy = BookingPolicy::default();
    let mut planner = BookingPlanner::new().with_policy(policy);
    planner.select(resource.clone(), date);
    planner.set_window(start, end).context("Invalid window")?;
    planner
        .refresh(client)
        .await
        .with_context(|| format!("Failed to load availability for {}", resource))?;

    if let (Verdict::Conflict(conflicts), Availability::Loaded(reservations), Some(proposed)) =
        (planner.verdict(), planner.availability(), planner.window())
    {
        report_conflict(&proposed, conflicts, reservations, &policy, json)?;
        process::exit(EXIT_CONFLICT);
    }

    let metadata = BookingMetadata {
        purpose: purpose.to_string(),
        date: Some(date),
        schedule,
    };
    match planner.submit(client, &metadata).await {
        Ok(confirmation) => {
            if json {
                print_json(&confirmation)?;
            } else {
                println!(
                    "{}",
                    confirmation.message.as_deref().unwrap_or("Booking confirmed")
                );
                if let Some(id) = &confirmation.booking_id {
                    println!("Booking id: {}", id);
                }
            }
            Ok(())
        }
        Err(ClientError::SubmitConflict { message }) => {
            bail!(
                "{} was booked by someone else just now ({}); run `deskbook availability` and pick another window",
                resource,
                message
            )
        }
        Err(ClientError::Blocked(BlockReason::InvalidWindow(message))) => {
            bail!("Window not allowed: {}", message)
        }
        Err(e) => Err(e).context("Booking failed"),
    }
}

/// Print the conflict warning, the colliding reservations and the first free gap
/// long enough for the proposed window, all on stdout.
fn report_conflict(
    proposed: &ProposedWindow,
    conflicts: &[Conflict],
    reservations: &[ReservationWindow],
    policy: &BookingPolicy,
    json: bool,
) -> Result<()> {
    let needed = proposed.duration_minutes();
    let suggestion = find_first_free_slot(reservations, policy.open, policy.close, needed);

    if json {
        return print_json(&ConflictReport::new(proposed, conflicts, suggestion));
    }

    println!("{}", CONFLICT_WARNING);
    print_conflicts(conflicts);
    match suggestion {
        Some(slot) => println!(
            "First free slot of at least {} min: {}-{}",
            needed, slot.start, slot.end
        ),
        None => println!(
            "No free slot of {} min between {} and {}",
            needed, policy.open, policy.close
        ),
    }
    Ok(())
}

fn warn_if_not_canonical(resource: &ResourceId) {
    if !is_valid_workspace_id(resource.as_str()) {
        warn!(
            resource = %resource,
            "{} is not a canonical workspace id (WH/WS/DR/CR followed by three digits, e.g. WS001)",
            resource
        );
    }
}

fn print_conflicts(conflicts: &[Conflict]) {
    for c in conflicts {
        println!(
            "  {}-{}  {}  (overlaps {} min)",
            c.reservation.start(),
            c.reservation.end(),
            c.reservation.occupant(),
            c.overlap_minutes
        );
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_client(cli: &Cli, session: Arc<Session>) -> Result<DeskbookClient> {
    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(url) = &cli.backend_url {
        config = config.with_base_url(url).context("Invalid --backend-url")?;
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    Ok(DeskbookClient::new(config, session)?)
}

async fn authenticated_client(cli: &Cli) -> Result<DeskbookClient> {
    if let Some(token) = &cli.token {
        return build_client(cli, Arc::new(Session::with_token(token.as_str())));
    }

    let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
        bail!("Not signed in: pass --token, or --email and --password (or set DESKBOOK_TOKEN)");
    };
    let client = build_client(cli, Arc::new(Session::new()))?;
    client
        .login(email, password)
        .await
        .context("Login failed")?;
    Ok(client)
}

fn resolve_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => Ok(parse_date(d)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Reservations from any of:
/// - a backend `{"bookings": [...]}` document
/// - a bare array of backend rows (`start_time`/`end_time`)
/// - a bare array of `{occupant, start, end}`, as `availability --json` prints them
fn read_reservations(path: Option<&str>) -> Result<Vec<ReservationWindow>> {
    let raw = read_input(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("Reservations are not valid JSON")?;

    let backend_rows = match &value {
        serde_json::Value::Array(items) => items.iter().any(|item| item.get("start_time").is_some()),
        _ => true,
    };
    if !backend_rows {
        return serde_json::from_value(value).context("Unexpected reservations format");
    }

    let value = if value.is_array() {
        serde_json::json!({ "bookings": value })
    } else {
        value
    };
    let response: AvailabilityResponse =
        serde_json::from_value(value).context("Unexpected reservations format")?;
    Ok(response.into_reservations()?)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
