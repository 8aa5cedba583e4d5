use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use box23_desk::config::Config;
use box23_desk::models::{NewPayment, NewUser, UserStatus};
use box23_desk::{Desk, FileStore, HttpRemote, TracingReporter};

#[derive(Parser, Debug)]
#[command(name = "box23-desk")]
#[command(about = "Front desk for the Antología Box23 studio")]
#[command(version)]
struct Cli {
    /// Directory holding the local data files (overrides BOX23_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Backup API base URL (overrides BOX23_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for UserStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => UserStatus::Active,
            StatusArg::Inactive => UserStatus::Inactive,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new member
    AddUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        document: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        birthdate: String,
        #[arg(long, default_value = "")]
        eps: String,
        #[arg(long, default_value = "")]
        rh: String,
        #[arg(long, default_value = "")]
        emergency_contact: String,
        #[arg(long, default_value = "")]
        emergency_phone: String,
        #[arg(long, default_value = "")]
        class_time: String,
        #[arg(long, default_value = "")]
        affiliation_type: String,
        #[arg(long, value_enum, default_value = "active")]
        status: StatusArg,
    },
    /// List members, optionally filtered by name or document
    Users {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Active members available for check-in
    Roster,
    /// Record attendance for the given member ids
    Attendance {
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        user_ids: Vec<String>,
    },
    /// Register a payment
    Pay {
        #[arg(long)]
        user: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "cash")]
        method: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Payment history, newest first
    Payments {
        #[arg(long)]
        user: Option<String>,
    },
    /// Dashboard counters
    Stats,
    /// Upload everything to the cloud
    Backup,
    /// Replace local data with the newest cloud backup
    Restore,
}

fn or_dash(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = cli.data_dir.unwrap_or(config.data_dir);
    let api_url = cli.api_url.unwrap_or(config.api_url);
    info!("Using data directory {}", data_dir.display());

    let mut desk = Desk::open(FileStore::new(data_dir), TracingReporter)?;

    match cli.command {
        Command::AddUser {
            name,
            document,
            phone,
            birthdate,
            eps,
            rh,
            emergency_contact,
            emergency_phone,
            class_time,
            affiliation_type,
            status,
        } => {
            let user = desk.add_user(NewUser {
                name,
                document,
                phone,
                birthdate,
                eps,
                rh,
                emergency_contact,
                emergency_phone,
                class_time,
                affiliation_type,
                status: status.into(),
            })?;
            println!("{}", user.id);
        }
        Command::Users { search } => {
            for user in desk.search_users(&search) {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    user.id,
                    user.name,
                    user.document,
                    user.phone,
                    user.class_time,
                    user.status.as_str()
                );
            }
        }
        Command::Roster => {
            for user in desk.attendance_roster() {
                println!(
                    "{}\t{}\t{} - {}",
                    user.id, user.name, user.class_time, user.affiliation_type
                );
            }
        }
        Command::Attendance { date, user_ids } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            desk.save_attendance(date, &user_ids)?;
        }
        Command::Pay {
            user,
            start,
            end,
            amount,
            method,
            description,
        } => {
            let payment = desk.register_payment(NewPayment {
                user_id: user,
                start_date: start,
                end_date: end,
                amount,
                method,
                description,
            })?;
            println!("{}", payment.id);
        }
        Command::Payments { user } => {
            for p in desk.payment_history(user.as_deref()) {
                println!(
                    "{}\t{}\t{}..{}\t{}\t{}\t{}",
                    p.date.format("%Y-%m-%d"),
                    p.user_id,
                    or_dash(p.start_date),
                    or_dash(p.end_date),
                    p.amount.map_or_else(|| "-".to_string(), |a| format!("{a:.0}")),
                    p.method,
                    p.description
                );
            }
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&desk.dashboard())?);
        }
        Command::Backup => {
            desk.backup(&HttpRemote::new(api_url)).await?;
        }
        Command::Restore => {
            desk.restore(&HttpRemote::new(api_url)).await?;
        }
    }

    Ok(())
}
