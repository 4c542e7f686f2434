use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use stock_alerts::{
    config,
    controllers::{
        alert_form_controller::SubmitOutcome,
        alert_list_controller::{CommitOutcome, ListState, RemoveOutcome},
        workspace_controller::AlertWorkspace,
    },
    models::{AlertId, AlertRecord},
    services::{AlertApiClient, Notification},
};

#[derive(Parser)]
#[command(name = "stock-alerts", about = "Manage price alerts kept by the alert service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List all alerts (default)
    List {
        #[arg(long)]
        json: bool,
    },
    /// Place a new alert
    Create {
        symbol: String,
        price: String,
        /// above | below
        #[arg(long, default_value = "below")]
        direction: String,
        /// 0-4 or intraday | swing | weekly | longterm | "stock option"
        #[arg(long, default_value = "swing")]
        category: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Change fields of an existing alert
    Update {
        id: String,
        #[arg(long)]
        price: Option<String>,
        /// BUY | SHORT
        #[arg(long)]
        side: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Delete an alert
    Delete {
        id: String,
        /// skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = config::load();

    let store = match AlertApiClient::new(&settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("alert service at {}", store.base_url());

    let mut ws = AlertWorkspace::from_settings(store, &settings);

    let ok = match cli.command.unwrap_or(Command::List { json: false }) {
        Command::List { json } => list(&mut ws, json).await,
        Command::Create {
            symbol,
            price,
            direction,
            category,
            comment,
        } => create(&mut ws, &symbol, &price, &direction, &category, &comment).await,
        Command::Update {
            id,
            price,
            side,
            category,
            comment,
        } => {
            let fields = [
                ("price", price),
                ("side", side),
                ("category", category),
                ("comment", comment),
            ];
            update(&mut ws, &AlertId::new(id), &fields).await
        }
        Command::Delete { id, yes } => delete(&mut ws, &AlertId::new(id), yes).await,
    };

    report(ws.notifier().current());
    ws.shutdown();

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

async fn list(ws: &mut AlertWorkspace<AlertApiClient>, json: bool) -> bool {
    match ws.show_list().await {
        ListState::Ready(alerts) if json => match serde_json::to_string_pretty(alerts) {
            Ok(s) => {
                println!("{s}");
                true
            }
            Err(e) => {
                eprintln!("{e}");
                false
            }
        },
        ListState::Ready(alerts) => {
            if alerts.is_empty() {
                println!("No alerts yet.");
            }
            for a in alerts {
                print_alert(a);
            }
            true
        }
        ListState::Failed(msg) => {
            eprintln!("{msg}");
            false
        }
        ListState::Loading => false,
    }
}

async fn create(
    ws: &mut AlertWorkspace<AlertApiClient>,
    symbol: &str,
    price: &str,
    direction: &str,
    category: &str,
    comment: &str,
) -> bool {
    let fields = [
        ("instrument", symbol),
        ("price", price),
        ("direction", direction),
        ("category", category),
        ("comment", comment),
    ];
    for (name, value) in fields {
        if let Err(e) = ws.form_mut().set_field_raw(name, value) {
            eprintln!("{e}");
            return false;
        }
    }

    match ws.submit_form().await {
        SubmitOutcome::Created(record) => {
            print_alert(&record);
            true
        }
        _ => false,
    }
}

async fn update(
    ws: &mut AlertWorkspace<AlertApiClient>,
    id: &AlertId,
    fields: &[(&str, Option<String>)],
) -> bool {
    let list = match ws.ready_list().await {
        Ok(list) => list,
        Err(msg) => {
            eprintln!("{msg}");
            return false;
        }
    };

    if list.begin_edit(id).is_none() {
        eprintln!("No alert with id {id}");
        return false;
    }
    for (name, value) in fields {
        let Some(value) = value else { continue };
        if let Err(e) = list.edit_field_raw(name, value) {
            eprintln!("{e}");
            return false;
        }
    }

    match list.commit_edit().await {
        CommitOutcome::Committed { .. } => {
            if let Some(a) = list.state().find(id) {
                print_alert(a);
            }
            true
        }
        _ => false,
    }
}

async fn delete(ws: &mut AlertWorkspace<AlertApiClient>, id: &AlertId, yes: bool) -> bool {
    let list = match ws.ready_list().await {
        Ok(list) => list,
        Err(msg) => {
            eprintln!("{msg}");
            return false;
        }
    };

    let outcome = list.remove(id, |_| yes || confirm_delete()).await;
    match outcome {
        RemoveOutcome::Removed => true,
        RemoveOutcome::Declined => {
            println!("Cancelled.");
            true
        }
        _ => false,
    }
}

fn confirm_delete() -> bool {
    print!("Are you sure you want to delete this alert? [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_alert(a: &AlertRecord) {
    let side = a.side.map(|s| s.as_str()).unwrap_or("-");
    let price = a.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string());
    println!(
        "{:<26} {:<10} {:<12} {:<5} {:>12}  {}",
        a.id.as_str(),
        a.instrument,
        a.category_or_default().label(),
        side,
        price,
        a.comment_or_placeholder()
    );
}

fn report(n: Option<Notification>) {
    if let Some(n) = n {
        println!("[{}] {}", n.severity.label(), n.message);
    }
}
