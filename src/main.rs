use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use fiber_cost_console::domain::{
    parse_lengths, Calculator, LengthEntry, PriceSheet, PricingSettings, Selection, LENGTH_CATALOG,
};
use fiber_cost_console::infra::export::{default_export_filename, save_price_list};
use fiber_cost_console::infra::price_source::PriceSheetClient;
use fiber_cost_console::util::persistence::{load_settings, save_settings};
use fiber_cost_console::util::version::{APP_NAME, VERSION_TEXT};

#[derive(Parser)]
#[command(name = "fiber-cost", version = VERSION_TEXT, about = APP_NAME)]
struct Cli {
    /// Load unit prices from a published JSON price sheet instead of the builtin one.
    #[arg(long, global = true)]
    price_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price one cable length and show the cost breakdown.
    Quote {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Cable length in meters.
        #[arg(long)]
        length: f64,
    },
    /// Price every catalog length (or a custom list).
    Table {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Comma or newline separated lengths in meters.
        #[arg(long)]
        lengths: Option<String>,
        /// Write a CSV export; without a path a timestamped name is used.
        #[arg(long, num_args = 0..=1)]
        csv: Option<Option<PathBuf>>,
    },
    /// Report selections whose unit prices are not defined.
    Validate {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Show or change persisted pricing settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    SetRate { origin: String, rate: f64 },
    SetDefaultOrigin { origin: String },
    SetExchange { rate: f64 },
    SetMarkup { markup: f64 },
    SetStrict {
        #[arg(action = clap::ArgAction::Set)]
        strict: bool,
    },
}

#[derive(Args)]
struct SelectionArgs {
    #[arg(long, default_value = "")]
    connector_a: String,
    #[arg(long, default_value = "")]
    connector_b: String,
    #[arg(long, default_value = "")]
    polish_a: String,
    #[arg(long, default_value = "")]
    polish_b: String,
    #[arg(long, default_value = "")]
    fiber_mode: String,
    #[arg(long, default_value = "")]
    fiber_type: String,
    #[arg(long, default_value = "")]
    loss_grade: String,
    #[arg(long, default_value = "")]
    jacket: String,
    #[arg(long, default_value = "")]
    ship_from: String,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Self {
            connector_a: args.connector_a,
            connector_b: args.connector_b,
            polish_a: args.polish_a,
            polish_b: args.polish_b,
            fiber_mode: args.fiber_mode,
            fiber_type: args.fiber_type,
            loss_grade: args.loss_grade,
            jacket: args.jacket,
            ship_from: args.ship_from,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();

    match cli.command {
        Command::Quote { selection, length } => {
            let sheet = load_sheet(cli.price_url.as_deref()).await?;
            let calculator = Calculator::new(&sheet, &settings);
            let selection = Selection::from(selection);

            print_diagnostics(&calculator, &selection);
            let total = calculator
                .calculate_price_checked(length, &selection)
                .context("refusing to quote in strict mode")?;
            let connector = calculator.connector_and_labor(&selection);
            let cable = calculator.cable_cost(length, &selection);

            println!(
                "Connector material: US$ {:.3} ({} housings)",
                connector.connector_material_cost,
                connector.material_connector_count()
            );
            println!(
                "Labor:              US$ {:.2} ({} terminations)",
                connector.labor_cost,
                connector.labor_connector_count()
            );
            println!("Cable material:     US$ {:.3}", cable);
            println!("Total:              US$ {:.2}", total);
        }
        Command::Table {
            selection,
            lengths,
            csv,
        } => {
            let sheet = load_sheet(cli.price_url.as_deref()).await?;
            let calculator = Calculator::new(&sheet, &settings);
            let selection = Selection::from(selection);
            let entries: Vec<LengthEntry> = match lengths {
                Some(raw) => parse_lengths(&raw)?,
                None => LENGTH_CATALOG.to_vec(),
            };

            print_diagnostics(&calculator, &selection);
            let rows = calculator
                .price_list_checked(&entries, &selection)
                .context("refusing to build a price list in strict mode")?;

            println!(
                "{:<24} {:>12} {:>10} {:>10} {:>10}",
                "Length", "Cable USD", "USD", "TWD", "Resale"
            );
            for row in &rows {
                println!(
                    "{:<24} {:>12.3} {:>10.2} {:>10} {:>10}",
                    row.label,
                    row.cable_cost,
                    row.total_price_usd,
                    row.total_price_local,
                    row.resale_price_local
                );
            }

            if let Some(target) = csv {
                let path = target.unwrap_or_else(|| {
                    PathBuf::from(default_export_filename(
                        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()),
                    ))
                });
                save_price_list(&rows, &path)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Validate { selection } => {
            let sheet = load_sheet(cli.price_url.as_deref()).await?;
            let calculator = Calculator::new(&sheet, &settings);
            let diagnostics = calculator.validate(&Selection::from(selection));
            if diagnostics.is_empty() {
                println!("All selected combinations have a defined price.");
            } else {
                for diagnostic in &diagnostics {
                    println!("{diagnostic}");
                }
                std::process::exit(1);
            }
        }
        Command::Settings { action } => {
            if apply_settings_action(&mut settings, action)? {
                let path = save_settings(&settings)?;
                println!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}

/// Returns whether the settings changed and need saving.
fn apply_settings_action(settings: &mut PricingSettings, action: SettingsAction) -> Result<bool> {
    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(settings)?);
            return Ok(false);
        }
        SettingsAction::SetRate { origin, rate } => {
            if !rate.is_finite() || rate < 0.0 {
                bail!("labor rate must be a non-negative number");
            }
            settings.set_labor_rate(&origin, rate);
        }
        SettingsAction::SetDefaultOrigin { origin } => {
            let origin = origin.trim().to_ascii_uppercase();
            if !settings.labor_rates.contains_key(&origin) {
                bail!("no labor rate configured for origin {origin}");
            }
            settings.default_origin = origin;
        }
        SettingsAction::SetExchange { rate } => {
            if !rate.is_finite() || rate <= 0.0 {
                bail!("exchange rate must be positive");
            }
            settings.exchange_rate = rate;
        }
        SettingsAction::SetMarkup { markup } => {
            if !markup.is_finite() || markup <= 0.0 {
                bail!("markup must be positive");
            }
            settings.resale_markup = markup;
        }
        SettingsAction::SetStrict { strict } => settings.strict = strict,
    }
    Ok(true)
}

async fn load_sheet(price_url: Option<&str>) -> Result<PriceSheet> {
    let client = match price_url {
        Some(url) => PriceSheetClient::with_url(url)?,
        None => PriceSheetClient::builtin()?,
    };
    let payload = client.get_sheet().await?;
    tracing::debug!(status = ?payload.status, "price sheet ready");
    Ok(payload.data)
}

fn print_diagnostics(calculator: &Calculator<'_>, selection: &Selection) {
    for diagnostic in calculator.validate(selection) {
        eprintln!("warning: {diagnostic}");
    }
}
