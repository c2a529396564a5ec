use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use strava_gear::{
    AccessToken, Authorizer, CredentialArgs, Credentials, Interrupt, Prompt, READ_SCOPES,
    StravaConfig, StravaError, TerminalPrompt, WRITE_SCOPES, bulk, weekly,
};

#[derive(Debug, Parser)]
#[command(
    name = "strava-gear",
    version,
    about = "Bulk-assign running shoes to Strava activities and chart weekly mileage."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assign one pair of shoes to every run in a date range that has no gear yet
    BulkEditGear(CredentialFlags),
    /// Chart weekly running mileage over the past year
    WeeklyMileage(CredentialFlags),
}

#[derive(Debug, Args)]
struct CredentialFlags {
    /// Strava API application client ID
    client_id: Option<String>,
    /// Strava API application client secret
    client_secret: Option<String>,
}

impl From<CredentialFlags> for CredentialArgs {
    fn from(flags: CredentialFlags) -> Self {
        Self {
            client_id: flags.client_id,
            client_secret: flags.client_secret,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let interrupt = Interrupt::on_ctrl_c();

    let mut prompt = TerminalPrompt::new();
    let result = interrupt
        .guard(async {
            match cli.command {
                Command::BulkEditGear(flags) => {
                    run_bulk_edit_gear(flags.into(), &mut prompt, &interrupt).await
                }
                Command::WeeklyMileage(flags) => {
                    run_weekly_mileage(flags.into(), &mut prompt, &interrupt).await
                }
            }
        })
        .await;
    drop(prompt);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(StravaError::Interrupted) => {
            eprintln!("\nInterrupted.");
            ExitCode::FAILURE
        }
        // Ctrl-C during the callback wait surfaces as a cancelled callback.
        Err(_) if interrupt.is_raised() => {
            eprintln!("\nInterrupted.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("\nAn error occurred: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("STRAVA_GEAR_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

async fn run_bulk_edit_gear(
    args: CredentialArgs,
    prompt: &mut impl Prompt,
    interrupt: &Interrupt,
) -> Result<(), StravaError> {
    println!("Welcome to the Strava Bulk Edit Tool!");

    let config = StravaConfig::from_env()?;
    // Only the weekly report reads credentials from the environment.
    let credentials = Credentials::resolve(args, |_| None, prompt)?;

    let report = bulk::run(&config, prompt, || {
        authorize(&config, credentials, WRITE_SCOPES, interrupt)
    })
    .await?;
    tracing::info!(updates = report.update_count(), "bulk edit finished");
    Ok(())
}

async fn run_weekly_mileage(
    args: CredentialArgs,
    prompt: &mut impl Prompt,
    interrupt: &Interrupt,
) -> Result<(), StravaError> {
    println!("Welcome to the Strava Weekly Mileage Visualizer!");

    let config = StravaConfig::from_env()?;
    let credentials = Credentials::resolve(args, |key| std::env::var(key).ok(), prompt)?;

    let chart = weekly::run(&config, Utc::now().date_naive(), || {
        authorize(&config, credentials, READ_SCOPES, interrupt)
    })
    .await?;
    print!("{chart}");
    Ok(())
}

async fn authorize(
    config: &StravaConfig,
    credentials: Credentials,
    scopes: &[&str],
    interrupt: &Interrupt,
) -> Result<AccessToken, StravaError> {
    let authorizer = Authorizer::new(config, credentials)?;
    let redirect_uri = authorizer.redirect_uri();

    let token = authorizer
        .authenticate(
            scopes,
            |url| {
                println!("\nOpen the following URL in your browser to authorize the application:");
                println!("{url}");
                println!("\nWaiting for authorization callback on {redirect_uri}...");
                Ok(())
            },
            interrupt.clone().raised(),
        )
        .await?;

    println!("Access token received.");
    Ok(token)
}
