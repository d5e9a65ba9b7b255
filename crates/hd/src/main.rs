use clap::{Parser, Subcommand};
use hd_core::types::{AccountId, NewSpecialist, NewUser};
use hd_serve::config::Config;
use hd_serve::AppState;
use serde::Serialize;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "hd", about = "Help-session lifecycle service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Print the OpenAPI document.
    Openapi,
    AddUser {
        username: String,
        email: String,
        phone_number: String,
        #[arg(long)]
        admin: bool,
    },
    AddSpecialist {
        name: String,
        email: String,
        phone_number: String,
        #[arg(long)]
        specialization: Option<String>,
    },
    /// Mint a bearer token for a `usr_` or `spc_` account id.
    Token {
        account_id: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(error = %message, "command failed");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<(), String> {
    match command {
        Command::Serve => {
            let secret = config.require_jwt_secret().map_err(|err| err.to_string())?;
            config.prepare_db_dir().map_err(|err| err.to_string())?;
            let state = AppState::from_config(config, secret);
            hd_serve::serve(state, config.addr())
                .await
                .map_err(|err| format!("serve error: {err}"))
        }
        Command::Openapi => {
            println!("{}", hd_serve::openapi::generate_spec());
            Ok(())
        }
        Command::AddUser {
            username,
            email,
            phone_number,
            admin,
        } => {
            let helpdesk = open(config)?;
            let user = helpdesk
                .directory()
                .add_user(NewUser {
                    username,
                    email,
                    phone_number,
                    is_admin: admin,
                })
                .map_err(|err| err.to_string())?;
            print_json(&user)
        }
        Command::AddSpecialist {
            name,
            email,
            phone_number,
            specialization,
        } => {
            let helpdesk = open(config)?;
            let specialist = helpdesk
                .directory()
                .add_specialist(NewSpecialist {
                    name,
                    email,
                    phone_number,
                    specialization,
                })
                .map_err(|err| err.to_string())?;
            print_json(&specialist)
        }
        Command::Token { account_id, hours } => {
            let secret = config.require_jwt_secret().map_err(|err| err.to_string())?;
            let account = AccountId::parse(&account_id).map_err(|err| err.to_string())?;
            let state = AppState::from_config(config, secret);
            let helpdesk = hd_serve::build_helpdesk(&state).map_err(|err| err.to_string())?;
            helpdesk
                .directory()
                .resolve(&account)
                .map_err(|err| err.to_string())?;
            let token = hd_serve::auth::issue_token(
                &state.keys,
                &account,
                chrono::Duration::hours(hours),
            )
            .map_err(|err| err.to_string())?;
            println!("{token}");
            Ok(())
        }
    }
}

fn open(config: &Config) -> Result<hd_core::Helpdesk<hd_serve::DbStore>, String> {
    config.prepare_db_dir().map_err(|err| err.to_string())?;
    // Directory commands never check tokens.
    let state = AppState::from_config(config, config.jwt_secret.as_deref().unwrap_or_default());
    hd_serve::build_helpdesk(&state).map_err(|err| err.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
