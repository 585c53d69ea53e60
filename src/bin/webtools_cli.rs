// ABOUTME: Command-line tool for provisioning users and checking credentials
// ABOUTME: Drives the webtools library with environment configuration and optional overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! Usage:
//! ```bash
//! # Hash a password under the configured scheme
//! webtools-cli hash-password --password 'correct horse'
//!
//! # Create a user in the configured database
//! webtools-cli --database-url sqlite:./data/app.db create-user --username alice --password 'correct horse'
//!
//! # Verify credentials (upgrades the stored hash if it is outdated)
//! webtools-cli check-login --username alice --password 'correct horse'
//!
//! # Verify credentials and print a bearer token (needs SECRET_KEY and OAUTH_NAME)
//! webtools-cli issue-token --username alice --password 'correct horse'
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use webtools::auth::{CredentialVerifier, PasswordContext, PasswordScheme, TokenManager};
use webtools::config::{DatabaseConfig, DatabaseUrl, PasswordPolicy};
use webtools::database::users::create_user;
use webtools::database::{DataAccessProvider, Database, RequestContext, UserId};
use webtools::logging::LoggingConfig;

#[derive(Parser)]
#[command(
    name = "webtools-cli",
    about = "User provisioning and credential checks",
    long_about = "Create users and verify credentials against the configured database. Connection settings come from DATABASE_URL or DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASSWORD."
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print a hash of the password under the current scheme
    HashPassword {
        /// Password to hash
        #[arg(long)]
        password: String,
    },

    /// Insert a user with a freshly hashed password
    CreateUser {
        /// Username
        #[arg(long)]
        username: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Verify a username and password
    CheckLogin {
        /// Username
        #[arg(long)]
        username: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Verify a username and password, then print an auth token for the user
    IssueToken {
        /// Username
        #[arg(long)]
        username: String,

        /// Password
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let passwords = Arc::new(PasswordContext::new(PasswordPolicy::from_env()?)?);

    match args.command {
        Command::HashPassword { password } => {
            println!("{}", passwords.hash(&password)?);
        }
        Command::CreateUser { username, password } => {
            let database = open_database(args.database_url.as_deref())?;
            let hash = passwords.hash(password.trim())?;

            let mut ctx = RequestContext::new();
            let created = create_user(&database, &mut ctx, username.trim(), &hash).await;
            database.release_connection(&mut ctx).await;

            let user_id = created?;
            info!(%user_id, username = username.trim(), "User created");
            println!("{user_id}");
        }
        Command::CheckLogin { username, password } => {
            let database = open_database(args.database_url.as_deref())?;
            let user_id = check_credentials(database, passwords, &username, &password).await?;
            println!("{user_id}");
        }
        Command::IssueToken { username, password } => {
            let tokens = TokenManager::from_env()?;
            let database = open_database(args.database_url.as_deref())?;
            let user_id = check_credentials(database, passwords, &username, &password).await?;
            println!("{}", tokens.issue_token(user_id)?);
        }
    }

    Ok(())
}

fn open_database(url_override: Option<&str>) -> Result<Database> {
    let config = match url_override {
        Some(url) => DatabaseConfig::new(DatabaseUrl::parse_url(url)),
        None => DatabaseConfig::from_env()?,
    };
    info!(target_database = %config.url, "Using database");
    Ok(Database::new(config))
}

async fn check_credentials(
    database: Database,
    passwords: Arc<PasswordContext>,
    username: &str,
    password: &str,
) -> Result<UserId> {
    let database = Arc::new(database);
    let verifier = CredentialVerifier::new(Arc::clone(&database), passwords);

    let mut ctx = RequestContext::new();
    let outcome = verifier
        .authenticate(&mut ctx, Some(username), Some(password))
        .await;
    database.release_connection(&mut ctx).await;

    match outcome? {
        Some(user_id) => Ok(user_id),
        None => bail!("invalid username or password"),
    }
}
