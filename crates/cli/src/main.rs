use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use dental_core::auth::{PasswordHasher, TokenSigner};
use dental_core::models::RegisterRequest;
use dental_core::repositories::postgres;
use dental_core::services::AuthService;
use dental_core::{open_datastore, AppConfig};
use dental_types::Role;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dental")]
#[command(about = "Dental practice backend operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the embedded database migrations
    Migrate,
    /// Create a staff account
    CreateUser {
        email: String,
        first_name: String,
        last_name: String,
        /// One of dentist, hygienist, admin, staff
        #[arg(value_parser = parse_role)]
        role: Role,
        /// Initial password (at least 6 characters)
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Print the bcrypt hash of a password
    HashPassword { password: String },
    /// Verify a session token with the configured secret and print its claims
    InspectToken { token: String },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse::<Role>().map_err(|err| err.to_string())
}

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("dental=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to read configuration")?;

    match cli.command {
        Commands::Migrate => {
            let pool = postgres::connect(&config.database).await?;
            postgres::run_migrations(&pool).await?;
            println!("Migrations applied.");
        }
        Commands::CreateUser {
            email,
            first_name,
            last_name,
            role,
            password,
            phone,
        } => {
            let store = open_datastore(&config).await?;
            let auth = AuthService::from_config(&store, &config.auth)?;
            let session = auth
                .register(RegisterRequest {
                    email,
                    password,
                    first_name,
                    last_name,
                    role,
                    phone,
                })
                .await?;
            println!(
                "Created user {} ({}, {}) with id {}",
                session.user.full_name(),
                session.user.email,
                session.user.role,
                session.user.id
            );
        }
        Commands::HashPassword { password } => {
            let hasher = PasswordHasher::new(config.auth.bcrypt_cost)?;
            println!("{}", hasher.hash(&password).await?);
        }
        Commands::InspectToken { token } => {
            if config.auth.using_dev_secret {
                eprintln!("JWT_SECRET is not set; verifying with the development secret.");
            }
            let claims = TokenSigner::from_config(&config.auth)
                .verify(token.trim())
                .context("token rejected")?;
            println!("User ID: {}", claims.sub);
            println!("Role: {}", claims.role);
            println!("Issued: {}", format_timestamp(claims.iat));
            println!("Expires: {}", format_timestamp(claims.exp));
        }
    }

    Ok(())
}
