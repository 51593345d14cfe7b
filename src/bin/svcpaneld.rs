//! svcpaneld - HTTP control panel daemon for systemd services
//!
//! Serves the panel API on 0.0.0.0:25569 by default. The service list is
//! refreshed from systemctl at startup and every 60 seconds.
//!
//! TLS is not terminated here; run behind a TLS proxy.

use clap::Parser;
use log::info;
use std::io::BufRead;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use svcpanel::api;
use svcpanel::protocol::DEFAULT_PORT;
use svcpanel::users::{User, UserDirectory};
use svcpanel::{Panel, RegistryRefresher, ServiceRegistry, Systemctl};

#[derive(Parser)]
#[command(name = "svcpaneld")]
#[command(about = "HTTP control panel for systemd services")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    listen: SocketAddr,

    /// Users file (username:sha256hex per line)
    #[arg(long, default_value = "/etc/svcpanel/users")]
    users: PathBuf,

    /// Seconds between full service list refreshes
    #[arg(long, default_value_t = 60)]
    refresh_interval: u64,

    /// Service manager command line (e.g. "sudo -n systemctl")
    #[arg(long, default_value = "systemctl")]
    systemctl: String,

    /// Browser origin allowed through CORS
    #[arg(long)]
    allow_origin: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Read a password from stdin and print a users file line
    HashPassword {
        /// Username for the line
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Some(Command::HashPassword { username }) = args.command {
        let mut password = String::new();
        std::io::stdin().lock().read_line(&mut password)?;
        let password = password.trim_end_matches(|c| c == '\r' || c == '\n');
        println!("{}", User::with_password(username, password).to_line());
        return Ok(());
    }

    let users = UserDirectory::load(&args.users).await?;
    if users.is_empty() {
        log::warn!("No users in {}; nobody can log in", args.users.display());
    } else {
        info!("Loaded {} users from {}", users.len(), args.users.display());
    }

    let systemctl = Arc::new(Systemctl::from_command_line(&args.systemctl)?);
    let registry = Arc::new(ServiceRegistry::new());

    let refresher = Arc::new(
        RegistryRefresher::new(Arc::clone(&registry), Arc::clone(&systemctl))
            .with_interval(Duration::from_secs(args.refresh_interval.max(1))),
    );
    info!(
        "Refreshing services from {} every {:?}",
        systemctl.program(),
        refresher.interval()
    );
    let refresh_task = refresher.spawn();

    let panel = Arc::new(Panel::new(registry, systemctl, users));
    let mut app = api::router(panel);
    if let Some(origin) = &args.allow_origin {
        app = app.layer(api::cors_layer(origin)?);
        info!("CORS enabled for {}", origin);
    }

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!("svcpaneld listening on {}", args.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresh_task.abort();
    info!("svcpaneld stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received interrupt, shutting down");
}
