mod args;
mod logging;

use clap::Parser;
use pg_provision::host::Host;
use pg_provision::{ProvisionError, ProvisionSpec, ResourceReconciler};
use tracing::Level;

use crate::args::{Args, Command, database_options};
use crate::logging::LogWriter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let writer = LogWriter::new(args.log.as_deref()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    if let Err(err) = run(args).await {
        eprintln!("pg-provision: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ProvisionError> {
    let spec = ProvisionSpec::from_options(args.provision_options()?);
    let mut reconciler = ResourceReconciler::from_spec(spec, Host::system());

    let result = match &args.command {
        Command::Install => reconciler.install().await,
        Command::Configure => reconciler.configure().await,
        Command::User { name, password } => {
            reconciler.ensure_user(name, password).await.map(|_| ())
        }
        Command::Database { name, options } => reconciler
            .ensure_database(name, database_options(options))
            .await
            .map(|_| ()),
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(reconciler.spec())?);
            Ok(())
        }
    };

    reconciler.close_connection().await;
    result
}
