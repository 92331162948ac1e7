use clap::Parser;
use log::{error, info};
use remote::network::{Remote, RemoteConfig};
use shared::console::{spawn_console_input, spawn_scoreboard};
use shared::Rules;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:7878")]
    server: String,

    /// Seconds to wait for the connection, 0 to wait indefinitely
    #[arg(long, default_value = "10")]
    connect_timeout: u64,

    /// Points needed to win. Must match the host: a lower value only warns
    /// and keeps following the host, a higher one reports the host's final
    /// snapshot as a lost connection
    #[arg(long, default_value_t = shared::MAX_SCORE)]
    max_score: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let rules = Rules {
        max_score: args.max_score.max(1),
        ..Rules::default()
    };
    let connect_timeout = match args.connect_timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    info!("Starting remote...");
    info!("Connecting to: {}", args.server);
    info!("Controls: w/s to move, x to stop, or type a paddle position");

    let remote = Remote::new(RemoteConfig {
        server_addr: args.server,
        connect_timeout,
        rules: rules.clone(),
    })?;

    let handle = remote.handle();
    let _console = {
        let handle = handle.clone();
        spawn_console_input(move |input| handle.submit(input))
    };
    let scoreboard = spawn_scoreboard(handle.subscribe(), rules);

    let mut run = tokio::spawn(remote.run());

    let result = tokio::select! {
        result = &mut run => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            handle.shutdown();
            run.await
        }
    };

    scoreboard.abort();

    match result {
        Ok(Ok(reason)) => {
            info!("{}", reason);
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Could not connect: {}", e);
            Err(e.into())
        }
        Err(e) => {
            error!("Remote task panicked: {}", e);
            Err(e.into())
        }
    }
}
