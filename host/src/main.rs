use clap::Parser;
use host::network::{Host, HostConfig};
use log::{error, info};
use shared::console::{spawn_console_input, spawn_scoreboard};
use shared::Rules;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "7878")]
    port: u16,

    /// Tick rate (updates per second)
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Points needed to win (the remote must be started with the same value)
    #[arg(long, default_value_t = shared::MAX_SCORE)]
    max_score: u32,

    /// Fixed RNG seed for reproducible serves
    #[arg(long)]
    seed: Option<u64>,
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
    let config = HostConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        tick_rate: args.tick_rate,
        rules: rules.clone(),
        seed: args.seed,
    };

    let mut host = Host::new(config)?;
    let addr = host.bind().await?;
    info!("Hosting on {} at {}Hz, first to {}", addr, args.tick_rate, rules.max_score);
    info!("Controls: w/s to move, x to stop, or type a paddle position");

    let handle = host.handle();
    let _console = {
        let handle = handle.clone();
        spawn_console_input(move |input| handle.submit(input))
    };
    let scoreboard = spawn_scoreboard(handle.subscribe(), rules);

    let mut run = tokio::spawn(host.run());

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
            error!("Host failed: {}", e);
            Err(e.into())
        }
        Err(e) => {
            error!("Host task panicked: {}", e);
            Err(e.into())
        }
    }
}
