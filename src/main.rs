use std::env;
use std::io::{self, Write};

use tokio_stream::wrappers::ReceiverStream;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use vending_engine::csv::{read_commands, write_products, write_reserve, write_summary};
use vending_engine::{Engine, MachineConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: vending <commands.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = MachineConfig::from_env();
    let mut engine = Engine::from_config(&config).expect("invalid machine configuration");

    let commands = match read_commands(path) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // the engine stays owned by this task; commands are funneled to it
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);
    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(cmd_receiver)).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_products(&mut out, engine.list_products()).expect("failed to write catalog");
    write_reserve(&mut out, &engine.list_coin_reserve()).expect("failed to write reserve");
    write_summary(&mut out, &engine).expect("failed to write summary");
    out.flush().expect("failed to flush stdout");
}
