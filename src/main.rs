//! zipkv server entry point: parse flags, start the engine task, and
//! accept connections until Ctrl+C.

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use zipkv::storage::{Engine, EngineHandle, ExpireStrategy};
use zipkv::{handle_connection, DEFAULT_DATABASES, DEFAULT_HOST, DEFAULT_PORT, VERSION};

struct Config {
    host: String,
    port: u16,
    databases: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            databases: DEFAULT_DATABASES,
        }
    }
}

impl Config {
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    config.host = take_value(&args, &mut i, "--host");
                }
                "--port" | "-p" => {
                    config.port = take_value(&args, &mut i, "--port").parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid port number");
                        std::process::exit(1);
                    });
                }
                "--databases" => {
                    let n: usize = take_value(&args, &mut i, "--databases")
                        .parse()
                        .unwrap_or(0);
                    if n == 0 {
                        eprintln!("Error: --databases requires a positive number");
                        std::process::exit(1);
                    }
                    config.databases = n;
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("zipkv {}", VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {}", other);
                    print_help();
                    std::process::exit(1);
                }
            }
            i += 1;
        }
        config
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i).cloned().unwrap_or_else(|| {
        eprintln!("Error: {} requires a value", flag);
        std::process::exit(1);
    })
}

fn print_help() {
    println!(
        r#"zipkv - in-memory multi-database RESP key/value store

USAGE:
    zipkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>        Port to listen on (default: 6379)
        --databases <N>      Number of logical databases (default: 16)
    -v, --version            Print version information
        --help               Print this help message

Connect with redis-cli or any RESP client:
    $ redis-cli -p 6379
    127.0.0.1:6379> SET greeting hello
    OK
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("zipkv {} starting", VERSION);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = Engine::new(config.databases, ExpireStrategy::HeapDriven).start(shutdown_rx);

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), databases = config.databases, "listening");

    tokio::select! {
        _ = accept_loop(listener, engine) => {}
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, stopping server");
        }
    }

    let _ = shutdown_tx.send(true);
    info!("server shutdown complete");
    Ok(())
}

async fn accept_loop(listener: TcpListener, engine: EngineHandle) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let engine = engine.clone();
                tokio::spawn(async move {
                    handle_connection(stream, addr, engine).await;
                });
            }
            Err(err) => {
                error!(error = %err, "failed to accept connection");
            }
        }
    }
}
