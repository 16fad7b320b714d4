use clap::Parser;
use dotenvy::dotenv;
use roost::fetch::HttpFetcher;
use roost::observability;
use roost::server::{ListenAddr, Server};
use roost::store::{self, Store};
use std::env;
use std::io;
use std::sync::Arc;

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address: tcp://HOST:PORT or file:///absolute/socket/path
    #[clap(long)]
    addr: Option<String>,
    /// Path to the SQLite database file
    #[clap(long)]
    db: Option<String>,
}

fn main() -> io::Result<()> {
    dotenv().ok();
    observability::init_logging();

    let args = Args::parse();
    let config = load_config(args);

    let addr: ListenAddr = config
        .addr
        .parse()
        .map_err(|e: String| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = store::init_pool(&config.db)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    tracing::info!("Running database migrations");
    let mut conn = pool.get().expect("Failed to get database connection");
    store::run_migrations(&mut conn).expect("Failed to run migrations");
    drop(conn);

    let store = Store::new(pool, Arc::new(HttpFetcher::new()));
    run_server(store, addr)
}

struct AppConfig {
    addr: String,
    db: String,
}

fn load_config(args: Args) -> AppConfig {
    let addr = match args.addr.or_else(|| env::var("ROOST_ADDR").ok()) {
        Some(addr) => addr,
        None => {
            log::info!("Using default listen address: tcp://127.0.0.1:7580");
            "tcp://127.0.0.1:7580".to_string()
        }
    };
    let db = match args.db.or_else(|| env::var("ROOST_DATABASE_URL").ok()) {
        Some(db) => {
            log::info!("Using database path from ROOST_DATABASE_URL: {}", db);
            db
        }
        None => {
            let mut path = env::current_dir().expect("Failed to get current directory");
            path.push("roost.db");
            let res = path.to_string_lossy().to_string();
            log::info!("Using default database path: {}", res);
            res
        }
    };

    AppConfig { addr, db }
}

#[actix_web::main]
async fn run_server(store: Store, addr: ListenAddr) -> io::Result<()> {
    tracing::info!("Starting server at {:?}", addr);
    let server = Server::bind(store, &addr)?;
    server.run().await
}
