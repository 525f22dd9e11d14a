use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Demo server greeting JSON and query-string clients alike.
#[derive(Parser, Debug)]
#[command(name = "formjson")]
struct Opt {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let opt = Opt::parse();
    init_tracing();

    let addr = format!("{}:{}", opt.host, opt.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    formjson::run(listener).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
