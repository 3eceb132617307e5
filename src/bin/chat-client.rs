use clap::Parser;
use socket_chat::{client, ChatError, InputMode, SessionConfig};
use tokio::io;

#[derive(Parser)]
#[command(about = "Chat with a chat-server over TCP")]
struct Args {
    hostname: String,
    port: u16,
    /// How typed input is sent
    #[arg(long, value_enum, default_value_t)]
    mode: InputMode,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    });
    socket_chat::init_logging();

    let mut stdin = io::stdin();
    let mut stdout = io::stdout();
    let config = SessionConfig::client(args.mode);
    match client::run(&args.hostname, args.port, &mut stdin, &mut stdout, config).await {
        Err(ChatError::Cancelled) => std::process::exit(130),
        res => res?,
    };

    Ok(())
}
