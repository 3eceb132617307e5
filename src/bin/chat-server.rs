use clap::Parser;
use socket_chat::{
    config::{TCP_BACKLOG, TCP_PORT},
    ChatError, InputMode, Server, SessionConfig,
};
use tokio::io;

#[derive(Parser)]
#[command(about = "Accept chat clients one at a time and shout back what they say")]
struct Args {
    #[arg(long, env = "CHAT_PORT", default_value_t = TCP_PORT)]
    port: u16,
    /// Pending connections the listening socket will queue
    #[arg(long, env = "CHAT_BACKLOG", default_value_t = TCP_BACKLOG)]
    backlog: u32,
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

    let mut server = Server::bind(args.port, args.backlog, SessionConfig::server(args.mode))?;

    let mut stdin = io::stdin();
    let mut stdout = io::stdout();
    match server.serve(&mut stdin, &mut stdout).await {
        // The terminal has already been restored by the time we get here.
        Err(ChatError::Cancelled) => std::process::exit(130),
        res => res?,
    }

    Ok(())
}
