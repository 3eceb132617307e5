use std::io;

use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};

use crate::{
    config::{SessionConfig, GREETING},
    error::{ChatError, Result},
    interrupt::Interrupt,
    net,
    session::{Session, SessionReport},
    writer::write_all,
};

/// Connect, say hello, chat until the server hangs up, then half-close.
///
/// The half-close is attempted even when the session failed, so the server
/// always gets to see end of stream.
pub async fn run<I, O>(
    host: &str,
    port: u16,
    input: &mut I,
    output: &mut O,
    config: SessionConfig,
) -> Result<SessionReport>
where
    I: AsyncRead + Unpin + ?Sized,
    O: AsyncWrite + Unpin + ?Sized,
{
    let mut stream = net::connect(host, port).await?;
    greet(&mut stream, output).await?;

    let mut interrupt = Interrupt::new(config.catch_interrupt)?;
    let outcome = Session::new(input, output, config)
        .interruptible(&mut interrupt)
        .run(&mut stream)
        .await;
    match outcome {
        Ok(report) => {
            if !report.half_closed {
                half_close(&mut stream).await?;
            }
            log::info!("Done.");
            Ok(report)
        }
        Err(err) => {
            if let Err(e) = half_close(&mut stream).await {
                log::warn!("{e}");
            }
            Err(err)
        }
    }
}

async fn greet<O>(stream: &mut TcpStream, output: &mut O) -> Result<()>
where
    O: AsyncWrite + Unpin + ?Sized,
{
    write_all(stream, GREETING.as_bytes())
        .await
        .map_err(|e| ChatError::io("write greeting", e))?;

    let banner = format!("I said:\n{GREETING}\nRemote says:\n");
    write_all(output, banner.as_bytes())
        .await
        .map_err(|e| ChatError::io("write to standard output", e))?;
    Ok(())
}

async fn half_close(stream: &mut TcpStream) -> Result<()> {
    match stream.shutdown().await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotConnected => {
            log::debug!("connection already closed, skipping shutdown");
            Ok(())
        }
        Err(e) => Err(ChatError::io("shutdown", e)),
    }
}
