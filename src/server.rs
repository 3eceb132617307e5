use std::net::SocketAddr;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};

use crate::{
    config::SessionConfig,
    error::{ChatError, Result},
    interrupt::Interrupt,
    net,
    session::{Session, SessionReport},
};

/// A listening socket that chats with one client at a time.
pub struct Server {
    listener: TcpListener,
    config: SessionConfig,
    interrupt: Interrupt,
}

impl Server {
    pub fn bind(port: u16, backlog: u32, config: SessionConfig) -> Result<Self> {
        let listener = net::listen(port, backlog)?;
        let interrupt = Interrupt::new(config.catch_interrupt)?;
        Ok(Self {
            listener,
            config,
            interrupt,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| ChatError::connect("getsockname", e))
    }

    /// Accept the next client and chat with it until it leaves.
    ///
    /// A failed accept or a Ctrl-C is returned as an error. Any other session
    /// failure is only logged and yields `None`: that client is dropped and
    /// the server can carry on with the next one.
    pub async fn serve_one<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
    ) -> Result<Option<SessionReport>>
    where
        I: AsyncRead + Unpin + ?Sized,
        O: AsyncWrite + Unpin + ?Sized,
    {
        let (mut stream, peer) = tokio::select! {
            biased;
            () = self.interrupt.recv() => return Err(ChatError::Cancelled),
            accepted = net::accept(&self.listener) => accepted?,
        };

        let outcome = Session::new(input, output, self.config)
            .interruptible(&mut self.interrupt)
            .run(&mut stream)
            .await;
        drop(stream);
        log::debug!("closed connection to {peer}");

        match outcome {
            Ok(report) => {
                log::debug!("session with {peer} ended: {report:?}");
                Ok(Some(report))
            }
            Err(ChatError::Cancelled) => Err(ChatError::Cancelled),
            Err(err) => {
                log::error!("session with {peer} aborted: {:#}", anyhow::Error::from(err));
                Ok(None)
            }
        }
    }

    /// Serve clients back to back until interrupted.
    pub async fn serve<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<()>
    where
        I: AsyncRead + Unpin + ?Sized,
        O: AsyncWrite + Unpin + ?Sized,
    {
        loop {
            self.serve_one(input, output).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{mem::MaybeUninit, ptr};

    #[test]
    fn broken_pipe_does_not_kill_the_process() {
        // The Rust runtime ignores SIGPIPE before main; a vanished client
        // surfaces as an EPIPE write error on that session only.
        let mut current = MaybeUninit::<libc::sigaction>::uninit();
        let rc = unsafe { libc::sigaction(libc::SIGPIPE, ptr::null(), current.as_mut_ptr()) };
        assert_eq!(rc, 0);
        let current = unsafe { current.assume_init() };
        assert_eq!(current.sa_sigaction, libc::SIG_IGN);
    }
}
