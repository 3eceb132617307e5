//! The duplex loop at the heart of both programs.
//!
//! A [`Session`] watches the connection and the local input at the same
//! time. Whichever becomes readable first is serviced: peer bytes go to the
//! local display (uppercased on the server), local input goes through the
//! [`Assembler`] and out to the peer. The loop ends when the peer closes its
//! side, or on the first error.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    config::{InputEof, Role, SessionConfig, LINE_CAPACITY, TRANSFER_CAPACITY},
    error::{ChatError, Result},
    interrupt::Interrupt,
    line::Assembler,
    terminal::RawLineMode,
    transform::to_uppercase_inplace,
    writer::write_all,
};

/// Outcome of one readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ready {
    /// The connection produced this many bytes; zero means the peer closed.
    Socket(usize),
    /// Local input produced this many bytes; zero means end of input.
    Input(usize),
    /// A read was interrupted before producing anything.
    Interrupted,
    /// The local user hit Ctrl-C.
    Stop,
}

/// What a finished session did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Bytes received from the peer.
    pub received: usize,
    /// Bytes sent to the peer.
    pub sent: usize,
    pub input_closed: bool,
    pub half_closed: bool,
}

pub struct Session<'a, I: ?Sized, O: ?Sized> {
    input: &'a mut I,
    output: &'a mut O,
    config: SessionConfig,
    assembler: Assembler,
    socket_buf: [u8; TRANSFER_CAPACITY],
    input_buf: [u8; TRANSFER_CAPACITY],
    input_open: bool,
    interrupt: Option<&'a mut Interrupt>,
    report: SessionReport,
}

impl<'a, I, O> Session<'a, I, O>
where
    I: AsyncRead + Unpin + ?Sized,
    O: AsyncWrite + Unpin + ?Sized,
{
    /// Every session starts from an empty line, never from leftovers of a
    /// previous connection.
    pub fn new(input: &'a mut I, output: &'a mut O, config: SessionConfig) -> Self {
        Self {
            input,
            output,
            config,
            assembler: Assembler::new(config.mode, LINE_CAPACITY),
            socket_buf: [0; TRANSFER_CAPACITY],
            input_buf: [0; TRANSFER_CAPACITY],
            input_open: true,
            interrupt: None,
            report: SessionReport::default(),
        }
    }

    /// Also end the session, with [`ChatError::Cancelled`], when `interrupt`
    /// fires.
    pub fn interruptible(mut self, interrupt: &'a mut Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Run until the peer closes the connection.
    ///
    /// The terminal, if this session put it in raw-line mode, is restored on
    /// every way out of here.
    pub async fn run<S>(mut self, conn: &mut S) -> Result<SessionReport>
    where
        S: AsyncRead + AsyncWrite + Unpin + ?Sized,
    {
        let _terminal = if self.config.raw_terminal {
            RawLineMode::enter(libc::STDIN_FILENO)
                .map_err(|e| ChatError::io("configure terminal", e))?
        } else {
            None
        };

        loop {
            match self.wait(conn).await? {
                Ready::Interrupted => continue,
                Ready::Stop => {
                    log::info!("Interrupted by user");
                    return Err(ChatError::Cancelled);
                }
                Ready::Socket(0) => {
                    log::info!("Peer went away");
                    return Ok(self.report);
                }
                Ready::Socket(n) => self.display(n).await?,
                Ready::Input(0) => self.close_input(conn).await?,
                Ready::Input(n) => self.forward(n, conn).await?,
            }
        }
    }

    /// Block until the connection or the local input has something.
    ///
    /// When both are ready the connection wins; the input is picked up on
    /// the next pass since readiness is re-evaluated every time.
    async fn wait<S>(&mut self, conn: &mut S) -> Result<Ready>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        let Self {
            input,
            socket_buf,
            input_buf,
            input_open,
            interrupt,
            ..
        } = self;

        tokio::select! {
            biased;
            () = stopped(interrupt) => Ok(Ready::Stop),
            res = conn.read(&mut socket_buf[..]) => {
                readiness(res, Ready::Socket, "read from remote peer")
            }
            res = input.read(&mut input_buf[..]), if *input_open => {
                readiness(res, Ready::Input, "read from local input")
            }
        }
    }

    async fn display(&mut self, n: usize) -> Result<()> {
        let data = &mut self.socket_buf[..n];
        if self.config.role == Role::Server {
            to_uppercase_inplace(data);
        }
        write_all(&mut *self.output, data)
            .await
            .map_err(|e| ChatError::io("write to standard output", e))?;
        self.report.received += n;

        // Put back whatever the user was in the middle of typing.
        let pending = self.assembler.pending();
        if !pending.is_empty() {
            write_all(&mut *self.output, pending)
                .await
                .map_err(|e| ChatError::io("write to standard output", e))?;
        }
        Ok(())
    }

    async fn forward<S>(&mut self, n: usize, conn: &mut S) -> Result<()>
    where
        S: AsyncWrite + Unpin + ?Sized,
    {
        let mut echo = BytesMut::new();
        let mut outgoing = Vec::new();
        self.assembler.ingest(&self.input_buf[..n], &mut echo, &mut outgoing);

        if !echo.is_empty() {
            write_all(&mut *self.output, &echo)
                .await
                .map_err(|e| ChatError::io("write to standard output", e))?;
        }
        for message in outgoing {
            self.report.sent += write_all(conn, &message)
                .await
                .map_err(|e| ChatError::io("write to remote peer", e))?;
        }
        Ok(())
    }

    async fn close_input<S>(&mut self, conn: &mut S) -> Result<()>
    where
        S: AsyncWrite + Unpin + ?Sized,
    {
        self.input_open = false;
        self.report.input_closed = true;
        if !self.assembler.pending().is_empty() {
            log::debug!("discarding unfinished line at end of input");
        }
        log::info!("Local input closed");

        if self.config.on_input_eof == InputEof::HalfClose {
            conn.shutdown()
                .await
                .map_err(|e| ChatError::io("shutdown", e))?;
            self.report.half_closed = true;
        }
        Ok(())
    }
}

async fn stopped(interrupt: &mut Option<&mut Interrupt>) {
    match interrupt {
        Some(interrupt) => interrupt.recv().await,
        None => std::future::pending().await,
    }
}

fn readiness(
    res: io::Result<usize>,
    ready: fn(usize) -> Ready,
    op: &'static str,
) -> Result<Ready> {
    match res {
        Ok(n) => Ok(ready(n)),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Ready::Interrupted),
        Err(e) => Err(ChatError::io(op, e)),
    }
}
