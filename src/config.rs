use clap::ValueEnum;

/// Port the server binds to when none is given.
pub const TCP_PORT: u16 = 35001;

/// Pending-connection queue length for the listening socket.
pub const TCP_BACKLOG: u32 = 5;

/// First thing a client says after connecting.
pub const GREETING: &str = "Hello there!";

/// Size of a single socket or input read.
pub const TRANSFER_CAPACITY: usize = 100;

/// Longest line the character-mode editor will hold.
pub const LINE_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// How local input is turned into outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputMode {
    /// Forward each read of local input verbatim, no line framing.
    Chunked,
    /// Edit locally one character at a time, send whole NUL-terminated lines.
    #[default]
    Line,
}

/// What a session does once its local input reaches end of stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEof {
    /// Stop watching local input, keep displaying the peer.
    Ignore,
    /// Also shut down our write side so the peer sees end of stream.
    HalfClose,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub role: Role,
    pub mode: InputMode,
    /// Switch the controlling terminal to raw-line mode for the session.
    pub raw_terminal: bool,
    pub on_input_eof: InputEof,
    /// End the session on Ctrl-C instead of letting SIGINT kill the process.
    pub catch_interrupt: bool,
}

impl SessionConfig {
    pub fn client(mode: InputMode) -> Self {
        Self {
            role: Role::Client,
            mode,
            raw_terminal: mode == InputMode::Line,
            on_input_eof: InputEof::HalfClose,
            catch_interrupt: true,
        }
    }

    pub fn server(mode: InputMode) -> Self {
        Self {
            role: Role::Server,
            mode,
            raw_terminal: mode == InputMode::Line,
            on_input_eof: InputEof::Ignore,
            catch_interrupt: true,
        }
    }

    /// Same settings without touching the real terminal or signals.
    pub fn detached(mut self) -> Self {
        self.raw_terminal = false;
        self.catch_interrupt = false;
        self
    }
}
