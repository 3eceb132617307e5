//! Ctrl-C as an ordinary event.
//!
//! Raw-line mode keeps `ISIG`, so Ctrl-C still raises SIGINT. Catching it
//! here lets the session return normally and the terminal guard run, instead
//! of the process dying with the terminal left in raw mode.

use std::future;

use tokio::signal::unix::{signal, Signal, SignalKind};

use crate::error::{ChatError, Result};

pub struct Interrupt {
    signal: Option<Signal>,
}

impl Interrupt {
    /// Start catching SIGINT. From here on the default handler is gone for
    /// the rest of the process.
    pub fn listen() -> Result<Self> {
        let signal = signal(SignalKind::interrupt())
            .map_err(|e| ChatError::io("install SIGINT handler", e))?;
        Ok(Self {
            signal: Some(signal),
        })
    }

    /// Never fires.
    pub fn disabled() -> Self {
        Self { signal: None }
    }

    pub fn new(enabled: bool) -> Result<Self> {
        if enabled {
            Self::listen()
        } else {
            Ok(Self::disabled())
        }
    }

    /// Resolve on the next SIGINT delivered after `listen`.
    pub async fn recv(&mut self) {
        match &mut self.signal {
            Some(signal) => {
                signal.recv().await;
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn disabled_never_fires() {
        let mut interrupt = Interrupt::new(false).unwrap();
        let fired = tokio::time::timeout(Duration::from_millis(20), interrupt.recv()).await;
        assert!(fired.is_err());
    }
}
