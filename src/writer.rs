use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Insist until every byte of `data` has landed on `dest`, then flush.
///
/// Short writes are retried from where they stopped and an interrupted call
/// is simply reissued. Any other error is returned as-is, at which point
/// `dest` holds exactly the bytes accepted by the earlier calls. A writer
/// that accepts nothing yields `WriteZero` instead of spinning.
pub async fn write_all<W>(dest: &mut W, data: &[u8]) -> io::Result<usize>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written = 0;
    while written < data.len() {
        match dest.write(&data[written..]).await {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    dest.flush().await?;
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    use super::*;

    /// Accepts at most `step` bytes per call and breaks after `limit` bytes.
    pub(crate) struct Trickle {
        pub landed: Vec<u8>,
        step: usize,
        limit: Option<usize>,
        interrupt_next: bool,
    }

    impl Trickle {
        pub(crate) fn new(step: usize) -> Self {
            Self {
                landed: Vec::new(),
                step,
                limit: None,
                interrupt_next: false,
            }
        }

        pub(crate) fn breaking_after(mut self, limit: usize) -> Self {
            self.limit = Some(limit);
            self
        }

        pub(crate) fn interrupted_once(mut self) -> Self {
            self.interrupt_next = true;
            self
        }
    }

    impl AsyncWrite for Trickle {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Poll::Ready(Err(io::ErrorKind::Interrupted.into()));
            }
            let room = match self.limit {
                Some(limit) if self.landed.len() >= limit => {
                    return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
                }
                Some(limit) => limit - self.landed.len(),
                None => usize::MAX,
            };
            let n = buf.len().min(self.step).min(room);
            self.landed.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn partial_writes_are_retried_in_order() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut dest = Trickle::new(7);
        let n = write_all(&mut dest, &data).await.unwrap();
        assert_eq!(n, data.len());
        assert_eq!(dest.landed, data);
    }

    #[tokio::test]
    async fn interruption_is_not_an_error() {
        let mut dest = Trickle::new(3).interrupted_once();
        assert_eq!(write_all(&mut dest, b"hello").await.unwrap(), 5);
        assert_eq!(dest.landed, b"hello");
    }

    #[tokio::test]
    async fn hard_error_stops_immediately() {
        let mut dest = Trickle::new(4).breaking_after(10);
        let err = write_all(&mut dest, b"abcdefghijklmnop").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(dest.landed, b"abcdefghij");
    }

    #[tokio::test]
    async fn empty_buffer_writes_nothing() {
        let mut dest = Trickle::new(1);
        assert_eq!(write_all(&mut dest, b"").await.unwrap(), 0);
        assert!(dest.landed.is_empty());
    }
}
