//! One-time snapshot of standard input.
//!
//! Stdin is probed and read at most once per process. The probe classifies
//! the descriptor, then reads it to the end: immediately for regular files
//! and pipes, or with a short bounded wait for sockets and anything else
//! where data may never arrive. Consumers only see the resolved
//! [`StdinState`].

use std::io::{self, IsTerminal, Read};
use std::sync::{OnceLock, mpsc};
use std::thread;
use std::time::Duration;

/// Bounded wait for descriptors that may never produce data.
pub const SOCKET_WAIT: Duration = Duration::from_millis(50);
/// Bounded wait when the platform cannot tell what stdin is.
pub const UNKNOWN_WAIT: Duration = Duration::from_millis(100);

/// What stdin was found to be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Terminal,
    File,
    Fifo,
    Socket,
    Other,
    Unknown,
}

impl DescriptorKind {
    /// `None` means read until end of input without a deadline.
    pub fn wait_delay(&self) -> Option<Duration> {
        match self {
            Self::Terminal | Self::File | Self::Fifo => None,
            Self::Socket | Self::Other => Some(SOCKET_WAIT),
            Self::Unknown => Some(UNKNOWN_WAIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinState {
    Interactive,
    PipedWithData(Vec<u8>),
    PipedEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdinSnapshot {
    state: StdinState,
    wait_delay: Option<Duration>,
}

static GLOBAL: OnceLock<StdinSnapshot> = OnceLock::new();

impl StdinSnapshot {
    /// The process-wide snapshot; the first call probes and reads stdin.
    pub fn global() -> &'static StdinSnapshot {
        GLOBAL.get_or_init(|| {
            let kind = classify(&io::stdin());
            Self::probe(kind, io::stdin())
        })
    }

    /// Resolve a snapshot from a classified reader.
    pub fn probe<R>(kind: DescriptorKind, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let wait_delay = kind.wait_delay();
        if kind == DescriptorKind::Terminal {
            tracing::debug!("stdin is a terminal");
            return Self::interactive();
        }

        let state = match read_bounded(reader, wait_delay) {
            Ok(Some(bytes)) if !bytes.is_empty() => StdinState::PipedWithData(bytes),
            Ok(_) => StdinState::PipedEmpty,
            Err(err) => {
                tracing::debug!(error = %err, "failed to read stdin");
                StdinState::PipedEmpty
            }
        };
        let bytes = match &state {
            StdinState::PipedWithData(b) => b.len(),
            _ => 0,
        };
        tracing::debug!(?kind, ?wait_delay, bytes, "stdin probed");

        Self { state, wait_delay }
    }

    pub fn interactive() -> Self {
        Self {
            state: StdinState::Interactive,
            wait_delay: None,
        }
    }

    pub fn piped(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let state = if bytes.is_empty() {
            StdinState::PipedEmpty
        } else {
            StdinState::PipedWithData(bytes)
        };
        Self {
            state,
            wait_delay: None,
        }
    }

    pub fn state(&self) -> &StdinState {
        &self.state
    }

    pub fn is_interactive(&self) -> bool {
        self.state == StdinState::Interactive
    }

    pub fn has_data(&self) -> bool {
        matches!(self.state, StdinState::PipedWithData(_))
    }

    pub fn wait_delay(&self) -> Option<Duration> {
        self.wait_delay
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.state {
            StdinState::PipedWithData(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    /// Stdin content as text, invalid UTF-8 replaced.
    pub fn text(&self) -> Option<String> {
        self.data()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

fn read_bounded<R>(mut reader: R, wait: Option<Duration>) -> io::Result<Option<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let Some(wait) = wait else {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        return Ok(Some(buf));
    };

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-probe".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            let result = reader.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        })?;

    match rx.recv_timeout(wait) {
        Ok(result) => result.map(Some),
        Err(_) => {
            tracing::debug!(?wait, "no stdin data before deadline");
            Ok(None)
        }
    }
}

#[cfg(unix)]
fn classify(stdin: &io::Stdin) -> DescriptorKind {
    use std::os::fd::AsFd;
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    const S_IFMT: u32 = 0o170000;
    const S_IFIFO: u32 = 0o010000;

    if stdin.is_terminal() {
        return DescriptorKind::Terminal;
    }
    let Ok(fd) = stdin.as_fd().try_clone_to_owned() else {
        return DescriptorKind::Unknown;
    };
    let Ok(meta) = std::fs::File::from(fd).metadata() else {
        return DescriptorKind::Unknown;
    };

    let file_type = meta.file_type();
    if file_type.is_file() {
        DescriptorKind::File
    } else if file_type.is_fifo() || meta.mode() & S_IFMT == S_IFIFO {
        DescriptorKind::Fifo
    } else if file_type.is_socket() {
        DescriptorKind::Socket
    } else {
        DescriptorKind::Other
    }
}

#[cfg(windows)]
fn classify(stdin: &io::Stdin) -> DescriptorKind {
    use std::os::windows::io::AsHandle;

    if stdin.is_terminal() {
        return DescriptorKind::Terminal;
    }
    let Ok(handle) = stdin.as_handle().try_clone_to_owned() else {
        return DescriptorKind::Unknown;
    };
    // Pipes are not reported as such here, so only files get an unbounded read.
    match std::fs::File::from(handle).metadata() {
        Ok(meta) if meta.is_file() => DescriptorKind::File,
        _ => DescriptorKind::Unknown,
    }
}

#[cfg(not(any(unix, windows)))]
fn classify(stdin: &io::Stdin) -> DescriptorKind {
    if stdin.is_terminal() {
        DescriptorKind::Terminal
    } else {
        DescriptorKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct NeverEnds;

    impl Read for NeverEnds {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            thread::sleep(Duration::from_secs(5));
            Ok(0)
        }
    }

    #[test]
    fn terminal_is_interactive_without_reading() {
        let snapshot = StdinSnapshot::probe(DescriptorKind::Terminal, NeverEnds);
        assert!(snapshot.is_interactive());
        assert!(!snapshot.has_data());
    }

    #[test]
    fn pipe_with_content_has_data() {
        let snapshot = StdinSnapshot::probe(DescriptorKind::Fifo, Cursor::new(b"{\"a\":1}".to_vec()));
        assert_eq!(snapshot.text().as_deref(), Some("{\"a\":1}"));
        assert_eq!(snapshot.wait_delay(), None);
    }

    #[test]
    fn empty_file_is_piped_empty() {
        let snapshot = StdinSnapshot::probe(DescriptorKind::File, Cursor::new(Vec::new()));
        assert_eq!(snapshot.state(), &StdinState::PipedEmpty);
    }

    #[test]
    fn socket_read_is_bounded() {
        let started = std::time::Instant::now();
        let snapshot = StdinSnapshot::probe(DescriptorKind::Socket, NeverEnds);
        assert_eq!(snapshot.state(), &StdinState::PipedEmpty);
        assert_eq!(snapshot.wait_delay(), Some(SOCKET_WAIT));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn socket_with_ready_data_is_read() {
        let snapshot = StdinSnapshot::probe(DescriptorKind::Socket, Cursor::new(b"x".to_vec()));
        assert_eq!(snapshot.data(), Some(&b"x"[..]));
    }
}
