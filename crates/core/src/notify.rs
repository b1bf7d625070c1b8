//! Run-completion notifications.

/// Receives a human-readable message when a scrape run finishes.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Console stream a [`ConsoleNotifier`] writes to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Prints notifications to a console stream, stdout unless told otherwise.
///
/// Callers that reserve stdout for machine-readable output use
/// [`ConsoleNotifier::stderr`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier {
    stream: ConsoleStream,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self { stream: ConsoleStream::Stdout }
    }

    pub fn stderr() -> Self {
        Self { stream: ConsoleStream::Stderr }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(message, stream = ?self.stream, "notification");
        match self.stream {
            ConsoleStream::Stdout => println!("{message}"),
            ConsoleStream::Stderr => eprintln!("{message}"),
        }
    }
}
