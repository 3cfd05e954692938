//! OS termination signals.
//!
//! [`InterruptListener`] is installed when the wait cycle starts and lives
//! until teardown ends:
//! - the first signal becomes an interrupt failure;
//! - a signal received during teardown terminates the process with the
//!   signal's default action.
//!
//! Tokio never removes a signal handler once registered. On unix a fallback
//! action is therefore registered next to it: while no listener is alive the
//! fallback runs the default action, so `SIGINT`/`SIGTERM`/`SIGQUIT` keep
//! terminating the process after `run` returns.
//!
//! Other platforms listen for Ctrl-C only.

/// A termination signal observed by an [`InterruptListener`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Received {
    pub(crate) name: &'static str,
    signo: i32,
}

impl Received {
    /// Runs the default action of the signal; exits with `128 + signo` if that returns.
    pub(crate) fn terminate(self) -> ! {
        #[cfg(unix)]
        {
            let _ = signal_hook::low_level::emulate_default_handler(self.signo);
        }
        std::process::exit(128 + self.signo)
    }
}

#[cfg(unix)]
pub(crate) use unix::InterruptListener;

#[cfg(not(unix))]
pub(crate) use other::InterruptListener;

#[cfg(unix)]
mod unix {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
    use tokio::signal::unix::{Signal, SignalKind, signal};

    use super::Received;

    /// Process-wide fallback state shared by every listener.
    struct Fallback {
        /// Set while no listener is alive; arms the default action.
        idle: Option<Arc<AtomicBool>>,
        active: usize,
    }

    static FALLBACK: Mutex<Fallback> = Mutex::new(Fallback {
        idle: None,
        active: 0,
    });

    fn acquire() -> io::Result<()> {
        let mut state = FALLBACK.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = match &state.idle {
            Some(idle) => Arc::clone(idle),
            None => {
                let idle = Arc::new(AtomicBool::new(false));
                for signo in [SIGINT, SIGTERM, SIGQUIT] {
                    signal_hook::flag::register_conditional_default(signo, Arc::clone(&idle))?;
                }
                state.idle = Some(Arc::clone(&idle));
                idle
            }
        };
        idle.store(false, Ordering::SeqCst);
        state.active += 1;
        Ok(())
    }

    fn release() {
        let mut state = FALLBACK.lock().unwrap_or_else(PoisonError::into_inner);
        state.active = state.active.saturating_sub(1);
        if state.active == 0 {
            if let Some(idle) = &state.idle {
                idle.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Listens for `SIGINT`, `SIGTERM` and `SIGQUIT`.
    pub(crate) struct InterruptListener {
        int: Signal,
        term: Signal,
        quit: Signal,
    }

    impl InterruptListener {
        /// Registers the listeners; must be called inside the runtime.
        pub(crate) fn install() -> io::Result<Self> {
            let int = signal(SignalKind::interrupt())?;
            let term = signal(SignalKind::terminate())?;
            let quit = signal(SignalKind::quit())?;
            acquire()?;
            Ok(Self { int, term, quit })
        }

        /// Resolves with the next termination signal.
        pub(crate) async fn recv(&mut self) -> Received {
            tokio::select! {
                _ = self.int.recv() => Received { name: "SIGINT", signo: SIGINT },
                _ = self.term.recv() => Received { name: "SIGTERM", signo: SIGTERM },
                _ = self.quit.recv() => Received { name: "SIGQUIT", signo: SIGQUIT },
            }
        }
    }

    impl Drop for InterruptListener {
        fn drop(&mut self) {
            release();
        }
    }
}

#[cfg(not(unix))]
mod other {
    use std::io;

    use super::Received;

    /// Listens for Ctrl-C.
    pub(crate) struct InterruptListener;

    impl InterruptListener {
        pub(crate) fn install() -> io::Result<Self> {
            Ok(Self)
        }

        pub(crate) async fn recv(&mut self) -> Received {
            match tokio::signal::ctrl_c().await {
                Ok(()) => Received {
                    name: "ctrl-c",
                    signo: 2,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "ctrl-c listener unavailable");
                    std::future::pending().await
                }
            }
        }
    }
}

/// Installs a listener, logging instead of failing when signals are unavailable.
pub(crate) fn listen() -> Option<InterruptListener> {
    match InterruptListener::install() {
        Ok(listener) => Some(listener),
        Err(e) => {
            tracing::warn!(error = %e, "signal listener unavailable");
            None
        }
    }
}

/// Resolves with the next signal, or never without a listener.
pub(crate) async fn next_signal(listener: &mut Option<InterruptListener>) -> Received {
    match listener {
        Some(listener) => listener.recv().await,
        None => std::future::pending().await,
    }
}
