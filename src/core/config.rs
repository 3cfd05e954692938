//! # Orchestrator configuration.
//!
//! Provides [`Config`], centralized settings for a
//! [`TaskOrchestrator`](crate::TaskOrchestrator).

/// Runtime configuration for the orchestrator.
///
/// ## Field semantics
/// - `handle_signals`: route SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere) into an
///   interrupt failure that tears the loop down
/// - `escalate_panics`: a panicking task escapes as a panic failure instead of
///   only being logged
/// - `warn_on_empty`: log a warning when `run` starts with no task
/// - `thread_name`: name given to the runtime's threads
///
/// ## Notes
/// All fields are public; start from [`Config::default`] and override.
#[derive(Clone, Debug)]
pub struct Config {
    /// Listen for OS termination signals while the wait cycle runs.
    ///
    /// The listener is installed when the wait cycle starts and kept until
    /// teardown ends; a second signal during teardown terminates the process.
    /// The underlying OS handler stays installed for the life of the process:
    /// once no orchestrator is listening, it runs the signal's default action,
    /// so the process can still be interrupted after `run` returns.
    pub handle_signals: bool,

    /// Treat task panics as escaped failures of category
    /// [`FailureCategory::Panic`](crate::FailureCategory::Panic).
    pub escalate_panics: bool,

    /// Warn when `run` is called with zero tasks.
    pub warn_on_empty: bool,

    /// Name for threads spawned by the owned runtime (blocking pool).
    pub thread_name: String,
}

impl Config {
    /// Configuration suited to embedding: no OS signal listener.
    pub fn without_signals() -> Self {
        Self {
            handle_signals: false,
            ..Self::default()
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `handle_signals = true`
    /// - `escalate_panics = false`
    /// - `warn_on_empty = true`
    /// - `thread_name = "taskloop"`
    fn default() -> Self {
        Self {
            handle_signals: true,
            escalate_panics: false,
            warn_on_empty: true,
            thread_name: "taskloop".to_string(),
        }
    }
}
