//! Deferred handling of asynchronous signals.
//!
//! While colored output is being written, a signal arriving in the middle of
//! an escape sequence would leave the terminal in the wrong color. The
//! handlers installed here only record the signal; the session polls
//! [`SignalMonitor::take_pending`] between writes, resets the color and then
//! lets the signal take its default effect.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

static INTERRUPT_SIGNAL: AtomicI32 = AtomicI32::new(0);
static STOP_SIGNAL_COUNT: AtomicUsize = AtomicUsize::new(0);

/// A recorded signal waiting to be acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSignal {
    /// Terminal stop request; the process suspends itself.
    Stop,
    /// Any other handled signal; the process dies from it.
    Terminate(i32),
}

/// Owns the installed handlers and restores the previous dispositions when
/// dropped.
#[derive(Debug, Default)]
pub struct SignalMonitor {
    active: bool,
    #[cfg(unix)]
    previous: Vec<(libc::c_int, libc::sighandler_t)>,
}

impl SignalMonitor {
    /// A monitor with no handlers installed; it never reports a signal.
    pub fn inactive() -> Self {
        SignalMonitor::default()
    }

    /// Consume the oldest recorded signal, if any.
    pub fn take_pending(&self) -> Option<PendingSignal> {
        if !self.active {
            return None;
        }

        let stops = STOP_SIGNAL_COUNT.load(Ordering::SeqCst);
        if stops > 0
            && STOP_SIGNAL_COUNT
                .compare_exchange(stops, stops - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Some(PendingSignal::Stop);
        }

        match INTERRUPT_SIGNAL.swap(0, Ordering::SeqCst) {
            0 => None,
            sig => Some(PendingSignal::Terminate(sig)),
        }
    }
}

#[cfg(unix)]
mod unix {
    use super::{INTERRUPT_SIGNAL, PendingSignal, STOP_SIGNAL_COUNT, SignalMonitor};
    use std::sync::atomic::Ordering;

    const TERMINATING_SIGNALS: [libc::c_int; 11] = [
        libc::SIGALRM,
        libc::SIGHUP,
        libc::SIGINT,
        libc::SIGPIPE,
        libc::SIGQUIT,
        libc::SIGTERM,
        libc::SIGIO,
        libc::SIGPROF,
        libc::SIGVTALRM,
        libc::SIGXCPU,
        libc::SIGXFSZ,
    ];

    extern "C" fn record_interrupt(sig: libc::c_int) {
        // Keep the first signal if several arrive before the next poll.
        let _ = INTERRUPT_SIGNAL.compare_exchange(0, sig, Ordering::SeqCst, Ordering::SeqCst);
    }

    extern "C" fn record_stop(_sig: libc::c_int) {
        STOP_SIGNAL_COUNT.fetch_add(1, Ordering::SeqCst);
    }

    impl SignalMonitor {
        /// Install recording handlers for terminal stop and the terminating
        /// signals. Signals the process inherited as ignored stay ignored.
        pub fn install() -> Self {
            let mut previous = Vec::new();
            let handlers = std::iter::once((libc::SIGTSTP, record_stop as extern "C" fn(libc::c_int)))
                .chain(TERMINATING_SIGNALS.iter().map(|&sig| (sig, record_interrupt as extern "C" fn(libc::c_int))));

            for (sig, handler) in handlers {
                // SAFETY: the handlers only touch atomics, which is
                // async-signal-safe.
                unsafe {
                    let prev = libc::signal(sig, libc::SIG_IGN);
                    if prev == libc::SIG_ERR || prev == libc::SIG_IGN {
                        continue;
                    }
                    libc::signal(sig, handler as libc::sighandler_t);
                    previous.push((sig, prev));
                }
            }

            tracing::trace!(installed = previous.len(), "installed signal handlers");
            SignalMonitor {
                active: true,
                previous,
            }
        }
    }

    impl Drop for SignalMonitor {
        fn drop(&mut self) {
            for &(sig, prev) in &self.previous {
                // SAFETY: restores a disposition previously returned by signal().
                unsafe {
                    libc::signal(sig, prev);
                }
            }
        }
    }

    impl PendingSignal {
        /// Let the signal take effect: suspend on a stop, otherwise restore
        /// the default disposition and die from the signal.
        pub fn deliver(self) {
            // SAFETY: plain libc calls on valid signal numbers.
            unsafe {
                match self {
                    PendingSignal::Stop => {
                        libc::raise(libc::SIGSTOP);
                    }
                    PendingSignal::Terminate(sig) => {
                        libc::signal(sig, libc::SIG_DFL);
                        libc::raise(sig);
                    }
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl SignalMonitor {
    pub fn install() -> Self {
        SignalMonitor::default()
    }
}

#[cfg(not(unix))]
impl PendingSignal {
    pub fn deliver(self) {}
}
