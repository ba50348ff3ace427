//! Shutdown on SIGINT, SIGTERM and SIGQUIT
//!
//! The handler does nothing but store into a static flag. It is installed
//! without `SA_RESTART`, so a pending `poll` returns `EINTR` and the loop
//! notices the flag right away instead of after the next timeout.

use std::io;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

const STOP_SIGNALS: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGQUIT];

extern "C" fn request_stop(_signal: libc::c_int) {
    STOP_REQUESTED.store(true, Ordering::Relaxed);
}

/// Install the stop handlers and return the flag they set
pub fn install_stop_handlers() -> io::Result<&'static AtomicBool> {
    for signal in STOP_SIGNALS {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = request_stop as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);

            if libc::sigaction(signal, &action, ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    tracing::debug!(signals = ?STOP_SIGNALS, "Installed stop handlers");
    Ok(&STOP_REQUESTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_sets_flag() {
        let flag = install_stop_handlers().unwrap();
        assert!(!flag.load(Ordering::Relaxed));

        unsafe {
            libc::raise(libc::SIGQUIT);
        }

        assert!(flag.load(Ordering::Relaxed));
    }
}
