//! Keeps the interpreter alive across Ctrl-C and Ctrl-Z.

use nix::libc;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use std::os::fd::BorrowedFd;
use tracing::warn;

/// Signals the interpreter survives.
pub const SUPPRESSED: [Signal; 2] = [Signal::SIGINT, Signal::SIGTSTP];

extern "C" fn emit_newline(_signal: libc::c_int) {
    // SAFETY: fd 1 stays open for the lifetime of the process.
    let stdout = unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) };
    let _ = nix::unistd::write(stdout, b"\n");
}

/// Installs the newline-printing handler for [`SUPPRESSED`].
///
/// Call once at startup, from the interpreter process only. Children get
/// default dispositions back when their program image is replaced.
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(emit_newline),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in SUPPRESSED {
        // SAFETY: the handler only calls write(2), which is async-signal-safe.
        unsafe { sigaction(signal, &action) }.inspect_err(|e| {
            warn!(?signal, error = %e, "failed to install signal handler");
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test]
    fn test_install_replaces_default_disposition() {
        install().unwrap();

        let probe = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        for signal in SUPPRESSED {
            // SAFETY: restores the same handler right after inspecting it.
            let previous = unsafe { sigaction(signal, &probe) }.unwrap();
            assert!(matches!(previous.handler(), SigHandler::Handler(_)));
            unsafe { sigaction(signal, &previous) }.unwrap();
        }
    }

    #[test]
    fn test_interrupt_does_not_terminate() {
        install().unwrap();
        raise(Signal::SIGINT).unwrap();
        // still running
    }
}
