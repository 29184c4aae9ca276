// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! debug {
    ($msg:literal, $($arg:tt)+) => {
        obsseq_log::_log::debug!(target: concat!("obsseq.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        obsseq_log::_log::debug!(target: concat!("obsseq.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        obsseq_log::_log::warn!(target: concat!("obsseq.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        obsseq_log::_log::warn!(target: concat!("obsseq.rust::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if obsseq_log::is_diagnostics_enabled() {
            obsseq_log::_log::info!(
                target: concat!("obsseq.rust::", module_path!()),
                $msg,
                $($arg)+
            );
        }
    };
    ($msg:literal) => {
        if obsseq_log::is_diagnostics_enabled() {
            obsseq_log::_log::info!(target: concat!("obsseq.rust::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// Meant to be called once at program start. No concrete logger is installed here;
/// the embedding application picks one and the macros above feed it through `log`.
/// Only the diagnostics switch (per-walk and per-sync summaries) is owned by this crate.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}
