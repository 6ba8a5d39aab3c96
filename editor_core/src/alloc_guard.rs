//! Bounded-retry allocation for core structures
//!
//! The cell arena and clipboard grow through [`reserve_or_abort`]. A failed
//! reservation is retried a few times; if it still fails the process is
//! aborted through [`handle_alloc_error`]. The editor never continues with a
//! partially built cell chain.

use alloc::alloc::{handle_alloc_error, Layout};
use alloc::vec::Vec;

/// Retries before giving up on an allocation
pub const DEFAULT_ALLOC_RETRIES: u32 = 5;

/// Make room for `additional` more elements in `vec`.
///
/// Diverges (aborts) if the reservation fails `retries + 1` times in a row.
pub fn reserve_or_abort<T>(vec: &mut Vec<T>, additional: usize, retries: u32) {
    if vec.capacity() - vec.len() >= additional {
        return;
    }

    for attempt in 0..=retries {
        match vec.try_reserve(additional) {
            Ok(()) => return,
            Err(err) => {
                log::warn!(
                    "allocation attempt {}/{} failed: {}",
                    attempt + 1,
                    retries + 1,
                    err
                );
            }
        }
    }

    log::error!(
        "allocation of {} more elements failed after {} retries, aborting",
        additional,
        retries
    );
    let layout = Layout::array::<T>(vec.len().saturating_add(additional))
        .unwrap_or_else(|_| Layout::new::<T>());
    handle_alloc_error(layout)
}
