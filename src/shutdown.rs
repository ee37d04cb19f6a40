// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shutdown signal shared by every builder job. Jobs check it before each file
/// read; once raised it is never lowered again.
#[derive(Clone, Default, Debug)]
pub struct ShutdownSignal {
    shutting_down: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Creates a new, lowered, shutdown signal.
    pub fn new() -> ShutdownSignal {
        ShutdownSignal::default()
    }

    /// Raises the signal.
    pub fn shut_down(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    /// Returns true once the signal has been raised.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;

    #[test]
    fn test_shutdown_visible_across_threads() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutting_down());

        let join = {
            let signal = signal.clone();
            thread::spawn(move || signal.shut_down())
        };

        assert!(join.join().is_ok());
        assert!(signal.is_shutting_down());
    }

    #[test]
    fn test_shutdown_is_sticky() {
        let signal = ShutdownSignal::new();
        signal.shut_down();
        signal.shut_down();
        assert!(signal.clone().is_shutting_down());
    }
}
