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
//! Routing of host notifications to registered handlers.

use std::collections::HashMap;

use tracing::debug;

/// Notifications the host audio system broadcasts to its implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemNotification {
    LoseFocus,
    GetFocus,
    MuteAll,
    UnmuteAll,
    Refresh,
}

impl SystemNotification {
    pub const ALL: [SystemNotification; 5] = [
        SystemNotification::LoseFocus,
        SystemNotification::GetFocus,
        SystemNotification::MuteAll,
        SystemNotification::UnmuteAll,
        SystemNotification::Refresh,
    ];
}

/// Identifies a registered handler so it can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn Fn(SystemNotification) + Send + Sync>;

/// A table of handlers per notification.
#[derive(Default)]
pub struct NotificationDispatcher {
    handlers: HashMap<SystemNotification, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl NotificationDispatcher {
    pub fn new() -> NotificationDispatcher {
        NotificationDispatcher::default()
    }

    /// Registers a handler for one notification.
    pub fn register<F>(&mut self, notification: SystemNotification, handler: F) -> HandlerId
    where
        F: Fn(SystemNotification) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(notification)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        for handlers in self.handlers.values_mut() {
            let before = handlers.len();
            handlers.retain(|(handler_id, _)| *handler_id != id);
            removed |= handlers.len() != before;
        }
        removed
    }

    /// Calls every handler of a notification and returns how many ran.
    pub fn dispatch(&self, notification: SystemNotification) -> usize {
        let Some(handlers) = self.handlers.get(&notification) else {
            return 0;
        };
        for (_, handler) in handlers {
            handler(notification);
        }
        debug!(notification = ?notification, handlers = handlers.len(), "Dispatched notification");
        handlers.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_dispatch_and_unregister() {
        let mut dispatcher = NotificationDispatcher::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let id = {
            let calls = calls.clone();
            dispatcher.register(SystemNotification::MuteAll, move |n| {
                assert_eq!(n, SystemNotification::MuteAll);
                calls.fetch_add(1, Ordering::Relaxed);
            })
        };

        assert_eq!(dispatcher.dispatch(SystemNotification::MuteAll), 1);
        assert_eq!(dispatcher.dispatch(SystemNotification::Refresh), 0);
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert_eq!(dispatcher.dispatch(SystemNotification::MuteAll), 0);
        assert_eq!(dispatcher.handler_count(), 0);
    }
}
