//! The page together with its event clock, plus transient notifications.

use crate::dom::{Element, ElementId, Page};
use crate::timers::{Task, TimerId, Timers};
use std::time::Duration;
use tracing::debug;

const NOTIFICATION_BASE_CLASSES: &str = "fixed top-4 right-4 p-4 rounded-lg text-white z-50";

/// Default lifetime of a notification
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    /// Background class for this kind of notification.
    pub fn class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "bg-green-500",
            NotificationKind::Error => "bg-red-500",
            NotificationKind::Info => "bg-blue-500",
        }
    }
}

/// Everything a page callback may touch: the document and the timer queue.
#[derive(Debug)]
pub struct Ui {
    pub page: Page,
    pub timers: Timers,
    notification_duration: Duration,
}

impl Ui {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            timers: Timers::new(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Append a notification to the page body and schedule its removal.
    pub fn notify(&mut self, message: &str, kind: NotificationKind) -> ElementId {
        let element = Element::new("div")
            .with_class(NOTIFICATION_BASE_CLASSES)
            .with_class(kind.class())
            .with_attr("role", "status")
            .with_text(message);

        let id = self.page.append(None, element);
        self.timers
            .set_timeout(self.notification_duration, Task::DismissNotification(id));
        debug!("Notification shown: {}", message);
        id
    }

    /// Remove a notification element. Already-removed elements are ignored.
    pub fn dismiss(&mut self, id: ElementId) {
        self.page.remove(id);
    }

    /// Currently visible notifications, oldest first.
    pub fn notifications(&self) -> Vec<ElementId> {
        self.page
            .select(|e| e.attr("role") == Some("status") && e.has_class("z-50"))
    }

    /// Schedule a one-shot task on the page clock.
    pub fn after(&mut self, delay: Duration, task: Task) -> TimerId {
        self.timers.set_timeout(delay, task)
    }
}
