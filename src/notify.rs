use crate::models::Mode;
use notify_rust::Notification;

const APP_NAME: &str = "questclock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub summary: &'static str,
    pub body: &'static str,
}

impl NotifyRequest {
    pub fn for_expiry(mode: Mode) -> Self {
        match mode {
            Mode::Focus => Self {
                summary: "Focus Session Complete!",
                body: "Great job! Take a break.",
            },
            Mode::Rest => Self {
                summary: "Break Over!",
                body: "Ready to focus again?",
            },
        }
    }
}

/// Desktop notifications, shown only when the user opted in.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn notify(&self, request: &NotifyRequest) {
        if !self.enabled {
            return;
        }

        let mut notification = Notification::new();
        notification.appname(APP_NAME);
        notification.summary(request.summary);
        notification.body(request.body);

        if let Err(err) = notification.show() {
            tracing::warn!(err = %err, "Could not show notification");
        }
    }
}
