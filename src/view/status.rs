// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt,
    time::{Duration, Instant},
};

use log::debug;

/// How long a status message stays visible.
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub(crate) struct Status {
    kind: Kind,
    text: String,
    shown_at: Instant,
}

impl Status {
    pub(crate) fn new(kind: Kind, text: impl Into<String>) -> Self {
        Self::new_at(kind, text, Instant::now())
    }

    pub(crate) fn new_at(kind: Kind, text: impl Into<String>, shown_at: Instant) -> Self {
        let status = Self {
            kind,
            text: text.into(),
            shown_at,
        };
        debug!("Status ({:?}): {}", kind, status.text);
        status
    }

    pub(crate) const fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < STATUS_TTL
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The single status line shared by everything on a screen. A newer message
/// replaces the older one.
#[derive(Clone, Debug, Default)]
pub(crate) struct StatusLine {
    current: Option<Status>,
}

impl StatusLine {
    pub(crate) fn show(&mut self, kind: Kind, text: impl Into<String>) {
        self.current = Some(Status::new(kind, text));
    }

    pub(crate) fn visible_at(&self, now: Instant) -> Option<&Status> {
        self.current.as_ref().filter(|s| s.is_visible_at(now))
    }

    pub(crate) fn visible(&self) -> Option<&Status> {
        self.visible_at(Instant::now())
    }

    #[cfg(test)]
    pub(crate) fn show_at(&mut self, kind: Kind, text: impl Into<String>, at: Instant) {
        self.current = Some(Status::new_at(kind, text, at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_expire_after_the_delay() {
        let start = Instant::now();
        let mut line = StatusLine::default();
        line.show_at(Kind::Success, "Salida marcada exitosamente.", start);

        assert_eq!(
            line.visible_at(start + Duration::from_secs(1)).map(Status::text),
            Some("Salida marcada exitosamente.")
        );
        assert!(line.visible_at(start + STATUS_TTL).is_none());
    }

    #[test]
    fn newer_messages_replace_older_ones() {
        let start = Instant::now();
        let mut line = StatusLine::default();
        line.show_at(Kind::Info, "Eliminando registro...", start);
        line.show_at(Kind::Error, "Error al eliminar registro: boom", start);

        let visible = line.visible_at(start);
        assert_eq!(visible.map(Status::kind), Some(Kind::Error));
    }
}
