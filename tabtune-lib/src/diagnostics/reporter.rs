//! Change-only playback status reporter.

/// Snapshot of playback state sent to UI consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub media_id: String,
    pub time: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub volume: u8,
    pub muted: bool,
}

impl Report {
    /// Progress in percent, capped at 100. Zero while the duration is unknown.
    pub fn percent(&self) -> f64 {
        match self.duration {
            Some(duration) if duration > 0.0 => (self.time / duration * 100.0).min(100.0),
            _ => 0.0,
        }
    }
}

/// Forwards reports to a callback, skipping ones equal to the last sent.
#[derive(Default)]
pub struct Reporter {
    report: Option<Box<dyn FnMut(Report)>>,
    last_report: Option<Report>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a callback, replacing any previous one.
    pub fn set(&mut self, report: Box<dyn FnMut(Report)>) {
        self.report = Some(report);
        self.last_report = None;
    }

    pub fn clear(&mut self) {
        self.report = None;
        self.last_report = None;
    }

    pub fn is_active(&self) -> bool {
        self.report.is_some()
    }

    /// Send `report` if it differs from the last one. Returns whether it was sent.
    pub fn publish(&mut self, report: Report) -> bool {
        let Some(callback) = self.report.as_mut() else {
            return false;
        };
        if self.last_report.as_ref() == Some(&report) {
            return false;
        }
        callback(report.clone());
        self.last_report = Some(report);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn report(time: f64) -> Report {
        Report {
            media_id: "abc".to_string(),
            time,
            duration: Some(200.0),
            playing: true,
            volume: 100,
            muted: false,
        }
    }

    #[test]
    fn only_changes_are_published() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut reporter = Reporter::new();
        assert!(!reporter.publish(report(1.0)));

        reporter.set(Box::new(move |r: Report| sink.borrow_mut().push(r.time)));
        assert!(reporter.publish(report(1.0)));
        assert!(!reporter.publish(report(1.0)));
        assert!(reporter.publish(report(2.0)));
        assert_eq!(*seen.borrow(), vec![1.0, 2.0]);
    }

    #[test]
    fn percent_handles_unknown_duration() {
        let mut r = report(50.0);
        assert_eq!(r.percent(), 25.0);
        r.duration = None;
        assert_eq!(r.percent(), 0.0);
        r.duration = Some(10.0);
        assert_eq!(r.percent(), 100.0);
    }
}
