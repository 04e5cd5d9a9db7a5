//! Helpers shared by tests.

use crate::view::{FocusContext, ViewBehavior};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::{Arc, Once};

/// Hook calls, formatted as `id:hook`.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A behavior that writes every hook call to an event log.
#[derive(Debug)]
pub struct Recorder {
    log: EventLog,
}

impl Recorder {
    pub fn new(log: &EventLog) -> Recorder {
        Recorder {
            log: Arc::clone(log),
        }
    }

    fn record(&self, context: &FocusContext, hook: &str) {
        self.log.lock().push(format!("{}:{}", context.id(), hook));
    }
}

impl ViewBehavior for Recorder {
    fn on_enter_focus(&mut self, context: &FocusContext) {
        self.record(context, "enter");
    }

    fn on_leave_focus(&mut self, context: &FocusContext) {
        self.record(context, "leave");
    }

    fn update(&mut self, context: &FocusContext) {
        self.record(context, "update");
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// Collects log records per thread, so parallel tests don’t see each other’s output.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Installs the capturing logger and clears this thread’s records.
pub fn capture_logs() {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Warnings logged on this thread since the last `capture_logs`.
pub fn captured_warnings() -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    })
}
