use log::{Level, LevelFilter, Log, Metadata, Record};

/// `log` backend that writes to the Workers console (visible in `wrangler tail`).
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

pub(crate) fn install(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error => worker::console_error!("[{}] {}", record.target(), record.args()),
            Level::Warn => worker::console_warn!("[{}] {}", record.target(), record.args()),
            Level::Info => worker::console_log!("[{}] {}", record.target(), record.args()),
            Level::Debug | Level::Trace => {
                worker::console_debug!("[{}] {}", record.target(), record.args())
            }
        }
    }

    fn flush(&self) {}
}
