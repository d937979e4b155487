// Channel multiplexer - routes engine messages to enabled destinations

use std::path::Path;

use aquion_engine::engine::{OutputSink, RunStop, SinkResult};
use aquion_engine::line_buffer::LineBuffer;
use aquion_engine::message::{Channel, Message};
use aquion_engine::reporter::Reporter;
use aquion_engine::table::SelectedOutput;
use aquion_io::punch::SelectedOutputWriter;
use aquion_io::sink::FileSink;
use rustc_hash::FxHashSet;

/// Receives screen-channel text during a run. Nothing is buffered for this
/// channel; without a callback the text is dropped.
pub type ScreenCallback = Box<dyn FnMut(&str)>;

const DEFAULT_OUTPUT_FILE: &str = "aquion.out";
const DEFAULT_LOG_FILE: &str = "aquion.log";
const DEFAULT_ERROR_FILE: &str = "aquion.err";
const DEFAULT_DUMP_FILE: &str = "dump.out";
const DEFAULT_SELECTED_FILE: &str = "selected.out";

/// Routes every engine message to the destinations enabled at arrival time.
///
/// Owns the capture flags (all default off), the file destinations, and the
/// optional screen callback. Buffers and the table stay with the session and
/// are passed into `dispatch`, so routing policy lives here and state lives
/// there.
///
/// Errors and warnings always reach the reporters; the error file, when
/// enabled, receives both (`ERROR:` and `WARNING:` prefixed lines). A
/// destination write failure downgrades to one warning per destination per
/// run and never interrupts dispatch.
pub struct OutputMux {
    output_file_on: bool,
    log_file_on: bool,
    error_file_on: bool,
    dump_file_on: bool,
    dump_string_on: bool,
    selected_output_file_on: bool,

    output: FileSink,
    log: FileSink,
    error: FileSink,
    dump: FileSink,
    punch: SelectedOutputWriter,

    screen_callback: Option<ScreenCallback>,
    write_warned: FxHashSet<Channel>,
}

impl OutputMux {
    pub fn new() -> Self {
        Self {
            output_file_on: false,
            log_file_on: false,
            error_file_on: false,
            dump_file_on: false,
            dump_string_on: false,
            selected_output_file_on: false,
            output: FileSink::new(Path::new(DEFAULT_OUTPUT_FILE)),
            log: FileSink::new(Path::new(DEFAULT_LOG_FILE)),
            error: FileSink::new(Path::new(DEFAULT_ERROR_FILE)),
            dump: FileSink::new(Path::new(DEFAULT_DUMP_FILE)),
            punch: SelectedOutputWriter::new(Path::new(DEFAULT_SELECTED_FILE)),
            screen_callback: None,
            write_warned: FxHashSet::default(),
        }
    }

    pub fn output_file_on(&self) -> bool {
        self.output_file_on
    }

    pub fn set_output_file_on(&mut self, on: bool) {
        self.output_file_on = on;
    }

    pub fn log_file_on(&self) -> bool {
        self.log_file_on
    }

    pub fn set_log_file_on(&mut self, on: bool) {
        self.log_file_on = on;
    }

    pub fn error_file_on(&self) -> bool {
        self.error_file_on
    }

    pub fn set_error_file_on(&mut self, on: bool) {
        self.error_file_on = on;
    }

    pub fn dump_file_on(&self) -> bool {
        self.dump_file_on
    }

    pub fn set_dump_file_on(&mut self, on: bool) {
        self.dump_file_on = on;
    }

    pub fn dump_string_on(&self) -> bool {
        self.dump_string_on
    }

    pub fn set_dump_string_on(&mut self, on: bool) {
        self.dump_string_on = on;
    }

    pub fn selected_output_file_on(&self) -> bool {
        self.selected_output_file_on
    }

    pub fn set_selected_output_file_on(&mut self, on: bool) {
        self.selected_output_file_on = on;
    }

    pub fn output_file_name(&self) -> &Path {
        self.output.path()
    }

    pub fn set_output_file_name(&mut self, path: &Path) -> Result<(), String> {
        self.output.set_path(path)
    }

    pub fn log_file_name(&self) -> &Path {
        self.log.path()
    }

    pub fn set_log_file_name(&mut self, path: &Path) -> Result<(), String> {
        self.log.set_path(path)
    }

    pub fn error_file_name(&self) -> &Path {
        self.error.path()
    }

    pub fn set_error_file_name(&mut self, path: &Path) -> Result<(), String> {
        self.error.set_path(path)
    }

    pub fn dump_file_name(&self) -> &Path {
        self.dump.path()
    }

    pub fn set_dump_file_name(&mut self, path: &Path) -> Result<(), String> {
        self.dump.set_path(path)
    }

    pub fn selected_output_file_name(&self) -> &Path {
        self.punch.path()
    }

    pub fn set_selected_output_file_name(&mut self, path: &Path) -> Result<(), String> {
        self.punch.retarget(path)
    }

    pub fn set_screen_callback(&mut self, callback: ScreenCallback) {
        self.screen_callback = Some(callback);
    }

    pub fn clear_screen_callback(&mut self) {
        self.screen_callback = None;
    }

    /// Route one message. Returns the stop signal after recording a fatal
    /// error; every other outcome, write failures included, is `Ok`.
    pub fn dispatch(
        &mut self,
        message: Message,
        errors: &mut Reporter,
        warnings: &mut Reporter,
        dump_text: &mut LineBuffer,
        table: &mut SelectedOutput,
    ) -> SinkResult {
        match message {
            Message::Error { text, fatal } => {
                let line = format!("ERROR: {}", text);
                errors.add(&line);
                if self.error_file_on {
                    self.write_channel(Channel::Error, &line, warnings);
                }
                if fatal {
                    return Err(RunStop);
                }
            }
            Message::Warning { text } => {
                let line = format!("WARNING: {}", text);
                warnings.add(&line);
                if self.error_file_on {
                    self.write_channel(Channel::Warning, &line, warnings);
                }
            }
            Message::Log { text } => {
                if self.log_file_on {
                    self.write_channel(Channel::Log, &text, warnings);
                }
            }
            Message::Output { text } => {
                if self.output_file_on {
                    self.write_channel(Channel::Output, &text, warnings);
                }
            }
            Message::Screen { text } => {
                if let Some(callback) = self.screen_callback.as_mut() {
                    callback(&text);
                }
            }
            Message::Dump { text } => {
                if self.dump_file_on {
                    self.write_channel(Channel::Dump, &text, warnings);
                }
                if self.dump_string_on && dump_text.accumulate(&text).is_err() {
                    warnings.add("WARNING: out of memory capturing dump text\n");
                }
            }
            Message::Field { heading, value } => {
                if self.selected_output_file_on && table.push_field(&heading, value).is_err() {
                    warnings.add("WARNING: out of memory building the selected-output row\n");
                }
            }
            Message::EndRow => {
                if self.selected_output_file_on {
                    let dropped = table.end_row();
                    if dropped > 0 {
                        warnings.add(&format!(
                            "WARNING: selected-output row wider than the header, {} field(s) dropped\n",
                            dropped
                        ));
                    }
                    if let Some(row) = table.row(table.row_count() - 1) {
                        let result = self.punch.write_row(row);
                        if let Err(e) = result {
                            self.warn_write_failure(Channel::SelectedField, &e, warnings);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Redirect the selected-output file mid-run. A failure is downgraded to
    /// a warning and reported to the engine as `false`.
    pub fn open_selected_output(&mut self, file_name: &str, warnings: &mut Reporter) -> bool {
        match self.punch.retarget(Path::new(file_name)) {
            Ok(()) => true,
            Err(e) => {
                warnings.add(&format!(
                    "WARNING: cannot switch the selected-output file to {}: {}\n",
                    file_name, e
                ));
                false
            }
        }
    }

    /// Mark the start of a run: re-arm the once-per-run write warnings.
    /// Destinations stay closed until their first write.
    pub fn open_run(&mut self) {
        self.write_warned.clear();
    }

    /// Flush and close every destination. Closing what is already closed is
    /// a no-op; flush failures downgrade to warnings like any other write.
    pub fn close_run(&mut self, warnings: &mut Reporter) {
        let results = [
            (Channel::Output, self.output.close()),
            (Channel::Log, self.log.close()),
            (Channel::Error, self.error.close()),
            (Channel::Dump, self.dump.close()),
            (Channel::SelectedField, self.punch.close()),
        ];
        for (channel, result) in results {
            if let Err(e) = result {
                self.warn_write_failure(channel, &e, warnings);
            }
        }
    }

    fn write_channel(&mut self, channel: Channel, text: &str, warnings: &mut Reporter) {
        let sink = match channel {
            Channel::Error | Channel::Warning => &mut self.error,
            Channel::Log => &mut self.log,
            Channel::Output => &mut self.output,
            Channel::Dump => &mut self.dump,
            Channel::Screen | Channel::SelectedField | Channel::EndRow => return,
        };
        let result = sink.write_str(text);
        if let Err(e) = result {
            // Warnings land in the error file, so they share its warn key.
            let key = if channel == Channel::Warning {
                Channel::Error
            } else {
                channel
            };
            self.warn_write_failure(key, &e, warnings);
        }
    }

    fn warn_write_failure(&mut self, key: Channel, error: &str, warnings: &mut Reporter) {
        if self.write_warned.insert(key) {
            warnings.add(&format!("WARNING: cannot write {} file: {}\n", key, error));
        }
    }
}

impl Default for OutputMux {
    fn default() -> Self {
        Self::new()
    }
}

/// Split borrow of session state handed to the engine for one run.
pub(crate) struct RunSink<'a> {
    pub(crate) mux: &'a mut OutputMux,
    pub(crate) errors: &'a mut Reporter,
    pub(crate) warnings: &'a mut Reporter,
    pub(crate) dump_text: &'a mut LineBuffer,
    pub(crate) table: &'a mut SelectedOutput,
}

impl OutputSink for RunSink<'_> {
    fn emit(&mut self, message: Message) -> SinkResult {
        self.mux
            .dispatch(message, self.errors, self.warnings, self.dump_text, self.table)
    }

    fn open_selected_output(&mut self, file_name: &str) -> bool {
        self.mux.open_selected_output(file_name, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquion_engine::cell::CellValue;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn buffers() -> (Reporter, Reporter, LineBuffer, SelectedOutput) {
        (
            Reporter::new(),
            Reporter::new(),
            LineBuffer::new(),
            SelectedOutput::new(),
        )
    }

    #[test]
    fn test_all_captures_default_off() {
        let mux = OutputMux::new();
        assert!(!mux.output_file_on());
        assert!(!mux.log_file_on());
        assert!(!mux.error_file_on());
        assert!(!mux.dump_file_on());
        assert!(!mux.dump_string_on());
        assert!(!mux.selected_output_file_on());
        assert_eq!(mux.output_file_name(), Path::new("aquion.out"));
        assert_eq!(mux.error_file_name(), Path::new("aquion.err"));
        assert_eq!(mux.selected_output_file_name(), Path::new("selected.out"));
    }

    #[test]
    fn test_error_reaches_reporter_without_file_capture() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.err");
        let mut mux = OutputMux::new();
        mux.set_error_file_name(&path).unwrap();
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        let result = mux.dispatch(
            Message::Error {
                text: "bad keyword\n".into(),
                fatal: false,
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        );
        mux.close_run(&mut warnings);

        assert_eq!(result, Ok(()));
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.text(), "ERROR: bad keyword\n");
        assert!(!path.exists(), "error file must not exist with capture off");
    }

    #[test]
    fn test_fatal_error_recorded_before_stop() {
        let mut mux = OutputMux::new();
        let (mut errors, mut warnings, mut dump, mut table) = buffers();
        let result = mux.dispatch(
            Message::Error {
                text: "stop now\n".into(),
                fatal: true,
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        );
        assert_eq!(result, Err(RunStop));
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.text(), "ERROR: stop now\n");
    }

    #[test]
    fn test_errors_and_warnings_share_error_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.err");
        let mut mux = OutputMux::new();
        mux.set_error_file_name(&path).unwrap();
        mux.set_error_file_on(true);
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        mux.dispatch(
            Message::Error {
                text: "bad\n".into(),
                fatal: false,
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.dispatch(
            Message::Warning { text: "odd\n".into() },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.close_run(&mut warnings);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ERROR: bad\nWARNING: odd\n"
        );
        assert_eq!(errors.count(), 1);
        assert_eq!(warnings.count(), 1);
    }

    #[test]
    fn test_log_and_output_route_to_their_files() {
        let dir = tempdir().unwrap();
        let out_path = dir.path().join("run.out");
        let log_path = dir.path().join("run.log");
        let mut mux = OutputMux::new();
        mux.set_output_file_name(&out_path).unwrap();
        mux.set_log_file_name(&log_path).unwrap();
        mux.set_output_file_on(true);
        mux.set_log_file_on(true);
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        mux.dispatch(
            Message::Output {
                text: "Beginning of initial solution calculations.\n".into(),
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.dispatch(
            Message::Log {
                text: "iterations: 12\n".into(),
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.close_run(&mut warnings);

        assert_eq!(
            fs::read_to_string(&out_path).unwrap(),
            "Beginning of initial solution calculations.\n"
        );
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "iterations: 12\n");
    }

    #[test]
    fn test_dump_string_capture_is_independent_of_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.out");
        let mut mux = OutputMux::new();
        mux.set_dump_file_name(&path).unwrap();
        mux.set_dump_string_on(true);
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        mux.dispatch(
            Message::Dump {
                text: "SOLUTION_RAW 1\n".into(),
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.close_run(&mut warnings);

        assert_eq!(dump.text(), "SOLUTION_RAW 1\n");
        assert!(!path.exists(), "dump file must stay off independently");
    }

    #[test]
    fn test_selected_output_disabled_leaves_table_untouched() {
        let mut mux = OutputMux::new();
        let (mut errors, mut warnings, mut dump, mut table) = buffers();
        table.push_real("pH", 7.0).unwrap();
        table.end_row();
        table.push_real("pH", 6.5).unwrap();
        table.end_row();

        mux.dispatch(
            Message::Field {
                heading: "pe".into(),
                value: CellValue::Real(4.0),
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.dispatch(
            Message::EndRow,
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();

        assert_eq!(table.row_count(), 2, "disabled channel must not append");
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn test_selected_output_rows_mirror_to_punch_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.sel");
        let mut mux = OutputMux::new();
        mux.set_selected_output_file_name(&path).unwrap();
        mux.set_selected_output_file_on(true);
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        for value in [7.0, 8.15] {
            mux.dispatch(
                Message::Field {
                    heading: "pH".into(),
                    value: CellValue::Real(value),
                },
                &mut errors,
                &mut warnings,
                &mut dump,
                &mut table,
            )
            .unwrap();
            mux.dispatch(
                Message::EndRow,
                &mut errors,
                &mut warnings,
                &mut dump,
                &mut table,
            )
            .unwrap();
        }
        mux.close_run(&mut warnings);

        assert_eq!(fs::read_to_string(&path).unwrap(), "pH\n8.1500e0\n");
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_over_wide_row_warns_with_dropped_count() {
        let mut mux = OutputMux::new();
        mux.set_selected_output_file_on(true);
        let dir = tempdir().unwrap();
        mux.set_selected_output_file_name(&dir.path().join("w.sel"))
            .unwrap();
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        table.push_real("pH", 7.0).unwrap();
        table.end_row();
        for heading in ["pH", "pe", "mu"] {
            mux.dispatch(
                Message::Field {
                    heading: heading.into(),
                    value: CellValue::Real(1.0),
                },
                &mut errors,
                &mut warnings,
                &mut dump,
                &mut table,
            )
            .unwrap();
        }
        mux.dispatch(
            Message::EndRow,
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.close_run(&mut warnings);

        assert_eq!(warnings.count(), 1);
        assert!(
            warnings.text().contains("2 field(s) dropped"),
            "warning should name the dropped count: {}",
            warnings.text()
        );
    }

    #[test]
    fn test_write_failure_warns_once_per_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("run.err");
        let mut mux = OutputMux::new();
        mux.set_error_file_name(&path).unwrap();
        mux.set_error_file_on(true);
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        for text in ["one\n", "two\n"] {
            mux.dispatch(
                Message::Error {
                    text: text.into(),
                    fatal: false,
                },
                &mut errors,
                &mut warnings,
                &mut dump,
                &mut table,
            )
            .unwrap();
        }
        mux.close_run(&mut warnings);

        assert_eq!(errors.count(), 2, "errors still recorded in memory");
        assert_eq!(warnings.count(), 1, "write failure warns once per run");
        assert!(warnings.text().contains("cannot write error file"));
    }

    #[test]
    fn test_screen_routes_to_callback_only() {
        let seen: Rc<RefCell<String>> = Rc::default();
        let sink_seen = Rc::clone(&seen);
        let mut mux = OutputMux::new();
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        // Without a callback the text is dropped.
        mux.dispatch(
            Message::Screen {
                text: "ignored\n".into(),
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();

        mux.set_screen_callback(Box::new(move |text| {
            sink_seen.borrow_mut().push_str(text);
        }));
        mux.dispatch(
            Message::Screen {
                text: "simulation 1\n".into(),
            },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();

        assert_eq!(*seen.borrow(), "simulation 1\n");
    }

    #[test]
    fn test_close_run_twice_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.out");
        let mut mux = OutputMux::new();
        mux.set_output_file_name(&path).unwrap();
        mux.set_output_file_on(true);
        let (mut errors, mut warnings, mut dump, mut table) = buffers();

        mux.open_run();
        mux.dispatch(
            Message::Output { text: "x\n".into() },
            &mut errors,
            &mut warnings,
            &mut dump,
            &mut table,
        )
        .unwrap();
        mux.close_run(&mut warnings);
        mux.close_run(&mut warnings);
        assert_eq!(warnings.count(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
    }
}
