// Session - run control, retrieval accessors, and host configuration

use std::path::Path;

use aquion_engine::cell::{CellValue, ValueError};
use aquion_engine::engine::ReactionEngine;
use aquion_engine::line_buffer::LineBuffer;
use aquion_engine::message::Message;
use aquion_engine::reporter::Reporter;
use aquion_engine::table::SelectedOutput;
use aquion_io::read;

use crate::hooks::{CatchHook, Hooks, RunHook};
use crate::mux::{OutputMux, RunSink, ScreenCallback};

/// One facade instance over a reaction engine.
///
/// Owns the accumulated input, both diagnostic reporters, the dump capture
/// buffer, the selected-output table, and the output multiplexer. Every run
/// entry point returns the post-run error count (0 on success); a fatal
/// stop raised by the engine never escapes, it only shows up in that count.
///
/// Single-threaded by design: one session serves one run at a time, and
/// hosts wanting parallel runs create more sessions.
pub struct Session {
    engine: Box<dyn ReactionEngine>,
    input: LineBuffer,
    errors: Reporter,
    warnings: Reporter,
    dump_text: LineBuffer,
    table: SelectedOutput,
    mux: OutputMux,
    hooks: Hooks,
    components: Vec<String>,
    database_loaded: bool,
    input_consumed: bool,
}

impl Session {
    pub fn new(engine: Box<dyn ReactionEngine>) -> Self {
        Self {
            engine,
            input: LineBuffer::new(),
            errors: Reporter::new(),
            warnings: Reporter::new(),
            dump_text: LineBuffer::new(),
            table: SelectedOutput::new(),
            mux: OutputMux::new(),
            hooks: Hooks::default(),
            components: Vec::new(),
            database_loaded: false,
            input_consumed: false,
        }
    }

    // --- input accumulation ---

    /// Append one input line (a line break is added). Accumulation after a
    /// run that consumed the buffer starts over from empty.
    pub fn accumulate_line(&mut self, line: &str) -> Result<(), ValueError> {
        if self.input_consumed {
            self.input.clear();
            self.input_consumed = false;
        }
        self.input.accumulate(line)?;
        self.input.accumulate("\n")
    }

    pub fn clear_accumulated_lines(&mut self) {
        self.input.clear();
        self.input_consumed = false;
    }

    pub fn accumulated_lines(&self) -> &str {
        self.input.text()
    }

    pub fn accumulated_line(&self, n: usize) -> &str {
        self.input.line(n)
    }

    pub fn accumulated_line_count(&self) -> usize {
        self.input.line_count()
    }

    // --- database loading ---

    /// Load a thermodynamic database from a file. Returns the error count;
    /// on failure the session stays without a database and runs are refused.
    pub fn load_database(&mut self, path: &Path) -> usize {
        match read::input_file(path) {
            Ok(text) => self.load_database_text(&text),
            Err(e) => {
                self.begin_run();
                self.database_loaded = false;
                self.record_run_error(&format!("cannot open database file: {}\n", e));
                self.finish_run()
            }
        }
    }

    /// Load a database from an in-memory string. Returns the error count.
    pub fn load_database_string(&mut self, text: &str) -> usize {
        self.load_database_text(text)
    }

    fn load_database_text(&mut self, text: &str) -> usize {
        self.begin_run();
        let stopped = {
            let mut sink = RunSink {
                mux: &mut self.mux,
                errors: &mut self.errors,
                warnings: &mut self.warnings,
                dump_text: &mut self.dump_text,
                table: &mut self.table,
            };
            self.engine.load_database(text, &mut sink).is_err()
        };
        if stopped && self.errors.count() == 0 {
            self.record_run_error("database load stopped by a fatal error\n");
        }
        self.components = self.engine.components();
        self.database_loaded = !stopped && self.errors.count() == 0;
        self.finish_run()
    }

    pub fn database_loaded(&self) -> bool {
        self.database_loaded
    }

    // --- run entry points ---

    /// Run the accumulated input lines. The buffer stays readable until the
    /// next accumulation begins.
    pub fn run_accumulated(&mut self) -> usize {
        self.input_consumed = true;
        let input = self.input.text().to_string();
        self.run_input(&input)
    }

    /// Run an input file through the engine.
    pub fn run_file(&mut self, path: &Path) -> usize {
        match read::input_file(path) {
            Ok(text) => self.run_input(&text),
            Err(e) => {
                self.begin_run();
                self.record_run_error(&format!("cannot open input file: {}\n", e));
                self.finish_run()
            }
        }
    }

    /// Run an inline input string through the engine.
    pub fn run_string(&mut self, input: &str) -> usize {
        self.run_input(input)
    }

    fn run_input(&mut self, input: &str) -> usize {
        self.begin_run();
        if !self.database_loaded {
            self.record_run_error("no database is loaded\n");
            return self.finish_run();
        }

        if let Some(mut hook) = self.hooks.pre_run.take() {
            let result = hook(self);
            self.hooks.pre_run.restore(hook);
            if let Err(e) = result {
                self.record_run_error(&format!("pre-run callback failed: {}\n", e));
                return self.finish_run();
            }
        }

        let stopped = {
            let mut sink = RunSink {
                mux: &mut self.mux,
                errors: &mut self.errors,
                warnings: &mut self.warnings,
                dump_text: &mut self.dump_text,
                table: &mut self.table,
            };
            self.engine.run(input, &mut sink).is_err()
        };
        self.components = self.engine.components();

        if stopped {
            if self.errors.count() == 0 {
                self.record_run_error("run stopped by a fatal error\n");
            }
            if let Some(mut hook) = self.hooks.catch_stop.take() {
                hook(self);
                self.hooks.catch_stop.restore(hook);
            }
        } else if let Some(mut hook) = self.hooks.post_run.take() {
            let result = hook(self);
            self.hooks.post_run.restore(hook);
            if let Err(e) = result {
                self.record_run_error(&format!("post-run callback failed: {}\n", e));
            }
        }

        self.finish_run()
    }

    /// Per-run bookkeeping shared by every entry point: reporters and dump
    /// capture start empty, the table is rebuilt only when the
    /// selected-output channel is on for this run.
    fn begin_run(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.dump_text.clear();
        if self.mux.selected_output_file_on() {
            self.table.reset();
        }
        self.mux.open_run();
    }

    fn finish_run(&mut self) -> usize {
        self.mux.close_run(&mut self.warnings);
        self.errors.count()
    }

    /// Route an internally detected failure like an engine error message
    /// (reporter plus error file), without stopping.
    fn record_run_error(&mut self, text: &str) {
        let message = Message::Error {
            text: text.to_string(),
            fatal: false,
        };
        let _ = self.mux.dispatch(
            message,
            &mut self.errors,
            &mut self.warnings,
            &mut self.dump_text,
            &mut self.table,
        );
    }

    // --- host-side diagnostics ---

    /// Append an error message verbatim and return the new error count.
    pub fn add_error(&mut self, message: &str) -> usize {
        self.errors.add(message)
    }

    /// Append a warning message verbatim and return the new warning count.
    pub fn add_warning(&mut self, message: &str) -> usize {
        self.warnings.add(message)
    }

    // --- retrieval (0-based indices; out of range yields "" or an error code) ---

    pub fn error_count(&self) -> usize {
        self.errors.count()
    }

    pub fn error_string(&self) -> &str {
        self.errors.text()
    }

    pub fn error_string_line(&self, n: usize) -> &str {
        self.errors.line(n)
    }

    pub fn error_string_line_count(&self) -> usize {
        self.errors.line_count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.count()
    }

    pub fn warning_string(&self) -> &str {
        self.warnings.text()
    }

    pub fn warning_string_line(&self, n: usize) -> &str {
        self.warnings.line(n)
    }

    pub fn warning_string_line_count(&self) -> usize {
        self.warnings.line_count()
    }

    pub fn dump_string(&self) -> &str {
        self.dump_text.text()
    }

    pub fn dump_string_line(&self, n: usize) -> &str {
        self.dump_text.line(n)
    }

    pub fn dump_string_line_count(&self) -> usize {
        self.dump_text.line_count()
    }

    pub fn selected_output_value(&self, row: usize, col: usize) -> Result<CellValue, ValueError> {
        self.table.value(row, col).map(|cell| cell.clone())
    }

    pub fn selected_output_row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn selected_output_column_count(&self) -> usize {
        self.table.column_count()
    }

    /// Direct view of the table, for exporters.
    pub fn selected_output(&self) -> &SelectedOutput {
        &self.table
    }

    pub fn component(&self, n: usize) -> &str {
        self.components.get(n).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    // --- output configuration pass-throughs ---

    pub fn output_file_on(&self) -> bool {
        self.mux.output_file_on()
    }

    pub fn set_output_file_on(&mut self, on: bool) {
        self.mux.set_output_file_on(on);
    }

    pub fn log_file_on(&self) -> bool {
        self.mux.log_file_on()
    }

    pub fn set_log_file_on(&mut self, on: bool) {
        self.mux.set_log_file_on(on);
    }

    pub fn error_file_on(&self) -> bool {
        self.mux.error_file_on()
    }

    pub fn set_error_file_on(&mut self, on: bool) {
        self.mux.set_error_file_on(on);
    }

    pub fn dump_file_on(&self) -> bool {
        self.mux.dump_file_on()
    }

    pub fn set_dump_file_on(&mut self, on: bool) {
        self.mux.set_dump_file_on(on);
    }

    pub fn dump_string_on(&self) -> bool {
        self.mux.dump_string_on()
    }

    pub fn set_dump_string_on(&mut self, on: bool) {
        self.mux.set_dump_string_on(on);
    }

    pub fn selected_output_file_on(&self) -> bool {
        self.mux.selected_output_file_on()
    }

    pub fn set_selected_output_file_on(&mut self, on: bool) {
        self.mux.set_selected_output_file_on(on);
    }

    pub fn output_file_name(&self) -> &Path {
        self.mux.output_file_name()
    }

    pub fn set_output_file_name(&mut self, path: &Path) {
        if let Err(e) = self.mux.set_output_file_name(path) {
            self.warnings
                .add(&format!("WARNING: cannot switch the output file: {}\n", e));
        }
    }

    pub fn log_file_name(&self) -> &Path {
        self.mux.log_file_name()
    }

    pub fn set_log_file_name(&mut self, path: &Path) {
        if let Err(e) = self.mux.set_log_file_name(path) {
            self.warnings
                .add(&format!("WARNING: cannot switch the log file: {}\n", e));
        }
    }

    pub fn error_file_name(&self) -> &Path {
        self.mux.error_file_name()
    }

    pub fn set_error_file_name(&mut self, path: &Path) {
        if let Err(e) = self.mux.set_error_file_name(path) {
            self.warnings
                .add(&format!("WARNING: cannot switch the error file: {}\n", e));
        }
    }

    pub fn dump_file_name(&self) -> &Path {
        self.mux.dump_file_name()
    }

    pub fn set_dump_file_name(&mut self, path: &Path) {
        if let Err(e) = self.mux.set_dump_file_name(path) {
            self.warnings
                .add(&format!("WARNING: cannot switch the dump file: {}\n", e));
        }
    }

    pub fn selected_output_file_name(&self) -> &Path {
        self.mux.selected_output_file_name()
    }

    pub fn set_selected_output_file_name(&mut self, path: &Path) {
        if let Err(e) = self.mux.set_selected_output_file_name(path) {
            self.warnings.add(&format!(
                "WARNING: cannot switch the selected-output file: {}\n",
                e
            ));
        }
    }

    // --- callbacks ---

    pub fn set_screen_callback(&mut self, callback: ScreenCallback) {
        self.mux.set_screen_callback(callback);
    }

    pub fn clear_screen_callback(&mut self) {
        self.mux.clear_screen_callback();
    }

    pub fn set_prerun_callback(&mut self, hook: RunHook) {
        self.hooks.pre_run.install(Some(hook));
    }

    pub fn clear_prerun_callback(&mut self) {
        self.hooks.pre_run.install(None);
    }

    pub fn set_postrun_callback(&mut self, hook: RunHook) {
        self.hooks.post_run.install(Some(hook));
    }

    pub fn clear_postrun_callback(&mut self) {
        self.hooks.post_run.install(None);
    }

    pub fn set_catch_callback(&mut self, hook: CatchHook) {
        self.hooks.catch_stop.install(Some(hook));
    }

    pub fn clear_catch_callback(&mut self) {
        self.hooks.catch_stop.install(None);
    }
}
