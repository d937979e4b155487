use crate::message::Message;

/// Signal that a fatal error ended the run early.
///
/// Engines raise it by returning `Err(RunStop)` from the sink outward; the
/// run boundary absorbs it, so hosts only ever observe the error count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStop;

impl std::fmt::Display for RunStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run stopped by a fatal error")
    }
}

pub type SinkResult = Result<(), RunStop>;

/// Where a running engine delivers its output.
///
/// One `emit` call per message keeps routing in a single place; the sink
/// decides which files, buffers, and callbacks each channel reaches. `emit`
/// returns `Err(RunStop)` after routing a fatal error, and the engine is
/// expected to propagate that with `?` back to the run boundary.
pub trait OutputSink {
    fn emit(&mut self, message: Message) -> SinkResult;

    /// Redirect the selected-output file to `file_name`, mid-run. Rows
    /// closed afterwards land in the new file. Returns false when the
    /// switch fails; the engine carries on either way.
    fn open_selected_output(&mut self, file_name: &str) -> bool;
}

/// A reaction simulator the session can drive.
///
/// Engines are handed the full input text per call and report everything
/// through the sink; they hold chemistry state between calls but no output
/// state.
pub trait ReactionEngine {
    /// Parse and install a thermodynamic database from `text`.
    fn load_database(&mut self, text: &str, sink: &mut dyn OutputSink) -> SinkResult;

    /// Run one input script against the loaded database.
    fn run(&mut self, input: &str, sink: &mut dyn OutputSink) -> SinkResult;

    /// Component names accumulated from everything run so far.
    fn components(&self) -> Vec<String>;
}
