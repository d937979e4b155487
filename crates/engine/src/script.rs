//! Scripted engine for driving the facade in tests and demos.
//!
//! `ScriptedEngine` replays a fixed list of `ScriptOp`s through the sink on
//! every call, so routing and buffering behavior can be exercised without a
//! real simulator. `ColumnKind` builds the selected-output headings a real
//! engine would emit.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::CellValue;
use crate::engine::{OutputSink, ReactionEngine, SinkResult};
use crate::message::Message;

/// Heading conventions for selected-output columns.
///
/// User-selected quantities punch under fixed prefixes and suffixes so a
/// column's meaning survives into the flat file. `heading` builds the
/// column heading for one species or phase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Total,
    Molality,
    Activity,
    EquilibriumPhase,
    EquilibriumPhaseDelta,
    SaturationIndex,
    Gas,
    KineticReactant,
    KineticReactantDelta,
    SolidSolution,
}

impl ColumnKind {
    pub fn heading(&self, name: &str) -> String {
        match self {
            ColumnKind::Total => format!("{}(mol/kgw)", name),
            ColumnKind::Molality => format!("m_{}(mol/kgw)", name),
            ColumnKind::Activity => format!("la_{}", name),
            ColumnKind::EquilibriumPhase => name.to_string(),
            ColumnKind::EquilibriumPhaseDelta => format!("d_{}", name),
            ColumnKind::SaturationIndex => format!("si_{}", name),
            ColumnKind::Gas => format!("g_{}", name),
            ColumnKind::KineticReactant => format!("k_{}", name),
            ColumnKind::KineticReactantDelta => format!("dk_{}", name),
            ColumnKind::SolidSolution => format!("s_{}", name),
        }
    }
}

/// One step of a scripted run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOp {
    Emit(Message),
    OpenSelectedOutput(String),
}

impl ScriptOp {
    pub fn error(text: &str, fatal: bool) -> Self {
        ScriptOp::Emit(Message::Error {
            text: text.to_string(),
            fatal,
        })
    }

    pub fn warning(text: &str) -> Self {
        ScriptOp::Emit(Message::Warning {
            text: text.to_string(),
        })
    }

    pub fn log(text: &str) -> Self {
        ScriptOp::Emit(Message::Log {
            text: text.to_string(),
        })
    }

    pub fn output(text: &str) -> Self {
        ScriptOp::Emit(Message::Output {
            text: text.to_string(),
        })
    }

    pub fn screen(text: &str) -> Self {
        ScriptOp::Emit(Message::Screen {
            text: text.to_string(),
        })
    }

    pub fn dump(text: &str) -> Self {
        ScriptOp::Emit(Message::Dump {
            text: text.to_string(),
        })
    }

    pub fn field(heading: &str, value: CellValue) -> Self {
        ScriptOp::Emit(Message::Field {
            heading: heading.to_string(),
            value,
        })
    }

    pub fn end_row() -> Self {
        ScriptOp::Emit(Message::EndRow)
    }

    pub fn open_selected_output(file_name: &str) -> Self {
        ScriptOp::OpenSelectedOutput(file_name.to_string())
    }
}

/// Deterministic engine that replays a fixed script per call.
///
/// Stands in for the simulator in tests and demos: `load_database` replays
/// the database script, every `run` replays the run script. Input text is
/// recorded in a shared log the host can keep a handle to.
#[derive(Default)]
pub struct ScriptedEngine {
    database_ops: Vec<ScriptOp>,
    run_ops: Vec<ScriptOp>,
    components: Vec<String>,
    inputs: Rc<RefCell<Vec<String>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database_script(mut self, ops: Vec<ScriptOp>) -> Self {
        self.database_ops = ops;
        self
    }

    pub fn with_run_script(mut self, ops: Vec<ScriptOp>) -> Self {
        self.run_ops = ops;
        self
    }

    pub fn with_components(mut self, names: Vec<String>) -> Self {
        self.components = names;
        self
    }

    /// Shared view of every input text handed to the engine, in call order.
    /// Clone the handle before boxing the engine.
    pub fn input_log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.inputs)
    }
}

impl ReactionEngine for ScriptedEngine {
    fn load_database(&mut self, text: &str, sink: &mut dyn OutputSink) -> SinkResult {
        self.inputs.borrow_mut().push(text.to_string());
        replay(&self.database_ops, sink)
    }

    fn run(&mut self, input: &str, sink: &mut dyn OutputSink) -> SinkResult {
        self.inputs.borrow_mut().push(input.to_string());
        replay(&self.run_ops, sink)
    }

    fn components(&self) -> Vec<String> {
        self.components.clone()
    }
}

fn replay(ops: &[ScriptOp], sink: &mut dyn OutputSink) -> SinkResult {
    for op in ops {
        match op {
            ScriptOp::Emit(message) => sink.emit(message.clone())?,
            ScriptOp::OpenSelectedOutput(file_name) => {
                sink.open_selected_output(file_name);
            }
        }
    }
    Ok(())
}
