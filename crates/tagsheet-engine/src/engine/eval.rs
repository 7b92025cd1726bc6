//! Sandboxed formula evaluation.
//!
//! A [`Sandbox`] owns one Rhai engine, built on first use. Every evaluation
//! runs a fresh scope, so scripts never see each other's variables. The only
//! resource limit is a wall-clock deadline checked from Rhai's progress
//! callback.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use rhai::{Engine, EvalAltResult, Position};

use super::Dynamic;
use super::compile::CompiledFormula;
use super::format::format_dynamic;
use crate::error::{FormulaError, Result};

/// Default wall-clock limit for one formula.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Operations between two deadline checks.
const PROGRESS_INTERVAL: u64 = 256;

type Deadline = Arc<Mutex<Option<Instant>>>;

/// Isolated, time-bounded formula runner.
#[derive(Default)]
pub struct Sandbox {
    engine: OnceLock<Engine>,
    run_lock: Mutex<()>,
    deadline: Deadline,
}

impl Sandbox {
    pub fn new() -> Sandbox {
        Sandbox::default()
    }

    fn engine(&self) -> &Engine {
        self.engine
            .get_or_init(|| create_engine(Arc::clone(&self.deadline)))
    }

    /// Run a compiled formula and render its result as cell text.
    pub fn evaluate(&self, formula: &CompiledFormula, timeout: Duration) -> Result<String> {
        let _running = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let engine = self.engine();

        let ast = engine
            .compile(&formula.script)
            .map_err(|e| FormulaError::Compile(locate(formula, e.1, &e.0.to_string())))?;

        set_deadline(&self.deadline, Some(Instant::now() + timeout));
        let result = engine.eval_ast::<Dynamic>(&ast);
        set_deadline(&self.deadline, None);

        match result {
            Ok(value) => {
                let text = format_dynamic(&value);
                tracing::trace!(source = %formula.source_name, result = %text, "formula evaluated");
                Ok(text)
            }
            Err(err) => {
                let err = runtime_error(formula, *err);
                tracing::trace!(source = %formula.source_name, error = %err, "formula failed");
                Err(err)
            }
        }
    }
}

fn set_deadline(deadline: &Deadline, value: Option<Instant>) {
    *deadline.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

fn create_engine(deadline: Deadline) -> Engine {
    tracing::debug!("building formula engine");
    let mut engine = Engine::new();

    engine.on_progress(move |ops| {
        if ops % PROGRESS_INTERVAL != 0 {
            return None;
        }
        let expired = deadline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|d| Instant::now() >= d);
        expired.then_some(Dynamic::UNIT)
    });
    engine.on_print(|text| tracing::debug!(target: "tagsheet::formula", "{}", text));
    engine.on_debug(|text, source, pos| {
        tracing::debug!(target: "tagsheet::formula", ?source, %pos, "{}", text)
    });

    engine
}

/// Turn a Rhai failure into a formula error with formula-relative position.
fn runtime_error(formula: &CompiledFormula, err: EvalAltResult) -> FormulaError {
    // Errors raised inside closures and built-ins arrive wrapped in one
    // `ErrorInFunctionCall` per frame; the cause is the innermost one.
    let mut positions = vec![err.position()];
    let mut innermost = err;
    loop {
        match innermost {
            EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => {
                positions.push(inner.position());
                innermost = *inner;
            }
            other => {
                innermost = other;
                break;
            }
        }
    }

    if matches!(innermost, EvalAltResult::ErrorTerminated(..)) {
        return FormulaError::Timeout;
    }

    // Prefer the deepest frame that points into the author's own lines.
    let position = positions
        .iter()
        .rev()
        .copied()
        .find(|p| p.line().is_some_and(|l| formula.user_line(l).is_some()))
        .unwrap_or_else(|| innermost.position());

    innermost.set_position(Position::NONE);
    FormulaError::Runtime(locate(formula, position, &innermost.to_string()))
}

/// Prefix a message with its location, relative to the formula when possible.
fn locate(formula: &CompiledFormula, position: Position, message: &str) -> String {
    let (Some(line), Some(column)) = (position.line(), position.position()) else {
        return message.to_string();
    };
    let Some(formula_line) = formula.formula_line(line) else {
        return format!("{}:{}:{}: {}", formula.source_name, line, column, message);
    };
    let column = match formula.user_line(line) {
        Some(_) => column.saturating_sub(formula.indent_width()).max(1),
        None => column,
    };
    format!("{}:{}: {}", formula_line, column, message)
}
