//! Memoized formula evaluation over a whole sheet.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tagsheet_engine::FormulaError;
use tagsheet_engine::engine::{ColumnKind, DEFAULT_TIMEOUT, Row, Sandbox, Sheet, compile};

/// Result of one formula cell.
pub type CellResult = std::result::Result<String, FormulaError>;

/// rowId → formula columnId → result.
pub type ComputedSheet = BTreeMap<String, BTreeMap<String, CellResult>>;

struct CachedCell {
    columns_fp: u64,
    inputs_fp: u64,
    result: CellResult,
}

/// Evaluates every formula cell of a sheet, rerunning only cells whose
/// columns or row inputs changed since the previous pass.
pub struct FormulaRuntime {
    sandbox: Arc<Sandbox>,
    timeout: Duration,
    cache: HashMap<(String, String), CachedCell>,
    recomputed: usize,
}

impl FormulaRuntime {
    pub fn new(sandbox: Arc<Sandbox>) -> FormulaRuntime {
        FormulaRuntime::with_timeout(sandbox, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(sandbox: Arc<Sandbox>, timeout: Duration) -> FormulaRuntime {
        FormulaRuntime {
            sandbox,
            timeout,
            cache: HashMap::new(),
            recomputed: 0,
        }
    }

    /// Number of cells evaluated by the last `compute` call.
    pub fn recomputed(&self) -> usize {
        self.recomputed
    }

    pub fn cached_cells(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized result.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn compute(&mut self, sheet: &Sheet) -> ComputedSheet {
        let columns_fp = fingerprint(&sheet.columns);
        let inputs = sheet.input_columns();
        let formulas: Vec<_> = sheet
            .columns
            .iter()
            .filter_map(|c| match &c.kind {
                ColumnKind::Formula {
                    formula,
                    formula_type,
                } => Some((c.id.as_str(), formula.as_str(), *formula_type)),
                _ => None,
            })
            .collect();

        self.recomputed = 0;
        let mut computed = ComputedSheet::new();
        let mut live = HashSet::new();

        for row in &sheet.rows {
            let inputs_fp = fingerprint(
                &inputs
                    .iter()
                    .map(|c| (c.id.as_str(), row.value(&c.id)))
                    .collect::<Vec<_>>(),
            );
            let results = computed.entry(row.id.clone()).or_default();

            for &(column_id, source, formula_type) in &formulas {
                let key = (row.id.clone(), column_id.to_string());
                let result = match self.cache.get(&key) {
                    Some(cell) if cell.columns_fp == columns_fp && cell.inputs_fp == inputs_fp => {
                        cell.result.clone()
                    }
                    _ => {
                        let compiled = compile(formula_type, source, &inputs, row)
                            .named(format!("formula_{}_{}", row.id, column_id));
                        let result = self.sandbox.evaluate(&compiled, self.timeout);
                        self.recomputed += 1;
                        self.cache.insert(
                            key.clone(),
                            CachedCell {
                                columns_fp,
                                inputs_fp,
                                result: result.clone(),
                            },
                        );
                        result
                    }
                };
                results.insert(column_id.to_string(), result);
                live.insert(key);
            }
        }

        self.cache.retain(|key, _| live.contains(key));
        tracing::debug!(
            sheet = %sheet.id,
            cells = live.len(),
            recomputed = self.recomputed,
            "formula pass"
        );
        computed
    }
}

fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Overlay successful formula results onto row values for display.
pub fn inject_computed(rows: &[Row], computed: &ComputedSheet) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            if let Some(results) = computed.get(&row.id) {
                for (column_id, result) in results {
                    if let Ok(value) = result {
                        row.values.insert(column_id.clone(), value.clone());
                    }
                }
            }
            row
        })
        .collect()
}
