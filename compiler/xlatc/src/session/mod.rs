//! Batch translation.

use rayon::prelude::*;
use xlat_codegen::{
    translate_unit, GeneratedFile, GeneratedType, NameTable, OrderNote, Options, TranslateError,
    TypeIndex,
};
use xlat_diagnostic::{emitter, Diagnostic, DiagnosticQueue, ErrorGuaranteed};
use xlat_ir::CompilationUnit;

use crate::combine::{self, CombineMode, HeaderMapping};

/// Worker stack size. Lowering recurses over expression trees and grows
/// the stack on demand, but a large initial stack keeps that rare.
const WORKER_STACK: usize = 32 * 1024 * 1024;

/// A batch that could not be translated at all.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The translator received input its resolver contract rules out.
    #[error("{unit}: {diagnostic}")]
    Internal {
        unit: String,
        diagnostic: Diagnostic,
    },
}

/// What became of one unit.
#[derive(Clone, Debug)]
pub enum UnitOutcome {
    Translated {
        types: Vec<GeneratedType>,
        files: Vec<GeneratedFile>,
        warnings: Vec<Diagnostic>,
    },
    /// No artifacts; `diagnostics` holds at least one error.
    Failed {
        diagnostics: Vec<Diagnostic>,
        guarantee: ErrorGuaranteed,
    },
}

impl UnitOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed { .. })
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            UnitOutcome::Translated { warnings, .. } => warnings,
            UnitOutcome::Failed { diagnostics, .. } => diagnostics,
        }
    }

    pub fn types(&self) -> &[GeneratedType] {
        match self {
            UnitOutcome::Translated { types, .. } => types,
            UnitOutcome::Failed { .. } => &[],
        }
    }
}

/// Results of a batch, in input order.
#[derive(Clone, Debug)]
pub struct BatchOutput {
    pub units: Vec<UnitOutcome>,
    /// The combined pair, in [`CombineMode::Combined`].
    pub combined: Option<Vec<GeneratedFile>>,
    /// Ordering decisions made for the combined output.
    pub order_notes: Vec<OrderNote>,
    pub header_mapping: HeaderMapping,
}

impl BatchOutput {
    /// Files to write: the combined pair if there is one, else every
    /// translated unit's files in input order.
    pub fn files(&self) -> Vec<&GeneratedFile> {
        if let Some(combined) = &self.combined {
            return combined.iter().collect();
        }
        self.units
            .iter()
            .filter_map(|u| match u {
                UnitOutcome::Translated { files, .. } => Some(files.iter()),
                UnitOutcome::Failed { .. } => None,
            })
            .flatten()
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_failed()).count()
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.units.iter().find_map(|u| match u {
            UnitOutcome::Failed { guarantee, .. } => Some(*guarantee),
            UnitOutcome::Translated { .. } => None,
        })
    }

    /// Every diagnostic as `File.java:line:col: severity[code]: message`.
    ///
    /// `units` must be the batch that produced this output.
    pub fn render_diagnostics(&self, units: &[CompilationUnit]) -> String {
        let mut out = String::new();
        for (unit, outcome) in units.iter().zip(&self.units) {
            if outcome.diagnostics().is_empty() {
                continue;
            }
            let lines = unit.line_index();
            for diag in outcome.diagnostics() {
                out.push_str(&emitter::render(diag, &unit.file_name, &lines));
                out.push('\n');
            }
        }
        out
    }
}

/// Translation settings shared by every batch.
#[derive(Clone, Debug, Default)]
pub struct Session {
    options: Options,
    combine: CombineMode,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Session {
            options,
            combine: CombineMode::PerUnit,
        }
    }

    #[must_use]
    pub fn with_combine(mut self, mode: CombineMode) -> Self {
        self.combine = mode;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Translate a batch.
    ///
    /// Every unit is translated against names and type summaries of the
    /// whole batch. A unit with a structural error is reported as
    /// [`UnitOutcome::Failed`] and the rest still translate; an internal
    /// error aborts the batch.
    pub fn translate(&self, units: &[CompilationUnit]) -> Result<BatchOutput, BatchError> {
        let _span = tracing::info_span!("translate_batch", units = units.len()).entered();

        let mut names = NameTable::new(&self.options);
        let registration: Vec<Option<TranslateError>> =
            units.iter().map(|unit| names.register(unit).err()).collect();
        let index = TypeIndex::build(units, &self.options);

        let translate_one = |(unit, registered): (&CompilationUnit, &Option<TranslateError>)| {
            match registered {
                Some(err) => Err(err.clone()),
                None => translate_unit(unit, &names, &index, &self.options),
            }
        };
        let results: Vec<_> = rayon::ThreadPoolBuilder::new()
            .stack_size(WORKER_STACK)
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| {
                    units
                        .par_iter()
                        .zip(registration.par_iter())
                        .map(translate_one)
                        .collect::<Vec<_>>()
                })
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), translating sequentially");
                units.iter().zip(&registration).map(translate_one).collect()
            });

        let mut outcomes = Vec::with_capacity(results.len());
        for (unit, result) in units.iter().zip(results) {
            outcomes.push(outcome(unit, result)?);
        }

        let mut output = BatchOutput {
            units: outcomes,
            combined: None,
            order_notes: Vec::new(),
            header_mapping: HeaderMapping::new(),
        };
        match &self.combine {
            CombineMode::PerUnit => {
                for ty in output.units.iter().flat_map(UnitOutcome::types) {
                    if ty.exported {
                        output.header_mapping.insert(&ty.name, ty.header.as_str());
                    }
                }
            }
            CombineMode::Combined { name } => {
                let sources: Vec<&str> = units
                    .iter()
                    .zip(&output.units)
                    .filter(|(_, o)| !o.is_failed())
                    .map(|(u, _)| u.file_name.as_str())
                    .collect();
                let types: Vec<&GeneratedType> =
                    output.units.iter().flat_map(UnitOutcome::types).collect();
                let combined = combine::combine(name, &sources, &types, &self.options);
                output.combined = Some(combined.files);
                output.order_notes = combined.notes;
                output.header_mapping = combined.mapping;
            }
        }

        tracing::info!(
            failed = output.error_count(),
            files = output.files().len(),
            "batch translated"
        );
        Ok(output)
    }
}

fn outcome(
    unit: &CompilationUnit,
    result: Result<xlat_codegen::UnitOutput, TranslateError>,
) -> Result<UnitOutcome, BatchError> {
    match result {
        Ok(out) => {
            // Deduplicated and in source order.
            let mut queue = DiagnosticQueue::new(&unit.source);
            for warning in out.warnings {
                queue.add(warning);
            }
            Ok(UnitOutcome::Translated {
                types: out.types,
                files: out.files,
                warnings: queue.flush(),
            })
        }
        Err(err) if err.is_internal() => {
            tracing::error!(unit = %unit.file_name, %err, "internal translator error");
            Err(BatchError::Internal {
                unit: unit.file_name.clone(),
                diagnostic: err.to_diagnostic(),
            })
        }
        Err(err) => {
            tracing::debug!(unit = %unit.file_name, %err, "unit failed");
            let mut queue = DiagnosticQueue::new(&unit.source);
            let guarantee = queue.emit_error(err.to_diagnostic());
            Ok(UnitOutcome::Failed {
                diagnostics: queue.flush(),
                guarantee,
            })
        }
    }
}

#[cfg(test)]
mod tests;
