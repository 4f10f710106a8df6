//! The chip registry.
//!
//! [`Context`] owns every chip definition seen in a session together with
//! the interner, source database and diagnostic sink they refer to. Chips
//! are resolved lazily by name: cache, then `<name>.hdl` in the library
//! folder, then the built-in gates.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use gatesim_common::{Ident, Interner};
use gatesim_diagnostics::{Diagnostic, DiagnosticSink};
use gatesim_ir::{Arena, ChipDecl, ChipId, GateKind, PinId, PinKind};
use gatesim_source::{chip_file_name, FileId, SourceDb, Span};
use tracing::{debug, trace};

use crate::builder::DeclBuilder;
use crate::errors;

/// Progress of linking a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Not visited yet.
    Unlinked,
    /// On the current link path; meeting it again means a cycle.
    InProgress,
    /// Finished, with the memoized result.
    Linked(bool),
}

/// Registry mapping case-folded chip names to definitions.
pub struct Context {
    library: Option<PathBuf>,
    pub(crate) interner: Interner,
    pub(crate) source_db: SourceDb,
    pub(crate) sink: DiagnosticSink,
    pub(crate) chips: Arena<ChipId, ChipDecl>,
    pub(crate) status: Vec<LinkStatus>,
    by_key: HashMap<Ident, ChipId>,
    /// Case-folded names of chips declared in files that had errors.
    failed: HashSet<Ident>,
    /// Names, exactly as requested, that resolved to nothing.
    missing: HashSet<Ident>,
}

impl Context {
    /// Creates a context with no library folder: only in-memory sources and
    /// built-in gates resolve.
    pub fn new() -> Self {
        Self {
            library: None,
            interner: Interner::new(),
            source_db: SourceDb::new(),
            sink: DiagnosticSink::new(),
            chips: Arena::new(),
            status: Vec::new(),
            by_key: HashMap::new(),
            failed: HashSet::new(),
            missing: HashSet::new(),
        }
    }

    /// Creates a context that loads missing chips from `dir`.
    pub fn with_library(dir: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(dir.into()),
            ..Self::new()
        }
    }

    /// Replaces the diagnostic sink, e.g. with one that forwards to a callback.
    pub fn with_sink(mut self, sink: DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// The library folder, if any.
    pub fn library(&self) -> Option<&Path> {
        self.library.as_deref()
    }

    /// The interner all chip and pin names live in.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Every source read so far.
    pub fn source_db(&self) -> &SourceDb {
        &self.source_db
    }

    /// The sink collecting diagnostics.
    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Reports a structural problem.
    pub fn error(&self, diag: Diagnostic) {
        self.sink.emit(diag);
    }

    /// Number of errors reported so far.
    pub fn error_count(&self) -> usize {
        self.sink.error_count()
    }

    /// Returns `true` once any error has been reported.
    pub fn has_errors(&self) -> bool {
        self.sink.has_errors()
    }

    /// Resolves a chip by name, loading it on first use.
    ///
    /// Returns `None` and reports `Chip `name` not found` when neither the
    /// library nor the built-in gates provide it.
    pub fn chip(&mut self, name: &str) -> Option<ChipId> {
        self.resolve(name, Span::DUMMY)
    }

    /// Returns an already registered chip without loading anything.
    pub fn lookup(&self, name: &str) -> Option<ChipId> {
        let key = self.interner.get(&name.to_ascii_lowercase())?;
        self.by_key.get(&key).copied()
    }

    /// Read access to a chip definition.
    pub fn decl(&self, id: ChipId) -> Option<&ChipDecl> {
        self.chips.get(id)
    }

    /// Iterates over every registered chip.
    pub fn decls(&self) -> impl Iterator<Item = (ChipId, &ChipDecl)> {
        self.chips.iter()
    }

    /// The name of a chip as written, or `""` for an unknown ID.
    pub fn chip_name(&self, id: ChipId) -> &str {
        self.chips
            .get(id)
            .map_or("", |decl| self.interner.resolve(decl.name))
    }

    /// Adds a pin to a chip.
    ///
    /// Reports exactly one error and returns `None` if the name is taken
    /// (case-insensitively), the width is unsupported, or linking of the
    /// chip has already started.
    pub fn add_pin(
        &mut self,
        chip: ChipId,
        name: &str,
        width: u32,
        kind: PinKind,
        span: Span,
    ) -> Option<PinId> {
        let status = self.status.get(chip.as_raw() as usize).copied()?;
        if status != LinkStatus::Unlinked {
            self.sink
                .emit(errors::error_chip_frozen(self.chip_name(chip), name, span));
            return None;
        }
        let ident = self.interner.get_or_intern(name);
        self.add_pin_ident(chip, ident, width, kind, span)
    }

    pub(crate) fn add_pin_ident(
        &mut self,
        chip: ChipId,
        name: Ident,
        width: u32,
        kind: PinKind,
        span: Span,
    ) -> Option<PinId> {
        let key = self.interner.fold_ident(name);
        let decl = self.chips.get_mut(chip)?;
        match decl.add_pin(name, key, width, kind, span) {
            Ok(id) => Some(id),
            Err(err) => {
                let diag = errors::error_add_pin(
                    err,
                    self.interner.resolve(decl.name),
                    self.interner.resolve(name),
                    span,
                );
                self.sink.emit(diag);
                None
            }
        }
    }

    /// Parses in-memory HDL text and registers every chip it declares.
    ///
    /// If the text has syntax or declaration errors, nothing is registered.
    pub fn add_source(&mut self, name: &str, text: &str) -> Vec<ChipId> {
        let file = self.source_db.add_source(name, text.to_string());
        self.load_parsed(file).unwrap_or_default()
    }

    /// Reads, parses and registers a chip file.
    pub fn load_file(&mut self, path: &Path) -> Vec<ChipId> {
        match self.source_db.load_file(path) {
            Ok(file) => self.load_parsed(file).unwrap_or_default(),
            Err(err) => {
                self.sink
                    .emit(errors::error_unreadable(&path.display().to_string(), &err));
                Vec::new()
            }
        }
    }

    pub(crate) fn resolve(&mut self, name: &str, span: Span) -> Option<ChipId> {
        let key = self.interner.fold(name);
        if let Some(&id) = self.by_key.get(&key) {
            return Some(id);
        }
        let exact = self.interner.get_or_intern(name);
        if self.failed.contains(&key) || self.missing.contains(&exact) {
            trace!(chip = name, "already failed");
            return None;
        }

        if let Some(folder) = self.library.clone() {
            match self.source_db.load_chip(&folder, name) {
                Ok(Some(file)) => {
                    debug!(chip = name, path = %folder.join(chip_file_name(name)).display(), "loading chip file");
                    let loaded = self.load_parsed(file).is_some();
                    if let Some(&id) = self.by_key.get(&key) {
                        if GateKind::from_name(name).is_some() {
                            self.sink
                                .emit(errors::note_shadows_builtin(name, self.chips[id].span));
                        }
                        return Some(id);
                    }
                    if loaded {
                        self.sink
                            .emit(errors::error_file_mismatch(name, &chip_file_name(name), span));
                    }
                    self.missing.insert(exact);
                    return None;
                }
                Ok(None) => {}
                Err(err) => {
                    self.sink
                        .emit(errors::error_unreadable(&chip_file_name(name), &err));
                    self.missing.insert(exact);
                    return None;
                }
            }
        }

        if let Some(gate) = GateKind::from_name(name) {
            debug!(chip = name, "using built-in gate");
            return self.register(gate.decl(&self.interner));
        }

        self.sink.emit(errors::error_chip_not_found(name, span));
        self.missing.insert(exact);
        None
    }

    fn load_parsed(&mut self, file: FileId) -> Option<Vec<ChipId>> {
        let before = self.sink.error_count();
        let ast = gatesim_parser::parse_file(file, &self.source_db, &self.interner, &self.sink);
        let decls = if self.sink.error_count() == before {
            DeclBuilder::build(&self.interner, &self.sink, &ast)
        } else {
            Vec::new()
        };
        if self.sink.error_count() > before {
            debug!(
                path = %self.source_db.get_file(file).path.display(),
                errors = self.sink.error_count() - before,
                "skipping file with errors"
            );
            for chip in ast.chip_defs() {
                self.failed.insert(self.interner.fold_ident(chip.name));
            }
            return None;
        }
        Some(decls.into_iter().filter_map(|d| self.register(d)).collect())
    }

    fn register(&mut self, decl: ChipDecl) -> Option<ChipId> {
        if let Some(&existing) = self.by_key.get(&decl.key) {
            self.sink.emit(errors::error_duplicate_chip(
                self.interner.resolve(decl.name),
                decl.span,
                self.chips[existing].span,
            ));
            return None;
        }
        let key = decl.key;
        trace!(chip = self.interner.resolve(decl.name), "registered");
        let id = self.chips.alloc(decl);
        self.status.push(LinkStatus::Unlinked);
        self.by_key.insert(key, id);
        self.failed.remove(&key);
        Some(id)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
