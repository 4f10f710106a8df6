//! Diagnostic codes and helper functions for resolution and linking.
//!
//! Error codes `E200`--`E212` cover chip resolution, pin declaration and
//! connection failures. Warning codes `W200`--`W201` cover nets that are
//! never driven and child inputs left unconnected. `N200` notes a library
//! file that replaces a built-in gate.

use gatesim_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use gatesim_ir::{AddPinError, BitRange, PinKind, MAX_PIN_WIDTH};
use gatesim_source::Span;

/// No cached chip, library file or built-in gate has the requested name.
pub const E200: DiagnosticCode = DiagnosticCode::new(Category::Error, 200);

/// A library file does not declare the chip it was loaded for.
pub const E201: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);

/// Two chips with the same name.
pub const E202: DiagnosticCode = DiagnosticCode::new(Category::Error, 202);

/// Two pins with the same name on one chip.
pub const E203: DiagnosticCode = DiagnosticCode::new(Category::Error, 203);

/// A connection names a pin the instantiated chip does not have.
pub const E204: DiagnosticCode = DiagnosticCode::new(Category::Error, 204);

/// The two sides of a connection have different widths.
pub const E205: DiagnosticCode = DiagnosticCode::new(Category::Error, 205);

/// Pin width of zero or above the supported maximum.
pub const E206: DiagnosticCode = DiagnosticCode::new(Category::Error, 206);

/// A chip directly or indirectly instantiates itself.
pub const E207: DiagnosticCode = DiagnosticCode::new(Category::Error, 207);

/// A connection names an internal net of the instantiated chip.
pub const E208: DiagnosticCode = DiagnosticCode::new(Category::Error, 208);

/// A bit range is reversed or outside its pin.
pub const E209: DiagnosticCode = DiagnosticCode::new(Category::Error, 209);

/// A child output is connected to an input of the enclosing chip.
pub const E210: DiagnosticCode = DiagnosticCode::new(Category::Error, 210);

/// A chip file exists but cannot be read.
pub const E211: DiagnosticCode = DiagnosticCode::new(Category::Error, 211);

/// A pin is added to a chip that has already been linked.
pub const E212: DiagnosticCode = DiagnosticCode::new(Category::Error, 212);

/// An output or internal net that no part drives.
pub const W200: DiagnosticCode = DiagnosticCode::new(Category::Warning, 200);

/// A child input with no connection; it reads as zero.
pub const W201: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);

/// Creates the diagnostic for a chip name that resolves to nothing.
pub fn error_chip_not_found(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E200, format!("Chip `{name}` not found"), span)
        .with_help(format!("add `{name}.hdl` to the library folder"))
}

/// Creates a diagnostic for a library file that lacks the requested chip.
pub fn error_file_mismatch(name: &str, file: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E201,
        format!("file `{file}` does not declare chip `{name}`"),
        span,
    )
}

/// Creates a diagnostic for a duplicate chip name.
pub fn error_duplicate_chip(name: &str, span: Span, prev_span: Span) -> Diagnostic {
    let diag = Diagnostic::error(E202, format!("duplicate chip `{name}`"), span);
    if prev_span.is_dummy() {
        diag.with_note(format!("`{name}` is a built-in gate"))
    } else {
        diag.with_label(Label::secondary(prev_span, "previously defined here"))
    }
}

/// Converts a refused pin into a diagnostic.
pub fn error_add_pin(err: AddPinError, chip: &str, pin: &str, span: Span) -> Diagnostic {
    match err {
        AddPinError::Duplicate { previous } => {
            let diag = Diagnostic::error(
                E203,
                format!("duplicate pin `{pin}` on chip `{chip}`"),
                span,
            )
            .with_note("pin names are case-insensitive");
            if previous.is_dummy() {
                diag
            } else {
                diag.with_label(Label::secondary(previous, "previously declared here"))
            }
        }
        AddPinError::ZeroWidth => Diagnostic::error(
            E206,
            format!("pin `{pin}` on chip `{chip}` has zero width"),
            span,
        ),
        AddPinError::TooWide { width } => Diagnostic::error(
            E206,
            format!("pin `{pin}` on chip `{chip}` is {width} bits wide"),
            span,
        )
        .with_note(format!("pins are at most {MAX_PIN_WIDTH} bits wide")),
    }
}

/// Creates a diagnostic for a connection to a pin the child does not have.
pub fn error_unknown_pin(pin: &str, chip: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E204, format!("chip `{chip}` has no pin `{pin}`"), span)
}

/// Creates a diagnostic for connection sides of different widths.
pub fn error_width_mismatch(jam: &str, jam_width: u32, pin: &str, pin_width: u32, span: Span) -> Diagnostic {
    Diagnostic::error(
        E205,
        format!("width mismatch: `{jam}` is {jam_width} bits but `{pin}` is {pin_width} bits"),
        span,
    )
}

/// Creates a diagnostic for a circular instantiation.
pub fn error_circular_instantiation(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E207, format!("circular instantiation of chip `{name}`"), span)
        .with_note("the chip directly or indirectly instantiates itself")
}

/// Creates a diagnostic for a connection to a child's internal net.
pub fn error_internal_pin(pin: &str, chip: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E208,
        format!("`{pin}` is an internal net of chip `{chip}`, not a pin"),
        span,
    )
}

/// Creates a diagnostic for a bit range that does not fit its pin.
pub fn error_bad_range(pin: &str, range: BitRange, width: u32, span: Span) -> Diagnostic {
    let message = if range.is_ordered() {
        format!("bit range `{pin}{range}` is outside the {width}-bit pin")
    } else {
        format!("bit range `{pin}{range}` is reversed")
    };
    Diagnostic::error(E209, message, span)
}

/// Creates a diagnostic for a child output driving a parent input.
pub fn error_drives_input(child_pin: &str, parent_pin: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E210,
        format!("output `{child_pin}` cannot drive input `{parent_pin}`"),
        span,
    )
    .with_help("connect the output to an OUT pin or a new internal net")
}

/// Creates a diagnostic for an unreadable chip file.
pub fn error_unreadable(file: &str, err: &std::io::Error) -> Diagnostic {
    Diagnostic::error(E211, format!("cannot read `{file}`: {err}"), Span::DUMMY)
}

/// Creates a diagnostic for a pin added after its chip was linked.
pub fn error_chip_frozen(chip: &str, pin: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E212,
        format!("cannot add pin `{pin}` to chip `{chip}`: it is already linked"),
        span,
    )
    .with_note("a chip cannot change once linking has started")
}

/// Creates a warning for an output or internal net with no driver.
pub fn warn_undriven(pin: &str, kind: PinKind, chip: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W200,
        format!("{kind} `{pin}` of chip `{chip}` is never driven"),
        span,
    )
}

/// Creates a warning for a child input left unconnected.
pub fn warn_unconnected_input(pin: &str, chip: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W201,
        format!("input `{pin}` of `{chip}` is unconnected"),
        span,
    )
}

/// A library file takes the place of a built-in gate.
pub const N200: DiagnosticCode = DiagnosticCode::new(Category::Note, 200);

/// Creates the note for a library chip shadowing a built-in gate.
pub fn note_shadows_builtin(name: &str, span: Span) -> Diagnostic {
    Diagnostic::note(
        N200,
        format!("`{name}` from the library replaces the built-in gate"),
        span,
    )
}
