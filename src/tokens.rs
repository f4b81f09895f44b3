//! Marker and placeholder literals shared by both transform directions.
//!
//! The uncloak table is ordered: a later substitution must not re-trigger an
//! earlier pattern, so the end-of-subset sentinel is restored before the
//! leading `<?DOCTYPE` is rewritten back into a declaration.

/// Inner marker text; its presence anywhere in a document means "cloaked".
pub(crate) const MARKER: &str = "DO NOT REMOVE THIS COMMENT! This is a 'cloaked' document";

/// The marker as appended to cloaked output, wrapped as a processing
/// instruction.
pub(crate) const MARKER_PI: &str =
    "<?DO NOT REMOVE THIS COMMENT! This is a 'cloaked' document?>";

/// Placeholder for an ampersand outside CDATA; restores to a bare `&`.
pub(crate) const AMP_ENT: &str = "##AMP_ENT##";

/// Placeholder for an ampersand inside CDATA; restores to `&amp;`.
pub(crate) const AMP_CDATA_ENT: &str = "##AMP_CDATA_ENT##";

pub(crate) const LEFT_SQUARE_BRACKET: &str = "xxLEFT_SQUARE_BRACKETxx";
pub(crate) const RIGHT_SQUARE_BRACKET: &str = "xxRIGHT_SQUARE_BRACKETxx";
pub(crate) const GREATER_THAN: &str = "xxGREATER_THANxx";
pub(crate) const LESS_THAN: &str = "xxLESS_THANxx";

/// Closes the processing instruction that stands in for a DOCTYPE
/// declaration.
pub(crate) const END_SUBSET: &str = "_END_SUBSET?>";

/// Ordered literal substitutions applied during uncloak. Every occurrence of
/// the left-hand token is replaced, unconditionally, top to bottom.
pub(crate) const UNCLOAK_TABLE: &[(&str, &str)] = &[
    (MARKER_PI, "\n"),
    (AMP_ENT, "&"),
    (AMP_CDATA_ENT, "&amp;"),
    ("xnclude", "xi:include"),
    (LEFT_SQUARE_BRACKET, "["),
    (RIGHT_SQUARE_BRACKET, "]"),
    (GREATER_THAN, ">"),
    (LESS_THAN, "<"),
    (END_SUBSET, ">\n"),
    ("<?DOCTYPE", "\n<!DOCTYPE"),
];
