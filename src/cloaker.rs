//! Cloaker module: the transform engine.
//!
//! Both directions are pure text rewriting over an opaque string; no XML is
//! ever parsed. Cloaking appends the marker and masks constructs in a fixed
//! order, uncloaking replays the literal token table. Matching is
//! best-effort: unbalanced CDATA or DOCTYPE markers are not detected and
//! simply produce a partial transform.

use crate::tokens::{
    AMP_CDATA_ENT, AMP_ENT, END_SUBSET, GREATER_THAN, LEFT_SQUARE_BRACKET, LESS_THAN, MARKER,
    MARKER_PI, RIGHT_SQUARE_BRACKET, UNCLOAK_TABLE,
};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

// Compiled once on first use, shared across all calls.
static DTD_INTERNAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!(DOCTYPE[^>]*\[[^\]]*\]\s*)>").expect("valid pattern"));
static DTD_BASIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!(DOCTYPE[^>]*)>").expect("valid pattern"));
static CDATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!\[CDATA\[(.*?)\]\]>").expect("valid pattern"));

/// Returns true if the content carries the cloak marker.
pub fn is_cloaked(content: &str) -> bool {
    content.contains(MARKER)
}

/// Returns the cloaked variant of the given XML content.
///
/// The input must not already be cloaked and must not contain any of the
/// placeholder literals; neither condition is checked here. Callers gate on
/// [`is_cloaked`] before cloaking.
pub fn cloak(content: &str) -> String {
    let mut content = format!("{content}{MARKER_PI}");

    content = content.replace("xi:include", "xnclude");
    content = mask_doctype(&content);
    content = mask_cdata_ampersands(&content);

    // remaining ampersands are entity references outside CDATA
    content.replace('&', AMP_ENT)
}

/// Reverses [`cloak`] by replaying the literal token table.
///
/// CDATA ampersands come back as `&amp;` rather than `&`, the marker is
/// restored as a trailing newline, and the DOCTYPE declaration regains a
/// newline on each side. Callers are expected to check [`is_cloaked`] first;
/// running this on plain text is unsupported.
pub fn uncloak(content: &str) -> String {
    let mut content = content.to_string();

    for (token, original) in UNCLOAK_TABLE {
        content = content.replace(token, original);
    }

    content
}

/// Reads the file at `path` and returns its cloaked content, ready to be fed
/// to an XML toolchain in place of the original document.
pub fn cloak_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    Ok(cloak(&content))
}

/// Masks the first DOCTYPE declaration, if any, as a processing instruction.
///
/// A declaration carrying an internal subset takes precedence; its structural
/// characters are individually escaped so the subset survives inside the
/// instruction. Only the first match is masked; further DOCTYPE-like strings
/// are left alone.
fn mask_doctype(content: &str) -> String {
    if let Some(caps) = DTD_INTERNAL.captures(content) {
        if let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) {
            let subset = body
                .as_str()
                .replace('[', LEFT_SQUARE_BRACKET)
                .replace(']', RIGHT_SQUARE_BRACKET)
                .replace('>', GREATER_THAN)
                .replace('<', LESS_THAN);
            return replace_span(content, whole.range(), &format!("<?{subset}{END_SUBSET}"));
        }
    }

    if let Some(caps) = DTD_BASIC.captures(content) {
        if let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) {
            // a basic declaration contains none of the subset characters
            let masked = format!("<?{}{}", body.as_str(), END_SUBSET);
            return replace_span(content, whole.range(), &masked);
        }
    }

    content.to_string()
}

/// Swaps every ampersand inside a CDATA section for the CDATA-scoped
/// placeholder. Sections are matched lazily, left to right, non-overlapping,
/// and must sit on a single line; anything unmatched falls through to the
/// generic ampersand pass.
fn mask_cdata_ampersands(content: &str) -> String {
    CDATA
        .replace_all(content, |caps: &Captures| {
            format!("<![CDATA[{}]]>", caps[1].replace('&', AMP_CDATA_ENT))
        })
        .into_owned()
}

fn replace_span(content: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() + replacement.len());
    out.push_str(&content[..range.start]);
    out.push_str(replacement);
    out.push_str(&content[range.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = concat!(
        "<?xml version=\"1.0\"?>\n",
        "<!DOCTYPE root [<!ENTITY a \"b\">]>\n",
        "<root>&a;</root>\n",
    );

    #[test]
    fn test_is_cloaked_detection() {
        assert!(!is_cloaked(DOC));
        assert!(is_cloaked(&cloak(DOC)));
    }

    #[test]
    fn test_round_trip_plain_text() {
        let text = "<root>plain</root>";
        assert_eq!(uncloak(&cloak(text)), format!("{text}\n"));
    }

    #[test]
    fn test_generic_ampersand_round_trip() {
        assert_eq!(uncloak(&cloak("a & b & c")), "a & b & c\n");
    }

    #[test]
    fn test_no_doctype_leaves_structure_untouched() {
        let cloaked = cloak("<root>hi</root>");
        assert!(cloaked.starts_with("<root>hi</root><?"));
    }

    #[test]
    fn test_entity_references_masked() {
        let cloaked = cloak(DOC);
        assert!(!cloaked.contains('&'));
        assert!(cloaked.contains(&format!("{AMP_ENT}a;")));
    }

    #[test]
    fn test_internal_subset_takes_precedence() {
        let cloaked = cloak(DOC);
        assert!(!cloaked.contains("<!DOCTYPE"));
        assert!(cloaked.contains(LEFT_SQUARE_BRACKET));
        assert!(cloaked.contains(RIGHT_SQUARE_BRACKET));
        assert!(cloaked.contains(GREATER_THAN));
        assert!(cloaked.contains(LESS_THAN));
        assert!(uncloak(&cloaked).contains("<!DOCTYPE root [<!ENTITY a \"b\">]>"));
    }

    #[test]
    fn test_basic_doctype_masked_without_escaping() {
        let cloaked = cloak("<!DOCTYPE root SYSTEM \"root.dtd\">\n<root/>\n");
        assert!(cloaked.contains("<?DOCTYPE root SYSTEM \"root.dtd\"_END_SUBSET?>"));
        assert!(!cloaked.contains(LEFT_SQUARE_BRACKET));
        assert!(uncloak(&cloaked).contains("<!DOCTYPE root SYSTEM \"root.dtd\">"));
    }

    #[test]
    fn test_doctype_round_trip_exact() {
        // the declaration regains a newline on each side, the marker restores
        // as a trailing newline
        assert_eq!(
            uncloak(&cloak(DOC)),
            concat!(
                "<?xml version=\"1.0\"?>\n",
                "\n<!DOCTYPE root [<!ENTITY a \"b\">]>\n",
                "\n<root>&a;</root>\n",
                "\n",
            )
        );
    }

    #[test]
    fn test_first_doctype_only() {
        let cloaked = cloak("<!DOCTYPE a>\n<root/>\n<!DOCTYPE b>\n");
        assert!(cloaked.contains("<?DOCTYPE a_END_SUBSET?>"));
        assert!(cloaked.contains("<!DOCTYPE b>"));
    }

    #[test]
    fn test_cdata_ampersand_becomes_entity() {
        assert_eq!(
            uncloak(&cloak("<![CDATA[a & b]]>")),
            "<![CDATA[a &amp; b]]>\n"
        );
    }

    #[test]
    fn test_cdata_ampersand_distinct_from_generic() {
        let cloaked = cloak("<x>&lt;</x><![CDATA[a & b]]>");
        assert!(cloaked.contains(AMP_CDATA_ENT));
        assert!(cloaked.contains(AMP_ENT));
        assert_eq!(uncloak(&cloaked), "<x>&lt;</x><![CDATA[a &amp; b]]>\n");
    }

    #[test]
    fn test_multiple_cdata_sections() {
        let text = "<a><![CDATA[x & y]]></a><b><![CDATA[p && q]]></b>";
        let cloaked = cloak(text);
        assert_eq!(cloaked.matches(AMP_CDATA_ENT).count(), 3);
        assert_eq!(
            uncloak(&cloaked),
            "<a><![CDATA[x &amp; y]]></a><b><![CDATA[p &amp;&amp; q]]></b>\n"
        );
    }

    #[test]
    fn test_multiline_cdata_takes_generic_path() {
        // the section pattern does not cross lines; ampersands in a multiline
        // section are treated as ordinary entity references and restore to `&`
        let text = "<![CDATA[a\n& b]]>";
        let cloaked = cloak(text);
        assert!(cloaked.contains(AMP_ENT));
        assert!(!cloaked.contains(AMP_CDATA_ENT));
        assert_eq!(uncloak(&cloaked), format!("{text}\n"));
    }

    #[test]
    fn test_xinclude_masking() {
        let cloaked = cloak("<xi:include href=\"x\"/>");
        assert!(!cloaked.contains("xi:include"));
        assert_eq!(uncloak(&cloaked), "<xi:include href=\"x\"/>\n");
    }

    #[test]
    fn test_double_cloak_produces_two_markers() {
        let twice = cloak(&cloak("<root/>"));
        assert_eq!(twice.matches(MARKER).count(), 2);
    }

    #[test]
    fn test_cloak_file_reads_and_cloaks() {
        let path = std::env::temp_dir().join("xml-cloak-test-input.xml");
        fs::write(&path, "<root>&amp;</root>").unwrap();

        let cloaked = cloak_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert!(is_cloaked(&cloaked));
        assert!(!cloaked.contains('&'));
    }

    #[test]
    fn test_cloak_file_missing_path() {
        assert!(cloak_file("definitely/not/here.xml").is_err());
    }
}
