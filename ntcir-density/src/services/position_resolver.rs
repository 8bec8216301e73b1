//! Paragraph position resolution
//!
//! A paragraph identifier ends in `_<N>`, the 1-based ordinal of the paragraph
//! in its document. The position of a paragraph is `N / M`, where `M` is the
//! largest ordinal among the paragraphs actually present in the document.
//! Missing paragraphs (gaps) are tolerated; `M` is never a declared total.

use ntcir_common::{Error, Result};
use std::path::Path;

/// Extract the ordinal `N` from an identifier of the form `<prefix>_<N>`
///
/// `document` is only used for error context.
pub fn paragraph_number(identifier: &str, document: &Path) -> Result<u64> {
    let malformed = |reason: &str| Error::MalformedIdentifier {
        identifier: identifier.to_string(),
        document: document.to_path_buf(),
        reason: reason.to_string(),
    };

    let (_, suffix) = identifier
        .rsplit_once('_')
        .ok_or_else(|| malformed("no `_<N>` ordinal suffix"))?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("ordinal suffix is not a number"));
    }

    let number: u64 = suffix
        .parse()
        .map_err(|_| malformed("ordinal suffix out of range"))?;

    if number == 0 {
        return Err(malformed("ordinal must be positive"));
    }

    Ok(number)
}

/// Position of `identifier` among `siblings`, in (0, 1]
///
/// `siblings` is every paragraph identifier present in the document,
/// including `identifier` itself.
pub fn resolve_position<'a, I>(document: &Path, identifier: &str, siblings: I) -> Result<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let number = paragraph_number(identifier, document)?;

    let mut total = 0u64;
    for sibling in siblings {
        total = total.max(paragraph_number(sibling, document)?);
    }

    if total == 0 || total < number {
        return Err(Error::InvariantViolation(format!(
            "paragraph {} in {} has ordinal {} but the largest ordinal present is {}",
            identifier,
            document.display(),
            number,
            total
        )));
    }

    Ok(number as f64 / total as f64)
}
