//! Genomic-interval query parser: turns a UCSC- or BED-style
//! string into a resolved `(chromosome, start, end)` triple.
//!
//! `parse_ucsc`/`parse_bed` share the same delimiter search order and
//! thousands-separator stripping; errors carry enough context to point
//! at the offending substring.

use crate::error::{HicError, Result};
use crate::reference::Reference;

/// A parsed, resolved genomic interval: `[start, end)` on a chromosome
/// known to the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicInterval {
    pub chrom_id: u32,
    pub chrom_name: String,
    pub start: u32,
    pub end: u32,
}

impl GenomicInterval {
    #[inline]
    pub fn size(&self) -> u32 {
        self.end - self.start
    }

    fn whole_chrom(reference: &Reference, chrom_id: u32) -> Self {
        let chrom = reference.get(chrom_id).expect("valid chrom id");
        GenomicInterval {
            chrom_id,
            chrom_name: chrom.name().to_string(),
            start: 0,
            end: chrom.length(),
        }
    }
}

/// Parse a UCSC-style query: a bare chromosome name, or `chrom:start-end`
/// (also accepting `chrom:pos`, treated as a single-base interval, and
/// thousands separators inside the position fields, e.g. `chr1:1,000-2,000`).
pub fn parse_ucsc(reference: &Reference, query: &str) -> Result<GenomicInterval> {
    if query.is_empty() {
        return Err(HicError::invalid_query("query is empty"));
    }

    if let Some(id) = reference.id_of(query) {
        return Ok(GenomicInterval::whole_chrom(reference, id));
    }

    let p1 = memchr::memrchr(b':', query.as_bytes());
    let p2 = memchr::memrchr(b'-', query.as_bytes());

    let (p1, p2) = match (p1, p2) {
        (None, None) => {
            return Err(HicError::invalid_query(format!(
                "invalid chromosome \"{query}\" in query \"{query}\""
            )));
        }
        (Some(p1), Some(p2)) if p1 <= p2 => (p1, p2),
        _ => {
            return Err(HicError::invalid_query(format!(
                "query \"{query}\" is malformed"
            )));
        }
    };

    // Strip thousands separators only from the position portion (after the
    // chromosome name), matching the original's "erase commas found at or
    // past p1" behaviour.
    let (name_part, rest) = query.split_at(p1);
    let rest_no_commas: String = rest.chars().filter(|&c| c != ',').collect();
    let p2_rel = rest_no_commas
        .rfind('-')
        .ok_or_else(|| HicError::invalid_query(format!("query \"{query}\" is malformed")))?;

    let mut bed_like = String::with_capacity(name_part.len() + rest_no_commas.len());
    bed_like.push_str(name_part);
    bed_like.push('\t');
    bed_like.push_str(&rest_no_commas[1..p2_rel]);
    bed_like.push('\t');
    bed_like.push_str(&rest_no_commas[p2_rel + 1..]);

    parse_bed(reference, &bed_like, '\t')
}

/// Parse a tab-separated (or `sep`-separated) 3-field query:
/// `chrom<sep>start<sep>end`.
pub fn parse_bed(reference: &Reference, query: &str, sep: char) -> Result<GenomicInterval> {
    if query.is_empty() {
        return Err(HicError::invalid_query("query is empty"));
    }

    let sep_byte = sep as u8;
    let p1 = memchr::memchr(sep_byte, query.as_bytes());
    let p2 = p1.and_then(|p1| memchr::memchr(sep_byte, query[p1 + 1..].as_bytes()).map(|rel| p1 + 1 + rel));

    let (p1, p2) = match (p1, p2) {
        (Some(p1), Some(p2)) if p1 <= p2 => (p1, p2),
        _ => {
            return Err(HicError::invalid_query(format!(
                "query \"{query}\" is malformed"
            )));
        }
    };

    let chrom_name = &query[..p1];
    let start_str = &query[p1 + 1..p2];
    let end_str = &query[p2 + 1..];

    let chrom_id = reference.id_of(chrom_name).ok_or_else(|| {
        HicError::invalid_query(format!(
            "invalid chromosome \"{chrom_name}\" in query \"{query}\""
        ))
    })?;

    if start_str.is_empty() {
        return Err(HicError::invalid_query(format!(
            "query \"{query}\" is malformed: missing start position"
        )));
    }
    if end_str.is_empty() {
        return Err(HicError::invalid_query(format!(
            "query \"{query}\" is malformed: missing end position"
        )));
    }

    let start: u32 = start_str.parse().map_err(|_| {
        HicError::invalid_query(format!(
            "invalid start position \"{start_str}\" in query \"{query}\""
        ))
    })?;
    let end: u32 = end_str.parse().map_err(|_| {
        HicError::invalid_query(format!(
            "invalid end position \"{end_str}\" in query \"{query}\""
        ))
    })?;

    let chrom = reference.get(chrom_id).expect("id_of returned a valid id");

    if end > chrom.length() {
        return Err(HicError::invalid_query(format!(
            "invalid end position \"{end}\" in query \"{query}\": end position is greater than the chromosome size ({end} > {})",
            chrom.length()
        )));
    }
    if start >= end {
        return Err(HicError::invalid_query(format!(
            "invalid query \"{query}\": query end position should be greater than the start position ({start} >= {end})"
        )));
    }

    Ok(GenomicInterval {
        chrom_id,
        chrom_name: chrom_name.to_string(),
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Reference {
        Reference::new(vec![("chr1".into(), 1000), ("chr2".into(), 500)]).unwrap()
    }

    #[test]
    fn bare_chromosome_name_spans_whole_chromosome() {
        let r = reference();
        let gi = parse_ucsc(&r, "chr1").unwrap();
        assert_eq!((gi.start, gi.end), (0, 1000));
    }

    #[test]
    fn ucsc_range_with_thousands_separators() {
        let r = reference();
        let gi = parse_ucsc(&r, "chr1:100-1,000").unwrap();
        assert_eq!((gi.chrom_id, gi.start, gi.end), (0, 100, 1000));
    }

    #[test]
    fn bed_three_column_parses() {
        let r = reference();
        let gi = parse_bed(&r, "chr2\t0\t500", '\t').unwrap();
        assert_eq!((gi.chrom_id, gi.start, gi.end), (1, 0, 500));
    }

    #[test]
    fn empty_query_is_rejected() {
        let r = reference();
        assert!(parse_ucsc(&r, "").is_err());
        assert!(parse_bed(&r, "", '\t').is_err());
    }

    #[test]
    fn unknown_chromosome_is_rejected() {
        let r = reference();
        assert!(parse_ucsc(&r, "chr9:0-100").is_err());
    }

    #[test]
    fn end_past_chromosome_length_is_rejected() {
        let r = reference();
        assert!(parse_bed(&r, "chr2\t0\t501", '\t').is_err());
    }

    #[test]
    fn start_equal_end_is_rejected() {
        let r = reference();
        assert!(parse_bed(&r, "chr1\t100\t100", '\t').is_err());
    }
}
