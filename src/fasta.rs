//! FASTA record assembly.

/// Residues per sequence line.
const LINE_WIDTH: usize = 60;

/// Format one FASTA record: a `>` header line followed by the sequence
/// wrapped at 60 columns.
pub fn format_record(id: &str, comment: &str, sequence: &str) -> String {
    let mut out = String::with_capacity(id.len() + comment.len() + sequence.len() + 16);
    out.push('>');
    out.push_str(id);
    if !comment.is_empty() {
        out.push(' ');
        out.push_str(comment);
    }
    out.push('\n');

    let residues: Vec<char> = sequence.chars().collect();
    for line in residues.chunks(LINE_WIDTH) {
        out.extend(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_with_comment() {
        let rec = format_record("fig|83333.1.peg.4", "thr operon leader peptide", "MKRIST");
        assert!(rec.starts_with(">fig|83333.1.peg.4 thr operon leader peptide\n"));
        assert!(rec.ends_with("MKRIST\n"));
    }

    #[test]
    fn test_header_without_comment() {
        let rec = format_record("seq1", "", "ACGT");
        assert_eq!(rec, ">seq1\nACGT\n");
    }

    #[test]
    fn test_wraps_at_sixty() {
        let seq = "A".repeat(130);
        let rec = format_record("seq1", "", &seq);
        let lines: Vec<&str> = rec.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
    }

    #[test]
    fn test_empty_sequence_has_no_body() {
        assert_eq!(format_record("seq1", "", ""), ">seq1\n");
    }
}
