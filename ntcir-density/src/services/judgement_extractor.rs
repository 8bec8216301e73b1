//! Relevance judgement parsing
//!
//! Judgement files in the NTCIR-11 Math-2 and NTCIR-12 MathIR format hold one
//! judgement per line: `<query-id> <unused> <identifier> <score>`.

use ntcir_common::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// A judged paragraph identifier and its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub identifier: String,
    pub score: f64,
}

/// Parse a single judgement line
pub fn parse_judgement_line(line: &str, source_name: &str, line_number: usize) -> Result<Judgement> {
    let malformed = |reason: String| Error::MalformedJudgement {
        source_name: source_name.to_string(),
        line_number,
        line: line.to_string(),
        reason,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [_query, _unused, identifier, score] = fields.as_slice() else {
        return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
    };

    let score: f64 = score
        .parse()
        .map_err(|_| malformed(format!("score {:?} is not a number", score)))?;

    Ok(Judgement {
        identifier: identifier.to_string(),
        score,
    })
}

/// Lazy, single-pass reader of judgements
///
/// Yields one item per input line, in input order.
pub struct JudgementReader<R> {
    lines: Lines<R>,
    source_name: String,
    line_number: usize,
}

impl<R: BufRead> JudgementReader<R> {
    pub fn new(source_name: impl Into<String>, reader: R) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            line_number: 0,
        }
    }
}

impl JudgementReader<BufReader<File>> {
    /// Open a judgement file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for JudgementReader<R> {
    type Item = Result<Judgement>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some(match line {
            Ok(line) => parse_judgement_line(&line, &self.source_name, self.line_number),
            Err(e) => Err(Error::io(&self.source_name, e)),
        })
    }
}
