use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::error::Error;
use atsp_core::matrix::CostMatrix;

/// Cost matrix file formats, identified by file name extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    /// TSPLIB with `EDGE_WEIGHT_FORMAT: FULL_MATRIX`.
    Tsplib,
    Csv,
    Tsv,
    /// Dimension followed by whitespace-separated weights.
    Text,
}

impl MatrixFormat {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "atsp" => Ok(MatrixFormat::Tsplib),
            "csv" => Ok(MatrixFormat::Csv),
            "tsv" => Ok(MatrixFormat::Tsv),
            "txt" => Ok(MatrixFormat::Text),
            other => Err(Error::parse(
                path,
                None,
                format!("unsupported file extension '{}'", other),
            )),
        }
    }
}

/// Reads a cost matrix from `path`, picking the format from its extension.
pub fn load_matrix(path: &Path) -> Result<CostMatrix, Error> {
    let format = MatrixFormat::from_path(path)?;
    let matrix = match format {
        MatrixFormat::Csv => parse_delimited(path, b',')?,
        MatrixFormat::Tsv => parse_delimited(path, b'\t')?,
        MatrixFormat::Tsplib => parse_tsplib(&std::fs::read_to_string(path)?, path)?,
        MatrixFormat::Text => parse_text(&std::fs::read_to_string(path)?, path)?,
    };
    debug!(path = %path.display(), ?format, size = matrix.size(), "Matrix loaded");
    Ok(matrix)
}

fn parse_delimited(path: &Path, delimiter: u8) -> Result<CostMatrix, Error> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: Vec<f64> = result?;
        rows.push(row);
    }
    Ok(CostMatrix::from_rows(rows)?)
}

/// Parses TSPLIB content carrying an explicit full matrix.
pub fn parse_tsplib(content: &str, path: &Path) -> Result<CostMatrix, Error> {
    let mut dimension: Option<usize> = None;
    let mut in_edge_weight_section = false;
    let mut weights: Vec<f64> = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line == "EOF" {
            continue;
        }
        if line == "EDGE_WEIGHT_SECTION" {
            in_edge_weight_section = true;
            continue;
        }
        if line.ends_with("_SECTION") {
            in_edge_weight_section = false;
            continue;
        }

        if in_edge_weight_section {
            for part in line.split_whitespace() {
                let weight: f64 = part.parse().map_err(|_| {
                    Error::parse(path, Some(line_num + 1), format!("invalid edge weight: {}", part))
                })?;
                weights.push(weight);
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_uppercase();
            let value = value.trim();

            match key.as_str() {
                "DIMENSION" => {
                    dimension = Some(value.parse().map_err(|_| {
                        Error::parse(path, Some(line_num + 1), format!("invalid dimension: {}", value))
                    })?);
                }
                "EDGE_WEIGHT_TYPE" if !value.eq_ignore_ascii_case("EXPLICIT") => {
                    return Err(Error::parse(
                        path,
                        Some(line_num + 1),
                        format!("unsupported EDGE_WEIGHT_TYPE {}", value),
                    ));
                }
                "EDGE_WEIGHT_FORMAT" if !value.eq_ignore_ascii_case("FULL_MATRIX") => {
                    return Err(Error::parse(
                        path,
                        Some(line_num + 1),
                        format!("unsupported EDGE_WEIGHT_FORMAT {}", value),
                    ));
                }
                // NAME, TYPE, COMMENT and friends carry no matrix data.
                _ => {}
            }
        }
    }

    let dimension = dimension.ok_or_else(|| Error::parse(path, None, "missing DIMENSION field"))?;
    Ok(CostMatrix::from_flat(dimension, weights)?)
}

/// Parses the plain text format: the dimension, then `dimension²` weights row by row.
pub fn parse_text(content: &str, path: &Path) -> Result<CostMatrix, Error> {
    let mut tokens = content.split_whitespace();

    let dimension: usize = tokens
        .next()
        .ok_or_else(|| Error::parse(path, None, "empty file"))?
        .parse()
        .map_err(|_| Error::parse(path, Some(1), "first token must be the dimension"))?;

    let weights = tokens
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| Error::parse(path, None, format!("invalid edge weight: {}", t)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CostMatrix::from_flat(dimension, weights)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::Error as AtspError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(suffix: &str, content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        temp_file
            .write_all(content.as_bytes())
            .expect("Failed to write mock content");
        temp_file
    }

    fn rows(m: &CostMatrix) -> Vec<Vec<f64>> {
        (0..m.size())
            .map(|u| (0..m.size()).map(|v| m.get(u, v)).collect())
            .collect()
    }

    const EXPECTED: [[f64; 3]; 3] = [[0.0, 1.0, 2.5], [3.0, 0.0, 4.0], [5.0, 6.0, 0.0]];

    #[test]
    fn test_load_csv_matrix() {
        let file = temp_with(".csv", "0,1,2.5\n3,0,4\n5,6,0\n");
        let m = load_matrix(file.path()).expect("csv should parse");
        assert_eq!(rows(&m), EXPECTED.map(|r| r.to_vec()).to_vec());
    }

    #[test]
    fn test_load_tsv_matrix() {
        let file = temp_with(".tsv", "0\t1\t2.5\n3\t0\t4\n5\t6\t0\n");
        let m = load_matrix(file.path()).expect("tsv should parse");
        assert_eq!(rows(&m), EXPECTED.map(|r| r.to_vec()).to_vec());
    }

    #[test]
    fn test_load_tsplib_full_matrix() {
        let content = "\
NAME: tiny
TYPE: ATSP
COMMENT: three nodes
DIMENSION: 3
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
EDGE_WEIGHT_SECTION
9999 1 2.5
3 9999 4
5 6 9999
EOF
";
        let file = temp_with(".atsp", content);
        let m = load_matrix(file.path()).expect("tsplib should parse");
        assert_eq!(rows(&m), EXPECTED.map(|r| r.to_vec()).to_vec());
    }

    #[test]
    fn test_load_text_matrix() {
        let file = temp_with(".txt", "3\n0 1 2.5\n3 0 4\n5 6 0\n");
        let m = load_matrix(file.path()).expect("text should parse");
        assert_eq!(rows(&m), EXPECTED.map(|r| r.to_vec()).to_vec());
    }

    #[test]
    fn test_text_accepts_infinite_weights() {
        let file = temp_with(".txt", "2 0 inf 1 0");
        let m = load_matrix(file.path()).expect("text should parse");
        assert!(m.get(0, 1).is_infinite());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = temp_with(".json", "[]");
        assert!(matches!(
            load_matrix(file.path()),
            Err(Error::ParseError { .. })
        ));
    }

    #[test]
    fn test_tsplib_missing_dimension() {
        let result = parse_tsplib("EDGE_WEIGHT_SECTION\n0 1\n1 0\n", Path::new("x.atsp"));
        match result {
            Err(Error::ParseError { cause, .. }) => assert!(cause.contains("DIMENSION")),
            other => panic!("Expected ParseError, got: {:?}", other),
        }
    }

    #[test]
    fn test_tsplib_rejects_other_weight_formats() {
        let content = "DIMENSION: 2\nEDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW\nEDGE_WEIGHT_SECTION\n0 1 0\n";
        assert!(matches!(
            parse_tsplib(content, Path::new("x.atsp")),
            Err(Error::ParseError { line: Some(2), .. })
        ));
    }

    #[test]
    fn test_wrong_entry_count_is_an_invalid_matrix() {
        let result = parse_text("3 0 1 2 3", Path::new("x.txt"));
        assert!(matches!(
            result,
            Err(Error::GraphError(AtspError::InvalidMatrix(_)))
        ));
    }

    #[test]
    fn test_csv_file_not_found() {
        let result = load_matrix(Path::new("non_existent_file.csv"));

        if let Err(Error::IoError(e)) = result {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        } else {
            panic!("Expected IoError, got: {:?}", result.err());
        }
    }
}
