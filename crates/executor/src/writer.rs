use std::io::Write;

use super::error::Error;
use common::types::Solution;

/// Which optional columns are printed after `beta, graph_size, kernel_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub compute_tour: bool,
    pub output_tour: bool,
}

impl OutputFormat {
    pub fn header(&self) -> String {
        let mut fields = vec!["beta", "graph_size", "kernel_size"];
        if self.compute_tour {
            fields.push("tour_cost");
        }
        if self.output_tour {
            fields.push("tour");
        }
        fields.join(", ")
    }

    /// One comma-separated result line; the tour is space-separated node labels.
    pub fn format(&self, solution: &Solution) -> String {
        let mut fields = vec![
            solution.beta.to_string(),
            solution.graph_size.to_string(),
            solution.kernel_size.to_string(),
        ];
        if self.compute_tour {
            // Undefined when the exact step was skipped; printed as 0.
            fields.push(solution.cost.unwrap_or(0.0).to_string());
        }
        if self.output_tour {
            let tour: Vec<String> = solution.tour.iter().map(|n| n.to_string()).collect();
            fields.push(tour.join(" "));
        }
        fields.join(", ")
    }
}

/// Single owner of the result stream.
pub struct Writer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn write_header(&mut self) -> Result<(), Error> {
        writeln!(self.out, "{}", self.format.header())?;
        Ok(())
    }

    pub fn write_solutions<'a>(
        &mut self,
        solutions: impl IntoIterator<Item = &'a Solution>,
    ) -> Result<(), Error> {
        for solution in solutions {
            writeln!(self.out, "{}", self.format.format(solution))?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> Solution {
        Solution {
            beta: 1.5,
            graph_size: 4,
            kernel_size: 2,
            cost: Some(7.25),
            tour: vec![0, 3, 1, 2],
        }
    }

    #[test]
    fn header_lists_enabled_columns() {
        let plain = OutputFormat {
            compute_tour: false,
            output_tour: false,
        };
        let full = OutputFormat {
            compute_tour: true,
            output_tour: true,
        };
        assert_eq!(plain.header(), "beta, graph_size, kernel_size");
        assert_eq!(full.header(), "beta, graph_size, kernel_size, tour_cost, tour");
    }

    #[test]
    fn line_matches_header_layout() {
        let format = OutputFormat {
            compute_tour: true,
            output_tour: true,
        };
        assert_eq!(format.format(&solution()), "1.5, 4, 2, 7.25, 0 3 1 2");
    }

    #[test]
    fn kernel_size_only() {
        let format = OutputFormat {
            compute_tour: false,
            output_tour: false,
        };
        let mut s = solution();
        s.beta = 0.0;
        s.cost = None;
        assert_eq!(format.format(&s), "0, 4, 2");
    }

    #[test]
    fn writer_emits_header_then_lines_in_order() {
        let format = OutputFormat {
            compute_tour: true,
            output_tour: false,
        };
        let mut writer = Writer::new(Vec::new(), format);
        let mut second = solution();
        second.beta = 3.0;
        second.kernel_size = 0;

        writer.write_header().unwrap();
        writer.write_solutions(&[solution(), second]).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "beta, graph_size, kernel_size, tour_cost\n1.5, 4, 2, 7.25\n3, 4, 0, 7.25\n"
        );
    }
}
