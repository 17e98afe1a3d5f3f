use crate::core::stats::{SummaryStat, compute_stats};

/// Label of the solver line carrying the total electrostatic energy.
pub const ENERGY_LABEL: &str = "Total electrostatic energy";

/// Every line of `output` that contains [`ENERGY_LABEL`], verbatim.
///
/// Each returned line counts as one observation downstream, so the solver
/// input should request a single energy per run.
pub fn extract_energy_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| line.contains(ENERGY_LABEL))
        .collect()
}

/// Append-only accumulator of raw energy lines for one variant kind, in
/// snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnergyLog {
    lines: Vec<String>,
}

impl EnergyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn stats(&self) -> SummaryStat {
        compute_stats(&self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APBS_OUTPUT: &str = "\
asc_getCoefficients: Ewald parameters
  Global net ELEC energy = -1.234E+02 kJ/mol
  Total electrostatic energy = -1.2000000000E+02 kJ/mol
Thanks for using APBS!
";

    #[test]
    fn extract_returns_matching_lines_verbatim() {
        let lines = extract_energy_lines(APBS_OUTPUT);
        assert_eq!(
            lines,
            vec!["  Total electrostatic energy = -1.2000000000E+02 kJ/mol"]
        );
    }

    #[test]
    fn extract_returns_every_matching_line() {
        let output = "Total electrostatic energy = 1 kJ/mol\nTotal electrostatic energy = 2 kJ/mol\n";
        assert_eq!(extract_energy_lines(output).len(), 2);
    }

    #[test]
    fn extract_from_failed_run_output_is_empty() {
        assert!(extract_energy_lines("Error: cannot open file\n").is_empty());
        assert!(extract_energy_lines("").is_empty());
    }

    #[test]
    fn energy_log_accumulates_in_append_order_and_reduces() {
        let mut log = EnergyLog::new();
        log.append(extract_energy_lines(APBS_OUTPUT));
        log.append(["Total electrostatic energy = -80.0 kJ/mol".to_string()]);

        assert_eq!(log.len(), 2);
        assert!(log.lines()[0].contains("-1.2000000000E+02"));

        let stat = log.stats();
        assert_eq!(stat.count, 2);
        assert_eq!(stat.mean, -100.0);
    }

    #[test]
    fn empty_energy_log_reduces_to_nan() {
        let stat = EnergyLog::new().stats();
        assert!(stat.mean.is_nan() && stat.sd.is_nan());
    }
}
