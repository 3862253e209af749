use crate::models::LogEntry;
use serde::Serialize;

/// Summary numbers for one measured field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldAnalysis {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub standard_deviation: f64,
}

/// Per-field summaries handed to the advisor prompt. Fields with no samples
/// are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FieldAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<FieldAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<FieldAnalysis>,
}

pub fn analyze(entries: &[LogEntry]) -> Analysis {
    Analysis {
        temperature: summarize(entries.iter().filter_map(|e| e.temperature)),
        humidity: summarize(entries.iter().filter_map(|e| e.humidity)),
        pressure: summarize(entries.iter().filter_map(|e| e.pressure)),
    }
}

fn summarize(values: impl Iterator<Item = f64>) -> Option<FieldAnalysis> {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let average = values.iter().sum::<f64>() / n;
    let minimum = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let maximum = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Some(FieldAnalysis {
        average,
        minimum,
        maximum,
        standard_deviation: sample_stdev(&values, average),
    })
}

/// Sample standard deviation; 0 when fewer than two points.
fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn entry(temperature: Option<f64>, humidity: Option<f64>) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            temperature,
            humidity,
            pressure: None,
            rainfall: None,
            battery: None,
            ts: Utc::now(),
        }
    }

    #[test]
    fn summarizes_known_values() {
        let entries = vec![
            entry(Some(10.0), None),
            entry(Some(20.0), None),
            entry(Some(30.0), None),
        ];
        let analysis = analyze(&entries);
        let temperature = analysis.temperature.unwrap();
        assert_eq!(temperature.average, 20.0);
        assert_eq!(temperature.minimum, 10.0);
        assert_eq!(temperature.maximum, 30.0);
        assert_eq!(temperature.standard_deviation, 10.0);
        assert!(analysis.humidity.is_none());
        assert!(analysis.pressure.is_none());
    }

    #[test]
    fn single_sample_has_zero_deviation() {
        let analysis = analyze(&[entry(None, Some(65.5))]);
        let humidity = analysis.humidity.unwrap();
        assert_eq!(humidity.average, 65.5);
        assert_eq!(humidity.standard_deviation, 0.0);
    }

    #[test]
    fn missing_fields_are_skipped_not_zeroed() {
        let entries = vec![entry(Some(22.0), Some(60.0)), entry(Some(24.0), None)];
        let analysis = analyze(&entries);
        assert_eq!(analysis.temperature.unwrap().average, 23.0);
        assert_eq!(analysis.humidity.unwrap().average, 60.0);
    }

    #[test]
    fn no_entries_yields_empty_analysis() {
        let analysis = analyze(&[]);
        assert!(analysis.temperature.is_none());
        assert!(analysis.humidity.is_none());
        assert!(analysis.pressure.is_none());
    }
}
