use super::{FrameOutput, Formatter, iso8601_timestamp};

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// One row per marker; hidden markers are written only when verbose
pub struct CsvFormatter {
    include_hidden: bool,
}

impl CsvFormatter {
    pub fn new(include_hidden: bool) -> Self {
        Self { include_hidden }
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, output: &FrameOutput) -> Option<String> {
        let ts = iso8601_timestamp();
        let rows: Vec<String> = output
            .markers
            .iter()
            .filter(|m| self.include_hidden || m.position.is_visible())
            .map(|m| {
                let (x, y) = m
                    .position
                    .coords()
                    .map_or((String::new(), String::new()), |(x, y)| {
                        (format!("{:.1}", x), format!("{:.1}", y))
                    });
                format!(
                    "{},{},{:.3},{},{},{},{},{:.1},{:.1},{:.2}",
                    ts,
                    output.frame_index,
                    output.timestamp_s,
                    quoted(&m.id),
                    quoted(&m.label),
                    x,
                    y,
                    m.bearing_degrees,
                    m.distance_m,
                    m.scale
                )
            })
            .collect();
        if rows.is_empty() {
            None
        } else {
            Some(rows.join("\n"))
        }
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,frame,sensor_time_s,id,label,x,y,bearing,distance_m,scale")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_frames::markers;
    use std::sync::Arc;

    #[test]
    fn test_csv_rows() {
        let markers = markers();
        let output = FrameOutput {
            frame_index: 1,
            timestamp_s: 0.25,
            yaw_degrees: 0.0,
            markers: &markers,
        };
        let text = CsvFormatter::new(false).format(&output).unwrap();
        assert_eq!(text.lines().count(), 1);
        let expected = ",1,0.250,\"coit\",\"Coit Tower\",812.4,300.0,47.5,1230.0,0.50";
        assert!(text.ends_with(expected), "{}", text);

        let text = CsvFormatter::new(true).format(&output).unwrap();
        assert_eq!(text.lines().count(), 2);
        let hidden = text.lines().nth(1).unwrap();
        assert!(hidden.contains(",\"ggb\",\"Golden Gate Bridge\",,,"), "{}", hidden);
    }

    #[test]
    fn test_csv_frame_without_visible_markers() {
        let markers = markers();
        let output = FrameOutput {
            frame_index: 2,
            timestamp_s: 0.5,
            yaw_degrees: 0.0,
            markers: &markers[1..],
        };
        assert!(CsvFormatter::new(false).format(&output).is_none());
        assert!(CsvFormatter::new(true).format(&output).is_some());
    }

    #[test]
    fn test_csv_quotes_id() {
        let mut markers = markers();
        markers[0].id = Arc::from("tower,\"north\"");
        let output = FrameOutput {
            frame_index: 3,
            timestamp_s: 0.75,
            yaw_degrees: 0.0,
            markers: &markers[..1],
        };
        let text = CsvFormatter::new(false).format(&output).unwrap();
        assert!(text.contains(",\"tower,\"\"north\"\"\",\"Coit Tower\","), "{}", text);
    }
}
