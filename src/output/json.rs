use serde::Serialize;

use super::{FrameOutput, Formatter, iso8601_timestamp};

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonMarker<'a> {
    id: &'a str,
    label: &'a str,
    visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    bearing: f64,
    distance_m: f64,
    scale: f64,
}

#[derive(Serialize)]
struct JsonFrame<'a> {
    ts: String,
    frame: u64,
    sensor_time_s: f64,
    yaw: f64,
    markers: Vec<JsonMarker<'a>>,
}

impl Formatter for JsonFormatter {
    fn format(&self, output: &FrameOutput) -> Option<String> {
        let frame = JsonFrame {
            ts: iso8601_timestamp(),
            frame: output.frame_index,
            sensor_time_s: output.timestamp_s,
            yaw: output.yaw_degrees,
            markers: output
                .markers
                .iter()
                .map(|m| {
                    let coords = m.position.coords();
                    JsonMarker {
                        id: &m.id,
                        label: &m.label,
                        visible: coords.is_some(),
                        x: coords.map(|(x, _)| x),
                        y: coords.map(|(_, y)| y),
                        bearing: m.bearing_degrees,
                        distance_m: m.distance_m,
                        scale: m.scale,
                    }
                })
                .collect(),
        };
        Some(serde_json::to_string(&frame).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e)))
    }
}
