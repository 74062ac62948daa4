use super::types::{SensorSnapshot, WorkerEvent};

/// Line tags understood by the device sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Orientation,
    Quaternion,
    Calibration,
}

impl ReadingKind {
    pub const ALL: [ReadingKind; 3] = [
        ReadingKind::Orientation,
        ReadingKind::Quaternion,
        ReadingKind::Calibration,
    ];

    /// Literal, case-sensitive line prefix
    pub fn tag(&self) -> &'static str {
        match self {
            ReadingKind::Orientation => "Orientation:",
            ReadingKind::Quaternion => "Quaternion:",
            ReadingKind::Calibration => "Calibration:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// A tagged line, with the text after the tag
    Reading { kind: ReadingKind, payload: &'a str },
    Unknown,
}

pub fn classify_line(line: &str) -> LineClass<'_> {
    ReadingKind::ALL
        .iter()
        .find_map(|kind| {
            line.strip_prefix(kind.tag())
                .map(|payload| LineClass::Reading { kind: *kind, payload })
        })
        .unwrap_or(LineClass::Unknown)
}

/// Parse a comma-separated payload such as ` 12.5,-3,0.25 `.
///
/// Never fails: an empty field reads as 0, anything else that is not a
/// number reads as NaN.
pub fn parse_components(payload: &str) -> Vec<f64> {
    payload.trim().split(',').map(parse_component).collect()
}

fn parse_component(field: &str) -> f64 {
    let field = field.trim();
    if field.is_empty() {
        return 0.0;
    }
    field.parse::<f64>().unwrap_or(f64::NAN)
}

/// Turns framed lines into snapshot updates and host events for one connection.
#[derive(Debug, Default)]
pub struct ReadingClassifier {
    snapshot: SensorSnapshot,
    calibration_visible: bool,
}

impl ReadingClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one complete line. Returns the events it produced, in order;
    /// empty for lines without a known tag.
    pub fn process_line(&mut self, line: &str) -> Vec<WorkerEvent> {
        let LineClass::Reading { kind, payload } = classify_line(line) else {
            return Vec::new();
        };

        let values = parse_components(payload);
        let mut events = Vec::with_capacity(2);
        match kind {
            ReadingKind::Orientation => self.snapshot.orientation = values,
            ReadingKind::Quaternion => self.snapshot.quaternion = values,
            ReadingKind::Calibration => {
                self.snapshot.calibration = values;
                if !self.calibration_visible {
                    self.calibration_visible = true;
                    events.push(WorkerEvent::ShowCalibration);
                }
            }
        }

        events.push(WorkerEvent::DataRead(self.snapshot.clone()));
        events
    }

    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    pub fn calibration_visible(&self) -> bool {
        self.calibration_visible
    }
}
