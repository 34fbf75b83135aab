use std::fmt;

/// A character position as exchanged with the downstream agent runtime:
/// two numeric fields serialized as `"x,y"`. Each field is rounded to
/// exactly two decimal places when the position is constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position {
            x: round2(x),
            y: round2(y),
        }
    }

    /// Parse a `"x,y"` pair. Each field parses independently; a missing or
    /// non-numeric field becomes NaN rather than an error, and the caller is
    /// responsible for validation via [`Position::is_valid`].
    pub fn parse(s: &str) -> Position {
        let mut fields = s.splitn(2, ',');
        let x = parse_field(fields.next());
        let y = parse_field(fields.next());
        Position::new(x, y)
    }

    /// True when both fields hold real numbers.
    pub fn is_valid(&self) -> bool {
        !self.x.is_nan() && !self.y.is_nan()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2}", self.x, self.y)
    }
}

fn parse_field(field: Option<&str>) -> f64 {
    field
        .and_then(|f| f.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
