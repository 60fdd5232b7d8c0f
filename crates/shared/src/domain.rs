use serde::{Deserialize, Serialize};

/// One star as entered by the user. Coordinates stay raw text until the
/// server parses them; the client never coerces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarRecord {
    pub name: String,
    pub x: String,
    pub y: String,
    pub z: String,
}

impl StarRecord {
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.x.is_empty() && self.y.is_empty() && self.z.is_empty()
    }
}

/// One star as the server resolved it: parsed coordinates in manual mode,
/// detected centroid plus generated depth in automatic mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottedStar {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
