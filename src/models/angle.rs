/// One camera-angle variation of an edit batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleSpec {
    pub name: &'static str,
    pub suffix: &'static str,
}

/// The seven angles of an edit batch, in output order.
pub static ANGLES: [AngleSpec; 7] = [
    AngleSpec {
        name: "Front View",
        suffix: "a straight-on front view at eye level",
    },
    AngleSpec {
        name: "Low Angle",
        suffix: "a dramatic low angle shot looking up at the subject",
    },
    AngleSpec {
        name: "High Angle",
        suffix: "a high angle shot looking down at the subject",
    },
    AngleSpec {
        name: "Bird's Eye",
        suffix: "a top-down bird's eye view directly above the subject",
    },
    AngleSpec {
        name: "Side Profile",
        suffix: "a side profile view at 90 degrees",
    },
    AngleSpec {
        name: "Three-Quarter",
        suffix: "a three-quarter view rotated 45 degrees",
    },
    AngleSpec {
        name: "Close-Up",
        suffix: "an intimate close-up shot with shallow depth of field",
    },
];

impl AngleSpec {
    /// Edit instruction for this angle. A blank instruction falls back to the
    /// keep-the-subject template.
    pub fn prompt(&self, instruction: Option<&str>) -> String {
        match instruction.map(str::trim).filter(|s| !s.is_empty()) {
            Some(instruction) => format!("{}, {}", instruction, self.suffix),
            None => format!("keep the subject but change camera to {}", self.suffix),
        }
    }
}
