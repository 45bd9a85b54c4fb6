// Keyboard editor: maps key presses to parameter edits or library/export commands.
// Visual: 1-5 swap the shape, arrows/brackets/A/Z dial the optics, +/- resize the glass.

use crate::params::{ParameterSet, ShapeVariant};

pub const DISTORTION_STEP: f32 = 0.25;
pub const BLUR_STEP: f32 = 0.5;
pub const ABERRATION_STEP: f32 = 0.5;
pub const SIZE_STEP: f32 = 1.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    /// Index into ShapeVariant::ALL
    Shape(u32),
    DistortionUp,
    DistortionDown,
    BlurUp,
    BlurDown,
    AberrationUp,
    AberrationDown,
    Grow,
    Shrink,
    ToggleMode,
    Save,
    NextDesign,
    DeleteDesign,
    Export,
}

/// Things the editor can't do to a ParameterSet alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Save,
    NextDesign,
    DeleteDesign,
    Export,
}

/// Apply `key` to `params`. Returns the command to run for non-parameter keys.
/// Edited values stay inside their valid ranges.
pub fn apply_key(key: EditorKey, params: &mut ParameterSet) -> Option<Command> {
    match key {
        EditorKey::Shape(i) => {
            if let Some(shape) = ShapeVariant::from_index(i) {
                params.shape = shape;
            }
        }
        EditorKey::DistortionUp => params.distortion += DISTORTION_STEP,
        EditorKey::DistortionDown => params.distortion = (params.distortion - DISTORTION_STEP).max(0.0),
        EditorKey::BlurUp => params.blur_radius += BLUR_STEP,
        EditorKey::BlurDown => params.blur_radius = (params.blur_radius - BLUR_STEP).max(0.0),
        EditorKey::AberrationUp => params.chromatic_aberration += ABERRATION_STEP,
        EditorKey::AberrationDown => {
            params.chromatic_aberration = (params.chromatic_aberration - ABERRATION_STEP).max(0.0)
        }
        EditorKey::Grow => {
            params.width *= SIZE_STEP;
            params.height *= SIZE_STEP;
        }
        EditorKey::Shrink => {
            params.width /= SIZE_STEP;
            params.height /= SIZE_STEP;
        }
        EditorKey::ToggleMode => params.mode = params.mode.toggled(),
        EditorKey::Save => return Some(Command::Save),
        EditorKey::NextDesign => return Some(Command::NextDesign),
        EditorKey::DeleteDesign => return Some(Command::DeleteDesign),
        EditorKey::Export => return Some(Command::Export),
    }
    None
}

/// One-line summary for the HUD.
pub fn describe(params: &ParameterSet) -> String {
    format!(
        "{} D{:.2} B{:.1} A{:.1} {:?}",
        params.shape, params.distortion, params.blur_radius, params.chromatic_aberration, params.mode
    )
}
