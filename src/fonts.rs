// asset paths for the two faces used across the ui
pub const MONO_FONT_PATH: &str = "fonts/SpaceMono-Regular.ttf";
pub const MONO_BOLD_FONT_PATH: &str = "fonts/SpaceMono-Bold.ttf";
