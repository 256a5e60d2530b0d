use serde::{Deserialize, Serialize};

/// Font size (in points) applied to text that no `{size:N}` span touched.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Font weight of a run. The dialect only distinguishes normal and bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

/// The fully resolved attribute set of one text run.
///
/// Every field is already merged: nested spans in the source have been
/// flattened so a renderer can map one `RunStyle` to one text style with no
/// further lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Font size in points.
    pub font_size: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
    /// Set by inline code spans; renderers map this to a code font.
    pub monospace: bool,
    /// Foreground color name or hex value from `{color:..}`.
    pub color: Option<String>,
    /// Background color; set by `==highlight==`.
    pub background: Option<String>,
    pub underline: bool,
    pub strikethrough: bool,
    /// Link target from `[text](url)` or a bare autolink.
    pub link: Option<String>,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            monospace: false,
            color: None,
            background: None,
            underline: false,
            strikethrough: false,
            link: None,
        }
    }
}

/// A maximal span of text sharing one resolved attribute set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    /// A run with the default style.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }
}
