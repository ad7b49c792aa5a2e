use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { font_size: 11.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurer: every display column is `char_width_factor * font_size` wide and every
/// line `line_height_factor * font_size` tall. Results depend only on the input.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn new(char_width_factor: f64, line_height_factor: f64) -> Self {
        Self {
            char_width_factor,
            line_height_factor,
        }
    }

    pub fn lines(text: &str) -> Vec<&str> {
        text.split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect()
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let lines = Self::lines(text);
        let font_size = style.font_size.max(1.0);
        let max_columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: max_columns as f64 * font_size * char_width_factor,
            height: lines.len() as f64 * font_size * line_height_factor,
            line_count: lines.len(),
        }
    }
}
