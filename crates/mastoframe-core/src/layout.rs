//! Caption fitting: the largest font size whose word-wrapped text fits a box.

/// Vertical gap between wrapped lines, in pixels.
pub const LINE_SPACING: f32 = 4.0;

/// Font metrics and glyph painting needed to lay out and draw a caption.
pub trait CaptionFont {
    /// Advance width of `text` set on a single line at `size` px.
    fn line_width(&self, text: &str, size: f32) -> f32;

    /// Height of one line box at `size` px.
    fn line_height(&self, size: f32) -> f32;

    /// Paints `text` with its line box's top-left corner at `origin`.
    ///
    /// `plot` receives pixel coordinates and a coverage value in `0.0..=1.0`.
    fn draw_line(
        &self,
        text: &str,
        size: f32,
        origin: (f32, f32),
        plot: &mut dyn FnMut(i32, i32, f32),
    );
}

/// Inclusive range of candidate font sizes, probed from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizeRange {
    max: u32,
    min: u32,
}

impl FontSizeRange {
    pub const DEFAULT_MAX: u32 = 20;
    pub const DEFAULT_MIN: u32 = 1;

    /// Sizes below 1 are raised to 1, and `max` never drops below `min`.
    pub fn new(max: u32, min: u32) -> Self {
        let min = min.max(1);
        Self {
            max: max.max(min),
            min,
        }
    }

    pub fn max(self) -> u32 {
        self.max
    }

    pub fn min(self) -> u32 {
        self.min
    }

    pub fn contains(self, size: u32) -> bool {
        (self.min..=self.max).contains(&size)
    }
}

impl Default for FontSizeRange {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX, Self::DEFAULT_MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
}

impl TextBox {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    pub font_size: u32,
    /// Lines joined with `\n`.
    pub wrapped: String,
}

impl TextLayout {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.wrapped.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }
}

/// Greedy word wrap at a given size.
///
/// Words are appended to the current line while the line still measures at
/// most `max_width`. A word that is wider than the box on its own still gets a
/// line of its own.
pub fn wrap<F: CaptionFont + ?Sized>(
    text: &str,
    font: &F,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        if let Some(current) = lines.last_mut() {
            let candidate = format!("{current} {word}");
            if font.line_width(&candidate, size) <= max_width {
                *current = candidate;
                continue;
            }
        }
        lines.push(word.to_string());
    }
    lines
}

/// Height of `lines` stacked lines at `size` px, including spacing.
pub fn block_height<F: CaptionFont + ?Sized>(font: &F, lines: usize, size: f32) -> f32 {
    if lines == 0 {
        return 0.0;
    }
    let lines = lines as f32;
    lines * font.line_height(size) + (lines - 1.0) * LINE_SPACING
}

/// Finds the largest size in `sizes` at which `text` fits inside `bounds`.
///
/// A size fits when its wrapped block is strictly shorter than the box. If no
/// size fits, the layout at `sizes.min()` is returned.
pub fn layout<F: CaptionFont + ?Sized>(
    text: &str,
    font: &F,
    bounds: TextBox,
    sizes: FontSizeRange,
) -> TextLayout {
    let max_width = bounds.width as f32;
    let max_height = bounds.height as f32;

    let mut size = sizes.max();
    loop {
        let lines = wrap(text, font, size as f32, max_width);
        let height = block_height(font, lines.len(), size as f32);
        if height < max_height || size <= sizes.min() {
            return TextLayout {
                font_size: size,
                wrapped: lines.join("\n"),
            };
        }
        size -= 1;
    }
}
