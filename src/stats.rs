//! Size-reduction statistics for a conversion.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConversionStats {
    pub original_bytes: u64,
    pub converted_bytes: u64,
    pub line_count: usize,
    pub char_count: usize,
}

impl ConversionStats {
    pub fn new(original_bytes: u64, markdown: &str) -> Self {
        Self {
            original_bytes,
            converted_bytes: markdown.len() as u64,
            line_count: markdown.lines().count(),
            char_count: markdown.chars().count(),
        }
    }

    /// Percentage saved relative to the upload. Negative when the text is
    /// larger than the source.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.converted_bytes as f64 / self.original_bytes as f64) * 100.0
    }

    /// Rough LLM token estimate, four characters per token.
    pub fn estimated_tokens(&self) -> usize {
        self.char_count.div_ceil(4)
    }

    /// Fold another file's numbers into a running total.
    pub fn accumulate(&mut self, other: &ConversionStats) {
        self.original_bytes += other.original_bytes;
        self.converted_bytes += other.converted_bytes;
        self.line_count += other.line_count;
        self.char_count += other.char_count;
    }

    pub fn summary(&self) -> String {
        let reduction = self.reduction_percent();
        let change = if reduction < 0.0 {
            format!("{:.1}% larger", -reduction)
        } else {
            format!("{:.1}% smaller", reduction)
        };
        format!(
            "{} → {} ({}, ~{} tokens)",
            human_size(self.original_bytes),
            human_size(self.converted_bytes),
            change,
            self.estimated_tokens()
        )
    }
}

pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Serialized form sent to the browser, with the derived figures filled in.
#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    #[serde(flatten)]
    pub stats: ConversionStats,
    pub reduction_percent: f64,
    pub estimated_tokens: usize,
    pub summary: String,
}

impl From<ConversionStats> for StatsView {
    fn from(stats: ConversionStats) -> Self {
        Self {
            reduction_percent: stats.reduction_percent(),
            estimated_tokens: stats.estimated_tokens(),
            summary: stats.summary(),
            stats,
        }
    }
}
