//! Result panel and terminal rendering of a [`View`].

use std::io::{self, Write};

use crate::backend::GenerationResult;

use super::state::View;

/// Width of the progress bar in cells.
const PROGRESS_WIDTH: usize = 30;

/// Longest video reference shown before it is elided (data URIs are huge).
const MAX_SRC_DISPLAY: usize = 60;

/// Contents of the result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    /// The video reference, verbatim.
    pub video_src: String,
    pub original_prompt: String,
    pub enhanced_prompt: String,
    pub model_used: String,
    pub video_size_bytes: Option<u64>,
    pub generated_at: Option<String>,
}

impl ResultView {
    pub fn from_result(result: &GenerationResult) -> Self {
        Self {
            video_src: result.video_data.clone(),
            original_prompt: result.original_prompt.clone(),
            enhanced_prompt: result.enhanced_prompt.clone(),
            model_used: result.model_used.clone(),
            video_size_bytes: result.video_size_bytes,
            generated_at: result.generation_timestamp.clone(),
        }
    }

    /// Short form of the video reference for display.
    pub fn video_src_display(&self) -> String {
        if let Some(rest) = self.video_src.strip_prefix("data:") {
            let mime = rest.split([';', ',']).next().unwrap_or("application/octet-stream");
            return format!("<inline {} data, {} chars>", mime, self.video_src.len());
        }
        if self.video_src.chars().count() > MAX_SRC_DISPLAY {
            let head: String = self.video_src.chars().take(MAX_SRC_DISPLAY - 3).collect();
            return format!("{}...", head);
        }
        self.video_src.clone()
    }
}

/// Format a byte count the way the result panel shows it.
pub fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!("{:.2} MB", mb)
}

/// Draw a fixed-width progress bar, e.g. `[#########.....]  60%`.
pub fn progress_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

/// Write the result panel.
pub fn write_result(view: &ResultView, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Video ready!")?;
    writeln!(out, "  Video:    {}", view.video_src_display())?;
    writeln!(out, "  Original: {}", view.original_prompt)?;
    writeln!(out, "  Enhanced: {}", view.enhanced_prompt)?;
    writeln!(out, "  Model:    {}", view.model_used)?;
    if let Some(bytes) = view.video_size_bytes {
        writeln!(out, "  Size:     {}", format_size(bytes))?;
    }
    if let Some(ref at) = view.generated_at {
        writeln!(out, "  Created:  {}", at)?;
    }
    Ok(())
}

/// Write every visible panel of a frame.
///
/// The loading panel is not written here; the terminal front end redraws the
/// progress bar in place instead.
pub fn draw(view: &View, out: &mut impl Write) -> io::Result<()> {
    for (kind, message) in &view.notifications {
        writeln!(out, "[{}] {}", kind.label(), message)?;
    }
    if let Some(ref result) = view.result {
        write_result(result, out)?;
    }
    if let Some(ref error) = view.error {
        writeln!(out, "Error: {}", error)?;
    }
    if view.generate_another {
        writeln!(out, "Type a new prompt, /another to start over, or /download to save.")?;
    }
    Ok(())
}
