//! Screen composition: title, submit control, rendered answer and sources.

use crate::config::Config;
use crate::messages::QueryResponse;
use crate::render::{AnswerRenderer, CodeHighlighter, PlainHighlighter, RenderOptions, SyntectHighlighter};
use crate::session::SessionState;

pub const SUBMIT_LABEL: &str = "Ask Question";
pub const BUSY_LABEL: &str = "Loading...";
pub const PLACEHOLDER: &str = "Ask about Chromium Android development...";

/// Label of the submit control for the given busy flag.
pub fn submit_label(busy: bool) -> &'static str {
    if busy {
        BUSY_LABEL
    } else {
        SUBMIT_LABEL
    }
}

pub struct View {
    title: String,
    renderer: AnswerRenderer,
}

impl View {
    pub fn new(title: impl Into<String>, renderer: AnswerRenderer) -> Self {
        Self {
            title: title.into(),
            renderer,
        }
    }

    /// View styled per `ui.*`; `color` off also disables code highlighting.
    pub fn from_config(config: &Config) -> Self {
        let color = config.ui.color();
        let highlighter: Box<dyn CodeHighlighter> = if color {
            Box::new(SyntectHighlighter::with_theme(config.ui.theme()))
        } else {
            Box::new(PlainHighlighter)
        };
        Self::new(
            config.ui.title(),
            AnswerRenderer::new(highlighter, RenderOptions { color }),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn render_title(&self) -> String {
        self.renderer.heading_text(&self.title)
    }

    /// Whether the submit control accepts input in `state`.
    pub fn can_submit(&self, state: &SessionState) -> bool {
        !state.busy
    }

    /// Answer heading, rendered markdown, and a sources list when non-empty.
    pub fn render_response(&self, response: &QueryResponse) -> String {
        let mut out = String::new();
        out.push_str(&self.renderer.heading_text("Answer:"));
        out.push('\n');
        out.push_str(&self.renderer.render(&response.answer));
        out.push('\n');

        if !response.sources.is_empty() {
            out.push('\n');
            out.push_str(&self.renderer.heading_text("Sources:"));
            out.push('\n');
            for source in &response.sources {
                out.push_str("  - ");
                out.push_str(&self.renderer.code_text(source));
                out.push('\n');
            }
        }
        out
    }

    /// Whole screen for a session snapshot. Nothing below the submit control
    /// until a response exists.
    pub fn render_screen(&self, state: &SessionState) -> String {
        let mut out = self.render_title();
        out.push_str("\n\n");
        out.push_str(&format!("[{}]\n", submit_label(!self.can_submit(state))));
        if let Some(response) = &state.response {
            out.push('\n');
            out.push_str(&self.render_response(response));
        }
        out
    }
}
