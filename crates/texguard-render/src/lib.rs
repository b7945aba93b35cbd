//! Renderer contracts consumed by the texguard extraction pipeline.
//!
//! The pipeline never typesets math or compiles diagrams itself. It hands each
//! extracted fragment to one of the renderers declared here and stores whatever
//! markup comes back. A renderer may be an in-process function, a sandboxed call,
//! or a thin carrier for a client-side typesetter (the defaults in [`client`]).

pub mod client;
pub mod html;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{ClientDiagramRenderer, ClientMathRenderer};
pub use html::{escape_attr, escape_html, is_safe_url, HtmlInlineFormatter};

/// Failure reported by a math or diagram renderer for a single fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer refused the input (empty, malformed, or out of its subset)
    #[error("rejected: {0}")]
    Rejected(String),
    /// The renderer accepted the input but failed while producing output
    #[error("render failed: {0}")]
    Failed(String),
}

pub type RenderResult = Result<String, RenderError>;

/// Coarse classification of the drawing space a diagram needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutIntent {
    Compact,
    Medium,
    Large,
    /// Wide or tall drawings whose span ratio exceeds the flat threshold
    Flat,
}

impl LayoutIntent {
    /// Position on the compact -> large axis. `Flat` sits beside `Large`.
    pub fn rank(self) -> u8 {
        match self {
            LayoutIntent::Compact => 0,
            LayoutIntent::Medium => 1,
            LayoutIntent::Large | LayoutIntent::Flat => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutIntent::Compact => "compact",
            LayoutIntent::Medium => "medium",
            LayoutIntent::Large => "large",
            LayoutIntent::Flat => "flat",
        }
    }
}

impl std::fmt::Display for LayoutIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing parameters handed to the diagram renderer alongside the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingHints {
    pub layout: LayoutIntent,
    /// Distance between positioned nodes, in centimetres
    pub node_distance_cm: f64,
    /// Length of the x unit vector, in centimetres
    pub x_unit_cm: f64,
    /// Length of the y unit vector, in centimetres
    pub y_unit_cm: f64,
    /// Display scale of the finished drawing (never above 1.0)
    pub scale: f64,
    /// Maximum width of the rendered drawing as a share of the container
    pub max_width_percent: u32,
    /// TikZ libraries the body relies on
    pub libraries: Vec<String>,
}

/// Renders one math expression.
///
/// `display` is true for display-mode math and for complete structured
/// environments (`\begin{align}...\end{align}`), which arrive with their wrapper.
pub trait MathRenderer {
    fn render_math(&self, expression: &str, display: bool) -> RenderResult;
}

/// Renders one diagram source block.
pub trait DiagramRenderer {
    fn render_diagram(&self, source: &str, hints: &SizingHints) -> RenderResult;
}

/// Applies inline text formatting (bold, italic, escaped characters) to a
/// short run of text such as a table cell, a caption, or a list item.
pub trait InlineFormatter {
    fn format_inline(&self, text: &str) -> String;
}

impl<F> MathRenderer for F
where
    F: Fn(&str, bool) -> RenderResult,
{
    fn render_math(&self, expression: &str, display: bool) -> RenderResult {
        self(expression, display)
    }
}

impl<F> DiagramRenderer for F
where
    F: Fn(&str, &SizingHints) -> RenderResult,
{
    fn render_diagram(&self, source: &str, hints: &SizingHints) -> RenderResult {
        self(source, hints)
    }
}

impl<F> InlineFormatter for F
where
    F: Fn(&str) -> String,
{
    fn format_inline(&self, text: &str) -> String {
        self(text)
    }
}
