//! Arc grouping state machine
//!
//! Chapters arrive one at a time, tagged with their arc label. Consecutive
//! chapters of the same arc are collected; when a different arc starts, the
//! collected run is closed as a [`Section`]. Interludes never start an arc and
//! join whichever arc is open. The final run is only closed by
//! [`ArcAccumulator::finish`], once the chapter stream is exhausted.

use crate::config::ArcConfig;
use crate::model::{Chapter, Section};

/// Accumulates consecutive chapters into arc sections
#[derive(Debug, Clone)]
pub struct ArcAccumulator {
    interlude_label: String,
    leading_interlude_arc: String,
    current_arc: Option<String>,
    pending: Vec<Chapter>,
}

impl ArcAccumulator {
    /// Creates an accumulator with no arc open
    ///
    /// `leading_interlude_arc` names the arc opened when an interlude arrives
    /// before any arc.
    pub fn new(interlude_label: &str, leading_interlude_arc: &str) -> Self {
        Self {
            interlude_label: interlude_label.to_string(),
            leading_interlude_arc: leading_interlude_arc.to_string(),
            current_arc: None,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &ArcConfig) -> Self {
        Self::new(&config.interlude_label, &config.leading_interlude_arc)
    }

    /// Name of the open arc, if any
    pub fn current_arc(&self) -> Option<&str> {
        self.current_arc.as_deref()
    }

    /// Chapters collected for the open arc
    pub fn pending(&self) -> &[Chapter] {
        &self.pending
    }

    /// Adds a chapter, returning the section it closed, if any
    pub fn push(&mut self, arc: &str, chapter: Chapter) -> Option<Section> {
        let closed = if arc == self.interlude_label {
            if self.current_arc.is_none() {
                self.current_arc = Some(self.leading_interlude_arc.clone());
            }
            None
        } else if self.current_arc.as_deref() != Some(arc) {
            let previous = self.current_arc.replace(arc.to_string());
            let chapters = std::mem::take(&mut self.pending);
            previous.and_then(|name| Section::new(name, chapters))
        } else {
            None
        };

        self.pending.push(chapter);
        closed
    }

    /// Closes the open arc, if it holds any chapters
    pub fn finish(self) -> Option<Section> {
        self.current_arc
            .and_then(|name| Section::new(name, self.pending))
    }
}

impl Default for ArcAccumulator {
    fn default() -> Self {
        Self::from_config(&ArcConfig::default())
    }
}
