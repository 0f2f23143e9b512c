//! The line filter applied to the planar toolpath before it is overlaid on
//! the reshaped mesh.
//!
//! Everything before the first layer marker is the *preamble*: start G-code
//! written for a flat bed, of which only comments survive. From the marker
//! on (the *body*) moves are kept unless they belong to a skirt or brim, and
//! temperature, fan and homing commands are dropped. The preamble to body
//! transition happens once and is never undone.

use common::config::ToolpathConfig;
use tracing::info;

use crate::line::{classify, LineKind, RegionTag, COMMENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Preamble,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Drop,
    /// Blank body lines vanish without counting as a removal.
    Skip,
}

pub struct RegionFilter<'a> {
    config: &'a ToolpathConfig,
    state: FilterState,
    body_start: Option<usize>,
    region: Option<RegionTag>,
    removed_preamble: usize,
    removed_body: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered<'a> {
    pub lines: Vec<&'a str>,
    pub removed_preamble: usize,
    pub removed_body: usize,
}

impl<'a> RegionFilter<'a> {
    /// Creates a filter that switches to [`FilterState::Body`] at line
    /// `body_start`. Without one the whole document is preamble.
    pub fn new(config: &'a ToolpathConfig, body_start: Option<usize>) -> Self {
        Self {
            config,
            state: FilterState::Preamble,
            body_start,
            region: None,
            removed_preamble: 0,
            removed_body: 0,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn region(&self) -> Option<&RegionTag> {
        self.region.as_ref()
    }

    pub fn removed(&self) -> usize {
        self.removed_preamble + self.removed_body
    }

    /// Decides the fate of line `index`. Lines must be fed in order.
    pub fn decide(&mut self, index: usize, line: &str) -> Decision {
        if self.state == FilterState::Preamble && Some(index) == self.body_start {
            self.state = FilterState::Body;
        }

        let decision = match self.state {
            FilterState::Preamble => self.preamble(line),
            FilterState::Body => self.body(line),
        };

        if decision == Decision::Drop {
            match self.state {
                FilterState::Preamble => self.removed_preamble += 1,
                FilterState::Body => self.removed_body += 1,
            }
        }

        decision
    }

    fn preamble(&self, line: &str) -> Decision {
        if line.trim_start().starts_with(COMMENT) {
            Decision::Keep
        } else {
            Decision::Drop
        }
    }

    fn body(&mut self, line: &str) -> Decision {
        let command = match classify(line, self.config) {
            LineKind::Blank => return Decision::Skip,
            LineKind::RegionMarker(tag) => {
                self.region = Some(tag);
                return Decision::Keep;
            }
            LineKind::Comment => return Decision::Keep,
            LineKind::Command(command) => command,
        };

        let config = self.config;
        let is_motion = command.starts_with(config.motion_prefix.as_str());

        if is_motion && self.region.as_ref().is_some_and(RegionTag::is_plate_only) {
            return Decision::Drop;
        }

        let is_control = (config.control_prefixes.iter())
            .any(|p| command.starts_with(p.as_str()));
        if is_control || command.starts_with(config.homing_command.as_str()) {
            return Decision::Drop;
        }

        if is_motion {
            Decision::Keep
        } else {
            Decision::Drop
        }
    }

    pub fn finish<'l>(self, lines: Vec<&'l str>) -> Filtered<'l> {
        Filtered {
            lines,
            removed_preamble: self.removed_preamble,
            removed_body: self.removed_body,
        }
    }
}

impl Filtered<'_> {
    pub fn removed(&self) -> usize {
        self.removed_preamble + self.removed_body
    }
}

/// Runs the filter over the whole document, returning the kept lines in their
/// original order.
pub fn filter<'l>(
    lines: &[&'l str],
    body_start: Option<usize>,
    config: &ToolpathConfig,
) -> Filtered<'l> {
    let mut filter = RegionFilter::new(config, body_start);
    let kept = (lines.iter().enumerate())
        .filter(|(index, line)| filter.decide(*index, line) == Decision::Keep)
        .map(|(_, line)| *line)
        .collect();

    let filtered = filter.finish(kept);
    info!("Removed {} lines (including skirt/brim)", filtered.removed());
    info!("Kept {} lines", filtered.lines.len());
    filtered
}
