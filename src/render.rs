//! Terminal presentation of a session as its events arrive.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::brand::{Concept, SessionId};
use crate::studio::StudioEvent;

/// Prints concept cards and per-concept image status lines.
///
/// The presenter tracks which images it is still waiting for so the caller
/// knows when there is nothing left to show. Events from any session other
/// than the most recently started one are ignored.
#[derive(Debug, Default)]
pub struct Presenter {
    color: bool,
    session: Option<SessionId>,
    /// Concept id → (1-based position, title) for concepts still loading.
    pending: HashMap<String, (usize, String)>,
    shown: bool,
    failed: bool,
    ready: usize,
    unavailable: usize,
}

impl Presenter {
    /// Create a presenter; `color` enables ANSI palette swatches.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color, ..Self::default() }
    }

    /// True once concepts failed, or every shown concept's image resolved.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.failed || (self.shown && self.pending.is_empty())
    }

    /// Images that resolved with and without a picture.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        (self.ready, self.unavailable)
    }

    /// Render one event.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn apply(&mut self, event: &StudioEvent, out: &mut impl Write) -> io::Result<()> {
        if let StudioEvent::SessionStarted { session } = event {
            self.session = Some(*session);
        } else if self.session.is_some_and(|active| active != event_session(event)) {
            return Ok(());
        }
        match event {
            StudioEvent::SessionStarted { .. } => {
                self.pending.clear();
                self.shown = false;
                self.failed = false;
                self.ready = 0;
                self.unavailable = 0;
                writeln!(out, "Brainstorming concepts...")?;
            }
            StudioEvent::ConceptsReady { concepts, .. } => {
                writeln!(out)?;
                for (i, concept) in concepts.iter().enumerate() {
                    self.write_card(out, i + 1, concept)?;
                    if concept.image_loading {
                        self.pending.insert(concept.id.clone(), (i + 1, concept.title.clone()));
                    }
                }
                self.shown = true;
                writeln!(out, "Rendering {} logos...", self.pending.len())?;
            }
            StudioEvent::ConceptsFailed { message, .. } => {
                self.failed = true;
                writeln!(out, "{message}")?;
            }
            StudioEvent::ImageResolved { concept_id, image_url, .. } => {
                let Some((position, title)) = self.pending.remove(concept_id) else {
                    return Ok(());
                };
                if let Some(url) = image_url {
                    self.ready += 1;
                    writeln!(out, "[{position}] {title}: image ready ({})", describe_uri(url))?;
                } else {
                    self.unavailable += 1;
                    writeln!(out, "[{position}] {title}: image unavailable")?;
                }
            }
        }
        Ok(())
    }

    fn write_card(&self, out: &mut impl Write, position: usize, c: &Concept) -> io::Result<()> {
        let palette: Vec<String> = c.color_palette.iter().map(|hex| self.swatch(hex)).collect();
        writeln!(out, "[{position}] {}", c.title)?;
        writeln!(out, "    Rationale:  {}", c.rationale)?;
        writeln!(out, "    Palette:    {}", palette.join("  "))?;
        writeln!(out, "    Typography: {}", c.typography_suggestion)?;
        writeln!(out, "    Prompt:     {}", c.image_prompt)?;
        writeln!(out)
    }

    fn swatch(&self, hex: &str) -> String {
        match parse_hex(hex) {
            Some((r, g, b)) if self.color => {
                format!("\x1b[38;2;{r};{g};{b}m\u{2588}\u{2588}\x1b[0m {hex}")
            }
            _ => hex.to_string(),
        }
    }
}

fn event_session(event: &StudioEvent) -> SessionId {
    match event {
        StudioEvent::SessionStarted { session }
        | StudioEvent::ConceptsReady { session, .. }
        | StudioEvent::ConceptsFailed { session, .. }
        | StudioEvent::ImageResolved { session, .. } => *session,
    }
}

/// Parse `#RGB` or `#RRGGBB` (the `#` is optional).
#[must_use]
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some((channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?)),
        3 => {
            let double = |i: usize| channel(&digits[i..=i].repeat(2));
            Some((double(0)?, double(1)?, double(2)?))
        }
        _ => None,
    }
}

/// Short description of a data URI, e.g. `image/png, 12 KB`.
fn describe_uri(uri: &str) -> String {
    let mime = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .unwrap_or("image");
    let payload = uri.split_once(',').map_or(0, |(_, p)| p.len());
    let kib = (payload * 3 / 4).div_ceil(1024);
    format!("{mime}, {kib} KB")
}
