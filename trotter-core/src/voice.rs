//! Voice cues
//!
//! Maps a recognized keyword to a sound clip and plays it. Independent of
//! the rig: nothing here touches the servo bus.

/// A keyword and the clip it triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cue {
    pub keyword: &'static str,
    pub clip: &'static str,
}

/// Built-in cue table
pub const DEFAULT_CUES: &[Cue] = &[
    Cue {
        keyword: "hello",
        clip: "hello.wav",
    },
    Cue {
        keyword: "goodbye",
        clip: "goodbye.wav",
    },
];

/// What the speech recognizer produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capture<'a> {
    /// Recognized text
    Heard(&'a str),
    /// Audio was captured but could not be understood
    Unintelligible,
    /// The recognizer could not be reached
    ServiceUnavailable,
}

/// Result of handling one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CueOutcome {
    /// Clip played to completion
    Played(&'static str),
    /// Text recognized but not a keyword
    Unrecognized,
    /// Nothing usable was captured
    RecognitionFailed,
}

/// Synchronous audio playback
pub trait ClipPlayer {
    type Error;

    /// Play `clip`, returning once playback has finished
    fn play(&mut self, clip: &str) -> Result<(), Self::Error>;
}

/// Keyword to clip lookup
#[derive(Debug, Clone, Copy)]
pub struct CueTable {
    cues: &'static [Cue],
}

impl Default for CueTable {
    fn default() -> Self {
        Self::new(DEFAULT_CUES)
    }
}

impl CueTable {
    pub const fn new(cues: &'static [Cue]) -> Self {
        Self { cues }
    }

    /// Clip for the whole of `text`, ignoring case and surrounding space
    pub fn lookup(&self, text: &str) -> Option<&'static str> {
        let text = text.trim();
        self.cues
            .iter()
            .find(|cue| cue.keyword.eq_ignore_ascii_case(text))
            .map(|cue| cue.clip)
    }

    /// Look up a capture and play the matching clip
    pub fn respond<P: ClipPlayer>(
        &self,
        capture: Capture<'_>,
        player: &mut P,
    ) -> Result<CueOutcome, P::Error> {
        let text = match capture {
            Capture::Heard(text) => text,
            Capture::Unintelligible | Capture::ServiceUnavailable => {
                return Ok(CueOutcome::RecognitionFailed)
            }
        };
        match self.lookup(text) {
            Some(clip) => {
                player.play(clip)?;
                Ok(CueOutcome::Played(clip))
            }
            None => Ok(CueOutcome::Unrecognized),
        }
    }
}
