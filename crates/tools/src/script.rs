use std::time::Duration;

use folio_input::InputSampler;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("entry {index}: expected `<ms>:<+|-><KeyCode>`, got {entry:?}")]
    Malformed { index: usize, entry: String },
    #[error("entry {index}: invalid time {value:?}")]
    BadTime { index: usize, value: String },
    #[error("entry {index}: timestamps must not decrease")]
    OutOfOrder { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedKey {
    pub at: Duration,
    pub code: String,
    pub pressed: bool,
}

/// A timeline of key presses fed into a sampler as simulated time passes.
///
/// Text form: comma separated `<ms>:+Code` (press) or `<ms>:-Code`
/// (release), e.g. `0:+KeyW,1200:-KeyW,1300:+Enter,1350:-Enter`.
#[derive(Debug, Clone, Default)]
pub struct KeyScript {
    events: Vec<ScriptedKey>,
    cursor: usize,
}

impl KeyScript {
    pub fn new(events: Vec<ScriptedKey>) -> Self {
        Self { events, cursor: 0 }
    }

    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let mut events: Vec<ScriptedKey> = Vec::new();
        for (index, entry) in text
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .enumerate()
        {
            let malformed = || ScriptError::Malformed {
                index,
                entry: entry.to_string(),
            };
            let (time, key) = entry.split_once(':').ok_or_else(malformed)?;
            let ms: u64 = time.trim().parse().map_err(|_| ScriptError::BadTime {
                index,
                value: time.to_string(),
            })?;
            let (pressed, code) = match key.trim().split_at_checked(1) {
                Some(("+", code)) if !code.is_empty() => (true, code),
                Some(("-", code)) if !code.is_empty() => (false, code),
                _ => return Err(malformed()),
            };
            let at = Duration::from_millis(ms);
            if events.last().is_some_and(|last| last.at > at) {
                return Err(ScriptError::OutOfOrder { index });
            }
            events.push(ScriptedKey {
                at,
                code: code.to_string(),
                pressed,
            });
        }
        Ok(Self::new(events))
    }

    /// Time of the last scripted event.
    pub fn duration(&self) -> Duration {
        self.events.last().map_or(Duration::ZERO, |e| e.at)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Feed every event due by `elapsed` into `sampler`. Returns how many
    /// were applied.
    pub fn advance(&mut self, elapsed: Duration, sampler: &InputSampler) -> usize {
        let start = self.cursor;
        while let Some(event) = self.events.get(self.cursor) {
            if event.at > elapsed {
                break;
            }
            sampler.key_event(&event.code, event.pressed);
            tracing::trace!(code = %event.code, pressed = event.pressed, "scripted key");
            self.cursor += 1;
        }
        self.cursor - start
    }
}
