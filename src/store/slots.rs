/*!
 * Fixed-width text slots of a translation.
 *
 * Every translation reserves the same number of slots regardless of the
 * language; only the first `plural_count` slots of a plural string (or the
 * first slot of a singular string) carry meaning.
 */

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Number of text slots reserved for every translation
pub const MAX_PLURAL_SLOTS: usize = 6;

/// Text slots of a translation, padded with empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSlots([String; MAX_PLURAL_SLOTS]);

impl TextSlots {
    /// Build slots from the texts supplied by an upstream converter
    ///
    /// Missing trailing slots are left empty.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Result<Self, ValidationError> {
        if texts.len() > MAX_PLURAL_SLOTS {
            return Err(ValidationError::TooManySlots {
                index: 0,
                count: texts.len(),
                max: MAX_PLURAL_SLOTS,
            });
        }
        let mut slots = Self::default();
        for (slot, text) in slots.0.iter_mut().zip(texts) {
            *slot = text.as_ref().to_string();
        }
        Ok(slots)
    }

    /// Build slots from a full array read back from storage
    pub fn from_array(texts: [String; MAX_PLURAL_SLOTS]) -> Self {
        Self(texts)
    }

    /// A single-slot value, as used by singular strings
    pub fn singular(text: impl Into<String>) -> Self {
        let mut slots = Self::default();
        slots.0[0] = text.into();
        slots
    }

    /// Whether every slot is empty
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|s| s.is_empty())
    }

    /// Whether every slot below `count` holds text
    pub fn filled_up_to(&self, count: usize) -> bool {
        self.0.iter().take(count.min(MAX_PLURAL_SLOTS)).all(|s| !s.is_empty())
    }

    /// Text of one slot; out-of-range indexes read as empty
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    /// Replace the text of one slot; out-of-range indexes are ignored
    pub fn set(&mut self, index: usize, text: impl Into<String>) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = text.into();
        }
    }

    /// Empty every slot from `from` upward
    pub fn clear_from(&mut self, from: usize) {
        for slot in self.0.iter_mut().skip(from) {
            slot.clear();
        }
    }

    /// The first `count` slots
    pub fn meaningful(&self, count: usize) -> Vec<String> {
        self.0.iter().take(count.min(MAX_PLURAL_SLOTS)).cloned().collect()
    }

    /// All slots in order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
