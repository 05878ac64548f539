//! Class labels for the leaf disease classifier
//!
//! The order of `CLASS_NAMES` is the order of the classifier's output units and
//! must match the checkpoint the model was trained with.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::NUM_CLASSES;

/// Class names in model output order (10 classes)
/// Format: "Plant_disease" or "Plant_healthy"
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "Apple_scab",
    "Apple_black_rot",
    "Apple_cedar_rust",
    "Apple_healthy",
    "Corn_common_rust",
    "Corn_gray_leaf_spot",
    "Corn_northern_leaf_blight",
    "Corn_healthy",
    "Potato_early_blight",
    "Potato_late_blight",
];

/// Get the class name for a given label index
pub fn class_name(label: usize) -> Option<&'static str> {
    CLASS_NAMES.get(label).copied()
}

/// Get the label index for a given class name
pub fn class_index(name: &str) -> Option<usize> {
    CLASS_NAMES.iter().position(|&n| n == name)
}

/// One of the fixed disease categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassLabel {
    index: usize,
}

impl ClassLabel {
    /// Label for a model output index
    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_CLASSES).then_some(Self { index })
    }

    /// Label for a raw class name such as `Apple_scab`
    pub fn from_name(name: &str) -> Option<Self> {
        class_index(name).map(|index| Self { index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw class name, e.g. `Corn_gray_leaf_spot`
    pub fn name(&self) -> &'static str {
        CLASS_NAMES[self.index]
    }

    /// Name shown to users, e.g. `Corn Gray Leaf Spot`
    pub fn display_name(&self) -> String {
        title_case(&self.name().replace('_', " "))
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ClassLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Uppercase the first letter of every word and lowercase the rest.
/// A word starts after any non-alphabetic character.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
