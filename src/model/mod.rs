//! Classifier model: architecture, labels and checkpoint loading

pub mod alexnet;
pub mod checkpoint;
pub mod labels;

pub use alexnet::{AlexNet, AlexNetConfig};
pub use checkpoint::{load_alexnet, CheckpointFormat};
pub use labels::{class_index, class_name, ClassLabel, CLASS_NAMES};
