//! Checkpoint loading for the AlexNet classifier
//!
//! Two on-disk formats are accepted:
//! - Burn `CompactRecorder` files (`.mpk`)
//! - PyTorch checkpoints (`.pt`, `.pth`, `.pkl`, `.tar`), either a bare state dict
//!   or a dictionary with a `state_dict` entry, optionally saved from a
//!   `DataParallel` wrapper (`module.` key prefix)

use std::path::Path;

use burn::{
    module::Module,
    record::{CompactRecorder, FullPrecisionSettings, Recorder},
    tensor::backend::Backend,
};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use tracing::{debug, info};

use super::alexnet::{AlexNet, AlexNetConfig, AlexNetRecord};
use crate::utils::error::{AdvisorError, Result};

/// Key holding the weights inside a training checkpoint dictionary
const STATE_DICT_KEY: &str = "state_dict";

/// torchvision AlexNet parameter names mapped onto `AlexNet` fields
const TORCHVISION_KEY_REMAP: [(&str, &str); 9] = [
    (r"^module\.(.+)$", "$1"),
    (r"^features\.0\.(.+)$", "conv1.$1"),
    (r"^features\.3\.(.+)$", "conv2.$1"),
    (r"^features\.6\.(.+)$", "conv3.$1"),
    (r"^features\.8\.(.+)$", "conv4.$1"),
    (r"^features\.10\.(.+)$", "conv5.$1"),
    (r"^classifier\.1\.(.+)$", "fc1.$1"),
    (r"^classifier\.4\.(.+)$", "fc2.$1"),
    (r"^classifier\.6\.(.+)$", "fc3.$1"),
];

/// Serialization format of a checkpoint file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointFormat {
    /// Burn named MessagePack record
    Burn,
    /// PyTorch pickle archive
    PyTorch,
}

impl CheckpointFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "mpk" => Ok(CheckpointFormat::Burn),
            "pt" | "pth" | "pkl" | "tar" => Ok(CheckpointFormat::PyTorch),
            other => Err(AdvisorError::Config(format!(
                "Unsupported checkpoint extension '{}' for {:?} (expected .mpk, .pt, .pth, .pkl or .tar)",
                other, path
            ))),
        }
    }
}

/// Load an AlexNet classifier from a checkpoint file
pub fn load_alexnet<B: Backend>(
    path: &Path,
    config: &AlexNetConfig,
    device: &B::Device,
) -> Result<AlexNet<B>> {
    if !path.exists() {
        return Err(AdvisorError::PathNotFound(path.to_path_buf()));
    }

    let format = CheckpointFormat::from_path(path)?;
    info!("Loading {:?} checkpoint from {:?}", format, path);

    match format {
        CheckpointFormat::Burn => AlexNet::<B>::new(config, device)
            .load_file(path.to_path_buf(), &CompactRecorder::new(), device)
            .map_err(|e| AdvisorError::ModelLoad(format!("{:?}", e))),
        CheckpointFormat::PyTorch => {
            // Read the weights before allocating the network
            let record = load_pytorch_record::<B>(path, device)?;
            Ok(AlexNet::<B>::new(config, device).load_record(record))
        }
    }
}

/// Read a PyTorch checkpoint, trying the `state_dict` entry first and the
/// top level second
fn load_pytorch_record<B: Backend>(path: &Path, device: &B::Device) -> Result<AlexNetRecord<B>> {
    let recorder = PyTorchFileRecorder::<FullPrecisionSettings>::default();

    let nested = torchvision_load_args(path).with_top_level_key(STATE_DICT_KEY);
    match <PyTorchFileRecorder<FullPrecisionSettings> as Recorder<B>>::load(&recorder, nested, device)
    {
        Ok(record) => Ok(record),
        Err(nested_err) => {
            debug!(
                "No usable '{}' entry in {:?} ({:?}), reading top-level state dict",
                STATE_DICT_KEY, path, nested_err
            );
            <PyTorchFileRecorder<FullPrecisionSettings> as Recorder<B>>::load(
                &recorder,
                torchvision_load_args(path),
                device,
            )
            .map_err(|e| AdvisorError::ModelLoad(format!("{:?}", e)))
        }
    }
}

fn torchvision_load_args(path: &Path) -> LoadArgs {
    TORCHVISION_KEY_REMAP
        .iter()
        .fold(LoadArgs::new(path.to_path_buf()), |args, (pattern, replacement)| {
            args.with_key_remap(pattern, replacement)
        })
}
