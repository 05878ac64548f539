//! AlexNet Architecture for Plant Disease Classification
//!
//! Mirrors the torchvision AlexNet layout so that checkpoints exported from
//! PyTorch map onto it field by field. Only the last linear layer differs from
//! the ImageNet network: it has one unit per leaf disease class.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

/// Spatial size produced by the adaptive pooling stage
const POOLED_SIZE: usize = 6;

/// Channels leaving the last convolution
const FEATURE_CHANNELS: usize = 256;

/// Configuration for the AlexNet classifier
#[derive(Config, Debug)]
pub struct AlexNetConfig {
    /// Number of output classes
    #[config(default = "10")]
    pub num_classes: usize,

    /// Width of the two hidden fully connected layers
    #[config(default = "4096")]
    pub hidden_size: usize,

    /// Dropout rate in the classifier head (inactive without autodiff)
    #[config(default = "0.5")]
    pub dropout_rate: f64,
}

/// AlexNet with a replaced output layer
///
/// Architecture:
/// - 5 convolutions (11x11/4, 5x5, 3x3, 3x3, 3x3) with ReLU
/// - MaxPooling after the first, second and fifth convolution
/// - Adaptive average pooling to 6x6
/// - Three fully connected layers with dropout before the first two
#[derive(Module, Debug)]
pub struct AlexNet<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
    pub conv4: Conv2d<B>,
    pub conv5: Conv2d<B>,
    pub pool: MaxPool2d,
    pub avg_pool: AdaptiveAvgPool2d,
    pub dropout: Dropout,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub fc3: Linear<B>,
    pub relu: Relu,
}

impl<B: Backend> AlexNet<B> {
    /// Create a new AlexNet from configuration
    pub fn new(config: &AlexNetConfig, device: &B::Device) -> Self {
        let conv1 = Conv2dConfig::new([3, 64], [11, 11])
            .with_stride([4, 4])
            .with_padding(PaddingConfig2d::Explicit(2, 2))
            .init(device);
        let conv2 = Conv2dConfig::new([64, 192], [5, 5])
            .with_padding(PaddingConfig2d::Explicit(2, 2))
            .init(device);
        let conv3 = Conv2dConfig::new([192, 384], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv4 = Conv2dConfig::new([384, 256], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv5 = Conv2dConfig::new([256, FEATURE_CHANNELS], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);

        let flattened = FEATURE_CHANNELS * POOLED_SIZE * POOLED_SIZE;

        Self {
            conv1,
            conv2,
            conv3,
            conv4,
            conv5,
            pool: MaxPool2dConfig::new([3, 3]).with_strides([2, 2]).init(),
            avg_pool: AdaptiveAvgPool2dConfig::new([POOLED_SIZE, POOLED_SIZE]).init(),
            dropout: DropoutConfig::new(config.dropout_rate).init(),
            fc1: LinearConfig::new(flattened, config.hidden_size).init(device),
            fc2: LinearConfig::new(config.hidden_size, config.hidden_size).init(device),
            fc3: LinearConfig::new(config.hidden_size, config.num_classes).init(device),
            relu: Relu::new(),
        }
    }

    /// Forward pass through the network
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 3, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        // Feature extraction
        let x = self.pool.forward(self.relu.forward(self.conv1.forward(x)));
        let x = self.pool.forward(self.relu.forward(self.conv2.forward(x)));
        let x = self.relu.forward(self.conv3.forward(x));
        let x = self.relu.forward(self.conv4.forward(x));
        let x = self.pool.forward(self.relu.forward(self.conv5.forward(x)));

        // [B, 256, H, W] -> [B, 256, 6, 6] -> [B, 9216]
        let x = self.avg_pool.forward(x);
        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        // Classifier
        let x = self.relu.forward(self.fc1.forward(self.dropout.forward(x)));
        let x = self.relu.forward(self.fc2.forward(self.dropout.forward(x)));
        self.fc3.forward(x)
    }

    /// Forward pass with softmax for inference
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{default_device, InferenceBackend};

    type TestBackend = InferenceBackend;

    fn small_config() -> AlexNetConfig {
        AlexNetConfig::new().with_hidden_size(16)
    }

    #[test]
    fn test_alexnet_output_shape() {
        let device = default_device();
        let model = AlexNet::<TestBackend>::new(&small_config(), &device);

        let input = Tensor::<TestBackend, 4>::zeros([2, 3, 224, 224], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 10]);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let device = default_device();
        let model = AlexNet::<TestBackend>::new(&small_config(), &device);

        let input = Tensor::<TestBackend, 4>::ones([1, 3, 224, 224], &device);
        let probs: Vec<f32> = model
            .forward_softmax(input)
            .into_data()
            .to_vec()
            .unwrap();

        assert_eq!(probs.len(), 10);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_config_matches_torchvision_head() {
        let config = AlexNetConfig::new();
        assert_eq!(config.num_classes, 10);
        assert_eq!(config.hidden_size, 4096);
    }
}
