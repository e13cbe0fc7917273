//! Candle LSTM loading and inference
//!
//! Handles:
//! - Loading pre-trained weights from a bincode bundle of named tensors
//! - Single-word recurrent steps against an explicit hidden state
//! - Turning logits into base-2 surprisal distributions
//! - M1 Metal GPU acceleration support

use candle_core::{DType, Device, Tensor};
use rustc_hash::FxHashMap;
use std::fs;
use thiserror::Error;

use super::tokenize::tokenize;
use super::vocab::Vocab;
use super::{SurprisalDistribution, SurprisalOracle};

/// Metadata about the model
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ModelConfig {
    pub vocab_size: usize,
    pub embedding_size: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
}

/// One named tensor in the weight bundle
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TensorData {
    pub name: String,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// On-disk weight format: config plus named tensors
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ModelBundle {
    pub config: ModelConfig,
    pub tensors: Vec<TensorData>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model weights: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode model bundle: {0}")]
    Decode(#[from] bincode::Error),
    #[error("model bundle is missing tensor '{0}'")]
    MissingTensor(String),
    #[error("tensor '{name}' has shape {actual:?}, expected {expected:?}")]
    BadShape {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
    #[error("word '{0}' is unknown and the vocabulary has no <unk> entry")]
    NoUnkFallback(String),
    #[error("cannot advance on an empty word")]
    EmptyWord,
}

/// Weights of one LSTM layer. Gate blocks are stacked in the order
/// input, forget, cell, output along the first axis.
struct LstmLayer {
    /// (4*hidden, input)
    weight_ih: Tensor,
    /// (4*hidden, hidden)
    weight_hh: Tensor,
    /// (4*hidden)
    bias_ih: Tensor,
    /// (4*hidden)
    bias_hh: Tensor,
}

/// Word-level LSTM language model
pub struct Model {
    config: ModelConfig,
    device: Device,
    /// Embedding weights: (vocab_size, embedding_size)
    embedding: Tensor,
    layers: Vec<LstmLayer>,
    /// Output projection: (vocab_size, hidden_size)
    decoder_weight: Tensor,
    /// (vocab_size)
    decoder_bias: Tensor,
}

/// Recurrent context of one sentence: an (h, c) pair per LSTM layer.
/// Steps never mutate in place; each advance returns a fresh value, so
/// states from earlier positions stay valid.
#[derive(Clone, Debug)]
pub struct HiddenState {
    layers: Vec<(Tensor, Tensor)>,
}

fn take_tensor(
    tensors: &mut FxHashMap<String, TensorData>,
    name: &str,
    expected: &[usize],
    device: &Device,
) -> Result<Tensor, ModelError> {
    let tensor = tensors
        .remove(name)
        .ok_or_else(|| ModelError::MissingTensor(name.to_string()))?;

    if tensor.shape != expected {
        return Err(ModelError::BadShape {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual: tensor.shape,
        });
    }
    Ok(Tensor::from_vec(tensor.data, expected.to_vec(), device)?)
}

#[allow(dead_code)]
impl Model {
    /// Load model weights from a bincode bundle on disk
    pub fn load(weights_path: &str) -> Result<Self, ModelError> {
        // Use Metal GPU on macOS, fallback to CPU
        #[cfg(target_os = "macos")]
        let device = Device::new_metal(0).unwrap_or(Device::Cpu);
        #[cfg(not(target_os = "macos"))]
        let device = Device::Cpu;

        let weights_bytes = fs::read(weights_path)?;
        let bundle: ModelBundle = bincode::deserialize(&weights_bytes)?;
        Self::from_bundle(bundle, device)
    }

    /// Build a model from an in-memory bundle
    pub fn from_bundle(bundle: ModelBundle, device: Device) -> Result<Self, ModelError> {
        let config = bundle.config.clone();
        let v = config.vocab_size;
        let e = config.embedding_size;
        let h = config.hidden_size;

        let mut by_name: FxHashMap<String, TensorData> = bundle
            .tensors
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();

        let embedding = take_tensor(&mut by_name, "embedding.weight", &[v, e], &device)?;

        let mut layers = Vec::with_capacity(config.num_layers);
        for k in 0..config.num_layers {
            let input = if k == 0 { e } else { h };
            layers.push(LstmLayer {
                weight_ih: take_tensor(
                    &mut by_name,
                    &format!("lstm.l{}.weight_ih", k),
                    &[4 * h, input],
                    &device,
                )?,
                weight_hh: take_tensor(
                    &mut by_name,
                    &format!("lstm.l{}.weight_hh", k),
                    &[4 * h, h],
                    &device,
                )?,
                bias_ih: take_tensor(
                    &mut by_name,
                    &format!("lstm.l{}.bias_ih", k),
                    &[4 * h],
                    &device,
                )?,
                bias_hh: take_tensor(
                    &mut by_name,
                    &format!("lstm.l{}.bias_hh", k),
                    &[4 * h],
                    &device,
                )?,
            });
        }

        let decoder_weight = take_tensor(&mut by_name, "decoder.weight", &[v, h], &device)?;
        let decoder_bias = take_tensor(&mut by_name, "decoder.bias", &[v], &device)?;

        Ok(Model {
            config,
            device,
            embedding,
            layers,
            decoder_weight,
            decoder_bias,
        })
    }

    /// One recurrent step: consume a single token ID, produce the logits
    /// predicting the next position and the successor state
    fn step(
        &self,
        token_id: u32,
        state: &HiddenState,
    ) -> Result<(HiddenState, Vec<f32>), ModelError> {
        // (1, embedding_size)
        let mut x = self.embedding.narrow(0, token_id as usize, 1)?;
        let mut next_layers = Vec::with_capacity(self.layers.len());

        for (layer, (h, c)) in self.layers.iter().zip(&state.layers) {
            // (1, 4*hidden)
            let gates = x
                .matmul(&layer.weight_ih.t()?)?
                .add(&h.matmul(&layer.weight_hh.t()?)?)?
                .broadcast_add(&layer.bias_ih)?
                .broadcast_add(&layer.bias_hh)?;
            let chunks = gates.chunk(4, 1)?;

            let i = candle_nn::ops::sigmoid(&chunks[0])?;
            let f = candle_nn::ops::sigmoid(&chunks[1])?;
            let g = chunks[2].tanh()?;
            let o = candle_nn::ops::sigmoid(&chunks[3])?;

            let new_c = f.mul(c)?.add(&i.mul(&g)?)?;
            let new_h = o.mul(&new_c.tanh()?)?;

            next_layers.push((new_h.clone(), new_c));
            x = new_h;
        }

        let logits = x
            .matmul(&self.decoder_weight.t()?)?
            .broadcast_add(&self.decoder_bias)?
            .squeeze(0)?
            .to_vec1::<f32>()?;

        Ok((HiddenState { layers: next_layers }, logits))
    }

    /// Get model configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Total number of parameters across all tensors
    pub fn parameter_count(&self) -> usize {
        let mut count = self.embedding.elem_count();
        for layer in &self.layers {
            count += layer.weight_ih.elem_count()
                + layer.weight_hh.elem_count()
                + layer.bias_ih.elem_count()
                + layer.bias_hh.elem_count();
        }
        count + self.decoder_weight.elem_count() + self.decoder_bias.elem_count()
    }
}

impl SurprisalOracle for Model {
    type State = HiddenState;

    fn init_state(&self) -> Result<HiddenState, ModelError> {
        let mut layers = Vec::with_capacity(self.layers.len());
        for _ in &self.layers {
            let h = Tensor::zeros((1, self.config.hidden_size), DType::F32, &self.device)?;
            let c = Tensor::zeros((1, self.config.hidden_size), DType::F32, &self.device)?;
            layers.push((h, c));
        }
        Ok(HiddenState { layers })
    }

    fn advance(
        &self,
        vocab: &Vocab,
        state: &HiddenState,
        word: &str,
    ) -> Result<(HiddenState, SurprisalDistribution), ModelError> {
        let parts = tokenize(word);
        if parts.is_empty() {
            return Err(ModelError::EmptyWord);
        }

        let mut state = state.clone();
        let mut logits = Vec::new();
        for part in &parts {
            let token_id = match vocab.lookup(part) {
                Some(id) => id,
                None => {
                    eprintln!("⚠ sentence word '{}' is unknown to the model", part);
                    vocab
                        .unk_id()
                        .ok_or_else(|| ModelError::NoUnkFallback(part.clone()))?
                }
            };
            let (next, step_logits) = self.step(token_id, &state)?;
            state = next;
            logits = step_logits;
        }

        Ok((
            state,
            SurprisalDistribution::new(surprisals_from_logits(&logits)),
        ))
    }
}

/// Convert raw logits into base-2 surprisals: -log2(softmax(logits)).
/// Uses the max-subtraction trick so large logits stay finite.
pub fn surprisals_from_logits(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = logits.iter().map(|&x| (x - max).exp()).sum();
    let ln_denominator = max + sum.ln();

    logits
        .iter()
        .map(|&x| (ln_denominator - x) / std::f32::consts::LN_2)
        .collect()
}
