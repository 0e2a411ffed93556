use tracing::warn;

use crate::error::{Error, Result};
use crate::upscale_ai::tensor_codec::Tensor;

/// An upscaling model seen as an opaque tensor-to-tensor function.
///
/// Implementations receive a `[1, 3, width, height]` tensor and return a
/// `[1, 3, width * scale, height * scale]` tensor, or `None` when the run
/// failed. Any `Fn(Tensor) -> Option<Tensor>` closure is an `Inference`.
pub trait Inference {
    fn infer(&self, input: Tensor) -> Option<Tensor>;
}

impl<F> Inference for F
where
    F: Fn(Tensor) -> Option<Tensor>,
{
    fn infer(&self, input: Tensor) -> Option<Tensor> {
        self(input)
    }
}

/// Explicit handle on the model a pipeline run talks to.
///
/// Holds the engine and a label used in logs and errors. Loading and
/// releasing the model stay with the caller.
#[derive(Debug, Clone)]
pub struct InferenceContext<I> {
    engine: I,
    model_name: String,
}

impl<I: Inference> InferenceContext<I> {
    pub fn new(engine: I, model_name: impl Into<String>) -> Self {
        Self {
            engine,
            model_name: model_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn engine(&self) -> &I {
        &self.engine
    }

    /// Runs one tile through the engine.
    ///
    /// # Errors
    ///
    /// * `Error::InferenceFailed` - When the engine returns nothing, an
    ///   empty tensor, or a tensor not shaped `[1, 3, w, h]`
    pub fn run(&self, input: Tensor, band: usize, block: usize) -> Result<Tensor> {
        let fail = |reason: String| {
            warn!(model = %self.model_name, band, block, %reason, "inference failed");
            Error::InferenceFailed {
                band,
                block,
                reason,
            }
        };

        let output = self
            .engine
            .infer(input)
            .ok_or_else(|| fail("engine returned no output".to_string()))?;

        let shape = output.shape();
        if output.is_empty() {
            return Err(fail(format!("engine returned an empty tensor {shape:?}")));
        }
        if shape[0] != 1 || shape[1] != 3 {
            return Err(fail(format!(
                "expected output shaped [1, 3, w, h], got {shape:?}"
            )));
        }
        Ok(output)
    }
}
