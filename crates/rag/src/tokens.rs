//! Token-budget trimming.
//!
//! Prompts sent to the embedding and chat providers must respect each
//! model's input ceiling. Trimming is a hard prefix cut at the token
//! boundary, not sentence-aware; text already within budget is returned
//! unchanged.

use tiktoken_rs::get_bpe_from_model;

use crate::RagError;

/// Trim `text` so its token count under `model`'s tokenizer is at most
/// `max_tokens`. An unrecognized model name is a configuration error.
pub fn trim_to_tokens(text: &str, max_tokens: usize, model: &str) -> Result<String, RagError> {
    let bpe = get_bpe_from_model(model)
        .map_err(|e| RagError::Configuration(format!("no tokenizer for model {model}: {e}")))?;

    let tokens = bpe.encode_ordinary(text);
    if tokens.len() <= max_tokens {
        return Ok(text.to_string());
    }

    // A cut can land mid-codepoint; back off token by token until the prefix
    // decodes cleanly.
    let mut end = max_tokens;
    while end > 0 {
        match bpe.decode(tokens[..end].to_vec()) {
            Ok(trimmed) => {
                tracing::debug!(
                    model,
                    original_tokens = tokens.len(),
                    trimmed_tokens = end,
                    "trimmed text to token budget"
                );
                return Ok(trimmed);
            }
            Err(_) => end -= 1,
        }
    }

    Ok(String::new())
}

/// Token count of `text` under `model`'s tokenizer.
pub fn count_tokens(text: &str, model: &str) -> Result<usize, RagError> {
    let bpe = get_bpe_from_model(model)
        .map_err(|e| RagError::Configuration(format!("no tokenizer for model {model}: {e}")))?;
    Ok(bpe.encode_ordinary(text).len())
}
