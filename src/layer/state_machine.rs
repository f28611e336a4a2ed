//! State machine for layer declaration.
//!
//! A layer name moves through `(absent) -> Declared -> Populated`. Any other
//! move is a configuration error, and a new layer may only be declared once
//! every earlier layer has been populated.

use std::fmt;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    /// Named, but no module filters attached yet.
    Declared,
    /// Has at least one module filter; final.
    Populated,
}

impl fmt::Display for LayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerState::Declared => write!(f, "declared"),
            LayerState::Populated => write!(f, "populated"),
        }
    }
}

/// Check if a layer may move from `from` (`None` = not yet declared) to `to`.
pub fn is_valid_transition(from: Option<LayerState>, to: LayerState) -> bool {
    use LayerState::*;

    match (from, to) {
        (None, Declared) => true,
        (Some(Declared), Populated) => true,
        // Layers are immutable once populated and names are never reused
        _ => false,
    }
}

/// Validate a declaration of `name`.
///
/// `unpopulated` lists the layers that are still waiting for modules.
pub fn check_declare(
    name: &str,
    current: Option<LayerState>,
    unpopulated: &[String],
) -> Result<(), ConfigurationError> {
    if !unpopulated.is_empty() {
        return Err(ConfigurationError::LayersUnpopulated(unpopulated.to_vec()));
    }
    if !is_valid_transition(current, LayerState::Declared) {
        return Err(ConfigurationError::LayerAlreadyExists(name.to_string()));
    }
    Ok(())
}

/// Validate populating `name`.
pub fn check_populate(name: &str, current: Option<LayerState>) -> Result<(), ConfigurationError> {
    if is_valid_transition(current, LayerState::Populated) {
        return Ok(());
    }
    match current {
        None => Err(ConfigurationError::LayerNotDeclared(name.to_string())),
        Some(_) => Err(ConfigurationError::LayerAlreadyPopulated(name.to_string())),
    }
}
