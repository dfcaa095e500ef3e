//! Parameter Storage Types
//!
//! Provides the typed parameter values and the `ParameterStore` that tuning
//! constants are loaded into before the immutable `RobotConfig` is built.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 32;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is omitted from `iter_names`
        const HIDDEN = 0b00000001;
        /// Parameter cannot be overridden after registration
        const READ_ONLY = 0b00000010;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f64),
}

impl ParamValue {
    /// Numeric view of the value (`Bool` maps to 0.0 / 1.0)
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Bool(v) => f64::from(u8::from(*v)),
            ParamValue::Int(v) => f64::from(*v),
            ParamValue::Float(v) => *v,
        }
    }

    fn same_type(&self, other: &ParamValue) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

/// Parameter metadata
#[derive(Debug, Clone)]
pub struct ParamMetadata {
    pub flags: ParamFlags,
}

/// Parameter store for configuration management
pub struct ParameterStore {
    parameters: FnvIndexMap<String<PARAM_NAME_LEN>, ParamValue, MAX_PARAMS>,
    metadata: FnvIndexMap<String<PARAM_NAME_LEN>, ParamMetadata, MAX_PARAMS>,
    /// Set once any parameter has been overridden
    dirty: bool,
}

fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::<PARAM_NAME_LEN>::new();
    key.push_str(name)
        .map_err(|_| ParameterError::UnknownParameter)?;
    Ok(key)
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            parameters: FnvIndexMap::new(),
            metadata: FnvIndexMap::new(),
            dirty: false,
        }
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(&key(name).ok()?)
    }

    /// Numeric parameter value, if registered
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).map(ParamValue::as_f64)
    }

    /// Override a registered parameter
    ///
    /// Integer values are accepted for float parameters; any other type
    /// change is rejected.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = key(name)?;

        let current = self
            .parameters
            .get(&key)
            .ok_or(ParameterError::UnknownParameter)?;

        if let Some(meta) = self.metadata.get(&key) {
            if meta.flags.contains(ParamFlags::READ_ONLY) {
                return Err(ParameterError::ReadOnly);
            }
        }

        let value = match (current, value) {
            (ParamValue::Float(_), ParamValue::Int(v)) => ParamValue::Float(f64::from(v)),
            (current, value) if current.same_type(&value) => value,
            _ => return Err(ParameterError::TypeMismatch),
        };

        self.parameters
            .insert(key, value)
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Register a new parameter with default value and flags
    ///
    /// If the parameter already exists, this is a no-op (idempotent).
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = key(name)?;

        if self.parameters.contains_key(&key) {
            return Ok(());
        }

        self.parameters
            .insert(key.clone(), default_value)
            .map_err(|_| ParameterError::StoreFull)?;
        self.metadata
            .insert(key, ParamMetadata { flags })
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    /// Check if parameter is hidden
    pub fn is_hidden(&self, name: &str) -> bool {
        self.get_metadata(name)
            .is_some_and(|meta| meta.flags.contains(ParamFlags::HIDDEN))
    }

    /// Get all parameter names (excluding hidden parameters)
    pub fn iter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .keys()
            .map(|name| name.as_str())
            .filter(|name| !self.is_hidden(name))
    }

    /// Get parameter count (excluding hidden parameters)
    pub fn count(&self) -> usize {
        self.iter_names().count()
    }

    /// Check if any parameter was overridden since registration
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get total parameter count (including hidden parameters)
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Get metadata for a parameter by name
    pub fn get_metadata(&self, name: &str) -> Option<&ParamMetadata> {
        self.metadata.get(&key(name).ok()?)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
