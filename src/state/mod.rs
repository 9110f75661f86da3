//! Polymorphic state blobs: `{ "className": "...", ... }`.
//!
//! Anything persisted with a class name implements [`Stateful`]; a
//! [`ClassRegistry`] turns the name back into a default instance which then
//! loads the rest of the blob.

mod class_registry;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use class_registry::{ClassFactory, ClassRegistry};

use crate::calibration::{DateCalibrator, DateCalibratorKind, ValueCalibrator, ValueCalibratorKind};
use crate::error::{ChartError, ChartResult};
use crate::price_style::{PriceStyle, PriceStyleKind};

pub const CLASS_NAME_KEY: &str = "className";
pub const OPTIONS_KEY: &str = "options";

pub trait Stateful {
    fn class_name(&self) -> &str;
    fn save_state(&self) -> ChartResult<Value>;
    fn load_state(&mut self, state: &Value) -> ChartResult<()>;
}

/// Reads the `className` of a state blob.
pub fn class_name_of(state: &Value) -> ChartResult<&str> {
    match state.get(CLASS_NAME_KEY) {
        None | Some(Value::Null) => Err(ChartError::MissingClassName),
        Some(Value::String(name)) => Ok(name),
        Some(other) => Err(ChartError::InvalidConfig(format!(
            "`{CLASS_NAME_KEY}` must be a string, got {other}"
        ))),
    }
}

/// Creates the registered class named by `state` and loads the blob into it.
pub fn deserialize<T: Stateful>(registry: &ClassRegistry<T>, state: &Value) -> ChartResult<T> {
    let class_name = class_name_of(state)?;
    let mut instance = registry.create_instance(class_name)?;
    instance.load_state(state)?;
    Ok(instance)
}

/// Like [`deserialize`], but an absent or `null` blob yields `None`.
pub fn deserialize_optional<T: Stateful>(
    registry: &ClassRegistry<T>,
    state: Option<&Value>,
) -> ChartResult<Option<T>> {
    match state {
        None | Some(Value::Null) => Ok(None),
        Some(state) => deserialize(registry, state).map(Some),
    }
}

/// Parses the `options` object of a blob; missing or `null` options give the
/// defaults.
pub fn options_or_default<O: DeserializeOwned + Default>(state: &Value) -> ChartResult<O> {
    match state.get(OPTIONS_KEY) {
        None | Some(Value::Null) => Ok(O::default()),
        Some(options) => serde_json::from_value(options.clone()).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to parse state options: {e}"))
        }),
    }
}

pub(crate) fn to_state_value<S: serde::Serialize>(value: &S) -> ChartResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ChartError::InvalidData(format!("failed to serialize state: {e}")))
}

/// Registry with every built-in price style.
#[must_use]
pub fn price_style_registry() -> ClassRegistry<PriceStyle> {
    let mut registry = ClassRegistry::new();
    for kind in PriceStyleKind::ALL {
        // Built-in names are never empty.
        let _ = registry.register(kind.class_name(), move || kind.create_default());
    }
    registry
}

#[must_use]
pub fn date_calibrator_registry() -> ClassRegistry<DateCalibrator> {
    let mut registry = ClassRegistry::new();
    for kind in DateCalibratorKind::ALL {
        let _ = registry.register(kind.class_name(), move || DateCalibrator::with_kind(kind));
    }
    registry
}

#[must_use]
pub fn value_calibrator_registry() -> ClassRegistry<ValueCalibrator> {
    let mut registry = ClassRegistry::new();
    for kind in ValueCalibratorKind::ALL {
        let _ = registry.register(kind.class_name(), move || ValueCalibrator::with_kind(kind));
    }
    registry
}
