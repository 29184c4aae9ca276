// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed property tables for static components.
//!
//! A component type lists its properties once, as a `const` table of [`PropertyDescriptor`]s.
//! The synchronizer only ever sees the erased [`PropertyProvider`] view.

use std::fmt::Debug;

use indexmap::IndexMap;
use obsseq_config::{Parameter, SysConfig, Value, systems};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadType {
    Instrument,
    Engineering,
    Telescope,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    pub broad: BroadType,
    /// Instrument name shared by a static component and the iterators that drive it.
    pub narrow: &'static str,
}

impl ComponentType {
    pub const fn new(broad: BroadType, narrow: &'static str) -> Self {
        Self { broad, narrow }
    }

    pub fn is_instrument_or_engineering(&self) -> bool {
        matches!(self.broad, BroadType::Instrument | BroadType::Engineering)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyFlags {
    /// Updated as a side effect of setting other properties.
    pub volatile: bool,
    /// May be stepped by an iterator.
    pub iterable: bool,
    /// May be searched on.
    pub queryable: bool,
}

impl PropertyFlags {
    pub const FIXED: PropertyFlags = PropertyFlags {
        volatile: false,
        iterable: false,
        queryable: false,
    };
    pub const ITERABLE: PropertyFlags = PropertyFlags {
        volatile: false,
        iterable: true,
        queryable: true,
    };
    pub const VOLATILE: PropertyFlags = PropertyFlags {
        volatile: true,
        iterable: true,
        queryable: true,
    };
}

/// Accessors of one property of `T`.
pub struct PropertyDescriptor<T> {
    pub name: &'static str,
    pub flags: PropertyFlags,
    pub get: fn(&T) -> Option<Value>,
    pub set: fn(&mut T, &Value) -> Result<()>,
}

impl<T> PropertyDescriptor<T> {
    pub fn info(&self) -> PropertyInfo {
        PropertyInfo {
            name: self.name,
            flags: self.flags,
        }
    }
}

impl<T> Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: &'static str,
    pub flags: PropertyFlags,
}

/// Values of every property, in table order.
pub type PropertySnapshot = IndexMap<&'static str, Option<Value>>;

/// Property access to a static component, independent of its concrete type.
pub trait PropertyProvider: Debug + Send {
    fn component_type(&self) -> ComponentType;

    fn properties(&self) -> Vec<PropertyInfo>;

    fn property(&self, name: &str) -> Option<PropertyInfo> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    fn get(&self, name: &str) -> Option<Value>;

    /// Fails with [`Error::UnknownProperty`], [`Error::TypeMismatch`] or
    /// [`Error::PropertyRejected`]; the object is left unchanged in that case.
    fn set(&mut self, name: &str, value: &Value) -> Result<()>;

    fn snapshot(&self) -> PropertySnapshot {
        self.properties()
            .into_iter()
            .map(|p| (p.name, self.get(p.name)))
            .collect()
    }
}

/// A component whose properties are described by a static table.
pub trait Described: Debug + Send + Sized + 'static {
    const PROPERTIES: &'static [PropertyDescriptor<Self>];

    fn component_type(&self) -> ComponentType;

    fn descriptor(name: &str) -> Option<&'static PropertyDescriptor<Self>> {
        Self::PROPERTIES.iter().find(|d| d.name == name)
    }
}

impl<T: Described> PropertyProvider for T {
    fn component_type(&self) -> ComponentType {
        Described::component_type(self)
    }

    fn properties(&self) -> Vec<PropertyInfo> {
        T::PROPERTIES.iter().map(PropertyDescriptor::info).collect()
    }

    fn property(&self, name: &str) -> Option<PropertyInfo> {
        T::descriptor(name).map(PropertyDescriptor::info)
    }

    fn get(&self, name: &str) -> Option<Value> {
        T::descriptor(name).and_then(|d| (d.get)(self))
    }

    fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        let Some(descriptor) = T::descriptor(name) else {
            return Err(Error::UnknownProperty(name.to_string()));
        };
        (descriptor.set)(self, value)
    }
}

fn mismatch(property: &str, expected: &'static str, value: &Value) -> Error {
    Error::TypeMismatch {
        property: property.to_string(),
        expected,
        actual: value.type_name(),
    }
}

/// Typed views of a [`Value`] for use inside property setters.
pub fn expect_text<'v>(property: &str, value: &'v Value) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| mismatch(property, "text", value))
}

pub fn expect_bool(property: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| mismatch(property, "bool", value))
}

pub fn expect_int(property: &str, value: &Value) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| mismatch(property, "int", value))
}

pub fn expect_double(property: &str, value: &Value) -> Result<f64> {
    value
        .as_double()
        .ok_or_else(|| mismatch(property, "double", value))
}

/// A one-row iterator table seeded from the iterable properties of `provider`.
pub fn initial_iterator_config(provider: &dyn PropertyProvider) -> SysConfig {
    let mut sys_config = SysConfig::new(systems::INSTRUMENT);
    for info in provider.properties() {
        if info.flags.iterable {
            sys_config.put(Parameter::sparse(info.name, vec![provider.get(info.name)]));
        }
    }
    sys_config
}
