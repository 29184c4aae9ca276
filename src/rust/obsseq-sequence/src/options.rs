// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

/// Options handed to every [`ConfigBuilder::reset`](crate::ConfigBuilder::reset) of a walk.
#[derive(Debug, Clone, Default)]
pub struct CbOptions {
    /// Force every node to at most one step, for a cheap preview of the first step.
    pub collapse_repeat: bool,
    /// Stamp the natural (uncollapsed) step count of the emitting node into each step.
    pub add_obs_count: bool,
    /// Consulted by observe nodes when stamping observation class metadata.
    pub calibration_provider: Option<Arc<dyn CalibrationProvider>>,
}

impl CbOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a first step preview that still reports the full step counts.
    pub fn preview() -> Self {
        Self::default().collapse_repeat(true).add_obs_count(true)
    }

    pub fn collapse_repeat(mut self, value: bool) -> Self {
        self.collapse_repeat = value;
        self
    }

    pub fn add_obs_count(mut self, value: bool) -> Self {
        self.add_obs_count = value;
        self
    }

    pub fn calibration_provider(mut self, provider: Arc<dyn CalibrationProvider>) -> Self {
        self.calibration_provider = Some(provider);
        self
    }

    /// The step count a node actually iterates for the given natural count.
    pub(crate) fn effective_count(&self, natural: usize) -> usize {
        if self.collapse_repeat {
            natural.min(1)
        } else {
            natural
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserveType {
    Object,
    Dark,
    Bias,
    Flat,
    Arc,
}

impl ObserveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObserveType::Object => "OBJECT",
            ObserveType::Dark => "DARK",
            ObserveType::Bias => "BIAS",
            ObserveType::Flat => "FLAT",
            ObserveType::Arc => "ARC",
        }
    }

    pub fn default_class(&self) -> ObsClass {
        match self {
            ObserveType::Object => ObsClass::Science,
            ObserveType::Dark | ObserveType::Bias => ObsClass::DayCalibration,
            ObserveType::Flat | ObserveType::Arc => ObsClass::PartnerCalibration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObsClass {
    Science,
    ProgramCalibration,
    PartnerCalibration,
    Acquisition,
    AcquisitionCalibration,
    DayCalibration,
}

impl ObsClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObsClass::Science => "science",
            ObsClass::ProgramCalibration => "progCal",
            ObsClass::PartnerCalibration => "partnerCal",
            ObsClass::Acquisition => "acq",
            ObsClass::AcquisitionCalibration => "acqCal",
            ObsClass::DayCalibration => "dayCal",
        }
    }
}

/// Source of calibration related observation metadata.
pub trait CalibrationProvider: std::fmt::Debug + Send + Sync {
    /// Class of an observe step that does not declare one.
    fn default_class(&self, observe_type: ObserveType) -> ObsClass {
        observe_type.default_class()
    }

    /// Proprietary period of data taken with the given class, in months.
    fn proprietary_months(&self, class: ObsClass) -> Option<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_count() {
        let options = CbOptions::new();
        assert_eq!(options.effective_count(12), 12);
        let collapsed = CbOptions::new().collapse_repeat(true);
        assert_eq!(collapsed.effective_count(12), 1);
        assert_eq!(collapsed.effective_count(0), 0);
    }

    #[test]
    fn test_preview_options() {
        let options = CbOptions::preview();
        assert!(options.collapse_repeat);
        assert!(options.add_obs_count);
        assert!(options.calibration_provider.is_none());
    }
}
