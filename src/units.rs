//! Units of measure and conversion to canonical units.
//!
//! Every [`Unit`] belongs to one [`Dimension`] whose canonical unit is the
//! degree (angles), the metre (lengths) or unity (scale factors). Numeric
//! checks compare values in the canonical unit, so a factory that normalizes
//! `2.5969213 grad` to `2.33722917 deg` still passes while a factory that
//! drops the unit does not.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Physical dimension of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Angular,
    Linear,
    Scale,
}

/// Units recognised by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    Degree,
    Grad,
    Radian,
    ArcSecond,
    Metre,
    Kilometre,
    Foot,
    UsSurveyFoot,
    Unity,
    PartsPerMillion,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Degree | Unit::Grad | Unit::Radian | Unit::ArcSecond => Dimension::Angular,
            Unit::Metre | Unit::Kilometre | Unit::Foot | Unit::UsSurveyFoot => Dimension::Linear,
            Unit::Unity | Unit::PartsPerMillion => Dimension::Scale,
        }
    }

    /// The canonical unit of this unit's dimension.
    pub fn canonical(self) -> Unit {
        match self.dimension() {
            Dimension::Angular => Unit::Degree,
            Dimension::Linear => Unit::Metre,
            Dimension::Scale => Unit::Unity,
        }
    }

    /// Multiplier converting a value in this unit to the canonical unit.
    pub fn factor(self) -> f64 {
        match self {
            Unit::Degree => 1.0,
            Unit::Grad => 0.9,
            Unit::Radian => 180.0 / PI,
            Unit::ArcSecond => 1.0 / 3600.0,
            Unit::Metre => 1.0,
            Unit::Kilometre => 1000.0,
            Unit::Foot => 0.3048,
            Unit::UsSurveyFoot => 1200.0 / 3937.0,
            Unit::Unity => 1.0,
            Unit::PartsPerMillion => 1e-6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Degree => "deg",
            Unit::Grad => "grad",
            Unit::Radian => "rad",
            Unit::ArcSecond => "arcsec",
            Unit::Metre => "m",
            Unit::Kilometre => "km",
            Unit::Foot => "ft",
            Unit::UsSurveyFoot => "ftUS",
            Unit::Unity => "unity",
            Unit::PartsPerMillion => "ppm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A numeric value together with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub unit: Unit,
}

impl Measure {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn degrees(value: f64) -> Self {
        Self::new(value, Unit::Degree)
    }

    pub fn metres(value: f64) -> Self {
        Self::new(value, Unit::Metre)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Converts measures to and from canonical units.
///
/// Injected into the verifier through [`Collaborators`](crate::Collaborators)
/// so an implementation can plug in its own unit database.
pub trait UnitConverter: fmt::Debug {
    /// Value of `measure` in the canonical unit of its dimension, or `None`
    /// if the unit is not known to this converter.
    fn to_canonical(&self, measure: Measure) -> Option<f64>;

    /// Value expressed in `unit`, given a value in that unit's canonical unit.
    fn from_canonical(&self, value: f64, unit: Unit) -> Option<f64>;
}

/// Converter backed by the fixed factors of [`Unit::factor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardUnits;

impl UnitConverter for StandardUnits {
    fn to_canonical(&self, measure: Measure) -> Option<f64> {
        Some(measure.value * measure.unit.factor())
    }

    fn from_canonical(&self, value: f64, unit: Unit) -> Option<f64> {
        Some(value / unit.factor())
    }
}
