//! The observable surface of an entity built by the factory under test.
//!
//! The harness never looks inside vendor objects. It reads them through the
//! [`Entity`] trait, which exposes exactly the properties a reference fixture
//! can assert on: identifiers, name, aliases, named dependencies, measures and
//! scalar fields.

use crate::factory::FactoryKind;
use crate::units::Measure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of geodetic object a fixture describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Ellipsoid,
    PrimeMeridian,
    GeodeticDatum,
    VerticalDatum,
    CoordinateSystem,
    GeographicCrs,
    GeocentricCrs,
    ProjectedCrs,
    VerticalCrs,
    CompoundCrs,
    Conversion,
    Transformation,
    ConcatenatedOperation,
}

impl EntityKind {
    /// The factory responsible for creating entities of this kind.
    pub fn factory(self) -> FactoryKind {
        match self {
            EntityKind::Ellipsoid
            | EntityKind::PrimeMeridian
            | EntityKind::GeodeticDatum
            | EntityKind::VerticalDatum => FactoryKind::Datum,
            EntityKind::CoordinateSystem => FactoryKind::CoordinateSystem,
            EntityKind::GeographicCrs
            | EntityKind::GeocentricCrs
            | EntityKind::ProjectedCrs
            | EntityKind::VerticalCrs
            | EntityKind::CompoundCrs => FactoryKind::Crs,
            EntityKind::Conversion
            | EntityKind::Transformation
            | EntityKind::ConcatenatedOperation => FactoryKind::CoordinateOperation,
        }
    }

    /// Role name under which an entity of this kind is referenced as a
    /// dependency of another entity.
    pub fn role(self) -> &'static str {
        match self {
            EntityKind::Ellipsoid => "ellipsoid",
            EntityKind::PrimeMeridian => "primeMeridian",
            EntityKind::GeodeticDatum | EntityKind::VerticalDatum => "datum",
            EntityKind::CoordinateSystem => "coordinateSystem",
            EntityKind::GeographicCrs
            | EntityKind::GeocentricCrs
            | EntityKind::ProjectedCrs
            | EntityKind::VerticalCrs
            | EntityKind::CompoundCrs => "baseCrs",
            EntityKind::Conversion => "conversion",
            EntityKind::Transformation | EntityKind::ConcatenatedOperation => "operation",
        }
    }

    pub fn is_operation(self) -> bool {
        self.factory() == FactoryKind::CoordinateOperation
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Ellipsoid => "ellipsoid",
            EntityKind::PrimeMeridian => "prime meridian",
            EntityKind::GeodeticDatum => "geodetic datum",
            EntityKind::VerticalDatum => "vertical datum",
            EntityKind::CoordinateSystem => "coordinate system",
            EntityKind::GeographicCrs => "geographic CRS",
            EntityKind::GeocentricCrs => "geocentric CRS",
            EntityKind::ProjectedCrs => "projected CRS",
            EntityKind::VerticalCrs => "vertical CRS",
            EntityKind::CompoundCrs => "compound CRS",
            EntityKind::Conversion => "conversion",
            EntityKind::Transformation => "transformation",
            EntityKind::ConcatenatedOperation => "concatenated operation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Code of an entity in its authority's register.
///
/// EPSG codes are numeric; user-defined GIGS objects use numeric codes too,
/// but other registers may use text codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Numeric(u32),
    Text(String),
}

impl From<u32> for Code {
    fn from(code: u32) -> Self {
        Code::Numeric(code)
    }
}

impl From<&str> for Code {
    fn from(code: &str) -> Self {
        Code::Text(code.to_string())
    }
}

impl From<String> for Code {
    fn from(code: String) -> Self {
        Code::Text(code)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Numeric(n) => write!(f, "{}", n),
            Code::Text(s) => write!(f, "{}", s),
        }
    }
}

/// An authority-qualified identifier such as `EPSG:6326`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    pub authority: String,
    pub code: String,
}

impl Identifier {
    pub fn new(authority: impl Into<String>, code: impl ToString) -> Self {
        Self {
            authority: authority.into(),
            code: code.to_string(),
        }
    }

    /// Authorities compare case-insensitively, codes exactly.
    pub fn matches(&self, other: &Identifier) -> bool {
        self.authority.eq_ignore_ascii_case(&other.authority) && self.code == other.code
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

/// A scalar property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Real(x) => write!(f, "{}", x),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Read access to an object returned by the factory under test.
pub trait Entity: fmt::Debug {
    fn kind(&self) -> EntityKind;

    fn identifiers(&self) -> Vec<Identifier>;

    /// Primary name, if the implementation records one.
    fn name(&self) -> Option<&str>;

    fn aliases(&self) -> Vec<String>;

    /// A named sub-component such as `ellipsoid` or `step 1`.
    fn dependency(&self, role: &str) -> Option<&dyn Entity>;

    /// A numeric attribute, in the unit the implementation stored it in.
    fn measure(&self, field: &str) -> Option<Measure>;

    /// A scalar attribute such as `isNorthAxisFirst`.
    fn field(&self, _field: &str) -> Option<FieldValue> {
        None
    }

    /// Short description used in failure labels.
    fn describe(&self) -> String {
        match (self.identifiers().first(), self.name()) {
            (Some(id), _) => format!("{} {}", self.kind(), id),
            (None, Some(name)) => format!("{} \"{}\"", self.kind(), name),
            (None, None) => self.kind().to_string(),
        }
    }
}
