//! Comparison of a built entity against its reference fixture.
//!
//! Checks run in a fixed order and the first unmet one ends the test:
//!
//! 1. the entity exists;
//! 2. the structural validator accepts it;
//! 3. its identifiers contain the fixture's authority and code;
//! 4. its name equals the fixture's name exactly;
//! 5. its aliases cover (or equal) the fixture's aliases;
//! 6. its named dependencies carry the expected names;
//! 7. scalar fields and measures match, measures within tolerance.
//!
//! Steps 3 to 6 are gated by capability flags. A disabled check does not
//! fail: it leaves a [`Tip`] in the returned [`Verification`].

use crate::config::{Capability, Configuration};
use crate::entity::{Entity, FieldValue};
use crate::errors::{PropertyMismatch, TestError, TestResult};
use crate::factory::{Collaborators, Validator};
use crate::fixture::ReferenceFixture;
use crate::units::{Dimension, Measure, Unit, UnitConverter};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// How the entity's aliases must relate to the fixture's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasPolicy {
    /// Every expected alias must be present; extra aliases are fine.
    Superset,
    /// The alias sets must be equal.
    Exact,
}

impl Default for AliasPolicy {
    fn default() -> Self {
        AliasPolicy::Superset
    }
}

/// Absolute tolerances, in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Degrees.
    pub angular: f64,
    /// Metres.
    pub linear: f64,
    pub scale: f64,
}

impl Tolerances {
    pub const ANGULAR: f64 = 1e-7;
    pub const LINEAR: f64 = 1e-3;
    pub const SCALE: f64 = 1e-10;

    pub fn for_unit(&self, unit: Unit) -> f64 {
        match unit.dimension() {
            Dimension::Angular => self.angular,
            Dimension::Linear => self.linear,
            Dimension::Scale => self.scale,
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            angular: Self::ANGULAR,
            linear: Self::LINEAR,
            scale: Self::SCALE,
        }
    }
}

/// Switches set per test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Run the identifier, name and alias checks.
    pub identification: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            identification: true,
        }
    }
}

/// A check downgraded to a skip because a capability is disclaimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tip {
    pub check: String,
    pub capability: Capability,
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not checked because {} is false", self.check, self.capability)
    }
}

/// What a successful verification did not check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub tips: Vec<Tip>,
}

impl Verification {
    fn tip(&mut self, check: impl Into<String>, capability: Capability) {
        let tip = Tip {
            check: check.into(),
            capability,
        };
        debug!("{}", tip);
        self.tips.push(tip);
    }
}

#[derive(Debug, Clone)]
pub struct Verifier {
    validator: Arc<dyn Validator>,
    units: Arc<dyn UnitConverter>,
    alias_policy: AliasPolicy,
    tolerances: Tolerances,
}

impl Verifier {
    pub fn new(validator: Arc<dyn Validator>, units: Arc<dyn UnitConverter>) -> Self {
        Self {
            validator,
            units,
            alias_policy: AliasPolicy::default(),
            tolerances: Tolerances::default(),
        }
    }

    pub fn from_collaborators(collaborators: &Collaborators) -> Self {
        Self::new(
            Arc::clone(collaborators.validator()),
            Arc::clone(collaborators.units()),
        )
    }

    pub fn with_alias_policy(mut self, alias_policy: AliasPolicy) -> Self {
        self.alias_policy = alias_policy;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn alias_policy(&self) -> AliasPolicy {
        self.alias_policy
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn verify(
        &self,
        entity: Option<&dyn Entity>,
        fixture: &ReferenceFixture,
        configuration: &Configuration,
        options: VerifyOptions,
    ) -> TestResult<Verification> {
        let entity = entity.ok_or_else(|| {
            TestError::unexpected(format!(
                "no {} was built for {}",
                fixture.kind(),
                fixture.identifier()
            ))
        })?;
        let mut verification = Verification::default();

        self.validator
            .validate(entity)
            .map_err(|e| TestError::structural(e.message))?;

        if options.identification {
            self.verify_identification(entity, fixture, configuration, &mut verification)?;
        }
        self.verify_dependencies(entity, fixture, configuration, &mut verification)?;
        self.verify_fields(entity, fixture)?;
        self.verify_measures(entity, fixture, configuration, &mut verification)?;

        Ok(verification)
    }

    fn verify_identification(
        &self,
        entity: &dyn Entity,
        fixture: &ReferenceFixture,
        configuration: &Configuration,
        verification: &mut Verification,
    ) -> TestResult<()> {
        let expected = fixture.identifier();

        if configuration.flag(Capability::StandardIdentifierSupported) {
            let identifiers = entity.identifiers();
            if !identifiers.iter().any(|id| id.matches(&expected)) {
                let actual: Vec<String> = identifiers.iter().map(ToString::to_string).collect();
                return Err(PropertyMismatch::new(
                    entity.describe(),
                    "identifier",
                    &expected,
                    format!("[{}]", actual.join(", ")),
                )
                .into());
            }
        } else {
            verification.tip("identifier", Capability::StandardIdentifierSupported);
        }

        if configuration.flag(Capability::StandardNameSupported) {
            let actual = entity.name().unwrap_or("<none>");
            if actual != fixture.name() {
                return Err(
                    PropertyMismatch::new(entity.describe(), "name", fixture.name(), actual).into(),
                );
            }
        } else {
            verification.tip("name", Capability::StandardNameSupported);
        }

        if configuration.flag(Capability::StandardAliasSupported) {
            let actual: BTreeSet<String> = entity.aliases().into_iter().collect();
            let expected = fixture.aliases();
            let matches = match self.alias_policy {
                AliasPolicy::Superset => expected.is_subset(&actual),
                AliasPolicy::Exact => *expected == actual,
            };
            if !matches {
                return Err(PropertyMismatch::new(
                    entity.describe(),
                    "alias",
                    format_set(expected),
                    format_set(&actual),
                )
                .into());
            }
        } else {
            verification.tip("alias", Capability::StandardAliasSupported);
        }

        Ok(())
    }

    fn verify_dependencies(
        &self,
        entity: &dyn Entity,
        fixture: &ReferenceFixture,
        configuration: &Configuration,
        verification: &mut Verification,
    ) -> TestResult<()> {
        if fixture.dependencies().is_empty() {
            return Ok(());
        }
        let gate = [
            Capability::DependencyIdentificationSupported,
            Capability::StandardNameSupported,
        ];
        if let Some(&disabled) = gate.iter().find(|&&c| !configuration.flag(c)) {
            for role in fixture.dependencies().keys() {
                verification.tip(format!("{} name", role), disabled);
            }
            return Ok(());
        }

        for (role, expected) in fixture.dependencies() {
            let actual = entity
                .dependency(role)
                .map(|d| d.name().unwrap_or("<none>").to_string())
                .unwrap_or_else(|| "<missing>".to_string());
            if actual != *expected {
                return Err(PropertyMismatch::new(
                    entity.describe(),
                    format!("{} name", role),
                    expected,
                    actual,
                )
                .under(Capability::DependencyIdentificationSupported)
                .into());
            }
        }
        Ok(())
    }

    fn verify_fields(&self, entity: &dyn Entity, fixture: &ReferenceFixture) -> TestResult<()> {
        for (field, expected) in fixture.fields() {
            let actual = entity.field(field);
            let matches = match (expected, &actual) {
                (FieldValue::Real(e), Some(FieldValue::Real(a))) => {
                    (e - a).abs() <= self.tolerances.scale
                }
                (e, Some(a)) => e == a,
                (_, None) => false,
            };
            if !matches {
                let actual = actual.map_or_else(|| "<missing>".to_string(), |a| a.to_string());
                return Err(PropertyMismatch::new(entity.describe(), field.as_str(), expected, actual).into());
            }
        }
        Ok(())
    }

    /// Dual numeric check: the stored value in the supplied unit when user
    /// values must be preserved, and always the value in the canonical unit.
    /// Tolerances are canonical and converted for the first comparison.
    fn verify_measures(
        &self,
        entity: &dyn Entity,
        fixture: &ReferenceFixture,
        configuration: &Configuration,
        verification: &mut Verification,
    ) -> TestResult<()> {
        let preserves = configuration.flag(Capability::PreservesUserValues);

        for (field, expected) in fixture.measures() {
            let tolerance = fixture
                .tolerance()
                .unwrap_or_else(|| self.tolerances.for_unit(expected.unit));
            let actual = entity.measure(field).ok_or_else(|| {
                PropertyMismatch::new(entity.describe(), field.as_str(), expected, "<missing>")
            })?;

            if preserves {
                let supplied_tolerance = self
                    .units
                    .from_canonical(tolerance, expected.unit)
                    .ok_or_else(|| {
                        TestError::unexpected(format!("cannot express a tolerance in {}", expected.unit))
                    })?
                    .abs();
                if actual.unit != expected.unit
                    || (actual.value - expected.value).abs() > supplied_tolerance
                {
                    return Err(PropertyMismatch::new(
                        entity.describe(),
                        format!("{} (as supplied)", field),
                        expected,
                        actual,
                    )
                    .under(Capability::PreservesUserValues)
                    .into());
                }
            } else {
                verification.tip(format!("{} (as supplied)", field), Capability::PreservesUserValues);
            }

            let expected_canonical = self.canonical(*expected)?;
            let actual_canonical = self.canonical(actual)?;
            if actual.unit.dimension() != expected.unit.dimension()
                || (actual_canonical - expected_canonical).abs() > tolerance
            {
                let canonical = expected.unit.canonical();
                return Err(PropertyMismatch::new(
                    entity.describe(),
                    format!("{} (in {})", field, canonical),
                    Measure::new(expected_canonical, canonical),
                    Measure::new(actual_canonical, actual.unit.canonical()),
                )
                .into());
            }
        }
        Ok(())
    }

    fn canonical(&self, measure: Measure) -> TestResult<f64> {
        self.units
            .to_canonical(measure)
            .ok_or_else(|| TestError::unexpected(format!("cannot convert {} to a canonical unit", measure)))
    }
}

fn format_set(set: &BTreeSet<String>) -> String {
    let items: Vec<&str> = set.iter().map(String::as_str).collect();
    format!("{{{}}}", items.join(", "))
}
