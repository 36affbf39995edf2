//! # Measurement Type - Unit-Aware Quantity Handling
//!
//! All ingredient quantities flow through [`Measurement`], a value + unit pair
//! that refuses to mix incompatible physical kinds.
//!
//! ## Why a Dedicated Type?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Raw f64 quantities                  Measurement                        │
//! │  ─────────────────────────────────   ─────────────────────────────────  │
//! │  0.25 (of what? liters? kilos?)      Measurement { 250.0, Milliliter }  │
//! │  2.0 kg + 500.0 g = 502.0 ???        2 kg + 500 g = 2.5 kg              │
//! │  30 ml - 50 ml = -20 ml              30 ml - 50 ml = 0 ml (floored)     │
//! │  grams vs milliliters: silent bug    conversion across kinds: error     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unit System
//! Three quantity kinds, each with a base unit and a single derived unit:
//!
//! | Kind   | Base unit  | Derived unit | Factor |
//! |--------|------------|--------------|--------|
//! | Mass   | gram       | kilogram     | ×1000  |
//! | Volume | milliliter | liter        | ×1000  |
//! | Count  | piece      | (none)       | ×1     |
//!
//! Mass ↔ volume ↔ count conversions always fail. There is no density
//! table in this system, so "how many grams is 100 ml of milk" is
//! unanswerable on purpose.
//!
//! ## Invariants
//! - A measurement value is never negative. Construction clamps negative
//!   input to zero, and subtraction floors at zero.
//! - Arithmetic never changes the left-hand side's unit.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Units
// =============================================================================

/// Physical kind of a measurement.
///
/// Units can only convert within their own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuantityKind {
    Mass,
    Volume,
    Count,
}

/// Unit of measure for ingredient quantities.
///
/// Serialized in documents as lowercase words (`"gram"`, `"milliliter"`, ...)
/// so ledger entries stay readable in the store console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MeasurementUnit {
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Piece,
}

impl MeasurementUnit {
    /// The physical kind this unit measures.
    pub const fn kind(&self) -> QuantityKind {
        match self {
            MeasurementUnit::Gram | MeasurementUnit::Kilogram => QuantityKind::Mass,
            MeasurementUnit::Milliliter | MeasurementUnit::Liter => QuantityKind::Volume,
            MeasurementUnit::Piece => QuantityKind::Count,
        }
    }

    /// Multiplier from this unit to its kind's base unit.
    ///
    /// `kilogram → gram` and `liter → milliliter` are both ×1000;
    /// base units (and `piece`) are ×1.
    pub const fn factor_to_base(&self) -> f64 {
        match self {
            MeasurementUnit::Gram | MeasurementUnit::Milliliter | MeasurementUnit::Piece => 1.0,
            MeasurementUnit::Kilogram | MeasurementUnit::Liter => 1000.0,
        }
    }

    /// The base unit of this unit's kind.
    pub const fn base_unit(&self) -> MeasurementUnit {
        match self.kind() {
            QuantityKind::Mass => MeasurementUnit::Gram,
            QuantityKind::Volume => MeasurementUnit::Milliliter,
            QuantityKind::Count => MeasurementUnit::Piece,
        }
    }

    /// Whether a value in this unit can be converted to `other`.
    pub const fn is_compatible_with(&self, other: &MeasurementUnit) -> bool {
        matches!(
            (self.kind(), other.kind()),
            (QuantityKind::Mass, QuantityKind::Mass)
                | (QuantityKind::Volume, QuantityKind::Volume)
                | (QuantityKind::Count, QuantityKind::Count)
        )
    }

    /// Short display symbol (`g`, `kg`, `ml`, `l`, `pc`).
    pub const fn symbol(&self) -> &'static str {
        match self {
            MeasurementUnit::Gram => "g",
            MeasurementUnit::Kilogram => "kg",
            MeasurementUnit::Milliliter => "ml",
            MeasurementUnit::Liter => "l",
            MeasurementUnit::Piece => "pc",
        }
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// A non-negative quantity paired with its unit.
///
/// ## Examples
/// ```rust
/// use brew_core::measurement::{Measurement, MeasurementUnit};
///
/// let shot = Measurement::grams(18.0);
/// let double = shot.multiplied(2.0);
/// assert_eq!(double.value, 36.0);
///
/// let milk = Measurement::milliliters(250.0);
/// let in_liters = milk.converted(MeasurementUnit::Liter).unwrap();
/// assert_eq!(in_liters.value, 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Measurement {
    /// Quantity expressed in `unit`. Never negative.
    pub value: f64,
    pub unit: MeasurementUnit,
}

impl Measurement {
    /// Creates a measurement, clamping negative input to zero.
    ///
    /// Negative stock quantities have no physical meaning here, so a
    /// negative `value` becomes `0.0` rather than an error. Callers that
    /// care about the distinction validate before constructing.
    pub fn new(value: f64, unit: MeasurementUnit) -> Self {
        Self {
            value: if value < 0.0 { 0.0 } else { value },
            unit,
        }
    }

    pub fn grams(value: f64) -> Self {
        Self::new(value, MeasurementUnit::Gram)
    }

    pub fn kilograms(value: f64) -> Self {
        Self::new(value, MeasurementUnit::Kilogram)
    }

    pub fn milliliters(value: f64) -> Self {
        Self::new(value, MeasurementUnit::Milliliter)
    }

    pub fn liters(value: f64) -> Self {
        Self::new(value, MeasurementUnit::Liter)
    }

    pub fn pieces(value: f64) -> Self {
        Self::new(value, MeasurementUnit::Piece)
    }

    /// A zero quantity in the given unit.
    pub fn zero(unit: MeasurementUnit) -> Self {
        Self::new(0.0, unit)
    }

    /// Value expressed in the base unit of this measurement's kind.
    pub fn base_value(&self) -> f64 {
        self.value * self.unit.factor_to_base()
    }

    /// This measurement re-expressed in its kind's base unit.
    pub fn in_base_unit(&self) -> Measurement {
        Measurement::new(self.base_value(), self.unit.base_unit())
    }

    /// Converts to another unit of the same kind.
    ///
    /// Fails with [`CoreError::IncompatibleUnits`] when the kinds differ;
    /// a wrong number is worse than no number.
    pub fn converted(&self, to: MeasurementUnit) -> CoreResult<Measurement> {
        if !self.unit.is_compatible_with(&to) {
            return Err(CoreError::IncompatibleUnits {
                from: self.unit,
                to,
            });
        }
        Ok(Measurement::new(
            self.base_value() / to.factor_to_base(),
            to,
        ))
    }

    /// Scales by a factor, keeping the unit.
    ///
    /// A negative factor would produce a negative quantity, so the result
    /// is clamped to zero like every other constructor.
    pub fn multiplied(&self, factor: f64) -> Measurement {
        Measurement::new(self.value * factor, self.unit)
    }

    /// Adds another measurement, result in `self`'s unit.
    pub fn adding(&self, other: &Measurement) -> CoreResult<Measurement> {
        let addend = other.converted(self.unit)?;
        Ok(Measurement::new(self.value + addend.value, self.unit))
    }

    /// Subtracts another measurement, result in `self`'s unit.
    ///
    /// Floors at zero: subtracting 50 ml from 30 ml leaves 0 ml, not
    /// -20 ml. Availability checks happen before subtraction, so a floored
    /// result only ever shows up when the caller already accepted the loss.
    pub fn subtracting(&self, other: &Measurement) -> CoreResult<Measurement> {
        let subtrahend = other.converted(self.unit)?;
        Ok(Measurement::new(self.value - subtrahend.value, self.unit))
    }

    /// Whether `self` is strictly greater than `other` (compared in base units).
    pub fn is_greater_than(&self, other: &Measurement) -> CoreResult<bool> {
        if !self.unit.is_compatible_with(&other.unit) {
            return Err(CoreError::IncompatibleUnits {
                from: self.unit,
                to: other.unit,
            });
        }
        Ok(self.base_value() > other.base_value())
    }

    /// Whether `self` is strictly less than `other` (compared in base units).
    pub fn is_less_than(&self, other: &Measurement) -> CoreResult<bool> {
        if !self.unit.is_compatible_with(&other.unit) {
            return Err(CoreError::IncompatibleUnits {
                from: self.unit,
                to: other.unit,
            });
        }
        Ok(self.base_value() < other.base_value())
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

impl std::fmt::Display for Measurement {
    /// Formats as `250 ml`, `2.5 kg`, `3 pc`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
