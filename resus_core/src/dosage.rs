//! Fixed drug dosage policy table.
//!
//! Reproduced as domain data, not computed logic: the table maps the
//! patient age band to the dose string embedded in drug events when
//! dosage prompting is enabled.

use crate::PatientAgeCategory;

/// Adrenaline dose for the given age band.
pub fn adrenaline_dose(age: PatientAgeCategory) -> &'static str {
    match age {
        PatientAgeCategory::Adult => "1mg",
        PatientAgeCategory::Paediatric => "10mcg/kg",
        PatientAgeCategory::Neonate => "10-30mcg/kg",
    }
}

/// Amiodarone dose for the given age band and dose number.
///
/// Returns `None` for neonates, where amiodarone is not indicated.
pub fn amiodarone_dose(age: PatientAgeCategory, dose_number: u32) -> Option<&'static str> {
    match age {
        PatientAgeCategory::Adult => Some(if dose_number == 1 { "300mg" } else { "150mg" }),
        PatientAgeCategory::Paediatric => Some("5mg/kg"),
        PatientAgeCategory::Neonate => None,
    }
}
