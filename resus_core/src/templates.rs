//! Built-in checklist templates and the other-drugs picker list.
//!
//! These are fixed clinical reference data: the 4H/4T reversible
//! causes, the post-ROSC bundle, and the post-mortem tasks. Reset
//! restores every checklist to the template defaults.

use crate::ChecklistItem;
use once_cell::sync::Lazy;

/// The 4H/4T differential checklist.
pub fn reversible_causes() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::new("hypoxia", "Hypoxia"),
        ChecklistItem::new("hypovolemia", "Hypovolemia"),
        ChecklistItem::new("hypo-hyperkalaemia", "Hypo/Hyperkalaemia"),
        ChecklistItem::new("hypothermia", "Hypothermia"),
        ChecklistItem::new("toxins", "Toxins"),
        ChecklistItem::new("tamponade", "Tamponade"),
        ChecklistItem::new("tension-pneumothorax", "Tension Pneumothorax"),
        ChecklistItem::new("thrombosis", "Thrombosis"),
    ]
}

/// Post-ROSC care bundle.
pub fn post_rosc_tasks() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::new("ventilation", "Optimise Ventilation & Oxygenation"),
        ChecklistItem::new("ecg", "12-Lead ECG"),
        ChecklistItem::new("hypotension", "Treat Hypotension (SBP < 90)"),
        ChecklistItem::new("glucose", "Check Blood Glucose"),
        ChecklistItem::new("temp", "Consider Temperature Control"),
        ChecklistItem::new("causes", "Identify & Treat Causes"),
    ]
}

/// Tasks after a confirmed death.
pub fn post_mortem_tasks() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::new("reposition", "Reposition body & remove lines/tubes"),
        ChecklistItem::new("documentation", "Complete documentation"),
        ChecklistItem::new("expected", "Determine expected/unexpected death"),
        ChecklistItem::new("coroner", "Contact Coroner (if unexpected)"),
        ChecklistItem::new("procedure", "Follow local body handling procedure"),
        ChecklistItem::new("leaflet", "Provide leaflet to bereaved relatives"),
        ChecklistItem::new("donation", "Consider organ/tissue donation"),
    ]
}

/// Medications offered by the "other drug" picker, sorted for display.
pub static OTHER_DRUGS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut drugs = vec![
        "Adenosine",
        "Adrenaline 1:1000",
        "Adrenaline 1:10,000",
        "Amiodarone (Further Dose)",
        "Atropine",
        "Calcium chloride",
        "Glucose",
        "Hartmann's solution",
        "Magnesium sulphate",
        "Midazolam",
        "Naloxone",
        "Potassium chloride",
        "Sodium bicarbonate",
        "Sodium chloride",
        "Tranexamic acid",
    ];
    drugs.sort_unstable();
    drugs
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_start_unchecked() {
        for item in reversible_causes()
            .iter()
            .chain(post_rosc_tasks().iter())
            .chain(post_mortem_tasks().iter())
        {
            assert!(!item.is_completed, "{} should start unchecked", item.id);
        }
    }

    #[test]
    fn test_reversible_causes_contains_hypothermia() {
        let causes = reversible_causes();
        assert_eq!(causes.len(), 8);
        assert!(causes.iter().any(|c| c.id == "hypothermia"));
    }

    #[test]
    fn test_other_drugs_sorted() {
        let mut sorted = OTHER_DRUGS.clone();
        sorted.sort_unstable();
        assert_eq!(*OTHER_DRUGS, sorted);
        assert_eq!(OTHER_DRUGS.len(), 15);
    }
}
