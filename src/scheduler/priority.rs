use crate::model::{ShiftSlot, SlotKind};

fn rank(slot: &ShiftSlot) -> u8 {
    match (slot.kind, slot.high_traffic) {
        (SlotKind::Opening, _) => 0,
        (SlotKind::Ordinary, true) => 1,
        (SlotKind::Ordinary, false) => 2,
        (SlotKind::Closing, _) => 3,
    }
}

/// Ordonne les créneaux : ouvertures, puis heures de pointe, puis créneaux
/// ordinaires, fermetures en dernier. Tri stable : l'ordre du catalogue
/// départage les égalités.
pub fn prioritize(slots: &[ShiftSlot]) -> Vec<&ShiftSlot> {
    let mut ordered: Vec<&ShiftSlot> = slots.iter().collect();
    ordered.sort_by_key(|s| rank(s));
    ordered
}
