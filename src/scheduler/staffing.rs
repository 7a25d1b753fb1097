use super::Policy;
use crate::model::{Day, Role, ShiftSlot};

/// Effectif requis pour `role` sur `slot` le jour `day`.
///
/// Part de la base du créneau ; une surcharge de la politique qui correspond
/// au rôle, à la nature du créneau et au jour la remplace. La première
/// surcharge correspondante l'emporte. Un rôle absent du créneau reste à 0.
pub fn required_staff(slot: &ShiftSlot, role: Role, day: Day, policy: &Policy) -> u32 {
    let base = slot.base_requirement(role);
    if base == 0 {
        return 0;
    }
    policy
        .overrides
        .iter()
        .find(|o| o.applies(role, slot.kind, day))
        .map_or(base, |o| o.required)
}
