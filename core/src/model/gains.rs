//! Stat, meat and MP gain values.
//!
//! All three are small `Copy` tuples with component-wise addition. Each has a
//! shared `NONE` constant that is the additive identity.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Substat gains split by attribute. Components may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statgain {
    pub muscle: i32,
    pub myst: i32,
    pub moxie: i32,
}

impl Statgain {
    pub const NONE: Statgain = Statgain::new(0, 0, 0);

    pub const fn new(muscle: i32, myst: i32, moxie: i32) -> Self {
        Self {
            muscle,
            myst,
            moxie,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn total(&self) -> i32 {
        self.muscle + self.myst + self.moxie
    }
}

impl Add for Statgain {
    type Output = Statgain;

    fn add(self, rhs: Statgain) -> Statgain {
        Statgain::new(
            self.muscle + rhs.muscle,
            self.myst + rhs.myst,
            self.moxie + rhs.moxie,
        )
    }
}

impl AddAssign for Statgain {
    fn add_assign(&mut self, rhs: Statgain) {
        *self = *self + rhs;
    }
}

/// Meat gained inside encounters, gained elsewhere, and spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeatGain {
    pub encounter: i32,
    pub other: i32,
    pub spent: i32,
}

impl MeatGain {
    pub const NONE: MeatGain = MeatGain::new(0, 0, 0);

    pub const fn new(encounter: i32, other: i32, spent: i32) -> Self {
        Self {
            encounter,
            other,
            spent,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Meat gained from all sources, ignoring what was spent.
    pub fn gained(&self) -> i32 {
        self.encounter + self.other
    }

    pub fn net(&self) -> i32 {
        self.gained() - self.spent
    }
}

impl Add for MeatGain {
    type Output = MeatGain;

    fn add(self, rhs: MeatGain) -> MeatGain {
        MeatGain::new(
            self.encounter + rhs.encounter,
            self.other + rhs.other,
            self.spent + rhs.spent,
        )
    }
}

impl AddAssign for MeatGain {
    fn add_assign(&mut self, rhs: MeatGain) {
        *self = *self + rhs;
    }
}

/// MP gains by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MpGain {
    pub encounter: i32,
    pub starfish: i32,
    pub resting: i32,
    pub out_of_encounter: i32,
    pub consumable: i32,
}

impl MpGain {
    pub const NONE: MpGain = MpGain::new(0, 0, 0, 0, 0);

    pub const fn new(
        encounter: i32,
        starfish: i32,
        resting: i32,
        out_of_encounter: i32,
        consumable: i32,
    ) -> Self {
        Self {
            encounter,
            starfish,
            resting,
            out_of_encounter,
            consumable,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn total(&self) -> i32 {
        self.encounter + self.starfish + self.resting + self.out_of_encounter + self.consumable
    }

    /// A gain of `amount` attributed to `source`.
    pub fn from_source(source: MpSource, amount: i32) -> Self {
        let mut gain = Self::NONE;
        match source {
            MpSource::Encounter => gain.encounter = amount,
            MpSource::Starfish => gain.starfish = amount,
            MpSource::Resting => gain.resting = amount,
            MpSource::OutOfEncounter => gain.out_of_encounter = amount,
            MpSource::Consumable => gain.consumable = amount,
        }
        gain
    }
}

impl Add for MpGain {
    type Output = MpGain;

    fn add(self, rhs: MpGain) -> MpGain {
        MpGain::new(
            self.encounter + rhs.encounter,
            self.starfish + rhs.starfish,
            self.resting + rhs.resting,
            self.out_of_encounter + rhs.out_of_encounter,
            self.consumable + rhs.consumable,
        )
    }
}

impl AddAssign for MpGain {
    fn add_assign(&mut self, rhs: MpGain) {
        *self = *self + rhs;
    }
}

/// Where an MP gain came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpSource {
    Encounter,
    Starfish,
    Resting,
    OutOfEncounter,
    Consumable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statgain_addition_is_commutative_and_associative() {
        let a = Statgain::new(3, -1, 7);
        let b = Statgain::new(10, 4, 0);
        let c = Statgain::new(-2, 9, 1);

        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!(a + Statgain::NONE, a);
        assert_eq!(Statgain::NONE + a, a);
    }

    #[test]
    fn test_meat_gain_addition() {
        let a = MeatGain::new(100, 20, 5);
        let b = MeatGain::new(0, 300, 250);
        let c = MeatGain::new(7, 0, 0);

        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!(a + MeatGain::NONE, a);
        assert_eq!((a + b).gained(), 420);
        assert_eq!((a + b).net(), 165);
    }

    #[test]
    fn test_mp_gain_addition() {
        let a = MpGain::new(1, 2, 3, 4, 5);
        let b = MpGain::new(10, 0, 0, 0, 1);
        let c = MpGain::from_source(MpSource::Resting, 20);

        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!(a + MpGain::NONE, a);
        assert_eq!((a + c).resting, 23);
        assert_eq!(a.total(), 15);
    }

    #[test]
    fn test_add_assign() {
        let mut total = Statgain::NONE;
        total += Statgain::new(1, 2, 3);
        total += Statgain::new(1, 0, -3);
        assert_eq!(total, Statgain::new(2, 2, 0));
        assert!(!total.is_none());
    }
}
