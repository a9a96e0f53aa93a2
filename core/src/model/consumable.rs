use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::gains::Statgain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumableVersion {
    Food,
    Booze,
    Spleen,
    Other,
}

impl ConsumableVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Booze => "booze",
            Self::Spleen => "spleen",
            Self::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "food" => Some(Self::Food),
            "booze" => Some(Self::Booze),
            "spleen" => Some(Self::Spleen),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// One consumption event: eating, drinking, chewing or using something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    pub name: String,
    pub adventure_gain: u32,
    pub amount: u32,
    pub turn: u32,
    pub day: u32,
    pub stat_gain: Statgain,
    pub version: ConsumableVersion,
}

impl Consumable {
    /// # Panics
    /// If `amount` is zero. A consumable line always names at least one unit.
    pub fn new(
        name: impl Into<String>,
        adventure_gain: u32,
        amount: u32,
        turn: u32,
        version: ConsumableVersion,
    ) -> Self {
        assert!(amount >= 1, "consumable amount must be at least 1");
        Self {
            name: name.into(),
            adventure_gain,
            amount,
            turn,
            day: 1,
            stat_gain: Statgain::NONE,
            version,
        }
    }

    pub fn with_day(mut self, day: u32) -> Self {
        assert!(day >= 1, "day numbers start at 1");
        self.day = day;
        self
    }

    pub fn with_stat_gain(mut self, stat_gain: Statgain) -> Self {
        self.stat_gain = stat_gain;
        self
    }

    /// Whether `other` describes the same thing consumed on the same day.
    pub fn is_mergeable(&self, other: &Consumable) -> bool {
        self.name == other.name && self.day == other.day
    }

    /// Fold `other` into `self`, summing amounts and gains.
    ///
    /// # Panics
    /// If the two records do not share name and day.
    pub fn merge(&mut self, other: &Consumable) {
        assert!(
            self.is_mergeable(other),
            "cannot merge {} (day {}) into {} (day {})",
            other.name,
            other.day,
            self.name,
            self.day
        );
        self.amount += other.amount;
        self.adventure_gain += other.adventure_gain;
        self.stat_gain += other.stat_gain;
        self.turn = self.turn.min(other.turn);
    }
}

/// Merge consumables by (name, day), keeping first-seen order.
pub fn merge_by_day<'a>(consumables: impl IntoIterator<Item = &'a Consumable>) -> Vec<Consumable> {
    let mut merged: Vec<Consumable> = Vec::new();
    let mut index: HashMap<(String, u32), usize> = HashMap::new();

    for consumable in consumables {
        let key = (consumable.name.clone(), consumable.day);
        match index.get(&key) {
            Some(&i) => merged[i].merge(consumable),
            None => {
                index.insert(key, merged.len());
                merged.push(consumable.clone());
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pie(amount: u32, day: u32) -> Consumable {
        Consumable::new("key lime pie", 6 * amount, amount, 10, ConsumableVersion::Food)
            .with_day(day)
            .with_stat_gain(Statgain::new(5, 5, 5))
    }

    #[test]
    fn test_merge_sums_amounts_and_gains() {
        let mut a = pie(1, 1);
        a.merge(&pie(2, 1));

        assert_eq!(a.amount, 3);
        assert_eq!(a.adventure_gain, 18);
        assert_eq!(a.stat_gain, Statgain::new(10, 10, 10));
    }

    #[test]
    #[should_panic]
    fn test_merge_rejects_different_day() {
        let mut a = pie(1, 1);
        a.merge(&pie(1, 2));
    }

    #[test]
    #[should_panic]
    fn test_zero_amount_is_rejected() {
        Consumable::new("dud", 0, 0, 1, ConsumableVersion::Other);
    }

    #[test]
    fn test_merge_by_day_groups_per_day() {
        let list = vec![pie(1, 1), pie(1, 2), pie(2, 1)];
        let merged = merge_by_day(&list);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].day, 1);
        assert_eq!(merged[0].amount, 3);
        assert_eq!(merged[1].day, 2);
        assert_eq!(merged[1].amount, 1);
    }
}
