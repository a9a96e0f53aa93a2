use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// An item acquired on a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub amount: u32,
    pub turn: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, amount: u32, turn: u32) -> Self {
        assert!(amount >= 1, "item amount must be at least 1");
        Self {
            name: name.into(),
            amount,
            turn,
        }
    }
}

/// A skill cast, possibly several times, on a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub amount: u32,
    pub mp_cost: u32,
    pub turn: u32,
}

impl Skill {
    pub fn new(name: impl Into<String>, amount: u32, mp_cost: u32, turn: u32) -> Self {
        assert!(amount >= 1, "skill cast count must be at least 1");
        Self {
            name: name.into(),
            amount,
            mp_cost,
            turn,
        }
    }

    /// MP spent over all casts.
    pub fn total_mp_cost(&self) -> u32 {
        self.amount * self.mp_cost
    }
}

/// Sum item amounts by name, keeping first-seen order.
pub fn merge_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<Item> {
    let mut merged: Vec<Item> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for item in items {
        match index.get(item.name.as_str()) {
            Some(&i) => merged[i].amount += item.amount,
            None => {
                index.insert(&item.name, merged.len());
                merged.push(item.clone());
            }
        }
    }
    merged
}

/// Sum skill casts by name, keeping first-seen order.
pub fn merge_skills<'a>(skills: impl IntoIterator<Item = &'a Skill>) -> Vec<Skill> {
    let mut merged: Vec<Skill> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for skill in skills {
        match index.get(skill.name.as_str()) {
            Some(&i) => merged[i].amount += skill.amount,
            None => {
                index.insert(&skill.name, merged.len());
                merged.push(skill.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_items_by_name() {
        let items = vec![
            Item::new("hot wing", 1, 3),
            Item::new("bowling ball", 1, 4),
            Item::new("hot wing", 2, 9),
        ];
        let merged = merge_items(&items);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "hot wing");
        assert_eq!(merged[0].amount, 3);
        assert_eq!(merged[0].turn, 3);
    }

    #[test]
    fn test_skill_mp_cost() {
        let skill = Skill::new("Leash of Linguini", 3, 12, 1);
        assert_eq!(skill.total_mp_cost(), 36);

        let merged = merge_skills(&[skill.clone(), Skill::new("Leash of Linguini", 1, 12, 5)]);
        assert_eq!(merged[0].amount, 4);
    }
}
