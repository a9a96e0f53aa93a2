//! Session data model shared by every ingestion path.

pub mod changes;
pub mod consumable;
pub mod gains;
pub mod item;
pub mod level;
pub mod session;
pub mod snapshot;
pub mod summary;
pub mod turn;

pub use changes::{
    Banish, CombatRecord, DayChange, DayComments, EquipmentChange, EquipmentSlot, FamiliarChange,
    Hybridization, LearnedSkill, Pull,
};
pub use consumable::{Consumable, ConsumableVersion};
pub use gains::{MeatGain, MpGain, MpSource, Statgain};
pub use item::{Item, Skill};
pub use level::LevelData;
pub use session::{ASCENSION_START, AscensionLog, CharacterInfo, LogMode};
pub use snapshot::PlayerSnapshot;
pub use summary::{LogSummary, QuestTurns};
pub use turn::{
    DetailedTurnInterval, IntervalKind, SimpleTurnInterval, SingleTurn, Turn, TurnCounts,
    TurnInterval, TurnVersion,
};
