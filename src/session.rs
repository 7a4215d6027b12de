//! Score, round and miss tracking
//!
//! Owned by the application, not the simulation. The frame loop feeds it the
//! hit and escape events each tick produces.

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_POINTS, HEADSHOT_BONUS};
use crate::sim::GameEvent;

/// Difficulty, fixed once a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Rounds played before the session ends
    pub fn max_rounds(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 15,
        }
    }

    /// Multiplier on target spawn speed
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.7,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.4,
        }
    }
}

/// How hard the commentary should go at the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TauntLevel {
    Mild,
    Medium,
    Savage,
}

impl TauntLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TauntLevel::Mild => "mild",
            TauntLevel::Medium => "medium",
            TauntLevel::Savage => "savage",
        }
    }
}

/// Score after a hit in `round`
///
/// Each round past the first adds 10% to the base points (floored), so round
/// 0 pays 90%; a headshot adds a flat bonus on top.
pub fn calculate_score(current: u64, round: u32, headshot: bool) -> u64 {
    let points = BASE_POINTS * (9 + u64::from(round)) / 10;
    let bonus = if headshot { HEADSHOT_BONUS } else { 0 };
    current + points + bonus
}

/// Commentary intensity for a miss count
pub fn taunt_level(misses: u32) -> TauntLevel {
    if misses < 3 {
        TauntLevel::Mild
    } else if misses < 7 {
        TauntLevel::Medium
    } else {
        TauntLevel::Savage
    }
}

/// What applying an event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// Event doesn't affect the session
    None,
    /// Score went up
    Scored { points: u64 },
    /// A target got away
    Missed,
}

/// Session state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    /// 1-based; advances on every hit and escape
    pub round: u32,
    pub misses: u32,
    pub hits: u32,
    pub headshots: u32,
    pub difficulty: Difficulty,
}

impl Session {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            score: 0,
            round: 1,
            misses: 0,
            hits: 0,
            headshots: 0,
            difficulty,
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.difficulty.max_rounds()
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.difficulty.speed_multiplier()
    }

    /// The run is over once the round counter passes the difficulty's cap
    pub fn is_over(&self) -> bool {
        self.round > self.max_rounds()
    }

    pub fn taunt_level(&self) -> TauntLevel {
        taunt_level(self.misses)
    }

    /// Record a hit, scored against the round it happened in
    pub fn on_hit(&mut self, headshot: bool) -> u64 {
        if self.is_over() {
            return 0;
        }
        let new_score = calculate_score(self.score, self.round, headshot);
        let points = new_score - self.score;
        self.score = new_score;
        self.hits += 1;
        if headshot {
            self.headshots += 1;
        }
        self.advance_round();
        points
    }

    /// Record a target that got away
    pub fn on_escape(&mut self) {
        if self.is_over() {
            return;
        }
        self.misses += 1;
        self.advance_round();
    }

    /// Apply one simulation event
    pub fn apply(&mut self, event: &GameEvent) -> SessionChange {
        match event {
            GameEvent::TargetHit(hit) => SessionChange::Scored {
                points: self.on_hit(hit.headshot),
            },
            GameEvent::TargetEscaped { .. } if !self.is_over() => {
                self.on_escape();
                SessionChange::Missed
            }
            _ => SessionChange::None,
        }
    }

    fn advance_round(&mut self) {
        self.round += 1;
        if self.is_over() {
            log::info!(
                "Session over: score {} after {} rounds ({} hits, {} misses)",
                self.score,
                self.max_rounds(),
                self.hits,
                self.misses
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Hit;
    use glam::Vec2;

    #[test]
    fn test_base_score_round_one() {
        assert_eq!(calculate_score(0, 1, false), 100);
    }

    #[test]
    fn test_round_multiplier() {
        // Round 3 = 1 + (2 * 0.1) = 1.2 multiplier
        assert_eq!(calculate_score(0, 3, false), 120);
        assert_eq!(calculate_score(500, 10, false), 690);
        assert_eq!(calculate_score(0, 0, false), 90);
    }

    #[test]
    fn test_headshot_bonus_is_flat() {
        assert_eq!(calculate_score(0, 1, true), 150);
        assert_eq!(calculate_score(0, 3, true), 170);
    }

    #[test]
    fn test_taunt_levels() {
        assert_eq!(taunt_level(0), TauntLevel::Mild);
        assert_eq!(taunt_level(1), TauntLevel::Mild);
        assert_eq!(taunt_level(2), TauntLevel::Mild);
        assert_eq!(taunt_level(3), TauntLevel::Medium);
        assert_eq!(taunt_level(5), TauntLevel::Medium);
        assert_eq!(taunt_level(6), TauntLevel::Medium);
        assert_eq!(taunt_level(7), TauntLevel::Savage);
        assert_eq!(taunt_level(10), TauntLevel::Savage);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_hit_scores_and_advances_round() {
        let mut session = Session::new(Difficulty::Medium);
        assert_eq!(session.on_hit(false), 100);
        assert_eq!(session.round, 2);
        assert_eq!(session.on_hit(false), 110);
        assert_eq!(session.score, 210);
        assert_eq!(session.misses, 0);
    }

    #[test]
    fn test_escape_counts_miss() {
        let mut session = Session::new(Difficulty::Medium);
        let event = GameEvent::TargetEscaped {
            id: 1,
            pos: Vec2::new(0.5, 1.01),
        };
        assert_eq!(session.apply(&event), SessionChange::Missed);
        assert_eq!(session.misses, 1);
        assert_eq!(session.round, 2);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_shot_fired_alone_changes_nothing() {
        let mut session = Session::new(Difficulty::Medium);
        let change = session.apply(&GameEvent::ShotFired {
            pos: Vec2::new(0.5, 0.5),
        });
        assert_eq!(change, SessionChange::None);
        assert_eq!(session.round, 1);
        assert_eq!(session.misses, 0);
    }

    #[test]
    fn test_apply_hit_event() {
        let mut session = Session::new(Difficulty::Medium);
        let hit = Hit {
            target_id: 3,
            pos: Vec2::new(0.5, 0.5),
            distance: 0.01,
            headshot: true,
        };
        let change = session.apply(&GameEvent::TargetHit(hit));
        assert_eq!(change, SessionChange::Scored { points: 150 });
        assert_eq!(session.headshots, 1);
    }

    #[test]
    fn test_session_ends_after_max_rounds() {
        let mut session = Session::new(Difficulty::Easy);
        for _ in 0..4 {
            session.on_escape();
        }
        assert!(!session.is_over());
        session.on_hit(false);
        assert!(session.is_over());
        assert_eq!(session.round, 6);

        // Further events are ignored
        let score = session.score;
        assert_eq!(session.on_hit(false), 0);
        session.on_escape();
        assert_eq!(session.score, score);
        assert_eq!(session.misses, 4);
        assert_eq!(session.round, 6);
    }
}
