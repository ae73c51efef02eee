use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    Individual,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for GoalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalPeriod::Daily => write!(f, "daily"),
            GoalPeriod::Weekly => write!(f, "weekly"),
            GoalPeriod::Monthly => write!(f, "monthly"),
        }
    }
}

/// A gamification notice. `id` is the stable dedup key: the same event may
/// arrive from the push channel and from a local simulation, and must only
/// be displayed once per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementEvent {
    pub id: String,
    pub kind: AchievementKind,
    pub subject_name: String,
    pub goal_title: String,
    pub period: GoalPeriod,
    pub coin_reward: u32,
    pub timestamp: DateTime<Utc>,
}

impl AchievementEvent {
    pub fn new(
        id: impl Into<String>,
        kind: AchievementKind,
        subject_name: impl Into<String>,
        goal_title: impl Into<String>,
        period: GoalPeriod,
        coin_reward: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            subject_name: subject_name.into(),
            goal_title: goal_title.into(),
            period,
            coin_reward,
            timestamp: Utc::now(),
        }
    }

    pub fn dedup_key(&self) -> &str {
        &self.id
    }
}

/// Envelope delivered over the push channel. A `None` target is a team-wide
/// broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementPush {
    pub target_user_id: Option<Uuid>,
    pub achievement: AchievementEvent,
}

impl AchievementPush {
    pub fn addressed_to(&self, user_id: Uuid) -> bool {
        match self.target_user_id {
            None => true,
            Some(target) => target == user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AchievementEvent {
        AchievementEvent::new(
            "goal-42",
            AchievementKind::Individual,
            "Carlos",
            "Meta diária de atendimentos",
            GoalPeriod::Daily,
            50,
        )
    }

    #[test]
    fn test_dedup_key_is_id() {
        let event = sample();
        assert_eq!(event.dedup_key(), "goal-42");
    }

    #[test]
    fn test_period_display() {
        assert_eq!(GoalPeriod::Daily.to_string(), "daily");
        assert_eq!(GoalPeriod::Weekly.to_string(), "weekly");
        assert_eq!(GoalPeriod::Monthly.to_string(), "monthly");
    }

    #[test]
    fn test_push_broadcast_addresses_everyone() {
        let push = AchievementPush {
            target_user_id: None,
            achievement: sample(),
        };

        assert!(push.addressed_to(Uuid::new_v4()));
    }

    #[test]
    fn test_push_targeted() {
        let me = Uuid::new_v4();
        let push = AchievementPush {
            target_user_id: Some(me),
            achievement: sample(),
        };

        assert!(push.addressed_to(me));
        assert!(!push.addressed_to(Uuid::new_v4()));
    }
}
