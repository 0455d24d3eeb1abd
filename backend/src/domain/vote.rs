//! Vote targets, directions, and outcomes.
//!
//! A vote is either up or down; "neutral" is the absence of a stored vote and
//! never a stored value. The two target kinds are kept apart by the tagged
//! [`VoteTarget`] enum so a question vote and a question/tag vote never share
//! storage even when the question identifier matches.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Identifier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

/// Identifier of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(i64);

macro_rules! numeric_id {
    ($name:ident) => {
        impl $name {
            #[rustfmt::skip]
            pub const fn new(raw: i64) -> Self { Self(raw) }

            #[rustfmt::skip]
            pub const fn get(self) -> i64 { self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(QuestionId);
numeric_id!(TagId);

/// Something a voter can vote on.
///
/// # Examples
/// ```
/// use qa_backend::domain::{QuestionId, TagId, VoteTarget};
///
/// let question = VoteTarget::question(QuestionId::new(42));
/// let pair = VoteTarget::question_tag(QuestionId::new(42), TagId::new(3));
/// assert_ne!(question, pair);
/// assert_eq!(pair.question_id(), QuestionId::new(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoteTarget {
    Question { question_id: QuestionId },
    QuestionTag { question_id: QuestionId, tag_id: TagId },
}

impl VoteTarget {
    pub const fn question(question_id: QuestionId) -> Self {
        Self::Question { question_id }
    }

    pub const fn question_tag(question_id: QuestionId, tag_id: TagId) -> Self {
        Self::QuestionTag {
            question_id,
            tag_id,
        }
    }

    /// Question the target belongs to, for either kind.
    pub const fn question_id(&self) -> QuestionId {
        match *self {
            Self::Question { question_id } | Self::QuestionTag { question_id, .. } => question_id,
        }
    }

    /// Tag component, present only for question/tag targets.
    pub const fn tag_id(&self) -> Option<TagId> {
        match *self {
            Self::Question { .. } => None,
            Self::QuestionTag { tag_id, .. } => Some(tag_id),
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question { question_id } => write!(f, "question {question_id}"),
            Self::QuestionTag {
                question_id,
                tag_id,
            } => write!(f, "question {question_id} tag {tag_id}"),
        }
    }
}

/// Errors raised when decoding vote directions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteDirectionError {
    #[error("vote value must be +1 or -1, got {0}")]
    Value(i16),
    #[error("vote direction must be 'up' or 'down', got '{0}'")]
    Name(String),
}

/// Requested or stored vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed contribution to the aggregate score.
    pub const fn value(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl TryFrom<i16> for VoteDirection {
    type Error = VoteDirectionError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(VoteDirectionError::Value(other)),
        }
    }
}

impl FromStr for VoteDirection {
    type Err = VoteDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(VoteDirectionError::Name(other.to_owned())),
        }
    }
}

/// A voter's current position on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    Up,
    Down,
    Neutral,
}

impl From<Option<VoteDirection>> for VoteState {
    fn from(value: Option<VoteDirection>) -> Self {
        match value {
            Some(VoteDirection::Up) => Self::Up,
            Some(VoteDirection::Down) => Self::Down,
            None => Self::Neutral,
        }
    }
}

/// A stored vote row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub voter_id: UserId,
    pub target: VoteTarget,
    pub direction: VoteDirection,
    pub created_at: DateTime<Utc>,
}

/// Result of casting a vote: the new score and where the voter now stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub target: VoteTarget,
    pub score: i64,
    pub state: VoteState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, Ok(VoteDirection::Up))]
    #[case(-1, Ok(VoteDirection::Down))]
    #[case(0, Err(VoteDirectionError::Value(0)))]
    #[case(2, Err(VoteDirectionError::Value(2)))]
    fn direction_from_stored_value(
        #[case] raw: i16,
        #[case] expected: Result<VoteDirection, VoteDirectionError>,
    ) {
        assert_eq!(VoteDirection::try_from(raw), expected);
    }

    #[rstest]
    #[case("up", Some(VoteDirection::Up))]
    #[case("down", Some(VoteDirection::Down))]
    #[case("UP", None)]
    #[case("sideways", None)]
    fn direction_from_path_segment(#[case] raw: &str, #[case] expected: Option<VoteDirection>) {
        assert_eq!(raw.parse::<VoteDirection>().ok(), expected);
    }

    #[rstest]
    fn question_and_pair_targets_differ_for_same_question() {
        let question = VoteTarget::question(QuestionId::new(1));
        let pair = VoteTarget::question_tag(QuestionId::new(1), TagId::new(1));
        assert_ne!(question, pair);
        assert_eq!(question.tag_id(), None);
        assert_eq!(pair.tag_id(), Some(TagId::new(1)));
    }

    #[rstest]
    fn target_serialises_with_kind_tag() {
        let value = serde_json::to_value(VoteTarget::question_tag(QuestionId::new(4), TagId::new(2)))
            .expect("serialise");
        assert_eq!(
            value,
            serde_json::json!({ "kind": "question_tag", "question_id": 4, "tag_id": 2 })
        );
    }

    #[rstest]
    fn state_from_optional_direction() {
        assert_eq!(VoteState::from(None), VoteState::Neutral);
        assert_eq!(VoteState::from(Some(VoteDirection::Down)), VoteState::Down);
    }
}
