//! Bookable resources: short codes and the kinds they map to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

const MAX_RESOURCE_ID_LEN: usize = 32;

/// Short code identifying one bookable unit (`DR001`, `WS12`, `DR1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(code: &str) -> Result<Self> {
        let ok = !code.is_empty()
            && code.len() <= MAX_RESOURCE_ID_LEN
            && code
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if ok {
            Ok(ResourceId(code.to_string()))
        } else {
            Err(EngineError::InvalidResource(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kind inferred from the code prefix, if it carries a known one.
    pub fn kind(&self) -> Option<ResourceKind> {
        ResourceKind::from_code(&self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        ResourceId::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        ResourceId::parse(&value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// The kinds of bookable unit. Serialized with the backend's query names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    HotSeat,
    #[serde(rename = "work_station")]
    Workstation,
    DiscussionRoom,
    ConferenceRoom,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::HotSeat,
        ResourceKind::Workstation,
        ResourceKind::DiscussionRoom,
        ResourceKind::ConferenceRoom,
    ];

    /// Infer the kind from a resource code prefix (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let prefix = code.get(..2)?.to_ascii_uppercase();
        match prefix.as_str() {
            "WH" | "HS" => Some(ResourceKind::HotSeat),
            "WS" => Some(ResourceKind::Workstation),
            "DR" => Some(ResourceKind::DiscussionRoom),
            "CR" => Some(ResourceKind::ConferenceRoom),
            _ => None,
        }
    }

    /// Name used in `?type=` queries against the backend.
    pub fn query_name(self) -> &'static str {
        match self {
            ResourceKind::HotSeat => "hot_seat",
            ResourceKind::Workstation => "work_station",
            ResourceKind::DiscussionRoom => "discussion_room",
            ResourceKind::ConferenceRoom => "conference_room",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::HotSeat => "Hot Seat",
            ResourceKind::Workstation => "Workstation",
            ResourceKind::DiscussionRoom => "Discussion Room",
            ResourceKind::ConferenceRoom => "Conference Room",
        }
    }

    pub fn is_room(self) -> bool {
        matches!(
            self,
            ResourceKind::DiscussionRoom | ResourceKind::ConferenceRoom
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        ResourceKind::ALL
            .into_iter()
            .find(|k| {
                k.query_name() == normalized
                    || k.label().to_ascii_lowercase().replace(' ', "_") == normalized
            })
            .ok_or_else(|| EngineError::validation("resource kind", format!("unknown kind '{}'", s)))
    }
}
