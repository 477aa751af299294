use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("unrecognized status value: {0}")]
pub struct ParseStatusError(pub String);

/// Lifecycle of a ticket. `ACTIVE` on submission, `DISPATCHED` once a
/// rescuer is assigned, `SOLVED` when closed out. SOLVED is terminal; no
/// transition guard prevents re-dispatch, which mirrors the dispatcher UI
/// contract (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "DISPATCHED")]
    Dispatched,
    #[serde(rename = "SOLVED")]
    Solved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "ACTIVE",
            TicketStatus::Dispatched => "DISPATCHED",
            TicketStatus::Solved => "SOLVED",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(TicketStatus::Active),
            "DISPATCHED" => Ok(TicketStatus::Dispatched),
            "SOLVED" => Ok(TicketStatus::Solved),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Availability of a rescuer. Not a strict state machine: whichever
/// operation runs last wins the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RescuerStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "on-mission")]
    OnMission,
    #[serde(rename = "responding")]
    Responding,
    #[serde(rename = "off-duty")]
    OffDuty,
}

impl RescuerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RescuerStatus::Available => "available",
            RescuerStatus::OnMission => "on-mission",
            RescuerStatus::Responding => "responding",
            RescuerStatus::OffDuty => "off-duty",
        }
    }

    /// Off-duty rescuers are hidden from dispatcher listings.
    pub fn is_on_duty(&self) -> bool {
        !matches!(self, RescuerStatus::OffDuty)
    }
}

impl Default for RescuerStatus {
    fn default() -> Self {
        RescuerStatus::Available
    }
}

impl fmt::Display for RescuerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RescuerStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(RescuerStatus::Available),
            "on-mission" => Ok(RescuerStatus::OnMission),
            "responding" => Ok(RescuerStatus::Responding),
            "off-duty" => Ok(RescuerStatus::OffDuty),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_status_round_trips_wire_strings() {
        for status in [
            TicketStatus::Active,
            TicketStatus::Dispatched,
            TicketStatus::Solved,
        ] {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
    }

    #[test]
    fn rescuer_status_round_trips_wire_strings() {
        for status in [
            RescuerStatus::Available,
            RescuerStatus::OnMission,
            RescuerStatus::Responding,
            RescuerStatus::OffDuty,
        ] {
            assert_eq!(status.as_str().parse::<RescuerStatus>().unwrap(), status);
        }
    }

    #[test]
    fn only_off_duty_is_hidden() {
        assert!(RescuerStatus::Available.is_on_duty());
        assert!(RescuerStatus::OnMission.is_on_duty());
        assert!(RescuerStatus::Responding.is_on_duty());
        assert!(!RescuerStatus::OffDuty.is_on_duty());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("busy".parse::<RescuerStatus>().is_err());
        assert!("active".parse::<TicketStatus>().is_err());
    }
}
