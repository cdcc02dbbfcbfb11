use crate::{
    Error, ErrorReport, Result,
    generation::{GenerationResponse, LectureInfo},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Idle,
    Pending,
    Ready,
    Failed,
}

/// A claim on the slot for one generation call.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub sequence: u64,
    pub request_id: Uuid,
    pub info: LectureInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSnapshot {
    pub state: SlotState,
    pub sequence: u64,
    pub request_id: Option<Uuid>,
    pub response: Option<GenerationResponse>,
    pub error: Option<ErrorReport>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The single logical request position behind the form.
///
/// Every submit or regenerate takes a new sequence number. A completion is
/// only recorded if it carries the latest number, so a slow older call can
/// never overwrite the result of a newer one. Older calls are not cancelled.
#[derive(Debug)]
pub struct GenerationSlot {
    state: SlotState,
    sequence: u64,
    request_id: Option<Uuid>,
    last_input: Option<LectureInfo>,
    response: Option<GenerationResponse>,
    error: Option<Error>,
    updated_at: Option<DateTime<Utc>>,
}

impl GenerationSlot {
    pub fn new() -> Self {
        Self {
            state: SlotState::Idle,
            sequence: 0,
            request_id: None,
            last_input: None,
            response: None,
            error: None,
            updated_at: None,
        }
    }

    pub fn current_state(&self) -> SlotState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == SlotState::Pending
    }

    /// Validates the form and claims the slot. Invalid input never gets a ticket.
    pub fn begin(&mut self, info: LectureInfo) -> Result<Ticket> {
        info.validate()?;
        self.last_input = Some(info.clone());
        Ok(self.issue(info))
    }

    /// Claims the slot again with the last submitted input.
    pub fn regenerate(&mut self) -> Result<Ticket> {
        let info = self
            .last_input
            .clone()
            .ok_or_else(|| Error::input("nothing to regenerate yet"))?;
        Ok(self.issue(info))
    }

    fn issue(&mut self, info: LectureInfo) -> Ticket {
        if self.is_in_flight() {
            debug!(
                "Request {} superseded while still in flight",
                self.sequence
            );
        }

        self.sequence += 1;
        let request_id = Uuid::new_v4();
        self.request_id = Some(request_id);
        self.state = SlotState::Pending;
        self.error = None;
        self.updated_at = Some(Utc::now());

        info!("Issued request {} ({})", self.sequence, request_id);

        Ticket {
            sequence: self.sequence,
            request_id,
            info,
        }
    }

    /// Records an outcome. Returns false and changes nothing if the ticket is stale.
    pub fn complete(&mut self, ticket: &Ticket, outcome: &Result<GenerationResponse>) -> bool {
        if ticket.sequence != self.sequence {
            warn!(
                "Discarding stale result for request {} (latest is {})",
                ticket.sequence, self.sequence
            );
            return false;
        }

        match outcome {
            Ok(response) => {
                self.response = Some(response.clone());
                self.error = None;
                self.state = SlotState::Ready;
            }
            Err(e) => {
                // The previous posts stay visible next to the error
                self.error = Some(e.clone());
                self.state = SlotState::Failed;
            }
        }
        self.updated_at = Some(Utc::now());

        debug!("Request {} settled as {:?}", ticket.sequence, self.state);
        true
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            state: self.state,
            sequence: self.sequence,
            request_id: self.request_id,
            response: self.response.clone(),
            error: self.error.as_ref().map(Error::report),
            updated_at: self.updated_at,
        }
    }
}

impl Default for GenerationSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    fn info(topic: &str) -> LectureInfo {
        LectureInfo {
            location: "광주".to_string(),
            topic: topic.to_string(),
            ..Default::default()
        }
    }

    fn posts(tag: &str) -> GenerationResponse {
        GenerationResponse {
            instagram: format!("{tag}-insta"),
            naver_blog: format!("{tag}-blog"),
        }
    }

    #[test]
    fn test_new_slot_is_idle() {
        let slot = GenerationSlot::new();
        let snapshot = slot.snapshot();
        assert_eq!(snapshot.state, SlotState::Idle);
        assert_eq!(snapshot.sequence, 0);
        assert!(snapshot.response.is_none());
    }

    #[test]
    fn test_invalid_input_gets_no_ticket() {
        let mut slot = GenerationSlot::new();
        let err = slot
            .begin(LectureInfo {
                location: String::new(),
                topic: "AI".to_string(),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(slot.current_state(), SlotState::Idle);
        assert_eq!(slot.snapshot().sequence, 0);
    }

    #[test]
    fn test_success_flow() {
        let mut slot = GenerationSlot::new();
        let ticket = slot.begin(info("AI")).unwrap();
        assert!(slot.is_in_flight());

        assert!(slot.complete(&ticket, &Ok(posts("a"))));
        let snapshot = slot.snapshot();
        assert_eq!(snapshot.state, SlotState::Ready);
        assert_eq!(snapshot.response, Some(posts("a")));
        assert_eq!(snapshot.request_id, Some(ticket.request_id));
    }

    #[test]
    fn test_failure_keeps_previous_posts() {
        let mut slot = GenerationSlot::new();
        let first = slot.begin(info("AI")).unwrap();
        slot.complete(&first, &Ok(posts("a")));

        let second = slot.regenerate().unwrap();
        slot.complete(&second, &Err(Error::credential("rejected")));

        let snapshot = slot.snapshot();
        assert_eq!(snapshot.state, SlotState::Failed);
        assert_eq!(snapshot.response, Some(posts("a")));
        assert_eq!(snapshot.error.unwrap().kind, ErrorKind::Credential);
    }

    #[test]
    fn test_new_ticket_clears_previous_error() {
        let mut slot = GenerationSlot::new();
        let first = slot.begin(info("AI")).unwrap();
        slot.complete(&first, &Err(Error::generation("timeout")));
        assert!(slot.snapshot().error.is_some());

        slot.regenerate().unwrap();

        let snapshot = slot.snapshot();
        assert_eq!(snapshot.state, SlotState::Pending);
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut slot = GenerationSlot::new();
        let old = slot.begin(info("old")).unwrap();
        let new = slot.begin(info("new")).unwrap();
        assert_eq!(new.sequence, old.sequence + 1);

        assert!(slot.complete(&new, &Ok(posts("new"))));
        assert!(!slot.complete(&old, &Ok(posts("old"))));

        assert_eq!(slot.snapshot().response, Some(posts("new")));
    }

    #[test]
    fn test_stale_failure_does_not_clobber_pending() {
        let mut slot = GenerationSlot::new();
        let old = slot.begin(info("old")).unwrap();
        let _new = slot.begin(info("new")).unwrap();

        assert!(!slot.complete(&old, &Err(Error::generation("timeout"))));
        assert!(slot.is_in_flight());
        assert!(slot.snapshot().error.is_none());
    }

    #[test]
    fn test_regenerate_reuses_last_input() {
        let mut slot = GenerationSlot::new();
        slot.begin(info("첫 강의")).unwrap();

        let ticket = slot.regenerate().unwrap();
        assert_eq!(ticket.info.topic, "첫 강의");
        assert_eq!(ticket.sequence, 2);
    }

    #[test]
    fn test_regenerate_before_submit() {
        let mut slot = GenerationSlot::new();
        let err = slot.regenerate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }
}
