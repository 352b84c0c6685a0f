//! Explicit lifecycles for status-driven records.
//!
//! Safety incidents, controlled documents, quality non-conformances and PPE
//! deliveries each move through a small set of states. Every machine here
//! declares its states, the actions allowed from each state and any guard
//! on the event payload, so the code that mutates a record can reject an
//! illegal change and a UI can ask which actions to offer.
//!
//! Status values keep the backend's wire names (`registrado`,
//! `em_investigacao`, ...) for serialization.
//!
//! # Example
//!
//! ```rust
//! use siteplan_core::lifecycle::{IncidentEvent, IncidentStatus, Lifecycle};
//!
//! let status = IncidentStatus::Registered;
//! let status = status.transition(&IncidentEvent::StartInvestigation).unwrap();
//! assert_eq!(status, IncidentStatus::UnderInvestigation);
//! assert!(status.transition(&IncidentEvent::StartInvestigation).is_err());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;

use crate::dates::add_days;

/// Rejected lifecycle change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("{machine}: '{action}' is not allowed from '{from}'")]
    InvalidTransition {
        machine: &'static str,
        from: &'static str,
        action: &'static str,
    },

    #[error("{machine}: {reason}")]
    GuardFailed {
        machine: &'static str,
        reason: String,
    },

    #[error("{machine}: unknown state '{value}'")]
    UnknownState {
        machine: &'static str,
        value: String,
    },

    #[error("{machine}: unknown action '{value}'")]
    UnknownAction {
        machine: &'static str,
        value: String,
    },
}

/// A finite state machine over a status enum
pub trait Lifecycle: Copy + Eq + Debug + Sized {
    /// Event payload applied to the record
    type Event: Debug;
    /// Payload-free event kind, used for transition tables and UI actions
    type Action: Copy + Eq + Debug + 'static;

    /// Machine name used in errors
    const MACHINE: &'static str;
    /// Every action the machine knows about
    const ACTIONS: &'static [Self::Action];

    fn state_name(&self) -> &'static str;
    fn action_name(action: Self::Action) -> &'static str;
    fn action_of(event: &Self::Event) -> Self::Action;

    /// Transition table: target state, or `None` when not allowed
    fn next(&self, action: Self::Action) -> Option<Self>;

    /// Payload checks run after the table allows the action
    fn guard(&self, _event: &Self::Event) -> Result<(), LifecycleError> {
        Ok(())
    }

    fn transition(&self, event: &Self::Event) -> Result<Self, LifecycleError> {
        let action = Self::action_of(event);
        let target = self
            .next(action)
            .ok_or(LifecycleError::InvalidTransition {
                machine: Self::MACHINE,
                from: self.state_name(),
                action: Self::action_name(action),
            })?;
        self.guard(event)?;
        Ok(target)
    }

    fn can(&self, action: Self::Action) -> bool {
        self.next(action).is_some()
    }

    /// Actions a UI may offer from this state
    fn available_events(&self) -> Vec<Self::Action> {
        Self::ACTIONS
            .iter()
            .copied()
            .filter(|a| self.can(*a))
            .collect()
    }

    fn is_terminal(&self) -> bool {
        self.available_events().is_empty()
    }
}

fn parse_action<A: Copy>(
    machine: &'static str,
    actions: &[A],
    name_of: fn(A) -> &'static str,
    value: &str,
) -> Result<A, LifecycleError> {
    let wanted = value.trim().replace('-', "_").to_ascii_lowercase();
    actions
        .iter()
        .copied()
        .find(|a| name_of(*a) == wanted)
        .ok_or_else(|| LifecycleError::UnknownAction {
            machine,
            value: value.to_string(),
        })
}

// ============================================================================
// Safety Incident
// ============================================================================

/// Safety incident status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    #[serde(rename = "registrado", alias = "aberto")]
    Registered,
    #[serde(rename = "em_investigacao")]
    UnderInvestigation,
    #[serde(rename = "investigado")]
    Investigated,
    #[serde(rename = "encerrado")]
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IncidentAction {
    StartInvestigation,
    ConcludeInvestigation,
    /// Edit fields, add witnesses or attachments
    Amend,
    Close,
}

/// Data required to close an incident
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentClosure {
    pub root_cause: String,
    pub corrective_actions: String,
    pub preventive_actions: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncidentEvent {
    StartInvestigation,
    ConcludeInvestigation,
    Amend,
    Close(IncidentClosure),
}

impl Lifecycle for IncidentStatus {
    type Event = IncidentEvent;
    type Action = IncidentAction;

    const MACHINE: &'static str = "incident";
    const ACTIONS: &'static [IncidentAction] = &[
        IncidentAction::StartInvestigation,
        IncidentAction::ConcludeInvestigation,
        IncidentAction::Amend,
        IncidentAction::Close,
    ];

    fn state_name(&self) -> &'static str {
        match self {
            IncidentStatus::Registered => "registrado",
            IncidentStatus::UnderInvestigation => "em_investigacao",
            IncidentStatus::Investigated => "investigado",
            IncidentStatus::Closed => "encerrado",
        }
    }

    fn action_name(action: IncidentAction) -> &'static str {
        match action {
            IncidentAction::StartInvestigation => "investigate",
            IncidentAction::ConcludeInvestigation => "conclude",
            IncidentAction::Amend => "amend",
            IncidentAction::Close => "close",
        }
    }

    fn action_of(event: &IncidentEvent) -> IncidentAction {
        match event {
            IncidentEvent::StartInvestigation => IncidentAction::StartInvestigation,
            IncidentEvent::ConcludeInvestigation => IncidentAction::ConcludeInvestigation,
            IncidentEvent::Amend => IncidentAction::Amend,
            IncidentEvent::Close(_) => IncidentAction::Close,
        }
    }

    fn next(&self, action: IncidentAction) -> Option<Self> {
        use IncidentAction as A;
        use IncidentStatus as S;
        match (self, action) {
            (S::Closed, _) => None,
            (S::Registered, A::StartInvestigation) => Some(S::UnderInvestigation),
            (S::UnderInvestigation, A::ConcludeInvestigation) => Some(S::Investigated),
            (state, A::Amend) => Some(*state),
            (_, A::Close) => Some(S::Closed),
            _ => None,
        }
    }

    fn guard(&self, event: &IncidentEvent) -> Result<(), LifecycleError> {
        if let IncidentEvent::Close(closure) = event {
            if closure.root_cause.trim().is_empty() {
                return Err(LifecycleError::GuardFailed {
                    machine: Self::MACHINE,
                    reason: "closing requires a root cause".into(),
                });
            }
            if closure.corrective_actions.trim().is_empty() {
                return Err(LifecycleError::GuardFailed {
                    machine: Self::MACHINE,
                    reason: "closing requires corrective actions".into(),
                });
            }
        }
        Ok(())
    }
}

impl IncidentAction {
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        parse_action(
            IncidentStatus::MACHINE,
            IncidentStatus::ACTIONS,
            IncidentStatus::action_name,
            value,
        )
    }
}

// ============================================================================
// Controlled Document
// ============================================================================

/// Controlled document status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Written as the client's `rascunho`; the backend's `em_elaboracao`
    /// is read back as the same state.
    #[serde(rename = "rascunho", alias = "em_elaboracao")]
    Draft,
    #[serde(rename = "em_revisao")]
    UnderReview,
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "obsoleto")]
    Obsolete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentAction {
    SubmitForReview,
    ReturnToDraft,
    Approve,
    /// Start a new revision of an approved document
    Revise,
    MarkObsolete,
}

impl Lifecycle for DocumentStatus {
    type Event = DocumentAction;
    type Action = DocumentAction;

    const MACHINE: &'static str = "document";
    const ACTIONS: &'static [DocumentAction] = &[
        DocumentAction::SubmitForReview,
        DocumentAction::ReturnToDraft,
        DocumentAction::Approve,
        DocumentAction::Revise,
        DocumentAction::MarkObsolete,
    ];

    fn state_name(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "rascunho",
            DocumentStatus::UnderReview => "em_revisao",
            DocumentStatus::Approved => "aprovado",
            DocumentStatus::Obsolete => "obsoleto",
        }
    }

    fn action_name(action: DocumentAction) -> &'static str {
        match action {
            DocumentAction::SubmitForReview => "submit",
            DocumentAction::ReturnToDraft => "return_to_draft",
            DocumentAction::Approve => "approve",
            DocumentAction::Revise => "revise",
            DocumentAction::MarkObsolete => "obsolete",
        }
    }

    fn action_of(event: &DocumentAction) -> DocumentAction {
        *event
    }

    fn next(&self, action: DocumentAction) -> Option<Self> {
        use DocumentAction as A;
        use DocumentStatus as S;
        match (self, action) {
            (S::Obsolete, _) => None,
            (S::Draft, A::SubmitForReview) => Some(S::UnderReview),
            (S::UnderReview, A::ReturnToDraft) => Some(S::Draft),
            (S::Draft | S::UnderReview, A::Approve) => Some(S::Approved),
            (S::Approved, A::Revise) => Some(S::UnderReview),
            (_, A::MarkObsolete) => Some(S::Obsolete),
            _ => None,
        }
    }
}

impl DocumentAction {
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        parse_action(
            DocumentStatus::MACHINE,
            DocumentStatus::ACTIONS,
            DocumentStatus::action_name,
            value,
        )
    }
}

// ============================================================================
// Quality Non-Conformance
// ============================================================================

/// Quality non-conformance status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonConformanceStatus {
    #[serde(rename = "aberta")]
    Open,
    #[serde(rename = "em_analise")]
    Analysis,
    #[serde(rename = "em_tratamento")]
    Treatment,
    #[serde(rename = "verificacao")]
    Verification,
    #[serde(rename = "encerrada")]
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NonConformanceAction {
    /// Move to the next stage of the treatment workflow
    Advance,
    Close,
}

impl Lifecycle for NonConformanceStatus {
    type Event = NonConformanceAction;
    type Action = NonConformanceAction;

    const MACHINE: &'static str = "non-conformance";
    const ACTIONS: &'static [NonConformanceAction] =
        &[NonConformanceAction::Advance, NonConformanceAction::Close];

    fn state_name(&self) -> &'static str {
        match self {
            NonConformanceStatus::Open => "aberta",
            NonConformanceStatus::Analysis => "em_analise",
            NonConformanceStatus::Treatment => "em_tratamento",
            NonConformanceStatus::Verification => "verificacao",
            NonConformanceStatus::Closed => "encerrada",
        }
    }

    fn action_name(action: NonConformanceAction) -> &'static str {
        match action {
            NonConformanceAction::Advance => "advance",
            NonConformanceAction::Close => "close",
        }
    }

    fn action_of(event: &NonConformanceAction) -> NonConformanceAction {
        *event
    }

    fn next(&self, action: NonConformanceAction) -> Option<Self> {
        use NonConformanceAction as A;
        use NonConformanceStatus as S;
        match (self, action) {
            (S::Closed, _) => None,
            (S::Open, A::Advance) => Some(S::Analysis),
            (S::Analysis, A::Advance) => Some(S::Treatment),
            (S::Treatment, A::Advance) => Some(S::Verification),
            (S::Verification, A::Advance) => None,
            (_, A::Close) => Some(S::Closed),
        }
    }
}

impl NonConformanceAction {
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        parse_action(
            NonConformanceStatus::MACHINE,
            NonConformanceStatus::ACTIONS,
            NonConformanceStatus::action_name,
            value,
        )
    }
}

// ============================================================================
// PPE Delivery
// ============================================================================

/// PPE delivery status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PpeStatus {
    #[serde(rename = "ativo")]
    Active,
    #[serde(rename = "vencido")]
    Expired,
    #[serde(rename = "devolvido")]
    Returned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PpeAction {
    Expire,
    Return,
}

impl Lifecycle for PpeStatus {
    type Event = PpeAction;
    type Action = PpeAction;

    const MACHINE: &'static str = "ppe delivery";
    const ACTIONS: &'static [PpeAction] = &[PpeAction::Expire, PpeAction::Return];

    fn state_name(&self) -> &'static str {
        match self {
            PpeStatus::Active => "ativo",
            PpeStatus::Expired => "vencido",
            PpeStatus::Returned => "devolvido",
        }
    }

    fn action_name(action: PpeAction) -> &'static str {
        match action {
            PpeAction::Expire => "expire",
            PpeAction::Return => "return",
        }
    }

    fn action_of(event: &PpeAction) -> PpeAction {
        *event
    }

    fn next(&self, action: PpeAction) -> Option<Self> {
        match (self, action) {
            (PpeStatus::Active, PpeAction::Expire) => Some(PpeStatus::Expired),
            (PpeStatus::Active | PpeStatus::Expired, PpeAction::Return) => Some(PpeStatus::Returned),
            _ => None,
        }
    }
}

impl PpeAction {
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        parse_action(PpeStatus::MACHINE, PpeStatus::ACTIONS, PpeStatus::action_name, value)
    }
}

/// A PPE item handed to a worker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpeDelivery {
    pub id: i64,
    pub user_id: i64,
    pub ppe_type: String,
    pub delivery_date: NaiveDate,
    /// Validity of the PPE type; `None` never expires
    pub validity_months: Option<u32>,
    pub return_date: Option<NaiveDate>,
}

impl PpeDelivery {
    /// Delivery date plus validity, for items still in use
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        if self.return_date.is_some() {
            return None;
        }
        let months = self.validity_months?;
        self.delivery_date
            .checked_add_months(chrono::Months::new(months))
    }

    /// Status derived from the record and the current date
    pub fn computed_status(&self, today: NaiveDate) -> PpeStatus {
        if self.return_date.is_some() {
            return PpeStatus::Returned;
        }
        match self.expiry_date() {
            Some(expiry) if expiry < today => PpeStatus::Expired,
            _ => PpeStatus::Active,
        }
    }

    /// Days left before expiry (negative once expired)
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date().map(|expiry| (expiry - today).num_days())
    }

    /// Record the return; rejected when the item was already returned
    pub fn mark_returned(&mut self, date: NaiveDate) -> Result<(), LifecycleError> {
        let status = self.computed_status(date);
        status.transition(&PpeAction::Return)?;
        self.return_date = Some(date);
        Ok(())
    }

    /// True when the item expires within `days` from `today`
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        match self.expiry_date() {
            Some(expiry) => expiry >= today && expiry <= add_days(today, days),
            None => false,
        }
    }
}

/// Per-worker PPE counts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpeSummary {
    pub total_deliveries: usize,
    pub active: usize,
    pub expired: usize,
    pub returned: usize,
}

impl PpeSummary {
    pub fn of(deliveries: &[PpeDelivery], today: NaiveDate) -> Self {
        let mut summary = PpeSummary {
            total_deliveries: deliveries.len(),
            ..Default::default()
        };
        for delivery in deliveries {
            match delivery.computed_status(today) {
                PpeStatus::Active => summary.active += 1,
                PpeStatus::Expired => summary.expired += 1,
                PpeStatus::Returned => summary.returned += 1,
            }
        }
        summary
    }
}

// ============================================================================
// Wire Names
// ============================================================================

macro_rules! wire_status {
    ($ty:ty, [$($variant:expr),+ $(,)?], aliases: [$(($alias:literal, $target:expr)),* $(,)?]) => {
        impl FromStr for $ty {
            type Err = LifecycleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                for state in [$($variant),+] {
                    if state.state_name() == wanted {
                        return Ok(state);
                    }
                }
                match wanted.as_str() {
                    $($alias => Ok($target),)*
                    _ => Err(LifecycleError::UnknownState {
                        machine: <$ty as Lifecycle>::MACHINE,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.state_name())
            }
        }
    };
}

wire_status!(
    IncidentStatus,
    [
        IncidentStatus::Registered,
        IncidentStatus::UnderInvestigation,
        IncidentStatus::Investigated,
        IncidentStatus::Closed,
    ],
    aliases: [("aberto", IncidentStatus::Registered)]
);

wire_status!(
    DocumentStatus,
    [
        DocumentStatus::Draft,
        DocumentStatus::UnderReview,
        DocumentStatus::Approved,
        DocumentStatus::Obsolete,
    ],
    aliases: [("em_elaboracao", DocumentStatus::Draft)]
);

wire_status!(
    NonConformanceStatus,
    [
        NonConformanceStatus::Open,
        NonConformanceStatus::Analysis,
        NonConformanceStatus::Treatment,
        NonConformanceStatus::Verification,
        NonConformanceStatus::Closed,
    ],
    aliases: []
);

wire_status!(
    PpeStatus,
    [PpeStatus::Active, PpeStatus::Expired, PpeStatus::Returned],
    aliases: []
);
