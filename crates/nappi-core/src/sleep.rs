//! Sleep/cooldown override coordinator.
//!
//! Tracks `{is_sleeping, cooldown}` for the monitored subject and exposes
//! the single mutating action: a manual intervention that inverts the
//! displayed state. During the cooldown the automated detector is
//! suppressed upstream; this coordinator only reports the remaining time.
//!
//! The coordinator never polls on its own. Callers fetch once when the
//! subject becomes known and re-fetch on whatever cadence suits them (the
//! CLI uses `[sleep] refresh_interval_secs`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::api::{ApiClient, InterventionAction, InterventionRequest, SleepStatusKind};
use crate::error::SleepError;
use crate::session::Session;

/// Cooldown half of the displayed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    NoCooldown,
    CoolingDown { remaining_minutes: i64 },
}

/// Displayed sleep state for one subject. Always superseded by the latest
/// fetch or the latest successful intervention response, never cached
/// beyond the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepState {
    pub is_sleeping: bool,
    pub sleep_started_at: Option<DateTime<Utc>>,
    pub cooldown_until: Option<DateTime<Utc>>,
}

impl SleepState {
    pub fn cooldown(&self, now: DateTime<Utc>) -> CooldownState {
        match self.cooldown_until {
            Some(until) if until > now => {
                // Round up so a window never displays as zero while active.
                let remaining = (until - now).num_seconds();
                CooldownState::CoolingDown {
                    remaining_minutes: (remaining + 59) / 60,
                }
            }
            _ => CooldownState::NoCooldown,
        }
    }
}

/// Guard that releases the single-flight flag on drop, success or failure.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SleepStateCoordinator {
    api: ApiClient,
    subject_id: i64,
    state: Mutex<Option<SleepState>>,
    in_flight: AtomicBool,
}

impl SleepStateCoordinator {
    pub fn new(api: ApiClient, session: &Session) -> Self {
        Self {
            api,
            subject_id: session.subject_id,
            state: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch current sleep and cooldown status and adopt them as the
    /// displayed state.
    pub async fn refresh(&self) -> Result<SleepState, SleepError> {
        let sleep = self.api.sleep_status(self.subject_id).await?;
        let cooldown = self.api.cooldown_status(self.subject_id).await?;

        let cooldown_until = match (cooldown.in_cooldown, cooldown.cooldown_remaining_minutes) {
            (true, Some(minutes)) => Some(Utc::now() + Duration::minutes(minutes)),
            (true, None) => Some(Utc::now()),
            (false, _) => None,
        };
        let state = SleepState {
            is_sleeping: sleep.is_sleeping,
            sleep_started_at: sleep.sleep_started_at,
            cooldown_until,
        };
        debug!(is_sleeping = state.is_sleeping, "sleep state refreshed");
        *self.state.lock().expect("sleep state poisoned") = Some(state.clone());
        Ok(state)
    }

    /// The displayed state, if fetched.
    pub fn current(&self) -> Option<SleepState> {
        self.state.lock().expect("sleep state poisoned").clone()
    }

    /// The only action offered: the logical inverse of the displayed
    /// state. `None` until the first refresh.
    pub fn available_action(&self) -> Option<InterventionAction> {
        self.current().map(|s| {
            if s.is_sleeping {
                InterventionAction::MarkAwake
            } else {
                InterventionAction::MarkAsleep
            }
        })
    }

    /// Submit a manual override. Single-flight: a call while another is in
    /// flight is rejected, not queued. On success the displayed state
    /// flips and the cooldown adopts the server-returned length; on
    /// failure the displayed state is exactly what it was before.
    pub async fn submit_intervention(
        &self,
        action: InterventionAction,
    ) -> Result<SleepState, SleepError> {
        let _guard =
            InFlightGuard::acquire(&self.in_flight).ok_or(SleepError::InterventionInFlight)?;

        let current = self.current().ok_or(SleepError::StateUnknown)?;
        let expected = if current.is_sleeping {
            InterventionAction::MarkAwake
        } else {
            InterventionAction::MarkAsleep
        };
        if action != expected {
            return Err(SleepError::RedundantAction {
                requested: action.to_string(),
            });
        }

        let response = self
            .api
            .submit_intervention(&InterventionRequest {
                subject_id: self.subject_id,
                action,
            })
            .await?;

        let is_sleeping = response.status == SleepStatusKind::Sleeping;
        let state = SleepState {
            is_sleeping,
            // The next refresh supplies the authoritative start time.
            sleep_started_at: if is_sleeping {
                current.sleep_started_at.or_else(|| Some(Utc::now()))
            } else {
                None
            },
            cooldown_until: Some(Utc::now() + Duration::minutes(response.cooldown_minutes)),
        };
        info!(
            %action,
            cooldown_minutes = response.cooldown_minutes,
            "intervention accepted"
        );
        *self.state.lock().expect("sleep state poisoned") = Some(state.clone());
        Ok(state)
    }
}
