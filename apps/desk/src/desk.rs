//! The front desk: every user-facing command, independent of how it is
//! presented. Each mutating command saves to the local store before returning.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::cloud::{BackupReceipt, BackupRemote, BackupRequest};
use crate::errors::DeskError;
use crate::models::{
    generate_id, AttendanceRecord, IncomePayment, NewPayment, NewUser, User,
};
use crate::report::Reporter;
use crate::state::AppState;
use crate::store::{KeyValueStore, LocalStore};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: usize,
    pub attendance: usize,
    pub income: usize,
    pub active_users: usize,
}

pub struct Desk<S, R> {
    state: AppState,
    store: LocalStore<S>,
    reporter: R,
}

impl<S: KeyValueStore, R: Reporter> Desk<S, R> {
    /// Loads whatever the store holds; a malformed store is fatal.
    pub fn open(kv: S, reporter: R) -> Result<Self, DeskError> {
        let store = LocalStore::new(kv);
        let mut state = AppState::default();
        store.load(&mut state)?;
        info!(
            "Loaded {} users, {} attendance records, {} payments",
            state.users.len(),
            state.attendance.len(),
            state.income.len()
        );
        Ok(Self {
            state,
            store,
            reporter,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Saves `next` and only then adopts it, so a failed save leaves the
    /// in-memory state matching what was last stored.
    fn commit(&mut self, mut next: AppState) -> Result<(), DeskError> {
        if let Err(e) = self.store.save(&mut next) {
            self.reporter.error(&format!("Could not save data: {e}"));
            return Err(e.into());
        }
        self.state = next;
        Ok(())
    }

    fn reject(&self, err: DeskError) -> DeskError {
        self.reporter.error(&err.to_string());
        err
    }

    // ── Users ───────────────────────────────────────────────────────────

    pub fn add_user(&mut self, new_user: NewUser) -> Result<User, DeskError> {
        if new_user.name.trim().is_empty() || new_user.document.trim().is_empty() {
            return Err(self.reject(DeskError::Validation(
                "name and document are required".to_string(),
            )));
        }
        if self
            .state
            .users
            .iter()
            .any(|u| u.document == new_user.document)
        {
            return Err(self.reject(DeskError::DuplicateDocument(new_user.document)));
        }

        let user = new_user.into_user(generate_id(), Utc::now());
        let mut next = self.state.clone();
        next.users.push(user.clone());
        self.commit(next)?;
        self.reporter
            .success(&format!("User {} registered", user.name));
        Ok(user)
    }

    /// Case-insensitive match on name, or substring match on document.
    pub fn search_users(&self, term: &str) -> Vec<&User> {
        let term = term.to_lowercase();
        self.state
            .users
            .iter()
            .filter(|u| u.name.to_lowercase().contains(&term) || u.document.contains(&term))
            .collect()
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.state.users.iter().find(|u| u.id == id)
    }

    // ── Attendance ──────────────────────────────────────────────────────

    /// Members eligible for check-in: active ones, in registration order.
    pub fn attendance_roster(&self) -> Vec<&User> {
        self.state.users.iter().filter(|u| u.is_active()).collect()
    }

    /// Appends one record per checked user for `date`. Returns how many.
    pub fn save_attendance(
        &mut self,
        date: NaiveDate,
        user_ids: &[String],
    ) -> Result<usize, DeskError> {
        let now = Utc::now();
        let mut next = self.state.clone();
        next.attendance
            .extend(user_ids.iter().map(|user_id| AttendanceRecord {
                id: generate_id(),
                user_id: user_id.clone(),
                date: Some(date),
                timestamp: now,
            }));
        self.commit(next)?;

        let count = user_ids.len();
        self.reporter
            .success(&format!("{count} attendances registered for {date}"));
        Ok(count)
    }

    // ── Income ──────────────────────────────────────────────────────────

    pub fn register_payment(&mut self, payment: NewPayment) -> Result<IncomePayment, DeskError> {
        if !payment.amount.is_finite() || payment.amount < 0.0 {
            return Err(self.reject(DeskError::Validation(format!(
                "amount must be a non-negative number, got {}",
                payment.amount
            ))));
        }
        if payment.end_date < payment.start_date {
            return Err(self.reject(DeskError::Validation(
                "coverage period ends before it starts".to_string(),
            )));
        }
        if self.find_user(&payment.user_id).is_none() {
            return Err(self.reject(DeskError::UnknownUser(payment.user_id)));
        }

        let record = IncomePayment {
            id: generate_id(),
            user_id: payment.user_id,
            start_date: Some(payment.start_date),
            end_date: Some(payment.end_date),
            amount: Some(payment.amount),
            method: payment.method,
            description: payment.description,
            date: Utc::now(),
        };
        let mut next = self.state.clone();
        next.income.push(record.clone());
        self.commit(next)?;
        self.reporter.success("Payment registered");
        Ok(record)
    }

    /// Payments, newest first, optionally for one member.
    pub fn payment_history(&self, user_id: Option<&str>) -> Vec<&IncomePayment> {
        let mut payments: Vec<&IncomePayment> = self
            .state
            .income
            .iter()
            .filter(|p| user_id.map_or(true, |id| p.user_id == id))
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        payments
    }

    pub fn dashboard(&self) -> DashboardStats {
        DashboardStats {
            users: self.state.users.len(),
            attendance: self.state.attendance.len(),
            income: self.state.income.len(),
            active_users: self.state.users.iter().filter(|u| u.is_active()).count(),
        }
    }

    // ── Cloud ───────────────────────────────────────────────────────────

    pub async fn backup(&self, remote: &dyn BackupRemote) -> Result<BackupReceipt, DeskError> {
        let request = BackupRequest {
            users: &self.state.users,
            attendance: &self.state.attendance,
            income: &self.state.income,
            last_backup: self.state.last_backup,
        };

        match remote.push(&request).await {
            Ok(receipt) => {
                self.reporter.success(&format!(
                    "Backup {} saved: {} users, {} attendance, {} payments",
                    receipt.backup_id,
                    receipt.records.users,
                    receipt.records.attendance,
                    receipt.records.income
                ));
                Ok(receipt)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Replaces local data with the newest cloud backup. Returns `false` when
    /// the cloud has none, leaving local data untouched.
    pub async fn restore(&mut self, remote: &dyn BackupRemote) -> Result<bool, DeskError> {
        let restored = match remote.fetch_latest().await {
            Ok(Some(restored)) => restored,
            Ok(None) => {
                self.reporter.error("No backups found in the cloud");
                return Ok(false);
            }
            Err(e) => return Err(self.reject(e)),
        };

        let next = AppState {
            users: restored.data.users,
            attendance: restored.data.attendance,
            income: restored.data.income,
            last_backup: self.state.last_backup,
        };
        self.commit(next)?;

        self.reporter.success(&format!(
            "Restored backup {} from {}",
            restored.backup_id, restored.created_at
        ));
        Ok(true)
    }
}
