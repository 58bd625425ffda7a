use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::grading::FinalExamResult;
use crate::worksheet::GradeReport;

/// Maximum saved calculations per account.
pub const MAX_SAVED_PER_ACCOUNT: usize = 100;

/// Rule violations when changing saved calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("no account given; pass --account or set `account` in the config file")]
    MissingAccount,

    #[error("account '{account}' has reached the maximum of {max} saved calculations")]
    LimitReached { account: String, max: usize },

    #[error("no saved calculation #{index} for account '{account}'")]
    NotFound { account: String, index: usize },
}

/// Calculation payload, tagged with the calculator it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CalculationData {
    Grade(GradeReport),
    Final(FinalExamResult),
}

impl CalculationData {
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationData::Grade(_) => "grade",
            CalculationData::Final(_) => "final",
        }
    }

    /// One-line summary, e.g. "B (86.1)" or "needs 73.3 on final".
    pub fn summary(&self) -> String {
        match self {
            CalculationData::Grade(report) => {
                format!("{} ({:.1})", report.result.letter, report.result.average)
            }
            CalculationData::Final(result) => format!("needs {:.1} on final", result.required),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub data: CalculationData,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedStore {
    pub version: u32,
    #[serde(default)]
    pub accounts: HashMap<String, Vec<SavedCalculation>>,
}

impl Default for SavedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedStore {
    /// Create a new empty store with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            accounts: HashMap::new(),
        }
    }

    /// Saved calculations for an account, oldest first
    pub fn list(&self, account: &str) -> &[SavedCalculation] {
        self.accounts
            .get(account.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a calculation by its 1-based position in `list`
    pub fn get(&self, account: &str, index: usize) -> Result<&SavedCalculation, StoreError> {
        index
            .checked_sub(1)
            .and_then(|i| self.list(account).get(i))
            .ok_or_else(|| StoreError::NotFound {
                account: account.trim().to_string(),
                index,
            })
    }

    /// Save a calculation under an account.
    ///
    /// A blank name becomes "Calculation N", N being the account's count
    /// including this one.
    pub fn save(
        &mut self,
        account: &str,
        name: &str,
        description: &str,
        data: CalculationData,
    ) -> Result<&SavedCalculation, StoreError> {
        let account = account.trim();
        if account.is_empty() {
            return Err(StoreError::MissingAccount);
        }

        let calcs = self.accounts.entry(account.to_string()).or_default();
        if calcs.len() >= MAX_SAVED_PER_ACCOUNT {
            return Err(StoreError::LimitReached {
                account: account.to_string(),
                max: MAX_SAVED_PER_ACCOUNT,
            });
        }

        let name = name.trim();
        let name = if name.is_empty() {
            format!("Calculation {}", calcs.len() + 1)
        } else {
            name.to_string()
        };

        calcs.push(SavedCalculation {
            id: Uuid::new_v4(),
            name,
            description: description.trim().to_string(),
            data,
            created_at: Utc::now(),
        });

        let saved = &calcs[calcs.len() - 1];
        tracing::debug!(account, id = %saved.id, kind = saved.data.kind(), "saved calculation");
        Ok(saved)
    }

    /// Remove a calculation by its 1-based position and return it
    pub fn delete(&mut self, account: &str, index: usize) -> Result<SavedCalculation, StoreError> {
        let account = account.trim();
        let not_found = || StoreError::NotFound {
            account: account.to_string(),
            index,
        };

        let calcs = self.accounts.get_mut(account).ok_or_else(not_found)?;
        if index == 0 || index > calcs.len() {
            return Err(not_found());
        }
        let removed = calcs.remove(index - 1);
        if calcs.is_empty() {
            self.accounts.remove(account);
        }
        Ok(removed)
    }
}
