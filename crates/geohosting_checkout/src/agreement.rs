// --- File: crates/geohosting_checkout/src/agreement.rs ---
//! Sequential acceptance of legal agreements ahead of payment.
//!
//! The gate walks the agreement list one document at a time. Declining at any
//! point drops every signature collected so far. Only a fully accepted list
//! yields [`SignedAgreements`], which payment initiation requires.

use chrono::{NaiveDate, Utc};
use geohosting_common::BoxFuture;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{FetchError, ValidationError};
use crate::models::Agreement;

pub const CLIENT_NAME_PLACEHOLDER: &str = "[Client Name]";
pub const DATE_PLACEHOLDER: &str = "[Date]";

/// Placeholders the signer has to fill in, when present in a template.
pub const REQUIRED_FIELDS: [&str; 3] = ["[Representative Name]", "[Title]", "[Signature]"];

pub trait AgreementSource: Send + Sync {
    fn list_agreements(&self) -> BoxFuture<'_, Vec<Agreement>, FetchError>;
}

impl<S: AgreementSource + ?Sized> AgreementSource for Arc<S> {
    fn list_agreements(&self) -> BoxFuture<'_, Vec<Agreement>, FetchError> {
        (**self).list_agreements()
    }
}

/// Company name when purchasing for a company, the buyer's own name otherwise.
pub fn client_name<'a>(company_name: Option<&'a str>, buyer_name: Option<&'a str>) -> Option<&'a str> {
    company_name
        .filter(|name| !name.trim().is_empty())
        .or(buyer_name.filter(|name| !name.trim().is_empty()))
}

pub fn fill_template(template: &str, client_name: Option<&str>, today: NaiveDate) -> String {
    let filled = template.replace(DATE_PLACEHOLDER, &today.format("%Y-%m-%d").to_string());
    match client_name {
        Some(name) => filled.replace(CLIENT_NAME_PLACEHOLDER, name),
        None => filled,
    }
}

pub fn required_fields(template: &str) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| template.contains(field))
        .collect()
}

/// Fills the load-time placeholders of every agreement.
pub fn prepare_agreements(
    agreements: Vec<Agreement>,
    client_name: Option<&str>,
    today: NaiveDate,
) -> Vec<Agreement> {
    agreements
        .into_iter()
        .map(|agreement| Agreement {
            template: fill_template(&agreement.template, client_name, today),
            signed: false,
            ..agreement
        })
        .collect()
}

/// What the signer supplied for the agreement currently shown.
#[derive(Debug, Clone, Default)]
pub struct AgreementAcceptance {
    /// Keyed by placeholder, e.g. `"[Title]"`.
    pub fields: HashMap<String, String>,
    /// The rendered, signed document (PDF).
    pub document: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedAgreement {
    pub id: u64,
    pub name: String,
    #[serde(skip)]
    pub document: Vec<u8>,
}

/// Proof that every agreement was accepted, in the order shown.
///
/// Only [`AgreementGate`] constructs this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedAgreements {
    agreements: Vec<SignedAgreement>,
}

impl SignedAgreements {
    pub fn ids(&self) -> Vec<u64> {
        self.agreements.iter().map(|a| a.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignedAgreement> {
        self.agreements.iter()
    }

    pub fn len(&self) -> usize {
        self.agreements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Loading,
    Showing(usize),
    AllSigned,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateStep {
    /// The agreement now awaiting acceptance.
    Showing(Agreement),
    /// Emitted once; the gate is closed again afterwards.
    Completed(SignedAgreements),
}

pub struct AgreementGate {
    state: GateState,
    agreements: Vec<Agreement>,
    signed: Vec<SignedAgreement>,
}

impl Default for AgreementGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AgreementGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Closed,
            agreements: Vec::new(),
            signed: Vec::new(),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn current(&self) -> Option<&Agreement> {
        match self.state {
            GateState::Showing(i) => self.agreements.get(i),
            _ => None,
        }
    }

    /// Loads the agreement list and shows the first one.
    ///
    /// A load failure closes the gate and is returned as-is; there is no retry.
    pub async fn open<A: AgreementSource + ?Sized>(
        &mut self,
        source: &A,
        client_name: Option<&str>,
    ) -> Result<GateStep, FetchError> {
        self.reset();
        self.state = GateState::Loading;
        match source.list_agreements().await {
            Ok(agreements) => Ok(self.show(prepare_agreements(
                agreements,
                client_name,
                Utc::now().date_naive(),
            ))),
            Err(err) => {
                warn!(error = %err, "Failed to load agreements");
                self.reset();
                Err(err)
            }
        }
    }

    /// Starts the walk over an already prepared list.
    pub fn show(&mut self, agreements: Vec<Agreement>) -> GateStep {
        self.reset();
        self.agreements = agreements;
        self.advance(0)
    }

    /// Accepts the shown agreement.
    ///
    /// Missing required fields or an empty document keep the gate on the same
    /// agreement.
    pub fn accept(&mut self, acceptance: AgreementAcceptance) -> Result<GateStep, ValidationError> {
        let index = match self.state {
            GateState::Showing(i) => i,
            _ => return Err(ValidationError::new("No agreement is awaiting acceptance.")),
        };
        let Some(agreement) = self.agreements.get(index) else {
            return Err(ValidationError::new("No agreement is awaiting acceptance."));
        };

        let missing: Vec<&str> = required_fields(&agreement.template)
            .into_iter()
            .filter(|field| {
                acceptance
                    .fields
                    .get(*field)
                    .map_or(true, |value| value.trim().is_empty())
            })
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::new(format!(
                "{} is missing {}.",
                agreement.name,
                missing.join(", ")
            )));
        }
        if acceptance.document.is_empty() {
            return Err(ValidationError::new(format!(
                "{} has no signed document.",
                agreement.name
            )));
        }

        self.signed.push(SignedAgreement {
            id: agreement.id,
            name: agreement.name.clone(),
            document: acceptance.document,
        });
        if let Some(agreement) = self.agreements.get_mut(index) {
            agreement.signed = true;
        }
        Ok(self.advance(index + 1))
    }

    /// Closes the gate and forgets every signature collected so far.
    pub fn decline(&mut self) {
        if let Some(agreement) = self.current() {
            info!(agreement_id = agreement.id, "Agreement declined");
        }
        self.reset();
    }

    fn advance(&mut self, next: usize) -> GateStep {
        match self.agreements.get(next) {
            Some(agreement) => {
                self.state = GateState::Showing(next);
                GateStep::Showing(agreement.clone())
            }
            None => {
                self.state = GateState::AllSigned;
                let signed = SignedAgreements {
                    agreements: std::mem::take(&mut self.signed),
                };
                info!(count = signed.len(), "All agreements signed");
                self.reset();
                GateStep::Completed(signed)
            }
        }
    }

    fn reset(&mut self) {
        self.state = GateState::Closed;
        self.agreements.clear();
        self.signed.clear();
    }
}
