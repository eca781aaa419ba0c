use std::io::Write;

use alloy::primitives::U256;
use futures_util::future::{join_all, try_join_all};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use tracing::{debug, info, warn};

use crate::{
    candidates::Candidates,
    chain::{GatewayResolver, NonceReader},
    error::AuditError,
};

/// Validated command line input.
#[derive(Debug, Clone)]
pub struct Invocation {
    gateway: String,
    account: String,
}

impl Invocation {
    /// Both addresses are required. The account is never consulted beyond
    /// this presence check.
    pub fn new(gateway: Option<String>, account: Option<String>) -> Result<Self, AuditError> {
        let gateway = present(gateway).ok_or(AuditError::MissingArgument {
            expected: "the gateway contract address",
        })?;
        let account = present(account).ok_or(AuditError::MissingArgument {
            expected: "an account address",
        })?;

        Ok(Self { gateway, account })
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }
}

fn present(arg: Option<String>) -> Option<String> {
    arg.filter(|a| !a.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonceRecord {
    pub address: String,
    #[serde(serialize_with = "as_decimal")]
    pub nonce: U256,
}

impl NonceRecord {
    fn is_used(&self) -> bool {
        !self.nonce.is_zero()
    }
}

// Bare JSON number at full 256-bit precision.
fn as_decimal<S: Serializer>(nonce: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(nonce.to_string()).map_err(serde::ser::Error::custom)?;
    raw.serialize(serializer)
}

/// How a failing candidate query affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first failure aborts the run and discards every result.
    #[default]
    AllOrNothing,
    /// Failures are logged and the candidate is left out of the report.
    KeepGoing,
}

pub struct NonceAuditor<'a, R> {
    resolver: &'a R,
    candidates: &'a Candidates,
    policy: FailurePolicy,
}

impl<'a, R: GatewayResolver> NonceAuditor<'a, R> {
    pub fn new(resolver: &'a R, candidates: &'a Candidates) -> Self {
        Self {
            resolver,
            candidates,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Queries every candidate concurrently and returns those with a nonzero
    /// nonce, in candidate order.
    pub async fn audit(&self, invocation: &Invocation) -> Result<Vec<NonceRecord>, AuditError> {
        debug!(account = %invocation.account, "account argument checked for presence only");

        let gateway = self
            .resolver
            .resolve(invocation.gateway())
            .await
            .map_err(|source| AuditError::Resolution {
                address: invocation.gateway().to_string(),
                source,
            })?;
        if self.candidates.is_empty() {
            warn!("candidate list is empty");
        }
        info!(
            gateway = invocation.gateway(),
            candidates = self.candidates.len(),
            "querying nonces"
        );

        let queries = self
            .candidates
            .iter()
            .map(|candidate| query(&gateway, candidate));

        let records = match self.policy {
            FailurePolicy::AllOrNothing => try_join_all(queries).await?,
            FailurePolicy::KeepGoing => join_all(queries)
                .await
                .into_iter()
                .filter_map(|result| match result {
                    Ok(record) => Some(record),
                    Err(AuditError::Query { candidate, source }) => {
                        warn!(%candidate, error = %source, "skipping candidate");
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "skipping candidate");
                        None
                    }
                })
                .collect(),
        };

        let used: Vec<_> = records.into_iter().filter(NonceRecord::is_used).collect();
        info!(used = used.len(), "audit complete");

        Ok(used)
    }

    /// Audits and writes the report as a single JSON line. Nothing is written
    /// when the audit fails.
    pub async fn run<W: Write>(&self, invocation: &Invocation, out: &mut W) -> Result<(), AuditError> {
        let records = self.audit(invocation).await?;
        write_report(&records, out)
    }
}

/// Validates the raw arguments, then audits and reports. No chain call is
/// made unless both arguments are present.
pub async fn run_with_args<R, W>(
    gateway: Option<String>,
    account: Option<String>,
    resolver: &R,
    candidates: &Candidates,
    policy: FailurePolicy,
    out: &mut W,
) -> Result<(), AuditError>
where
    R: GatewayResolver,
    W: Write,
{
    let invocation = Invocation::new(gateway, account)?;
    NonceAuditor::new(resolver, candidates)
        .with_policy(policy)
        .run(&invocation, out)
        .await
}

async fn query<G: NonceReader>(gateway: &G, candidate: &str) -> Result<NonceRecord, AuditError> {
    let nonce = gateway
        .nonce(candidate)
        .await
        .map_err(|source| AuditError::Query {
            candidate: candidate.to_string(),
            source,
        })?;

    Ok(NonceRecord {
        address: candidate.to_string(),
        nonce,
    })
}

pub fn write_report<W: Write>(records: &[NonceRecord], out: &mut W) -> Result<(), AuditError> {
    let line = serde_json::to_string(records)?;
    writeln!(out, "{line}")?;
    Ok(())
}
