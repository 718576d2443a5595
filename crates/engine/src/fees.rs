//! Fee computation.
//!
//! Two policies, both pure functions of `(kind, principal, risk score)`:
//!
//! - [`FeePolicy::Standard`]: per-kind base fee plus 1% of the principal.
//! - [`FeePolicy::RiskAdjusted`]: a rate in basis points derived from the
//!   principal volume and the caller-supplied risk score, clamped to a
//!   fixed band, with a minimum absolute fee.
//!
//! The orchestrator selects one policy per engine instance and applies it
//! **before** the funds-sufficiency check, since the fee affects the amount
//! that must be available.

use crate::{EngineError, MoneyCents, ResultEngine, TransactionKind};

/// Base fee per transaction kind for the standard policy, in cents.
///
/// Refunds are fee-exempt: the refund moves the original principal only and
/// the original payment's fee is not returned.
const fn base_fee_minor(kind: TransactionKind) -> i64 {
    match kind {
        TransactionKind::Transfer => 200,
        TransactionKind::Deposit => 150,
        TransactionKind::Withdrawal => 300,
        TransactionKind::Payment | TransactionKind::Refund => 0,
    }
}

/// Percentage applied on top of the base fee by the standard policy.
const STANDARD_RATE_BPS: i64 = 100; // 1%

/// Risk-adjusted policy constants, all in basis points.
const RISK_BASE_RATE_BPS: i64 = 250; // 2.5%
const RISK_MIN_RATE_BPS: i64 = 100; // 1.0%
const RISK_MAX_RATE_BPS: i64 = 450; // 4.5%
const RISK_SURCHARGE_BPS: i64 = 200; // up to +2.0% at risk score 1.0

/// Minimum absolute fee charged by the risk-adjusted policy, in cents.
const RISK_MIN_FEE_MINOR: i64 = 100;

/// Fee policy selected per engine instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeePolicy {
    /// Per-kind base fee + 1% of the principal.
    #[default]
    Standard,
    /// Volume-discounted, risk-surcharged percentage of the principal.
    ///
    /// Falls back to [`Standard`] when no risk score accompanies the
    /// transaction.
    ///
    /// [`Standard`]: FeePolicy::Standard
    RiskAdjusted,
}

impl FeePolicy {
    /// Computes the fee owed for a transaction, in cents.
    ///
    /// `risk_score` must be within `[0, 1]` when present.
    pub fn fee_minor(
        self,
        kind: TransactionKind,
        amount_minor: i64,
        risk_score: Option<f64>,
    ) -> ResultEngine<i64> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if kind == TransactionKind::Refund {
            return Ok(0);
        }
        match (self, risk_score) {
            (FeePolicy::RiskAdjusted, Some(score)) => risk_adjusted_fee(amount_minor, score),
            _ => Ok(standard_fee(kind, amount_minor)),
        }
    }
}

fn standard_fee(kind: TransactionKind, amount_minor: i64) -> i64 {
    base_fee_minor(kind) + MoneyCents::new(amount_minor).scale_bps(STANDARD_RATE_BPS).cents()
}

fn risk_adjusted_fee(amount_minor: i64, risk_score: f64) -> ResultEngine<i64> {
    if !(0.0..=1.0).contains(&risk_score) {
        return Err(EngineError::InvalidAmount(format!(
            "risk score must be within [0, 1], got {risk_score}"
        )));
    }

    let volume_discount_bps = if amount_minor >= MoneyCents::from_major(10_000).cents() {
        50
    } else if amount_minor >= MoneyCents::from_major(5_000).cents() {
        30
    } else if amount_minor >= MoneyCents::from_major(1_000).cents() {
        10
    } else {
        0
    };

    // Surcharge in whole bps, rounded half up, so the clamp below works on
    // integers only.
    let surcharge_bps = (risk_score * RISK_SURCHARGE_BPS as f64).round() as i64;

    let rate_bps = (RISK_BASE_RATE_BPS - volume_discount_bps + surcharge_bps)
        .clamp(RISK_MIN_RATE_BPS, RISK_MAX_RATE_BPS);

    let fee = MoneyCents::new(amount_minor).scale_bps(rate_bps).cents();
    Ok(fee.max(RISK_MIN_FEE_MINOR))
}
