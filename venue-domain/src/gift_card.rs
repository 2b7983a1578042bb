use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftCardStatus {
    Active,
    Used,
    Discarded,
}

impl GiftCardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftCardStatus::Active => "active",
            GiftCardStatus::Used => "used",
            GiftCardStatus::Discarded => "discarded",
        }
    }
}

impl fmt::Display for GiftCardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiftCardStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GiftCardStatus::Active),
            "used" => Ok(GiftCardStatus::Used),
            "discarded" => Ok(GiftCardStatus::Discarded),
            other => Err(DomainError::validation(format!(
                "unknown gift card status: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftCardKind {
    Predefined,
    Custom,
}

impl GiftCardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftCardKind::Predefined => "predefined",
            GiftCardKind::Custom => "custom",
        }
    }
}

impl fmt::Display for GiftCardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiftCardKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predefined" => Ok(GiftCardKind::Predefined),
            "custom" => Ok(GiftCardKind::Custom),
            other => Err(DomainError::validation(format!(
                "unknown gift card kind: {other:?}"
            ))),
        }
    }
}

/// One append-only entry in a card's usage history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    pub amount: i64,
    pub resulting_balance: i64,
    pub reservation_id: Option<Uuid>,
    /// Set for admin-initiated redemptions (offline and force redeems).
    pub admin_redemption: bool,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored-value account with a monotonically-decreasing balance.
///
/// Invariants: `0 <= balance <= amount`; `status == Used` iff the balance is
/// zero (force-redeem zeroes the balance and forfeits the remainder with an
/// explicit audit entry); code and PIN are assigned exactly once, at first
/// purchase, and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCard {
    pub id: Uuid,
    pub code: Option<String>,
    pub pin: Option<String>,
    /// Immutable face value in cents.
    pub amount: i64,
    pub balance: i64,
    pub status: GiftCardStatus,
    pub kind: GiftCardKind,
    pub owner: Option<String>,
    pub purchased_by: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub history: Vec<UsageEntry>,
}

impl GiftCard {
    pub fn issue(
        amount: i64,
        kind: GiftCardKind,
        owner: Option<String>,
    ) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("face value must be positive"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            code: None,
            pin: None,
            amount,
            balance: amount,
            status: GiftCardStatus::Active,
            kind,
            owner,
            purchased_by: None,
            is_active: true,
            created_at: Utc::now(),
            purchased_at: None,
            history: Vec::new(),
        })
    }

    pub fn is_purchased(&self) -> bool {
        self.purchased_by.is_some()
    }

    /// Assign the code/PIN pair at purchase time. Callers generate the pair;
    /// the card only enforces that assignment happens once.
    pub fn mark_purchased(
        &mut self,
        code: String,
        pin: String,
        buyer: String,
    ) -> Result<(), DomainError> {
        if self.is_purchased() {
            return Err(DomainError::validation("gift card is already purchased"));
        }
        self.code = Some(code);
        self.pin = Some(pin);
        self.purchased_by = Some(buyer);
        self.purchased_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_redeemable(&self) -> Result<(), DomainError> {
        if self.status != GiftCardStatus::Active || !self.is_active {
            return Err(DomainError::NotRedeemable {
                status: self.status,
            });
        }
        Ok(())
    }

    fn debit(&mut self, amount: i64, entry: UsageEntry) -> i64 {
        self.balance -= amount;
        if self.balance == 0 {
            self.status = GiftCardStatus::Used;
        }
        self.history.push(entry);
        self.balance
    }

    /// Redeem against the balance. Returns the new balance.
    pub fn redeem(
        &mut self,
        amount: i64,
        reservation_id: Option<Uuid>,
    ) -> Result<i64, DomainError> {
        self.ensure_redeemable()?;
        if amount <= 0 {
            return Err(DomainError::validation("redemption amount must be positive"));
        }
        if amount > self.balance {
            return Err(DomainError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        let resulting = self.balance - amount;
        Ok(self.debit(
            amount,
            UsageEntry {
                amount,
                resulting_balance: resulting,
                reservation_id,
                admin_redemption: false,
                reason: None,
                created_at: Utc::now(),
            },
        ))
    }

    /// Admin redemption with no linked reservation, tagged with a reason.
    pub fn offline_redeem(&mut self, amount: i64, reason: String) -> Result<i64, DomainError> {
        self.ensure_redeemable()?;
        if amount <= 0 {
            return Err(DomainError::validation("redemption amount must be positive"));
        }
        if amount > self.balance {
            return Err(DomainError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        let resulting = self.balance - amount;
        Ok(self.debit(
            amount,
            UsageEntry {
                amount,
                resulting_balance: resulting,
                reservation_id: None,
                admin_redemption: true,
                reason: Some(reason),
                created_at: Utc::now(),
            },
        ))
    }

    /// Zero the balance regardless of the remaining amount, forfeiting the
    /// remainder with a distinguishing audit entry.
    pub fn force_redeem(&mut self, reason: String) -> Result<i64, DomainError> {
        self.ensure_redeemable()?;
        let forfeited = self.balance;
        Ok(self.debit(
            forfeited,
            UsageEntry {
                amount: forfeited,
                resulting_balance: 0,
                reservation_id: None,
                admin_redemption: true,
                reason: Some(format!("force redeem, remainder forfeited: {reason}")),
                created_at: Utc::now(),
            },
        ))
    }

    pub fn discard(&mut self) -> Result<(), DomainError> {
        if self.status == GiftCardStatus::Discarded {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: GiftCardStatus::Discarded.to_string(),
            });
        }
        self.status = GiftCardStatus::Discarded;
        Ok(())
    }

    /// Only a discarded card can be reactivated; the balance is untouched.
    pub fn reactivate(&mut self) -> Result<(), DomainError> {
        if self.status != GiftCardStatus::Discarded {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: GiftCardStatus::Active.to_string(),
            });
        }
        self.status = GiftCardStatus::Active;
        Ok(())
    }
}

/// Redemption codes are `PREFIX-<n>` with `n` drawn from a dedicated
/// monotonic counter.
pub fn format_code(prefix: &str, number: u64) -> String {
    format!("{prefix}-{number}")
}

/// PINs are fixed-width zero-padded 6-digit strings.
pub fn format_pin(value: u32) -> String {
    format!("{:06}", value % 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchased_card(amount: i64) -> GiftCard {
        let mut card = GiftCard::issue(amount, GiftCardKind::Custom, None).unwrap();
        card.mark_purchased("GC-7".into(), "042137".into(), "buyer@example.com".into())
            .unwrap();
        card
    }

    #[test]
    fn redeem_decrements_and_flips_to_used_at_zero() {
        let mut card = purchased_card(100);
        assert_eq!(card.redeem(40, None).unwrap(), 60);
        assert_eq!(card.status, GiftCardStatus::Active);
        assert_eq!(card.redeem(60, None).unwrap(), 0);
        assert_eq!(card.status, GiftCardStatus::Used);

        let err = card.redeem(1, None).unwrap_err();
        assert!(matches!(err, DomainError::NotRedeemable { .. }));
    }

    #[test]
    fn redeem_rejects_overdraft_and_non_positive_amounts() {
        let mut card = purchased_card(50);
        assert!(matches!(
            card.redeem(60, None).unwrap_err(),
            DomainError::InsufficientBalance {
                requested: 60,
                available: 50
            }
        ));
        assert!(card.redeem(0, None).is_err());
        assert!(card.redeem(-5, None).is_err());
        assert_eq!(card.balance, 50);
    }

    #[test]
    fn balance_is_monotonically_non_increasing() {
        let mut card = purchased_card(100);
        let mut last = card.balance;
        for amount in [10, 20, 5, 30] {
            let balance = card.redeem(amount, None).unwrap();
            assert!(balance <= last && balance >= 0);
            last = balance;
        }
        assert_eq!(card.history.len(), 4);
        assert_eq!(card.history.last().unwrap().resulting_balance, last);
    }

    #[test]
    fn force_redeem_forfeits_remainder_with_audit_entry() {
        let mut card = purchased_card(100);
        card.redeem(30, None).unwrap();
        assert_eq!(card.force_redeem("counter settlement".into()).unwrap(), 0);
        assert_eq!(card.status, GiftCardStatus::Used);

        let entry = card.history.last().unwrap();
        assert!(entry.admin_redemption);
        assert_eq!(entry.amount, 70);
        assert!(entry.reason.as_deref().unwrap().contains("forfeited"));
    }

    #[test]
    fn offline_redeem_is_admin_tagged_without_reservation() {
        let mut card = purchased_card(100);
        card.offline_redeem(25, "walk-in purchase".into()).unwrap();
        let entry = card.history.last().unwrap();
        assert!(entry.admin_redemption);
        assert!(entry.reservation_id.is_none());
        assert_eq!(entry.resulting_balance, 75);
    }

    #[test]
    fn discarded_card_cannot_redeem_until_reactivated() {
        let mut card = purchased_card(100);
        card.discard().unwrap();
        assert!(card.redeem(10, None).is_err());
        assert!(card.discard().is_err());

        card.reactivate().unwrap();
        assert_eq!(card.balance, 100);
        assert_eq!(card.redeem(10, None).unwrap(), 90);
    }

    #[test]
    fn reactivate_requires_discarded() {
        let mut card = purchased_card(100);
        assert!(card.reactivate().is_err());
    }

    #[test]
    fn code_and_pin_are_assigned_exactly_once() {
        let mut card = GiftCard::issue(100, GiftCardKind::Predefined, None).unwrap();
        assert!(card.code.is_none() && card.pin.is_none());
        card.mark_purchased("GC-1".into(), "000042".into(), "a@b.c".into())
            .unwrap();
        assert!(card
            .mark_purchased("GC-2".into(), "000043".into(), "x@y.z".into())
            .is_err());
        assert_eq!(card.code.as_deref(), Some("GC-1"));
    }

    #[test]
    fn code_and_pin_formats() {
        assert_eq!(format_code("GC", 12), "GC-12");
        assert_eq!(format_pin(7), "000007");
        assert_eq!(format_pin(123456), "123456");
    }

    #[test]
    fn issue_rejects_non_positive_face_value() {
        assert!(GiftCard::issue(0, GiftCardKind::Custom, None).is_err());
        assert!(GiftCard::issue(-10, GiftCardKind::Custom, None).is_err());
    }
}
