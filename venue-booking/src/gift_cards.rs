use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use venue_core::notify::{dispatch, NotificationKind, Notifier};
use venue_core::repository::GiftCardRepository;
use venue_core::rules::EngineRules;
use venue_domain::gift_card::{format_code, format_pin, GiftCard, GiftCardKind};
use venue_domain::DomainError;

use crate::error::ServiceError;

/// Issues, redeems, and audits stored-value gift cards.
pub struct LedgerService {
    cards: Arc<dyn GiftCardRepository>,
    notifier: Arc<dyn Notifier>,
    rules: EngineRules,
}

impl LedgerService {
    pub fn new(
        cards: Arc<dyn GiftCardRepository>,
        notifier: Arc<dyn Notifier>,
        rules: EngineRules,
    ) -> Self {
        Self {
            cards,
            notifier,
            rules,
        }
    }

    /// Issue a card. When a buyer is supplied the card is purchased
    /// immediately and gets its code/PIN pair; otherwise it sits as an
    /// unpurchased (predefined) card until [`purchase`] is called.
    ///
    /// [`purchase`]: LedgerService::purchase
    pub async fn issue(
        &self,
        amount: i64,
        kind: GiftCardKind,
        buyer: Option<String>,
    ) -> Result<GiftCard, ServiceError> {
        let card = GiftCard::issue(amount, kind, buyer.clone())?;
        self.cards
            .insert(&card)
            .await
            .map_err(ServiceError::storage)?;
        match buyer {
            Some(buyer) => self.purchase(card.id, &buyer).await,
            None => Ok(card),
        }
    }

    /// Assign the code/PIN pair at purchase time. The code number comes from
    /// the dedicated monotonic counter; PINs are drawn uniformly and
    /// probe-retried on collision. Both retries are bounded: running out is
    /// a capacity problem, not a user error.
    pub async fn purchase(&self, id: Uuid, buyer: &str) -> Result<GiftCard, ServiceError> {
        let card = self.get(id).await?;
        if card.is_purchased() {
            return Err(DomainError::validation("gift card is already purchased").into());
        }

        let attempts = self.rules.generation_max_attempts;
        for _ in 0..attempts {
            let number = self
                .cards
                .next_code_number()
                .await
                .map_err(ServiceError::storage)?;
            let code = format_code(&self.rules.gift_card_code_prefix, number);
            let pin = format_pin(rand::thread_rng().gen_range(0..1_000_000));

            if self
                .cards
                .pin_exists(&pin)
                .await
                .map_err(ServiceError::storage)?
            {
                continue;
            }
            if self
                .cards
                .assign_code(id, &code, &pin, buyer, Utc::now())
                .await
                .map_err(ServiceError::storage)?
            {
                let purchased = self.get(id).await?;
                tracing::info!(card_id = %id, code = %code, "gift card purchased");
                dispatch(
                    self.notifier.clone(),
                    NotificationKind::GiftCardPurchased,
                    json!({ "card_id": id, "code": code, "amount": purchased.amount }),
                    self.rules.notification_timeout_ms,
                );
                return Ok(purchased);
            }

            // A refused assignment is either a code/PIN collision, worth
            // retrying with fresh values, or a purchase that landed
            // concurrently, which no amount of retrying will fix.
            if self.get(id).await?.is_purchased() {
                return Err(DomainError::validation("gift card is already purchased").into());
            }
        }

        tracing::error!(card_id = %id, attempts, "gift card code/pin generation exhausted");
        Err(DomainError::CodeSpaceExhausted { attempts }.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<GiftCard, ServiceError> {
        self.cards
            .get(id)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))
    }

    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<GiftCard>, ServiceError> {
        self.cards
            .list_for_owner(owner)
            .await
            .map_err(ServiceError::storage)
    }

    /// Look a card up by its code/PIN pair. Any mismatch is a uniform
    /// `NotFound`: wrong code and wrong PIN are indistinguishable to avoid
    /// enumeration leakage.
    async fn find_validated(&self, code: &str, pin: &str) -> Result<GiftCard, ServiceError> {
        let card = self
            .cards
            .find_by_code(code)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))?;
        if card.pin.as_deref() != Some(pin) {
            return Err(DomainError::NotFound.into());
        }
        Ok(card)
    }

    pub async fn validate(&self, code: &str, pin: &str) -> Result<i64, ServiceError> {
        Ok(self.find_validated(code, pin).await?.balance)
    }

    /// Customer redemption by code+PIN. The balance decrement is a
    /// compare-and-swap against the balance read here; a concurrent
    /// redemption loses the swap and retries against the fresh balance.
    pub async fn redeem(
        &self,
        code: &str,
        pin: &str,
        amount: i64,
        reservation_id: Option<Uuid>,
    ) -> Result<i64, ServiceError> {
        for _ in 0..self.rules.redeem_retry_attempts {
            let mut card = self.find_validated(code, pin).await?;
            let expected = card.balance;
            let expected_status = card.status;
            let new_balance = card.redeem(amount, reservation_id)?;
            let Some(entry) = card.history.last() else {
                return Err(ServiceError::Storage(
                    "usage history missing after redemption".to_string(),
                ));
            };
            if self
                .cards
                .update_balance(card.id, expected, expected_status, new_balance, card.status, entry)
                .await
                .map_err(ServiceError::storage)?
            {
                tracing::info!(card_id = %card.id, amount, new_balance, "gift card redeemed");
                return Ok(new_balance);
            }
        }
        Err(ServiceError::Storage(
            "gift card balance changed concurrently, giving up".to_string(),
        ))
    }

    /// Admin redemption without a linked reservation; the usage entry is
    /// tagged and carries the operator's reason.
    pub async fn offline_redeem(
        &self,
        id: Uuid,
        amount: i64,
        reason: String,
    ) -> Result<i64, ServiceError> {
        for _ in 0..self.rules.redeem_retry_attempts {
            let mut card = self.get(id).await?;
            let expected = card.balance;
            let expected_status = card.status;
            let new_balance = card.offline_redeem(amount, reason.clone())?;
            let Some(entry) = card.history.last() else {
                return Err(ServiceError::Storage(
                    "usage history missing after redemption".to_string(),
                ));
            };
            if self
                .cards
                .update_balance(id, expected, expected_status, new_balance, card.status, entry)
                .await
                .map_err(ServiceError::storage)?
            {
                return Ok(new_balance);
            }
        }
        Err(ServiceError::Storage(
            "gift card balance changed concurrently, giving up".to_string(),
        ))
    }

    /// Zero the balance and forfeit the remainder, leaving the
    /// distinguishing audit entry.
    pub async fn force_redeem(&self, id: Uuid, reason: String) -> Result<i64, ServiceError> {
        for _ in 0..self.rules.redeem_retry_attempts {
            let mut card = self.get(id).await?;
            let expected = card.balance;
            let expected_status = card.status;
            card.force_redeem(reason.clone())?;
            let Some(entry) = card.history.last() else {
                return Err(ServiceError::Storage(
                    "usage history missing after redemption".to_string(),
                ));
            };
            if self
                .cards
                .update_balance(id, expected, expected_status, 0, card.status, entry)
                .await
                .map_err(ServiceError::storage)?
            {
                tracing::warn!(card_id = %id, forfeited = expected, "gift card force-redeemed");
                return Ok(0);
            }
        }
        Err(ServiceError::Storage(
            "gift card balance changed concurrently, giving up".to_string(),
        ))
    }

    pub async fn discard(&self, id: Uuid) -> Result<GiftCard, ServiceError> {
        let mut card = self.get(id).await?;
        let from = card.status;
        card.discard()?;
        if !self
            .cards
            .update_status(id, from, card.status)
            .await
            .map_err(ServiceError::storage)?
        {
            return Err(ServiceError::Storage(
                "gift card status changed concurrently".to_string(),
            ));
        }
        Ok(card)
    }

    /// Reactivate a discarded card; the balance is untouched.
    pub async fn reactivate(&self, id: Uuid) -> Result<GiftCard, ServiceError> {
        let mut card = self.get(id).await?;
        let from = card.status;
        card.reactivate()?;
        if !self
            .cards
            .update_status(id, from, card.status)
            .await
            .map_err(ServiceError::storage)?
        {
            return Err(ServiceError::Storage(
                "gift card status changed concurrently".to_string(),
            ));
        }
        Ok(card)
    }
}
