//! Market Lifecycle
//!
//! Commitments, reveals and resolution for one market.
//!
//! ```text
//!   creation        wageDeadline         resolutionDate
//!      │   Open          │  AwaitingReveal     │  AwaitingResolution ──resolve()──► Resolved
//!      ├─────────────────┼─────────────────────┼──────────────────────
//!      predict()          verifyPrediction() at any time, including after resolve
//! ```
//!
//! Phases are never stored. Every entry point reads the clock once and
//! derives the phase from it, so a market moves forward only when someone
//! calls it after a deadline.
//!
//! The host serializes calls: each entry point takes `&mut self` and runs to
//! completion before the next one starts. Entry points validate everything
//! before mutating, so a rejected call leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::address::Address;
use crate::core::clock::{Clock, Timestamp};
use crate::core::hash::Hash32;
use crate::ledger::ReputationLedger;
use crate::market::error::MarketError;
use crate::market::events::{MarketEvent, MarketEventData};
use crate::market::reward::{Amount, RewardEngine};
use crate::market::state::{MarketParams, MarketPhase, OutcomeBound, PredictionRecord};
use crate::proof::commitment::{check_reveal, RevealCheck};
use crate::proof::signature::EcdsaVerifier;

/// Strategy that decides the winning outcome of a market.
pub trait OutcomeResolver {
    /// Reject parameters this strategy cannot resolve.
    fn validate(&self, _params: &MarketParams) -> Result<(), MarketError> {
        Ok(())
    }

    /// Winning outcome index at `now`. Called at most once per successful
    /// resolution; an error leaves the market unresolved.
    fn determine_outcome(&self, params: &MarketParams, now: Timestamp) -> Result<u32, MarketError>;
}

/// Result of a successful resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Winning outcome index.
    pub answer: u32,
    /// Reputation credited per correct participant.
    pub payouts: Vec<(Address, Amount)>,
}

/// Serializable view of a market.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Construction parameters.
    pub params: MarketParams,
    /// Phase at snapshot time.
    pub phase: MarketPhase,
    /// Stored answer.
    pub answer: Option<u32>,
    /// All prediction records, ordered by participant.
    pub predictions: Vec<PredictionRecord>,
    /// Event history.
    pub events: Vec<MarketEvent>,
}

/// A prediction market resolved by `R`.
pub struct Market<R> {
    params: MarketParams,
    resolver: R,
    clock: Arc<dyn Clock>,
    verifier: EcdsaVerifier,
    rewards: RewardEngine,
    predictions: BTreeMap<Address, PredictionRecord>,
    answer: Option<u32>,
    events: Vec<MarketEvent>,
}

impl<R: OutcomeResolver> Market<R> {
    /// Create a market after validating its parameters.
    pub fn new(
        params: MarketParams,
        resolver: R,
        clock: Arc<dyn Clock>,
        rewards: RewardEngine,
    ) -> Result<Self, MarketError> {
        params.validate()?;
        resolver.validate(&params)?;

        info!(
            "Market {} created: {:?} ({} outcomes, deadline {}, resolution {})",
            params.market.short(),
            params.question,
            params.number_of_outcomes,
            params.wage_deadline,
            params.resolution_date
        );

        Ok(Self {
            params,
            resolver,
            clock,
            verifier: EcdsaVerifier,
            rewards,
            predictions: BTreeMap::new(),
            answer: None,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Commit `commitment_hash` for `caller`.
    pub fn predict(&mut self, caller: Address, commitment_hash: Hash32) -> Result<(), MarketError> {
        let now = self.clock.now();

        if self.phase_at(now) != MarketPhase::Open {
            return Err(MarketError::MarketClosed {
                deadline: self.params.wage_deadline,
                now,
            });
        }
        if self.predictions.contains_key(&caller) {
            return Err(MarketError::AlreadyPredicted(caller));
        }

        self.predictions
            .insert(caller, PredictionRecord::new(caller, commitment_hash, now));
        self.events.push(MarketEvent::new(
            now,
            MarketEventData::PredictionCommitted {
                participant: caller,
                commitment_hash,
            },
        ));

        info!(
            "Market {}: {} committed at {}",
            self.params.market.short(),
            caller.short(),
            now
        );
        Ok(())
    }

    /// Reveal `claimed_value` for `participant`. Anyone may submit.
    ///
    /// Returns `Ok(true)` when the reveal matched and the prediction is now
    /// verified, `Ok(false)` when the committed signature does not sign
    /// `claimed_value` (nothing changes). Works in every phase; a reveal
    /// after resolution is recorded but earns nothing.
    pub fn verify_prediction(
        &mut self,
        participant: Address,
        claimed_value: u64,
        signature: &[u8],
    ) -> Result<bool, MarketError> {
        let now = self.clock.now();
        let market = self.params.market;

        let record = self
            .predictions
            .get(&participant)
            .ok_or(MarketError::NotPredicted(participant))?;
        if record.verified {
            return Err(MarketError::AlreadyVerified(participant));
        }

        let check = check_reveal(
            &self.verifier,
            &record.commitment_hash,
            &participant,
            &market,
            claimed_value,
            signature,
        );

        match check {
            RevealCheck::CommitmentMismatch => Err(MarketError::WrongSignature(participant)),
            RevealCheck::ValueMismatch => {
                debug!(
                    "Market {}: reveal of {} for {} does not match",
                    market.short(),
                    claimed_value,
                    participant.short()
                );
                Ok(false)
            }
            RevealCheck::Matches => {
                if let Some(record) = self.predictions.get_mut(&participant) {
                    record.verified = true;
                    record.revealed_value = Some(claimed_value);
                }
                self.events.push(MarketEvent::new(
                    now,
                    MarketEventData::PredictionVerified {
                        participant,
                        value: claimed_value,
                    },
                ));
                info!(
                    "Market {}: {} verified prediction {}",
                    market.short(),
                    participant.short(),
                    claimed_value
                );
                Ok(true)
            }
        }
    }

    /// Determine the answer and credit every verified correct participant.
    pub fn resolve<L>(&mut self, ledger: &mut L) -> Result<Resolution, MarketError>
    where
        L: ReputationLedger + ?Sized,
    {
        let now = self.clock.now();

        match self.phase_at(now) {
            MarketPhase::Resolved => {
                return Err(MarketError::AlreadyResolved {
                    answer: self.answer.unwrap_or_default(),
                })
            }
            MarketPhase::Open | MarketPhase::AwaitingReveal => {
                return Err(MarketError::TooEarly {
                    resolution_date: self.params.resolution_date,
                    now,
                })
            }
            MarketPhase::AwaitingResolution => {}
        }

        let answer = self.resolver.determine_outcome(&self.params, now)?;
        if answer >= self.params.number_of_outcomes {
            return Err(MarketError::InvalidOutcome {
                index: answer,
                number_of_outcomes: self.params.number_of_outcomes,
            });
        }

        let payouts: Vec<(Address, Amount)> = self
            .predictions
            .values()
            .filter(|record| record.is_correct(answer))
            .map(|record| {
                let amount = self.rewards.compute_reputation(
                    self.params.wage_deadline,
                    self.params.creation_date,
                    record.prediction_timestamp,
                    self.params.number_of_outcomes,
                );
                (record.participant, amount)
            })
            .collect();

        ledger.credit_batch(&payouts)?;

        // Nothing below can fail
        self.answer = Some(answer);
        self.events.push(MarketEvent::new(
            now,
            MarketEventData::MarketResolved {
                answer,
                winners: payouts.len() as u32,
            },
        ));
        for (participant, amount) in &payouts {
            if let Some(record) = self.predictions.get_mut(participant) {
                record.reward = Some(*amount);
            }
            self.events.push(MarketEvent::new(
                now,
                MarketEventData::ReputationCredited {
                    participant: *participant,
                    amount: *amount,
                },
            ));
        }

        info!(
            "Market {} resolved to outcome {} ({} winners)",
            self.params.market.short(),
            answer,
            payouts.len()
        );

        Ok(Resolution { answer, payouts })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Phase at the current clock reading.
    pub fn phase(&self) -> MarketPhase {
        self.phase_at(self.clock.now())
    }

    fn phase_at(&self, now: Timestamp) -> MarketPhase {
        self.params.phase_at(now, self.answer)
    }

    /// Market identity.
    pub fn market_id(&self) -> Address {
        self.params.market
    }

    /// Question being forecast.
    pub fn question(&self) -> &str {
        &self.params.question
    }

    /// Outcome bounds.
    pub fn outcome_bounds(&self) -> &[OutcomeBound] {
        &self.params.outcome_bounds
    }

    /// Construction parameters.
    pub fn params(&self) -> &MarketParams {
        &self.params
    }

    /// Creation time.
    pub fn creation_date(&self) -> Timestamp {
        self.params.creation_date
    }

    /// Wager deadline.
    pub fn wage_deadline(&self) -> Timestamp {
        self.params.wage_deadline
    }

    /// Resolution date.
    pub fn resolution_date(&self) -> Timestamp {
        self.params.resolution_date
    }

    /// Number of outcomes.
    pub fn number_of_outcomes(&self) -> u32 {
        self.params.number_of_outcomes
    }

    /// Whether `participant` holds a commitment.
    pub fn has_predicted(&self, participant: &Address) -> bool {
        self.predictions.contains_key(participant)
    }

    /// Whether `participant`'s reveal has been verified.
    pub fn verified_prediction(&self, participant: &Address) -> bool {
        self.predictions
            .get(participant)
            .map_or(false, |record| record.verified)
    }

    /// Winning outcome, once resolved.
    pub fn answer(&self) -> Option<u32> {
        self.answer
    }

    /// Record for `participant`.
    pub fn prediction(&self, participant: &Address) -> Option<&PredictionRecord> {
        self.predictions.get(participant)
    }

    /// Number of commitments.
    pub fn prediction_count(&self) -> usize {
        self.predictions.len()
    }

    /// Event history.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Resolution strategy.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Serializable view at the current clock reading.
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            params: self.params.clone(),
            phase: self.phase(),
            answer: self.answer,
            predictions: self.predictions.values().cloned().collect(),
            events: self.events.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::ledger::ReputationToken;
    use crate::market::reward::compute_reputation;
    use crate::proof::commitment::SealedPrediction;
    use crate::proof::signature::PredictionSigner;
    use std::cell::Cell;

    const MARKET: Address = Address::new([0x4d; 20]);

    /// Resolver that reports a preset outcome, counting calls.
    struct PresetOutcome {
        outcome: u32,
        calls: Cell<u32>,
    }

    impl PresetOutcome {
        fn new(outcome: u32) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl OutcomeResolver for PresetOutcome {
        fn determine_outcome(&self, _params: &MarketParams, _now: Timestamp) -> Result<u32, MarketError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.outcome)
        }
    }

    fn params(wage_deadline: Timestamp, resolution_date: Timestamp) -> MarketParams {
        MarketParams {
            market: MARKET,
            question: "In what range will USDC be by 12/06/2023".into(),
            outcome_bounds: vec![
                OutcomeBound::Label("in range".into()),
                OutcomeBound::Label("out of range".into()),
            ],
            number_of_outcomes: 2,
            creation_date: 0,
            wage_deadline,
            resolution_date,
        }
    }

    fn setup(outcome: u32) -> (Market<PresetOutcome>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let market = Market::new(
            params(1000, 1000),
            PresetOutcome::new(outcome),
            clock.clone(),
            RewardEngine::default(),
        )
        .unwrap();
        (market, clock)
    }

    fn signer(seed: u8) -> PredictionSigner {
        PredictionSigner::from_secret_bytes(&[seed; 32]).unwrap()
    }

    #[test]
    fn test_constructor_fields() {
        let (market, _) = setup(0);
        assert_eq!(market.wage_deadline(), 1000);
        assert_eq!(market.resolution_date(), 1000);
        assert_eq!(market.number_of_outcomes(), 2);
        assert_eq!(market.creation_date(), 0);
        assert_eq!(market.market_id(), MARKET);
        assert_eq!(market.answer(), None);
        assert_eq!(market.phase(), MarketPhase::Open);
    }

    #[test]
    fn test_constructor_rejects_invalid_params() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(0));
        let result = Market::new(
            params(0, 1000),
            PresetOutcome::new(0),
            clock,
            RewardEngine::default(),
        );
        assert!(matches!(result, Err(MarketError::InvalidParameters(_))));
    }

    #[test]
    fn test_predict_once() {
        let (mut market, clock) = setup(0);
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);

        clock.set(100);
        market.predict(alice.address(), sealed.commitment).unwrap();

        assert!(market.has_predicted(&alice.address()));
        assert_eq!(market.prediction(&alice.address()).unwrap().prediction_timestamp, 100);

        // Second commitment rejected regardless of payload
        assert_eq!(
            market.predict(alice.address(), [7; 32]),
            Err(MarketError::AlreadyPredicted(alice.address()))
        );
        assert_eq!(market.prediction(&alice.address()).unwrap().commitment_hash, sealed.commitment);
    }

    #[test]
    fn test_predict_after_deadline_rejected() {
        let (mut market, clock) = setup(0);
        let alice = signer(1);
        let bob = signer(2);
        market.predict(alice.address(), [1; 32]).unwrap();

        clock.set(1000);
        assert!(matches!(
            market.predict(bob.address(), [2; 32]),
            Err(MarketError::MarketClosed { deadline: 1000, now: 1000 })
        ));
        // Deadline check precedes the duplicate check
        assert!(matches!(
            market.predict(alice.address(), [1; 32]),
            Err(MarketError::MarketClosed { .. })
        ));
        assert!(!market.has_predicted(&bob.address()));
    }

    #[test]
    fn test_verify_before_predict_rejected() {
        let (mut market, _) = setup(0);
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);

        assert_eq!(
            market.verify_prediction(alice.address(), 1, &sealed.signature),
            Err(MarketError::NotPredicted(alice.address()))
        );
    }

    #[test]
    fn test_verify_prediction_flow() {
        let (mut market, _) = setup(0);
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);
        market.predict(alice.address(), sealed.commitment).unwrap();

        // A signature that was never committed
        let random = SealedPrediction::seal(&alice, 13, Address::new([0x11; 20]));
        assert_eq!(
            market.verify_prediction(alice.address(), 1, &random.signature),
            Err(MarketError::WrongSignature(alice.address()))
        );

        // Committed signature, wrong value: silently ignored
        assert_eq!(market.verify_prediction(alice.address(), 2, &sealed.signature), Ok(false));
        assert!(!market.verified_prediction(&alice.address()));

        // Correct reveal
        assert_eq!(market.verify_prediction(alice.address(), 1, &sealed.signature), Ok(true));
        assert!(market.verified_prediction(&alice.address()));
        assert_eq!(market.prediction(&alice.address()).unwrap().revealed_value, Some(1));

        // No second verification
        assert_eq!(
            market.verify_prediction(alice.address(), 1, &sealed.signature),
            Err(MarketError::AlreadyVerified(alice.address()))
        );
        assert!(market.verified_prediction(&alice.address()));
    }

    #[test]
    fn test_malformed_committed_signature_never_verifies() {
        let (mut market, _) = setup(0);
        let alice = signer(1);
        let garbage = vec![0xff; 12];
        market
            .predict(alice.address(), crate::proof::commitment_hash(&garbage))
            .unwrap();

        assert_eq!(market.verify_prediction(alice.address(), 1, &garbage), Ok(false));
        assert!(!market.verified_prediction(&alice.address()));
    }

    #[test]
    fn test_signature_from_other_market_rejected() {
        let (mut market, _) = setup(0);
        let alice = signer(1);
        let foreign = SealedPrediction::seal(&alice, 1, Address::new([0x99; 20]));

        // Committing a foreign-market signature never verifies here
        market.predict(alice.address(), foreign.commitment).unwrap();
        assert_eq!(market.verify_prediction(alice.address(), 1, &foreign.signature), Ok(false));
    }

    #[test]
    fn test_resolve_too_early_and_twice() {
        let (mut market, clock) = setup(1);
        let mut token = ReputationToken::new("defi", "DEFITOK");

        clock.set(999);
        assert!(matches!(
            market.resolve(&mut token),
            Err(MarketError::TooEarly { resolution_date: 1000, now: 999 })
        ));
        assert_eq!(market.resolver().calls.get(), 0);

        clock.set(1000);
        let resolution = market.resolve(&mut token).unwrap();
        assert_eq!(resolution.answer, 1);
        assert_eq!(market.answer(), Some(1));
        assert_eq!(market.phase(), MarketPhase::Resolved);

        assert_eq!(
            market.resolve(&mut token),
            Err(MarketError::AlreadyResolved { answer: 1 })
        );
        assert_eq!(market.resolver().calls.get(), 1);
    }

    #[test]
    fn test_out_of_range_outcome_leaves_market_unresolved() {
        let (mut market, clock) = setup(5);
        let mut token = ReputationToken::new("defi", "DEFITOK");
        clock.set(1000);

        assert!(matches!(
            market.resolve(&mut token),
            Err(MarketError::InvalidOutcome { index: 5, number_of_outcomes: 2 })
        ));
        assert_eq!(market.answer(), None);
    }

    #[test]
    fn test_end_to_end_rewards() {
        let (mut market, clock) = setup(1);
        let mut token = ReputationToken::new("defi", "DEFITOK");
        let alice = signer(1);
        let bob = signer(2);
        let carol = signer(3);

        let alice_sealed = SealedPrediction::seal(&alice, 1, MARKET);
        let bob_sealed = SealedPrediction::seal(&bob, 0, MARKET);
        let carol_sealed = SealedPrediction::seal(&carol, 1, MARKET);

        clock.set(100);
        market.predict(alice.address(), alice_sealed.commitment).unwrap();
        clock.set(500);
        market.predict(bob.address(), bob_sealed.commitment).unwrap();
        market.predict(carol.address(), carol_sealed.commitment).unwrap();

        clock.set(1001);
        // Anyone may reveal on the participant's behalf
        assert_eq!(market.verify_prediction(alice.address(), 1, &alice_sealed.signature), Ok(true));
        assert_eq!(market.verify_prediction(bob.address(), 0, &bob_sealed.signature), Ok(true));
        // Carol never reveals

        let resolution = market.resolve(&mut token).unwrap();
        let expected = compute_reputation(1000, 0, 100, 2);

        assert_eq!(resolution.answer, 1);
        assert_eq!(resolution.payouts, vec![(alice.address(), expected)]);
        assert!(market.verified_prediction(&alice.address()));
        assert_eq!(token.balance_of(&alice.address()), expected);
        assert_eq!(token.balance_of(&bob.address()), 0);
        assert_eq!(token.balance_of(&carol.address()), 0);
        assert_eq!(market.prediction(&alice.address()).unwrap().reward, Some(expected));

    }

    #[test]
    fn test_reveal_after_resolution() {
        let (mut market, clock) = setup(1);
        let mut token = ReputationToken::new("defi", "DEFITOK");
        let alice = signer(1);
        let bob = signer(2);
        let alice_sealed = SealedPrediction::seal(&alice, 1, MARKET);
        let bob_sealed = SealedPrediction::seal(&bob, 1, MARKET);

        clock.set(100);
        market.predict(alice.address(), alice_sealed.commitment).unwrap();
        market.predict(bob.address(), bob_sealed.commitment).unwrap();

        clock.set(1000);
        let resolution = market.resolve(&mut token).unwrap();
        assert!(resolution.payouts.is_empty());

        // Forgery is still reported after resolution
        assert_eq!(
            market.verify_prediction(alice.address(), 1, &bob_sealed.signature),
            Err(MarketError::WrongSignature(alice.address()))
        );
        assert!(!market.verified_prediction(&alice.address()));

        // Late correct reveal is recorded without a reward
        assert_eq!(market.verify_prediction(alice.address(), 1, &alice_sealed.signature), Ok(true));
        assert!(market.verified_prediction(&alice.address()));
        assert_eq!(market.prediction(&alice.address()).unwrap().reward, None);
        assert_eq!(token.balance_of(&alice.address()), 0);
        assert_eq!(token.total_supply(), 0);
        assert_eq!(
            market.verify_prediction(alice.address(), 1, &alice_sealed.signature),
            Err(MarketError::AlreadyVerified(alice.address()))
        );
    }

    #[test]
    fn test_other_participants_signature_rejected() {
        let (mut market, clock) = setup(0);
        let alice = signer(1);
        let bob = signer(2);
        let alice_sealed = SealedPrediction::seal(&alice, 1, MARKET);
        let bob_sealed = SealedPrediction::seal(&bob, 1, MARKET);

        clock.set(100);
        market.predict(alice.address(), alice_sealed.commitment).unwrap();
        market.predict(bob.address(), bob_sealed.commitment).unwrap();

        clock.set(1000);
        assert_eq!(
            market.verify_prediction(alice.address(), 1, &bob_sealed.signature),
            Err(MarketError::WrongSignature(alice.address()))
        );
        assert!(!market.verified_prediction(&alice.address()));
        assert!(!market.verified_prediction(&bob.address()));

        // Bob's own reveal is unaffected
        assert_eq!(market.verify_prediction(bob.address(), 1, &bob_sealed.signature), Ok(true));
        assert!(!market.verified_prediction(&alice.address()));
    }

    #[test]
    fn test_event_history() {
        let (mut market, clock) = setup(0);
        let mut token = ReputationToken::new("defi", "DEFITOK");
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 0, MARKET);

        clock.set(10);
        market.predict(alice.address(), sealed.commitment).unwrap();
        clock.set(1000);
        market.verify_prediction(alice.address(), 0, &sealed.signature).unwrap();
        market.resolve(&mut token).unwrap();

        let kinds: Vec<_> = market
            .events()
            .iter()
            .map(|event| match event.data {
                MarketEventData::PredictionCommitted { .. } => "committed",
                MarketEventData::PredictionVerified { .. } => "verified",
                MarketEventData::MarketResolved { .. } => "resolved",
                MarketEventData::ReputationCredited { .. } => "credited",
            })
            .collect();
        assert_eq!(kinds, vec!["committed", "verified", "resolved", "credited"]);
        assert_eq!(market.events()[0].timestamp, 10);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (mut market, clock) = setup(0);
        let alice = signer(1);
        clock.set(10);
        market.predict(alice.address(), [3; 32]).unwrap();

        let snapshot = market.snapshot();
        assert_eq!(snapshot.phase, MarketPhase::Open);
        assert_eq!(snapshot.predictions.len(), 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(&alice.address().to_string()));
    }
}
