//! Profitable trade discovery.
//!
//! Every (seller, buyer) pair for the same ware where the buyer pays more
//! than the seller asks is a candidate deal. Candidates are sized by the
//! available amounts and the player's caps, routed through the
//! [`PathEngine`] under the appropriate avoidance variant, scored, and the
//! best `limit` are retained in a bounded min-heap.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::legality::AvoidanceVariant;
use crate::path::{FloatOrd, PathEngine};
use crate::universe::{OfferRole, PlayerState, Position, TradeOffer, Universe, UNITS_PER_KM};

/// Number of deals returned when no limit is given.
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Smallest route length, in kilometres, used as a divisor when scoring by distance.
const MIN_SCORED_ROUTE_KM: f64 = 0.001;

/// Where the player starts from and what they can afford to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOrigin {
    pub position: Position,
    pub sector: String,
    pub credits: Option<f64>,
    pub cargo_capacity: Option<u64>,
}

impl From<&PlayerState> for TradeOrigin {
    fn from(player: &PlayerState) -> Self {
        Self {
            position: player.position,
            sector: player.sector.clone(),
            credits: player.credits,
            cargo_capacity: player.cargo_capacity,
        }
    }
}

/// Parameters of a ranking pass.
#[derive(Debug, Clone)]
pub struct TradeQuery {
    pub limit: usize,
    pub max_cargo: Option<u64>,
    pub rank_by_distance: bool,
    pub avoid_hostile: bool,
    pub avoid_illegal: bool,
    pub origin: Option<TradeOrigin>,
}

impl Default for TradeQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            max_cargo: None,
            rank_by_distance: false,
            avoid_hostile: false,
            avoid_illegal: false,
            origin: None,
        }
    }
}

impl TradeQuery {
    fn validate(&self) -> Result<()> {
        if let Some(origin) = &self.origin {
            if origin.credits.is_some_and(|credits| credits.is_nan() || credits < 0.0) {
                return Err(Error::InvalidQuery {
                    message: "credits must be a non-negative number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Variant used for the origin→seller leg: contraband is only picked up
    /// there, so only hostility restricts it.
    fn origin_variant(&self) -> AvoidanceVariant {
        AvoidanceVariant::from_flags(self.avoid_hostile, false)
    }
}

/// One candidate trade between a seller offer and a buyer offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub ware: String,
    /// Index of the sell offer in [`Universe::offers`].
    pub seller: usize,
    /// Index of the buy offer in [`Universe::offers`].
    pub buyer: usize,
    pub quantity: u64,
    pub profit_per_unit: f64,
    pub total_profit: f64,
    /// Seller→buyer distance in world units.
    pub trade_distance: f64,
    /// Origin→seller distance in world units, when an origin was supplied.
    pub origin_distance: Option<f64>,
    pub score: f64,
    pub variant: AvoidanceVariant,
}

impl Deal {
    /// Seller→buyer plus origin→seller distance, in world units.
    pub fn total_distance(&self) -> f64 {
        self.trade_distance + self.origin_distance.unwrap_or(0.0)
    }
}

/// Offer indices grouped by ware and role.
#[derive(Debug, Clone, Default)]
pub struct OfferBook {
    sellers: BTreeMap<String, Vec<usize>>,
    buyers: BTreeMap<String, Vec<usize>>,
}

impl OfferBook {
    pub fn from_offers(offers: &[TradeOffer]) -> Self {
        let mut book = Self::default();
        for (index, offer) in offers.iter().enumerate() {
            let side = match offer.role {
                OfferRole::Sell => &mut book.sellers,
                OfferRole::Buy => &mut book.buyers,
            };
            side.entry(offer.ware.clone()).or_default().push(index);
        }
        book
    }

    /// Wares that have at least one seller and one buyer.
    pub fn tradable_wares(&self) -> impl Iterator<Item = (&str, &[usize], &[usize])> {
        self.sellers.iter().filter_map(|(ware, sellers)| {
            self.buyers
                .get(ware)
                .map(|buyers| (ware.as_str(), sellers.as_slice(), buyers.as_slice()))
        })
    }
}

/// Rank the most profitable feasible deals in the universe.
///
/// Returns at most `query.limit` deals ordered by descending score. An
/// empty vector is a valid outcome.
pub fn rank_deals(
    universe: &Universe,
    engine: &mut PathEngine<'_>,
    query: &TradeQuery,
) -> Result<Vec<Deal>> {
    query.validate()?;
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let book = OfferBook::from_offers(&universe.offers);
    let mut top = TopK::new(query.limit);
    let mut candidates = 0usize;

    for (ware, sellers, buyers) in book.tradable_wares() {
        for &sell_index in sellers {
            let seller = &universe.offers[sell_index];
            if seller.amount == 0 {
                continue;
            }
            for &buy_index in buyers {
                let buyer = &universe.offers[buy_index];
                if buyer.amount == 0 || buyer.price <= seller.price {
                    continue;
                }
                candidates += 1;

                if let Some(deal) =
                    evaluate(engine, query, ware, (sell_index, seller), (buy_index, buyer))
                {
                    top.offer(deal.score, deal);
                }
            }
        }
    }

    engine.log_stats();
    let deals = top.into_sorted();
    debug!(candidates, returned = deals.len(), "ranked deals");
    Ok(deals)
}

fn evaluate(
    engine: &mut PathEngine<'_>,
    query: &TradeQuery,
    ware: &str,
    (sell_index, seller): (usize, &TradeOffer),
    (buy_index, buyer): (usize, &TradeOffer),
) -> Option<Deal> {
    let quantity = feasible_quantity(seller, buyer, query);
    if quantity == 0 {
        return None;
    }

    let profit_per_unit = buyer.price - seller.price;
    let total_profit = profit_per_unit * quantity as f64;

    let variant = AvoidanceVariant::for_trade(
        seller.illegal || buyer.illegal,
        query.avoid_hostile,
        query.avoid_illegal,
    );
    let graph = engine.graph();
    let trade_distance = engine.distance(
        variant,
        graph.station_node(seller.station),
        graph.station_node(buyer.station),
    );
    if !trade_distance.is_finite() {
        return None;
    }

    let origin_distance = match &query.origin {
        Some(origin) => {
            let distance = engine.point_to_station_distance(
                origin.position,
                &origin.sector,
                seller.station,
                query.origin_variant(),
            );
            if !distance.is_finite() {
                return None;
            }
            Some(distance)
        }
        None => None,
    };

    let mut deal = Deal {
        ware: ware.to_string(),
        seller: sell_index,
        buyer: buy_index,
        quantity,
        profit_per_unit,
        total_profit,
        trade_distance,
        origin_distance,
        score: total_profit,
        variant,
    };
    if query.rank_by_distance {
        let km = (deal.total_distance() / UNITS_PER_KM).max(MIN_SCORED_ROUTE_KM);
        deal.score = total_profit / km;
    }
    Some(deal)
}

/// Largest quantity that the offers, the hold, and the wallet all allow.
fn feasible_quantity(seller: &TradeOffer, buyer: &TradeOffer, query: &TradeQuery) -> u64 {
    let mut quantity = seller.amount.min(buyer.amount);
    if let Some(cap) = query.max_cargo {
        quantity = quantity.min(cap);
    }
    if let Some(origin) = &query.origin {
        if let Some(capacity) = origin.cargo_capacity {
            quantity = quantity.min(capacity);
        }
        if let Some(credits) = origin.credits {
            if seller.price > 0.0 {
                let affordable = (credits / seller.price).floor();
                quantity = quantity.min(affordable as u64);
            }
        }
    }
    quantity
}

/// Heap entry ordered by score, then by insertion order. The payload never
/// takes part in comparisons.
struct Ranked<T> {
    score: FloatOrd,
    sequence: u64,
    item: T,
}

impl<T> Ranked<T> {
    fn key(&self) -> (FloatOrd, u64) {
        (self.score, self.sequence)
    }
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Bounded selection of the `capacity` highest-scoring items.
pub struct TopK<T> {
    capacity: usize,
    next_sequence: u64,
    heap: BinaryHeap<Reverse<Ranked<T>>>,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_sequence: 0,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer an item; it is kept while there is room, or when its score is
    /// strictly greater than the current minimum.
    pub fn offer(&mut self, score: f64, item: T) {
        if self.capacity == 0 {
            return;
        }
        let entry = Ranked {
            score: FloatOrd(score),
            sequence: self.next_sequence,
            item,
        };
        self.next_sequence += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
            return;
        }
        if let Some(mut minimum) = self.heap.peek_mut() {
            if entry.score > minimum.0.score {
                *minimum = Reverse(entry);
            }
        }
    }

    /// Drain into a vector ordered by descending score; equal scores keep
    /// insertion order.
    pub fn into_sorted(self) -> Vec<T> {
        let mut entries: Vec<Ranked<T>> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        entries.into_iter().map(|entry| entry.item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(role: OfferRole, price: f64, amount: u64) -> TradeOffer {
        TradeOffer {
            ware: "ore".to_string(),
            station: 0,
            role,
            price,
            amount,
            illegal: false,
            sector: "s".to_string(),
            position: Position::default(),
        }
    }

    #[test]
    fn top_k_keeps_highest_scores() {
        let mut top = TopK::new(3);
        for (score, label) in [(1.0, "a"), (5.0, "b"), (3.0, "c"), (4.0, "d"), (2.0, "e")] {
            top.offer(score, label);
        }
        assert_eq!(top.len(), 3);
        assert_eq!(top.into_sorted(), vec!["b", "d", "c"]);
    }

    #[test]
    fn top_k_ties_do_not_replace_and_keep_insertion_order() {
        let mut top = TopK::new(2);
        top.offer(2.0, "first");
        top.offer(2.0, "second");
        top.offer(2.0, "third");
        assert_eq!(top.into_sorted(), vec!["first", "second"]);
    }

    #[test]
    fn top_k_with_zero_capacity_is_empty() {
        let mut top = TopK::new(0);
        top.offer(10.0, ());
        assert!(top.is_empty());
    }

    #[test]
    fn top_k_is_invariant_under_positive_scaling() {
        let scores = [3.5, 1.25, 9.0, 9.0, 0.5, 7.75];
        let pick = |factor: f64| {
            let mut top = TopK::new(4);
            for (index, score) in scores.iter().enumerate() {
                top.offer(score * factor, index);
            }
            top.into_sorted()
        };
        assert_eq!(pick(1.0), pick(1000.0));
        assert_eq!(pick(1.0), pick(0.01));
    }

    #[test]
    fn quantity_respects_every_cap() {
        let seller = offer(OfferRole::Sell, 10.0, 100);
        let buyer = offer(OfferRole::Buy, 15.0, 50);

        let mut query = TradeQuery::default();
        assert_eq!(feasible_quantity(&seller, &buyer, &query), 50);

        query.max_cargo = Some(40);
        assert_eq!(feasible_quantity(&seller, &buyer, &query), 40);

        query.origin = Some(TradeOrigin {
            position: Position::default(),
            sector: "s".to_string(),
            credits: Some(305.0),
            cargo_capacity: Some(35),
        });
        assert_eq!(feasible_quantity(&seller, &buyer, &query), 30);

        if let Some(origin) = query.origin.as_mut() {
            origin.credits = Some(9.99);
        }
        assert_eq!(feasible_quantity(&seller, &buyer, &query), 0);
    }

    #[test]
    fn free_wares_ignore_the_credit_cap() {
        let seller = offer(OfferRole::Sell, 0.0, 10);
        let buyer = offer(OfferRole::Buy, 1.0, 10);
        let query = TradeQuery {
            origin: Some(TradeOrigin {
                position: Position::default(),
                sector: "s".to_string(),
                credits: Some(0.0),
                cargo_capacity: None,
            }),
            ..TradeQuery::default()
        };
        assert_eq!(feasible_quantity(&seller, &buyer, &query), 10);
    }

    #[test]
    fn offer_book_only_pairs_wares_with_both_sides() {
        let mut sell = offer(OfferRole::Sell, 1.0, 1);
        sell.ware = "ore".to_string();
        let mut buy = offer(OfferRole::Buy, 2.0, 1);
        buy.ware = "ore".to_string();
        let mut lonely = offer(OfferRole::Sell, 1.0, 1);
        lonely.ware = "silicon".to_string();

        let book = OfferBook::from_offers(&[sell, lonely, buy]);
        let wares: Vec<_> = book.tradable_wares().map(|(ware, _, _)| ware).collect();
        assert_eq!(wares, vec!["ore"]);
    }
}
