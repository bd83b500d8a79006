//! Quote ranking and arbitrage detection

use super::Quote;
use alloy::primitives::U256;

/// Sort quotes by guaranteed minimum output, descending.
///
/// The sort is stable: venues that quoted the same output keep their
/// arrival order, so the first venue seen wins ties.
pub fn rank(mut quotes: Vec<Quote>) -> Vec<Quote> {
    quotes.sort_by(|a, b| b.min_output.cmp(&a.min_output));
    quotes
}

/// True when the gap between the two best quotes exceeds 0.5% of the best.
///
/// The comparison `(best - second) * 100 / best > 0.5` is evaluated exactly
/// in integers as `(best - second) * 200 > best`; no division, no rounding.
pub fn is_arbitrage_opportunity(ranked: &[Quote]) -> bool {
    let (Some(best), Some(second)) = (ranked.first(), ranked.get(1)) else {
        return false;
    };
    if best.min_output.is_zero() {
        return false;
    }
    let Some(gap) = best.min_output.checked_sub(second.min_output) else {
        return false;
    };
    gap * U256::from(200) > best.min_output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::quotes::{QuotePayload, RouteQuote, Venue};
    use alloy::primitives::Address;

    fn quote(venue: Venue, min_output: u64) -> Quote {
        Quote {
            venue,
            min_output: U256::from(min_output),
            payload: QuotePayload::Route(RouteQuote {
                chain: Network::Ethereum,
                from_token: Address::ZERO,
                to_token: Address::ZERO,
                amount_in: U256::ZERO,
                slippage_bps: 50,
            }),
        }
    }

    #[test]
    fn rank_sorts_descending() {
        let ranked = rank(vec![
            quote(Venue::Rfq, 990),
            quote(Venue::RouteAggregator, 1500),
            quote(Venue::Rfq, 1000),
        ]);

        let outputs: Vec<u64> = ranked.iter().map(|q| q.min_output.to::<u64>()).collect();
        assert_eq!(outputs, vec![1500, 1000, 990]);
    }

    #[test]
    fn rank_keeps_arrival_order_on_ties() {
        let ranked = rank(vec![
            quote(Venue::RouteAggregator, 1000),
            quote(Venue::Rfq, 1000),
        ]);

        assert_eq!(ranked[0].venue, Venue::RouteAggregator);
        assert_eq!(ranked[1].venue, Venue::Rfq);
    }

    #[test]
    fn no_opportunity_below_two_quotes() {
        assert!(!is_arbitrage_opportunity(&[]));
        assert!(!is_arbitrage_opportunity(&[quote(Venue::Rfq, 1000)]));
    }

    #[test]
    fn opportunity_above_half_percent() {
        // 1.0% gap
        let ranked = rank(vec![
            quote(Venue::RouteAggregator, 1000),
            quote(Venue::Rfq, 990),
        ]);
        assert!(is_arbitrage_opportunity(&ranked));

        // 0.7% gap: would vanish under truncating percent math
        let ranked = rank(vec![
            quote(Venue::RouteAggregator, 10_000),
            quote(Venue::Rfq, 9_930),
        ]);
        assert!(is_arbitrage_opportunity(&ranked));
    }

    #[test]
    fn no_opportunity_at_exactly_half_percent() {
        // gap of 5 on 1000 is exactly 0.5%, which must not trigger
        let ranked = rank(vec![
            quote(Venue::RouteAggregator, 1000),
            quote(Venue::Rfq, 995),
        ]);
        assert!(!is_arbitrage_opportunity(&ranked));
    }

    #[test]
    fn no_opportunity_on_equal_quotes() {
        let ranked = rank(vec![
            quote(Venue::RouteAggregator, 1000),
            quote(Venue::Rfq, 1000),
        ]);
        assert!(!is_arbitrage_opportunity(&ranked));
    }

    #[test]
    fn zero_output_never_triggers() {
        let ranked = vec![quote(Venue::RouteAggregator, 0), quote(Venue::Rfq, 0)];
        assert!(!is_arbitrage_opportunity(&ranked));
    }
}
