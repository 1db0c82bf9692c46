use crate::config::OVER_BINS;
use crate::types::{Delivery, InningsView, OverBin};

/// Bins one match's deliveries per over for the first and second innings.
///
/// Only overs `0..OVER_BINS` are binned; deliveries recorded past that are dropped.
/// Overs with no deliveries produce no bin.
pub fn bin_innings(deliveries: &[Delivery]) -> (InningsView, InningsView) {
    (bin_one(deliveries, 1), bin_one(deliveries, 2))
}

fn bin_one(deliveries: &[Delivery], inning: u8) -> InningsView {
    // (runs, wickets, deliveries seen) per over
    let mut slots = [(0u32, 0u32, 0u32); OVER_BINS as usize];
    for d in deliveries.iter().filter(|d| d.inning == inning && d.over < OVER_BINS) {
        let slot = &mut slots[d.over as usize];
        slot.0 += d.total_runs;
        slot.1 += u32::from(d.is_wicket);
        slot.2 += 1;
    }

    let bins: Vec<OverBin> = slots
        .iter()
        .zip(0u32..)
        .filter(|((_, _, seen), _)| *seen > 0)
        .map(|(&(runs, wickets, _), over)| OverBin { over, runs, wickets })
        .collect();

    let cumulative = bins
        .iter()
        .scan(0u32, |total, b| {
            *total += b.runs;
            Some(*total)
        })
        .collect();

    InningsView { bins, cumulative }
}

/// Batting and bowling side of the match, read from its first delivery.
pub fn match_teams(deliveries: &[Delivery]) -> Option<(String, String)> {
    deliveries
        .first()
        .map(|d| (d.batting_team.clone(), d.bowling_team.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(inning: u8, over: u32, total_runs: u32, is_wicket: u8) -> Delivery {
        Delivery {
            match_id: 7,
            inning,
            over,
            batting_team: if inning == 1 { "CSK" } else { "MI" }.to_string(),
            bowling_team: if inning == 1 { "MI" } else { "CSK" }.to_string(),
            total_runs,
            is_wicket,
        }
    }

    #[test]
    fn two_overs_first_innings() {
        let deliveries = vec![ball(1, 0, 4, 0), ball(1, 0, 1, 1), ball(1, 1, 6, 0)];
        let (first, second) = bin_innings(&deliveries);

        assert_eq!(
            first.bins,
            vec![
                OverBin { over: 0, runs: 5, wickets: 1 },
                OverBin { over: 1, runs: 6, wickets: 0 },
            ]
        );
        assert_eq!(first.cumulative, vec![5, 11]);
        assert!(second.is_empty());
        assert!(second.cumulative.is_empty());
    }

    #[test]
    fn no_deliveries_gives_empty_views() {
        let (first, second) = bin_innings(&[]);
        assert_eq!(first, InningsView::default());
        assert_eq!(second, InningsView::default());
        assert_eq!(match_teams(&[]), None);
    }

    #[test]
    fn empty_overs_are_skipped_not_zero_filled() {
        let deliveries = vec![ball(2, 0, 1, 0), ball(2, 3, 2, 0), ball(2, 3, 0, 1)];
        let (_, second) = bin_innings(&deliveries);
        let overs: Vec<u32> = second.bins.iter().map(|b| b.over).collect();
        assert_eq!(overs, vec![0, 3]);
        assert_eq!(second.cumulative, vec![1, 3]);
    }

    #[test]
    fn overs_past_twenty_and_super_overs_are_ignored() {
        let deliveries = vec![
            ball(1, 19, 4, 0),
            ball(1, 20, 1, 0),
            ball(3, 0, 6, 0),
        ];
        let (first, second) = bin_innings(&deliveries);
        assert_eq!(first.bins, vec![OverBin { over: 19, runs: 4, wickets: 0 }]);
        assert!(second.is_empty());
    }

    #[test]
    fn sums_match_innings_totals() {
        let mut deliveries = Vec::new();
        for over in 0..22u32 {
            if over % 5 == 2 {
                continue;
            }
            for b in 0..6u32 {
                deliveries.push(ball(1, over, (over + b) % 7, u8::from(b == 5 && over % 3 == 0)));
                deliveries.push(ball(2, over, (over * b) % 5, 0));
            }
        }

        let (first, second) = bin_innings(&deliveries);
        for (inning, view) in [(1u8, &first), (2u8, &second)] {
            let expected: u32 = deliveries
                .iter()
                .filter(|d| d.inning == inning && d.over < OVER_BINS)
                .map(|d| d.total_runs)
                .sum();
            assert_eq!(view.bins.iter().map(|b| b.runs).sum::<u32>(), expected);
            assert_eq!(view.total_runs(), expected);
            assert_eq!(view.cumulative.len(), view.bins.len());
            assert!(view.cumulative.windows(2).all(|w| w[0] <= w[1]));
            assert!(view.bins.windows(2).all(|w| w[0].over < w[1].over));
        }
    }

    #[test]
    fn teams_come_from_first_delivery() {
        let deliveries = vec![ball(1, 0, 1, 0), ball(2, 0, 1, 0)];
        assert_eq!(
            match_teams(&deliveries),
            Some(("CSK".to_string(), "MI".to_string()))
        );
    }
}
