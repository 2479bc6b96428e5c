use std::collections::HashMap;
use std::fmt;

use crate::game::{Match, Team};
use crate::player::PlayerId;


// Identifies an unordered pair of partners. The ids are stored sorted, so the token does not
// depend on argument order, and being a pair rather than a joined string it cannot collide
// whatever characters the ids contain.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PairingToken(PlayerId, PlayerId);

// Identifies an unordered match-up of two teams.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MatchupToken(PairingToken, PairingToken);

pub fn pairing_token(a: &PlayerId, b: &PlayerId) -> PairingToken {
    if a <= b {
        PairingToken(a.clone(), b.clone())
    } else {
        PairingToken(b.clone(), a.clone())
    }
}

pub fn team_pairing_token(team: &Team) -> PairingToken { pairing_token(&team[0], &team[1]) }

pub fn teams_pairing_token(team1: &Team, team2: &Team) -> MatchupToken {
    let t1 = team_pairing_token(team1);
    let t2 = team_pairing_token(team2);
    if t1 <= t2 { MatchupToken(t1, t2) } else { MatchupToken(t2, t1) }
}

impl PairingToken {
    pub fn players(&self) -> (&PlayerId, &PlayerId) { (&self.0, &self.1) }
}

impl fmt::Display for PairingToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{} & {}", self.0, self.1) }
}

impl fmt::Display for MatchupToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{} vs {}", self.0, self.1) }
}

// How often each partnership and each full match-up has occurred.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct PairingHistory {
    partnerships: HashMap<PairingToken, u32>,
    matchups: HashMap<MatchupToken, u32>,
}

impl PairingHistory {
    pub fn new() -> Self { Self::default() }

    pub fn record(&mut self, team1: &Team, team2: &Team) {
        for team in [team1, team2] {
            *self.partnerships.entry(team_pairing_token(team)).or_insert(0) += 1;
        }
        *self.matchups.entry(teams_pairing_token(team1, team2)).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool { self.partnerships.is_empty() }

    pub fn partnership_count(&self, token: &PairingToken) -> u32 {
        self.partnerships.get(token).copied().unwrap_or(0)
    }

    pub fn matchup_count(&self, token: &MatchupToken) -> u32 {
        self.matchups.get(token).copied().unwrap_or(0)
    }

    pub fn has_partnership(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.partnerships.contains_key(&pairing_token(a, b))
    }

    pub fn has_matchup(&self, team1: &Team, team2: &Team) -> bool {
        self.matchups.contains_key(&teams_pairing_token(team1, team2))
    }

    pub fn partnerships(&self) -> impl Iterator<Item = (&PairingToken, u32)> {
        self.partnerships.iter().map(|(token, &count)| (token, count))
    }
}

// Folds the matches played so far into partnership counts.
pub fn previous_pairing_counts<'a>(matches: impl IntoIterator<Item = &'a Match>) -> PairingHistory {
    let mut history = PairingHistory::new();
    for m in matches {
        history.record(&m.team1, &m.team2);
    }
    history
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MatchId;
    use crate::session::SessionId;
    use crate::test_util::team;

    fn played(team1: Team, team2: Team) -> Match {
        Match::new(MatchId::new("m"), SessionId::new("s"), 0, team1, team2)
    }

    #[test]
    fn tokens_are_symmetric() {
        let a = PlayerId::new("alice");
        let b = PlayerId::new("bob");
        assert_eq!(pairing_token(&a, &b), pairing_token(&b, &a));
        assert_eq!(
            teams_pairing_token(&team("a", "b"), &team("c", "d")),
            teams_pairing_token(&team("d", "c"), &team("b", "a"))
        );
    }

    #[test]
    fn separator_characters_do_not_collide() {
        let t1 = pairing_token(&PlayerId::new("a-b"), &PlayerId::new("c"));
        let t2 = pairing_token(&PlayerId::new("a"), &PlayerId::new("b-c"));
        assert_ne!(t1, t2);
    }

    #[test]
    fn counts_partnerships_and_matchups() {
        let history = previous_pairing_counts(&[
            played(team("a", "b"), team("c", "d")),
            played(team("b", "a"), team("c", "e")),
        ]);
        let partnerships = |a: &str, b: &str| {
            history.partnership_count(&pairing_token(&PlayerId::new(a), &PlayerId::new(b)))
        };
        assert_eq!(partnerships("a", "b"), 2);
        assert_eq!(partnerships("c", "d"), 1);
        assert!(!history.has_partnership(&PlayerId::new("a"), &PlayerId::new("c")));
        assert!(history.has_matchup(&team("d", "c"), &team("a", "b")));
        assert!(!history.has_matchup(&team("a", "b"), &team("d", "e")));
        let matchup = teams_pairing_token(&team("a", "b"), &team("c", "e"));
        assert_eq!(history.matchup_count(&matchup), 1);
    }
}
