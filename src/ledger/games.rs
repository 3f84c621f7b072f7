use super::models::{next_id, Game, LedgerDocument};
use crate::error::{LedgerError, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Fields supplied when creating or updating a game.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInput {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub opponent: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub participants: BTreeSet<u64>,
    #[serde(default)]
    pub result: Option<String>,
}

impl GameInput {
    /// Ids in `recorded` were valid when first referenced and may since have
    /// been deleted; every other participant must be a current member.
    fn validated(mut self, doc: &LedgerDocument, recorded: &BTreeSet<u64>) -> Result<Self> {
        self.date = self.date.trim().to_string();
        self.time = self.time.trim().to_string();
        self.opponent = self.opponent.trim().to_string();
        self.location = self.location.trim().to_string();

        let missing: Vec<&str> = [
            ("date", &self.date),
            ("time", &self.time),
            ("opponent", &self.opponent),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect();

        if !missing.is_empty() {
            return Err(LedgerError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        if let Some(unknown) = self
            .participants
            .iter()
            .find(|id| !recorded.contains(id) && doc.member(**id).is_none())
        {
            return Err(LedgerError::validation(format!(
                "unknown participant: {unknown}"
            )));
        }

        self.result = self
            .result
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(self)
    }
}

impl LedgerDocument {
    pub fn add_game(&mut self, input: GameInput) -> Result<Game> {
        let input = input.validated(self, &BTreeSet::new())?;

        let game = Game {
            id: next_id(self.games.iter().map(|g| g.id)),
            date: input.date,
            time: input.time,
            opponent: input.opponent,
            location: input.location,
            participants: input.participants,
            result: input.result,
            created_at: Utc::now(),
        };

        self.games.push(game.clone());
        Ok(game)
    }

    /// Replace the editable fields of a game. `result` is kept when not supplied.
    pub fn update_game(&mut self, id: u64, input: GameInput) -> Result<Game> {
        let recorded = self
            .games
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.participants.clone())
            .ok_or(LedgerError::game_not_found(id))?;
        let input = input.validated(self, &recorded)?;
        let game = self
            .games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(LedgerError::game_not_found(id))?;

        game.date = input.date;
        game.time = input.time;
        game.opponent = input.opponent;
        game.location = input.location;
        game.participants = input.participants;
        if input.result.is_some() {
            game.result = input.result;
        }

        Ok(game.clone())
    }

    pub fn delete_game(&mut self, id: u64) -> Result<Game> {
        let idx = self
            .games
            .iter()
            .position(|g| g.id == id)
            .ok_or(LedgerError::game_not_found(id))?;
        Ok(self.games.remove(idx))
    }

    /// Games ascending by calendar date. Unparsable dates go last.
    pub fn games_sorted(&self) -> Vec<Game> {
        let mut games = self.games.clone();
        games.sort_by(|a, b| compare_dates(&a.date, &b.date).then(a.id.cmp(&b.id)));
        games
    }
}

fn compare_dates(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
